use crate::pauli::{PauliString, words_anticommute, xor_mul_words};
use bitlane::{BitMatrix, BitVec};
use itertools::Itertools;
use std::collections::TryReserveError;
use std::fmt;

/// The tracked images of the single-qubit Pauli generators under a Clifford.
///
/// A tableau of order `n` records `X_obs[q]` and `Z_obs[q]`, the images of
/// `X_q` and `Z_q`, as bit-packed [`PauliString`]s. Storage is one bit matrix
/// of `4n x n` bits (the x-bit plane of all `2n` generators stacked over the
/// z-bit plane) plus a `2n`-bit sign vector. Generator `g < n` is `X_obs[g]`
/// and generator `n + g` is `Z_obs[g]`.
///
/// The commutation structure is preserved by every update: `X_obs[p]`
/// anticommutes with `Z_obs[q]` exactly when `p == q`, and the binary matrix
/// of components stays symplectic. [`is_valid`](Tableau::is_valid) checks
/// this directly.
///
/// The `prepend_*` family composes a gate *before* the tracked Clifford by
/// rewriting whole generator rows; the transposed-view `append_*` family
/// lives in [`TransposedTableau`](crate::TransposedTableau).
#[must_use]
#[derive(Clone, PartialEq, Eq)]
pub struct Tableau {
    pub(crate) bits: BitMatrix,
    pub(crate) signs: BitVec,
    pub(crate) num_qubits: usize,
}

/// x-bit-plane row of generator `g`.
#[inline]
fn x_row(_num_qubits: usize, generator: usize) -> usize {
    generator
}

/// z-bit-plane row of generator `g`.
#[inline]
fn z_row(num_qubits: usize, generator: usize) -> usize {
    2 * num_qubits + generator
}

/// Generator index of `X_obs[q]`.
#[inline]
fn x_gen(_num_qubits: usize, qubit: usize) -> usize {
    qubit
}

/// Generator index of `Z_obs[q]`.
#[inline]
fn z_gen(num_qubits: usize, qubit: usize) -> usize {
    num_qubits + qubit
}

impl Tableau {
    /// The identity Clifford: `X_obs[q] = X_q`, `Z_obs[q] = Z_q`, all signs
    /// positive.
    pub fn identity(num_qubits: usize) -> Self {
        let mut res = Self {
            bits: BitMatrix::zeros(4 * num_qubits, num_qubits),
            signs: BitVec::zeros(2 * num_qubits),
            num_qubits,
        };
        res.reset_to_identity();
        res
    }

    /// Fallible variant of [`identity`](Tableau::identity).
    pub fn try_identity(num_qubits: usize) -> Result<Self, TryReserveError> {
        let mut res = Self {
            bits: BitMatrix::try_zeros(4 * num_qubits, num_qubits)?,
            signs: BitVec::zeros(2 * num_qubits),
            num_qubits,
        };
        res.reset_to_identity();
        Ok(res)
    }

    fn reset_to_identity(&mut self) {
        let n = self.num_qubits;
        for qubit in 0..n {
            self.bits.set((x_row(n, x_gen(n, qubit)), qubit), true);
            self.bits.set((z_row(n, z_gen(n, qubit)), qubit), true);
        }
    }

    /// Build a tableau from per-qubit image strings.
    ///
    /// `x_images[q]` is the image of `X_q`, `z_images[q]` of `Z_q`, in the
    /// `±IXYZ` notation of [`PauliString`]'s `FromStr`.
    ///
    /// # Panics
    ///
    /// Will panic if the lists have different lengths, an image fails to
    /// parse or has the wrong size, or the images do not form a valid
    /// Clifford.
    pub fn from_images(x_images: &[&str], z_images: &[&str]) -> Self {
        let num_qubits = x_images.len();
        let mut res = Self::identity(num_qubits);
        for (qubit, (x_image, z_image)) in x_images.iter().zip_eq(z_images).enumerate() {
            let x_image: PauliString = x_image.parse().expect("image should parse");
            let z_image: PauliString = z_image.parse().expect("image should parse");
            assert_eq!(x_image.num_qubits(), num_qubits);
            assert_eq!(z_image.num_qubits(), num_qubits);
            res.assign_generator(x_gen(num_qubits, qubit), &x_image);
            res.assign_generator(z_gen(num_qubits, qubit), &z_image);
        }
        assert!(res.is_valid(), "images do not form a Clifford tableau");
        res
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The image of `X_q`.
    pub fn x_observable(&self, qubit: usize) -> PauliString {
        self.generator(x_gen(self.num_qubits, qubit))
    }

    /// The image of `Z_q`.
    pub fn z_observable(&self, qubit: usize) -> PauliString {
        self.generator(z_gen(self.num_qubits, qubit))
    }

    /// Sign bit of `X_obs[q]`.
    #[must_use]
    pub fn x_sign(&self, qubit: usize) -> bool {
        self.signs.index(x_gen(self.num_qubits, qubit))
    }

    /// Sign bit of `Z_obs[q]`.
    #[must_use]
    pub fn z_sign(&self, qubit: usize) -> bool {
        self.signs.index(z_gen(self.num_qubits, qubit))
    }

    /// Whether `Z_obs[q]` carries any X component. When it does not, a
    /// Z-basis measurement of `q` is deterministic.
    #[must_use]
    pub fn z_observable_has_x_part(&self, qubit: usize) -> bool {
        let n = self.num_qubits;
        !self.bits.row_is_zero(x_row(n, z_gen(n, qubit)))
    }

    fn generator(&self, generator: usize) -> PauliString {
        let n = self.num_qubits;
        let mut res = PauliString::identity(n);
        res.x_words_mut().copy_from_slice(self.bits.row_words(x_row(n, generator)));
        res.z_words_mut().copy_from_slice(self.bits.row_words(z_row(n, generator)));
        res.set_sign(self.signs.index(generator));
        res
    }

    fn assign_generator(&mut self, generator: usize, image: &PauliString) {
        let n = self.num_qubits;
        self.bits
            .row_words_mut(x_row(n, generator))
            .copy_from_slice(image.x_words());
        self.bits
            .row_words_mut(z_row(n, generator))
            .copy_from_slice(image.z_words());
        self.signs.assign_index(generator, image.sign());
    }

    /// `generator[dst] <- i^extra * generator[dst] * generator[src]`.
    ///
    /// The accumulated i-exponent must come out even; `extra` supplies the
    /// explicit factor when a Y component is split as `Y = iXZ`.
    fn mul_generator(&mut self, dst: usize, src: usize, extra_i_exponent: u8) {
        let n = self.num_qubits;
        let ((dst_x, dst_z), (src_x, src_z)) = self
            .bits
            .rows2_mut_rows2((x_row(n, dst), z_row(n, dst)), (x_row(n, src), z_row(n, src)));
        let exponent = (extra_i_exponent + xor_mul_words(dst_x, dst_z, src_x, src_z)) & 3;
        debug_assert!(exponent % 2 == 0);
        if self.signs.index(src) ^ (exponent == 2) {
            self.signs.negate_index(dst);
        }
    }

    fn swap_signs(&mut self, gen_a: usize, gen_b: usize) {
        let a = self.signs.index(gen_a);
        let b = self.signs.index(gen_b);
        self.signs.assign_index(gen_a, b);
        self.signs.assign_index(gen_b, a);
    }

    fn swap_generators(&mut self, gen_a: usize, gen_b: usize) {
        let n = self.num_qubits;
        self.bits.swap_rows(x_row(n, gen_a), x_row(n, gen_b));
        self.bits.swap_rows(z_row(n, gen_a), z_row(n, gen_b));
        self.swap_signs(gen_a, gen_b);
    }

    // Prepend family: `T <- T . G`. The new image of each generator is the
    // image under T of G's conjugation action on that generator.

    pub fn prepend_h(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.swap_generators(x_gen(n, qubit), z_gen(n, qubit));
    }

    /// Hadamard about the X+Y axis: `X -> Y`, `Z -> -Z`.
    pub fn prepend_h_xy(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.mul_generator(x_gen(n, qubit), z_gen(n, qubit), 1);
        self.signs.negate_index(z_gen(n, qubit));
    }

    /// Hadamard about the Y+Z axis: `X -> -X`, `Z -> Y`.
    pub fn prepend_h_yz(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.mul_generator(z_gen(n, qubit), x_gen(n, qubit), 3);
        self.signs.negate_index(x_gen(n, qubit));
    }

    pub fn prepend_x(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.signs.negate_index(z_gen(n, qubit));
    }

    pub fn prepend_y(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.signs.negate_index(x_gen(n, qubit));
        self.signs.negate_index(z_gen(n, qubit));
    }

    pub fn prepend_z(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.signs.negate_index(x_gen(n, qubit));
    }

    /// `X -> Y`, `Z -> Z`.
    pub fn prepend_sqrt_z(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.mul_generator(x_gen(n, qubit), z_gen(n, qubit), 1);
    }

    /// `X -> -Y`, `Z -> Z`.
    pub fn prepend_sqrt_z_dag(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.mul_generator(x_gen(n, qubit), z_gen(n, qubit), 3);
    }

    /// `X -> X`, `Z -> -Y`.
    pub fn prepend_sqrt_x(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.mul_generator(z_gen(n, qubit), x_gen(n, qubit), 1);
    }

    /// `X -> X`, `Z -> Y`.
    pub fn prepend_sqrt_x_dag(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.mul_generator(z_gen(n, qubit), x_gen(n, qubit), 3);
    }

    /// `X -> -Z`, `Z -> X`.
    pub fn prepend_sqrt_y(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.prepend_h(qubit);
        self.signs.negate_index(x_gen(n, qubit));
    }

    /// `X -> Z`, `Z -> -X`.
    pub fn prepend_sqrt_y_dag(&mut self, qubit: usize) {
        let n = self.num_qubits;
        self.prepend_h(qubit);
        self.signs.negate_index(z_gen(n, qubit));
    }

    pub fn prepend_cx(&mut self, control: usize, target: usize) {
        let n = self.num_qubits;
        self.mul_generator(x_gen(n, control), x_gen(n, target), 0);
        self.mul_generator(z_gen(n, target), z_gen(n, control), 0);
    }

    pub fn prepend_cy(&mut self, control: usize, target: usize) {
        let n = self.num_qubits;
        self.mul_generator(x_gen(n, control), x_gen(n, target), 0);
        self.mul_generator(x_gen(n, control), z_gen(n, target), 1);
        self.mul_generator(x_gen(n, target), z_gen(n, control), 0);
        self.mul_generator(z_gen(n, target), z_gen(n, control), 0);
    }

    pub fn prepend_cz(&mut self, control: usize, target: usize) {
        let n = self.num_qubits;
        self.mul_generator(x_gen(n, control), z_gen(n, target), 0);
        self.mul_generator(x_gen(n, target), z_gen(n, control), 0);
    }

    pub fn prepend_swap(&mut self, qubit_a: usize, qubit_b: usize) {
        let n = self.num_qubits;
        self.swap_generators(x_gen(n, qubit_a), x_gen(n, qubit_b));
        self.swap_generators(z_gen(n, qubit_a), z_gen(n, qubit_b));
    }

    /// Prepend an arbitrary small-gate tableau at the given target qubits.
    ///
    /// The new image of each targeted generator is the image under `self` of
    /// the gate's conjugation action, scattered over `targets`.
    ///
    /// # Panics
    ///
    /// Will panic if `targets` does not match the gate's order, repeats a
    /// qubit, or indexes out of range.
    pub fn inplace_scatter_prepend(&mut self, gate: &Tableau, targets: &[usize]) {
        let n = self.num_qubits;
        assert_eq!(gate.num_qubits(), targets.len());
        for (position, &target) in targets.iter().enumerate() {
            assert!(target < n);
            for &other in &targets[position + 1..] {
                assert_ne!(target, other);
            }
        }

        let mut new_images = Vec::with_capacity(2 * targets.len());
        for generator in 0..targets.len() {
            new_images.push(self.eval_scattered(&gate.x_observable(generator), targets));
        }
        for generator in 0..targets.len() {
            new_images.push(self.eval_scattered(&gate.z_observable(generator), targets));
        }
        for (position, &target) in targets.iter().enumerate() {
            self.assign_generator(x_gen(n, target), &new_images[position]);
            self.assign_generator(z_gen(n, target), &new_images[targets.len() + position]);
        }
    }

    /// The image under the tracked Clifford of a Pauli on all `n` qubits.
    pub fn eval_image(&self, pauli: &PauliString) -> PauliString {
        assert_eq!(pauli.num_qubits(), self.num_qubits);
        let targets: Vec<usize> = (0..self.num_qubits).collect();
        self.eval_scattered(pauli, &targets)
    }

    /// The image of a `targets.len()`-qubit Pauli embedded at `targets`.
    fn eval_scattered(&self, pauli: &PauliString, targets: &[usize]) -> PauliString {
        let mut res = PauliString::identity(self.num_qubits);
        res.set_sign(pauli.sign());
        let mut exponent: u8 = 0;
        for (position, &target) in targets.iter().enumerate() {
            let x = pauli.x_bit(position);
            let z = pauli.z_bit(position);
            if x && z {
                exponent = (exponent + 1) & 3;
            }
            if x {
                exponent = (exponent + res.mul_with_log_i(&self.x_observable(target))) & 3;
            }
            if z {
                exponent = (exponent + res.mul_with_log_i(&self.z_observable(target))) & 3;
            }
        }
        debug_assert!(exponent % 2 == 0);
        if exponent == 2 {
            res.negate_sign();
        }
        res
    }

    /// The inverse Clifford.
    ///
    /// The binary part is the symplectic inverse `J M^T J` (J exchanges the
    /// x and z blocks); each sign is then fixed so that pushing the candidate
    /// image back through `self` reproduces the bare generator.
    pub fn inverse(&self) -> Tableau {
        let n = self.num_qubits;
        let mut res = Tableau {
            bits: BitMatrix::zeros(4 * n, n),
            signs: BitVec::zeros(2 * n),
            num_qubits: n,
        };
        for qubit in 0..n {
            for component in 0..n {
                // X_obs'[q].x[c] = Z_obs[c].z[q]   X_obs'[q].z[c] = X_obs[c].z[q]
                // Z_obs'[q].x[c] = Z_obs[c].x[q]   Z_obs'[q].z[c] = X_obs[c].x[q]
                res.bits.set(
                    (x_row(n, x_gen(n, qubit)), component),
                    self.bits.get((z_row(n, z_gen(n, component)), qubit)),
                );
                res.bits.set(
                    (z_row(n, x_gen(n, qubit)), component),
                    self.bits.get((z_row(n, x_gen(n, component)), qubit)),
                );
                res.bits.set(
                    (x_row(n, z_gen(n, qubit)), component),
                    self.bits.get((x_row(n, z_gen(n, component)), qubit)),
                );
                res.bits.set(
                    (z_row(n, z_gen(n, qubit)), component),
                    self.bits.get((x_row(n, x_gen(n, component)), qubit)),
                );
            }
        }
        for qubit in 0..n {
            let x_image = self.eval_image(&res.x_observable(qubit));
            debug_assert_eq!(x_image, {
                let mut expected = PauliString::x(qubit, n);
                expected.set_sign(x_image.sign());
                expected
            });
            res.signs.assign_index(x_gen(n, qubit), x_image.sign());
            let z_image = self.eval_image(&res.z_observable(qubit));
            debug_assert_eq!(z_image, {
                let mut expected = PauliString::z(qubit, n);
                expected.set_sign(z_image.sign());
                expected
            });
            res.signs.assign_index(z_gen(n, qubit), z_image.sign());
        }
        debug_assert!(res.is_valid());
        res
    }

    fn generators_anticommute(&self, gen_a: usize, gen_b: usize) -> bool {
        let n = self.num_qubits;
        words_anticommute(
            self.bits.row_words(x_row(n, gen_a)),
            self.bits.row_words(z_row(n, gen_a)),
            self.bits.row_words(x_row(n, gen_b)),
            self.bits.row_words(z_row(n, gen_b)),
        )
    }

    /// Whether the commutation invariants hold: `X_obs[p]` anticommutes with
    /// `Z_obs[q]` exactly when `p == q`, and images of a kind commute among
    /// themselves. Equivalent to the component matrix being symplectic.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let n = self.num_qubits;
        for a in 0..2 * n {
            for b in a..2 * n {
                let expected = b == a + n && a < n;
                if self.generators_anticommute(a, b) != expected {
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qubit in 0..self.num_qubits {
            write!(f, "X{qubit}→{}, ", self.x_observable(qubit))?;
        }
        for qubit in 0..self.num_qubits {
            write!(f, "Z{qubit}→{}, ", self.z_observable(qubit))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tableau({self})")
    }
}
