use crate::tableau::Tableau;
use bitlane::BitMatrix;

/// Qubit-major view of a [`Tableau`], for measurement collapse.
///
/// The tableau's bit planes are generator-major: one row per generator, one
/// bit per qubit. Collapse works the other way around, conjugating every
/// generator at one qubit, so this view holds the transposed planes, where
/// row `q` spans all `2n` generators and the `append_*` updates become
/// whole-lane row operations.
///
/// Constructing the view transposes the planes; dropping it transposes them
/// back, so mutations made through the view are retained by the tableau. The
/// view is the authoritative state while it lives (the tableau itself is
/// inaccessible, being mutably borrowed).
#[must_use]
pub struct TransposedTableau<'t> {
    tableau: &'t mut Tableau,
    x_planes: BitMatrix,
    z_planes: BitMatrix,
}

impl<'t> TransposedTableau<'t> {
    pub fn new(tableau: &'t mut Tableau) -> Self {
        let generators = 2 * tableau.num_qubits;
        let x_planes = tableau.bits.transposed_rows(0, generators);
        let z_planes = tableau.bits.transposed_rows(generators, generators);
        Self {
            tableau,
            x_planes,
            z_planes,
        }
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.tableau.num_qubits
    }

    /// X bit of `Z_obs[target]` at `qubit`.
    #[must_use]
    pub fn z_obs_x_bit(&self, target: usize, qubit: usize) -> bool {
        let n = self.num_qubits();
        self.x_planes.get((qubit, n + target))
    }

    /// Z bit of `Z_obs[target]` at `qubit`.
    #[must_use]
    pub fn z_obs_z_bit(&self, target: usize, qubit: usize) -> bool {
        let n = self.num_qubits();
        self.z_planes.get((qubit, n + target))
    }

    /// Sign bit of `Z_obs[target]`.
    #[must_use]
    pub fn z_sign(&self, target: usize) -> bool {
        let n = self.num_qubits();
        self.tableau.signs.index(n + target)
    }

    // Append family: conjugate every generator's component at the target
    // qubit(s). Row `q` of a transposed plane holds that component for all
    // 2n generators at once; the sign vector is indexed the same way.

    /// `X <-> Z`, `Y -> -Y`.
    pub fn append_h(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter_mut()).zip(z_row.iter_mut()) {
            *sign ^= *x & *z;
            std::mem::swap(x, z);
        }
    }

    /// `X <-> Y`, `Z -> -Z`.
    pub fn append_h_xy(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter()).zip(z_row.iter_mut()) {
            *sign ^= *z & !*x;
            *z ^= *x;
        }
    }

    /// `Y <-> Z`, `X -> -X`.
    pub fn append_h_yz(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter_mut()).zip(z_row.iter()) {
            *sign ^= *x & !*z;
            *x ^= *z;
        }
    }

    /// Flip the sign of every generator with a Z or Y component at `qubit`.
    pub fn append_x(&mut self, qubit: usize) {
        let z_row = self.z_planes.row_words(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for (sign, z) in signs.iter_mut().zip(z_row.iter()) {
            *sign ^= *z;
        }
    }

    /// Flip the sign of every generator with an X or Z component at `qubit`.
    pub fn append_y(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words(qubit);
        let z_row = self.z_planes.row_words(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter()).zip(z_row.iter()) {
            *sign ^= *x ^ *z;
        }
    }

    /// Flip the sign of every generator with an X or Y component at `qubit`.
    pub fn append_z(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for (sign, x) in signs.iter_mut().zip(x_row.iter()) {
            *sign ^= *x;
        }
    }

    /// `X -> Y`, `Y -> -X`, `Z -> Z`.
    pub fn append_sqrt_z(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter()).zip(z_row.iter_mut()) {
            *sign ^= *x & *z;
            *z ^= *x;
        }
    }

    /// `X -> -Y`, `Y -> X`, `Z -> Z`.
    pub fn append_sqrt_z_dag(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter()).zip(z_row.iter_mut()) {
            *sign ^= *x & !*z;
            *z ^= *x;
        }
    }

    /// `Z -> -Y`, `Y -> Z`, `X -> X`.
    pub fn append_sqrt_x(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter_mut()).zip(z_row.iter()) {
            *sign ^= *z & !*x;
            *x ^= *z;
        }
    }

    /// `Z -> Y`, `Y -> -Z`, `X -> X`.
    pub fn append_sqrt_x_dag(&mut self, qubit: usize) {
        let x_row = self.x_planes.row_words_mut(qubit);
        let z_row = self.z_planes.row_words_mut(qubit);
        let signs = self.tableau.signs.as_words_mut();
        for ((sign, x), z) in signs.iter_mut().zip(x_row.iter_mut()).zip(z_row.iter()) {
            *sign ^= *x & *z;
            *x ^= *z;
        }
    }

    pub fn append_cx(&mut self, control: usize, target: usize) {
        let (target_x, control_x) = self.x_planes.rows2_words_mut(target, control);
        let (control_z, target_z) = self.z_planes.rows2_words_mut(control, target);
        let signs = self.tableau.signs.as_words_mut();
        for word_index in 0..signs.len() {
            signs[word_index] ^=
                control_x[word_index] & target_z[word_index] & !(target_x[word_index] ^ control_z[word_index]);
            target_x[word_index] ^= control_x[word_index];
            control_z[word_index] ^= target_z[word_index];
        }
    }

    pub fn append_cz(&mut self, control: usize, target: usize) {
        let (control_x, target_x) = self.x_planes.rows2_words_mut(control, target);
        let (control_z, target_z) = self.z_planes.rows2_words_mut(control, target);
        let signs = self.tableau.signs.as_words_mut();
        for word_index in 0..signs.len() {
            signs[word_index] ^=
                control_x[word_index] & target_x[word_index] & (control_z[word_index] ^ target_z[word_index]);
            control_z[word_index] ^= target_x[word_index];
            target_z[word_index] ^= control_x[word_index];
        }
    }

    pub fn append_cy(&mut self, control: usize, target: usize) {
        self.append_sqrt_z_dag(target);
        self.append_cx(control, target);
        self.append_sqrt_z(target);
    }
}

impl Drop for TransposedTableau<'_> {
    fn drop(&mut self) {
        let generators = 2 * self.tableau.num_qubits;
        self.tableau.bits.overwrite_rows(0, &self.x_planes.transposed());
        self.tableau.bits.overwrite_rows(generators, &self.z_planes.transposed());
    }
}
