use bitlane::{BitVec, Word};
use derive_more::Display;
use std::fmt;
use std::str::FromStr;

/// A sign-extended Pauli operator on `n` qubits.
///
/// Stores one X bit and one Z bit per qubit plus a single overall sign bit;
/// per qubit, `(x, z)` reads as {I, X, Z, Y}. Phases are restricted to ±1:
/// the ±i bookkeeping of Pauli products is resolved at multiplication time
/// and must cancel (products that would leave a stray i-phase are rejected).
///
/// ```
/// use paulitab::PauliString;
///
/// let mut p: PauliString = "+XIZ".parse().unwrap();
/// let q: PauliString = "+ZIZ".parse().unwrap();
/// assert!(!p.commutes_with(&q));
/// p.set_sign(true);
/// assert_eq!(p.to_string(), "-XIZ");
/// ```
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PauliString {
    x: BitVec,
    z: BitVec,
    sign: bool,
}

impl PauliString {
    /// The identity operator on `num_qubits` qubits, positive sign.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            x: BitVec::zeros(num_qubits),
            z: BitVec::zeros(num_qubits),
            sign: false,
        }
    }

    /// Single-qubit X at `index` within `num_qubits` qubits.
    pub fn x(index: usize, num_qubits: usize) -> Self {
        let mut res = Self::identity(num_qubits);
        res.x.assign_index(index, true);
        res
    }

    /// Single-qubit Y at `index` within `num_qubits` qubits.
    pub fn y(index: usize, num_qubits: usize) -> Self {
        let mut res = Self::identity(num_qubits);
        res.x.assign_index(index, true);
        res.z.assign_index(index, true);
        res
    }

    /// Single-qubit Z at `index` within `num_qubits` qubits.
    pub fn z(index: usize, num_qubits: usize) -> Self {
        let mut res = Self::identity(num_qubits);
        res.z.assign_index(index, true);
        res
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn x_bit(&self, qubit: usize) -> bool {
        self.x.index(qubit)
    }

    #[must_use]
    pub fn z_bit(&self, qubit: usize) -> bool {
        self.z.index(qubit)
    }

    pub fn set_x_bit(&mut self, qubit: usize, to: bool) {
        self.x.assign_index(qubit, to);
    }

    pub fn set_z_bit(&mut self, qubit: usize, to: bool) {
        self.z.assign_index(qubit, to);
    }

    #[must_use]
    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn set_sign(&mut self, to: bool) {
        self.sign = to;
    }

    pub fn negate_sign(&mut self) {
        self.sign = !self.sign;
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        !self.sign && self.x.is_zero() && self.z.is_zero()
    }

    /// Number of qubits carrying a non-identity component.
    #[must_use]
    pub fn weight(&self) -> usize {
        self.x
            .as_words()
            .iter()
            .zip(self.z.as_words())
            .map(|(x, z)| (x | z).count_ones() as usize)
            .sum()
    }

    #[must_use]
    pub fn commutes_with(&self, other: &Self) -> bool {
        assert_eq!(self.num_qubits(), other.num_qubits());
        !words_anticommute(
            self.x.as_words(),
            self.z.as_words(),
            other.x.as_words(),
            other.z.as_words(),
        )
    }

    /// `self <- self * rhs` for commuting operands.
    ///
    /// # Panics
    ///
    /// Will panic if the operands anticommute, since the product would carry
    /// a ±i phase that a sign bit cannot hold.
    pub fn mul_assign_right(&mut self, rhs: &Self) {
        let exponent = self.mul_with_log_i(rhs);
        assert!(exponent % 2 == 0, "product of anticommuting Pauli strings");
        if exponent == 2 {
            self.negate_sign();
        }
    }

    /// `self <- self * rhs` up to phase; XORs the signs and returns the
    /// i-exponent (mod 4) accumulated by the xz reordering. The caller is
    /// responsible for folding the exponent into the sign.
    pub(crate) fn mul_with_log_i(&mut self, rhs: &Self) -> u8 {
        assert_eq!(self.num_qubits(), rhs.num_qubits());
        self.sign ^= rhs.sign;
        xor_mul_words(
            self.x.as_words_mut(),
            self.z.as_words_mut(),
            rhs.x.as_words(),
            rhs.z.as_words(),
        )
    }

    pub(crate) fn x_words(&self) -> &[Word] {
        self.x.as_words()
    }

    pub(crate) fn z_words(&self) -> &[Word] {
        self.z.as_words()
    }

    pub(crate) fn x_words_mut(&mut self) -> &mut [Word] {
        self.x.as_words_mut()
    }

    pub(crate) fn z_words_mut(&mut self) -> &mut [Word] {
        self.z.as_words_mut()
    }
}

/// `(dst_x, dst_z) <- (dst_x ^ src_x, dst_z ^ src_z)`, returning the
/// i-exponent (mod 4) the product picks up from reordering X past Z.
///
/// Each anticommuting qubit position contributes +i or -i; two carry planes
/// hold a per-bit-position counter mod 4 and a final popcount folds them.
pub(crate) fn xor_mul_words(dst_x: &mut [Word], dst_z: &mut [Word], src_x: &[Word], src_z: &[Word]) -> u8 {
    debug_assert!(dst_x.len() == dst_z.len() && dst_x.len() == src_x.len() && dst_x.len() == src_z.len());
    let mut low_plane: Word = 0;
    let mut high_plane: Word = 0;
    for word_index in 0..dst_x.len() {
        let old_x = dst_x[word_index];
        let old_z = dst_z[word_index];
        let new_x = old_x ^ src_x[word_index];
        let new_z = old_z ^ src_z[word_index];
        dst_x[word_index] = new_x;
        dst_z[word_index] = new_z;

        let x1z2 = old_x & src_z[word_index];
        let anti_commutes = (src_x[word_index] & old_z) ^ x1z2;
        high_plane ^= (low_plane ^ new_x ^ new_z ^ x1z2) & anti_commutes;
        low_plane ^= anti_commutes;
    }
    ((low_plane.count_ones() + 2 * high_plane.count_ones()) & 3) as u8
}

pub(crate) fn words_anticommute(x1: &[Word], z1: &[Word], x2: &[Word], z2: &[Word]) -> bool {
    let mut parity: Word = 0;
    for word_index in 0..x1.len() {
        parity ^= x1[word_index] & z2[word_index];
        parity ^= z1[word_index] & x2[word_index];
    }
    parity.count_ones() % 2 == 1
}

/// The input was not a `±[IXYZ_]*` Pauli string.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("not a valid Pauli string")]
pub struct PauliParseError;

impl std::error::Error for PauliParseError {}

impl FromStr for PauliString {
    type Err = PauliParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (sign, body) = match text.as_bytes().first() {
            Some(b'+') => (false, &text[1..]),
            Some(b'-') => (true, &text[1..]),
            _ => (false, text),
        };
        let mut res = Self::identity(body.chars().count());
        res.sign = sign;
        for (qubit, pauli) in body.chars().enumerate() {
            match pauli {
                'I' | '_' => {}
                'X' => res.x.assign_index(qubit, true),
                'Y' => {
                    res.x.assign_index(qubit, true);
                    res.z.assign_index(qubit, true);
                }
                'Z' => res.z.assign_index(qubit, true),
                _ => return Err(PauliParseError),
            }
        }
        Ok(res)
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.sign { '-' } else { '+' })?;
        for qubit in 0..self.num_qubits() {
            let pauli = match (self.x_bit(qubit), self.z_bit(qubit)) {
                (false, false) => 'I',
                (true, false) => 'X',
                (true, true) => 'Y',
                (false, true) => 'Z',
            };
            write!(f, "{pauli}")?;
        }
        Ok(())
    }
}
