use crate::lane::{LANE_WORD_COUNT, Lane, LaneSlot, Word};
use crate::transpose::transpose_tile64;
use crate::{lane_count_for, word_count_for};
use rand::Rng;
use std::collections::TryReserveError;
use std::fmt;

/// A dense bit matrix whose rows are contiguous runs of 256-bit lanes.
///
/// Each row is padded to a whole number of lanes; padding bits beyond
/// [`column_count`](BitMatrix::column_count) are always zero. Row-level
/// operations work on whole lanes, so XOR-ing one row into another touches
/// 256 bits per step.
///
/// ```
/// use bitlane::BitMatrix;
///
/// let mut m = BitMatrix::zeros(4, 300);
/// m.set((1, 299), true);
/// assert!(m.get((1, 299)));
/// m.add_into_row(3, 1);
/// assert!(m.get((3, 299)));
/// ```
#[must_use]
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitMatrix {
    lanes: Vec<Lane>,
    row_count: usize,
    column_count: usize,
}

impl BitMatrix {
    pub fn zeros(row_count: usize, column_count: usize) -> Self {
        Self {
            lanes: vec![Lane::default(); row_count * lane_count_for(column_count)],
            row_count,
            column_count,
        }
    }

    /// Fallible variant of [`zeros`](BitMatrix::zeros); surfaces allocation
    /// failure instead of aborting.
    pub fn try_zeros(row_count: usize, column_count: usize) -> Result<Self, TryReserveError> {
        let lane_total = row_count * lane_count_for(column_count);
        let mut lanes = Vec::new();
        lanes.try_reserve_exact(lane_total)?;
        lanes.resize(lane_total, Lane::default());
        Ok(Self {
            lanes,
            row_count,
            column_count,
        })
    }

    /// Create a matrix with uniformly random entries; padding stays zero.
    pub fn random_with_rng<R: Rng>(row_count: usize, column_count: usize, rng: &mut R) -> Self {
        let mut res = Self::zeros(row_count, column_count);
        rng.fill(res.as_words_mut());
        res.mask_row_padding();
        res
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.column_count)
    }

    #[inline]
    fn lanes_per_row(&self) -> usize {
        lane_count_for(self.column_count)
    }

    /// Number of 64-bit words in each (padded) row.
    #[inline]
    #[must_use]
    pub fn words_per_row(&self) -> usize {
        word_count_for(self.column_count)
    }

    pub fn row(&self, index: usize) -> &[Lane] {
        let stride = self.lanes_per_row();
        &self.lanes[index * stride..(index + 1) * stride]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [Lane] {
        let stride = self.lanes_per_row();
        &mut self.lanes[index * stride..(index + 1) * stride]
    }

    /// The row as a flat word slice.
    #[must_use]
    pub fn row_words(&self, index: usize) -> &[Word] {
        lane_words(self.row(index))
    }

    /// The row as a mutable flat word slice.
    ///
    /// Callers writing through this view must keep padding bits zero.
    #[must_use]
    pub fn row_words_mut(&mut self, index: usize) -> &mut [Word] {
        lane_words_mut(self.row_mut(index))
    }

    /// Mutable word views of two distinct rows, returned in argument order.
    ///
    /// # Panics
    ///
    /// Will panic if the indexes are equal or out of range.
    pub fn rows2_words_mut(&mut self, row_a: usize, row_b: usize) -> (&mut [Word], &mut [Word]) {
        assert_ne!(row_a, row_b);
        assert!(row_a < self.row_count && row_b < self.row_count);
        let stride = self.lanes_per_row();
        let (low, high, a_is_low) = if row_a < row_b {
            (row_a, row_b, true)
        } else {
            (row_b, row_a, false)
        };
        let (head, tail) = self.lanes.split_at_mut(high * stride);
        let low_words = lane_words_mut(&mut head[low * stride..(low + 1) * stride]);
        let high_words = lane_words_mut(&mut tail[..stride]);
        if a_is_low { (low_words, high_words) } else { (high_words, low_words) }
    }

    /// Mutable word views of two rows plus shared word views of two more.
    ///
    /// # Panics
    ///
    /// Will panic if any two of the four indexes coincide or are out of range.
    pub fn rows2_mut_rows2(
        &mut self,
        mut_rows: (usize, usize),
        shared_rows: (usize, usize),
    ) -> ((&mut [Word], &mut [Word]), (&[Word], &[Word])) {
        let all = [mut_rows.0, mut_rows.1, shared_rows.0, shared_rows.1];
        for (position, &row) in all.iter().enumerate() {
            assert!(row < self.row_count);
            for &other in &all[position + 1..] {
                assert_ne!(row, other);
            }
        }
        let stride = self.lanes_per_row();
        let words_per_row = self.words_per_row();
        let base = self.lanes.as_mut_ptr();
        unsafe {
            let row_at = |row: usize| base.add(row * stride).cast::<Word>();
            (
                (
                    std::slice::from_raw_parts_mut(row_at(mut_rows.0), words_per_row),
                    std::slice::from_raw_parts_mut(row_at(mut_rows.1), words_per_row),
                ),
                (
                    std::slice::from_raw_parts(row_at(shared_rows.0), words_per_row),
                    std::slice::from_raw_parts(row_at(shared_rows.1), words_per_row),
                ),
            )
        }
    }

    /// # Panics
    ///
    /// Will panic if index out of range.
    #[must_use]
    pub fn get(&self, index: (usize, usize)) -> bool {
        assert!(index.0 < self.row_count && index.1 < self.column_count);
        LaneSlot::of(index.1).value_in(self.row_words(index.0))
    }

    /// # Panics
    ///
    /// Will panic if index out of range.
    pub fn set(&mut self, index: (usize, usize), to: bool) {
        assert!(index.0 < self.row_count && index.1 < self.column_count);
        LaneSlot::of(index.1).assign_in(self.row_words_mut(index.0), to);
    }

    /// Toggle the bit at the given (row, column) index.
    ///
    /// # Panics
    ///
    /// Will panic if index out of range.
    pub fn negate(&mut self, index: (usize, usize)) {
        assert!(index.0 < self.row_count && index.1 < self.column_count);
        LaneSlot::of(index.1).negate_in(self.row_words_mut(index.0));
    }

    #[must_use]
    pub fn row_is_zero(&self, index: usize) -> bool {
        self.row(index).iter().all(Lane::is_zero)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.lanes.iter().all(Lane::is_zero)
    }

    pub fn swap_rows(&mut self, left_row_index: usize, right_row_index: usize) {
        if left_row_index == right_row_index {
            return;
        }
        let (left, right) = self.rows2_words_mut(left_row_index, right_row_index);
        left.swap_with_slice(right);
    }

    /// `row[to_index] ^= row[from_index]`, addition in GF(2).
    ///
    /// # Panics
    ///
    /// Will panic if the indexes are equal.
    pub fn add_into_row(&mut self, to_index: usize, from_index: usize) {
        let (to_row, from_row) = self.rows2_words_mut(to_index, from_index);
        for (to_word, from_word) in to_row.iter_mut().zip(from_row.iter()) {
            *to_word ^= *from_word;
        }
    }

    /// The whole buffer as a flat word slice, padding included.
    #[must_use]
    pub fn as_words(&self) -> &[Word] {
        lane_words(&self.lanes)
    }

    /// The whole buffer as a mutable flat word slice, padding included.
    #[must_use]
    pub fn as_words_mut(&mut self) -> &mut [Word] {
        lane_words_mut(&mut self.lanes)
    }

    /// Transpose of the row slab `[start_row, start_row + slab_rows)`.
    ///
    /// The result has one row per column of `self` and one column per slab
    /// row. Works in 64x64 bit tiles.
    ///
    /// # Panics
    ///
    /// Will panic if the slab exceeds the matrix.
    pub fn transposed_rows(&self, start_row: usize, slab_rows: usize) -> BitMatrix {
        assert!(start_row + slab_rows <= self.row_count);
        let mut res = BitMatrix::zeros(self.column_count, slab_rows);
        let row_tiles = slab_rows.div_ceil(64);
        let column_tiles = self.column_count.div_ceil(64);
        let mut tile = [0u64; 64];
        for tile_row in 0..row_tiles {
            for tile_column in 0..column_tiles {
                for (offset, slot) in tile.iter_mut().enumerate() {
                    let row = tile_row * 64 + offset;
                    *slot = if row < slab_rows {
                        self.row_words(start_row + row)[tile_column]
                    } else {
                        0
                    };
                }
                transpose_tile64(&mut tile);
                for (offset, &value) in tile.iter().enumerate() {
                    let row = tile_column * 64 + offset;
                    if row < self.column_count {
                        res.row_words_mut(row)[tile_row] = value;
                    }
                }
            }
        }
        res
    }

    /// Transpose of the whole matrix.
    pub fn transposed(&self) -> BitMatrix {
        self.transposed_rows(0, self.row_count)
    }

    /// Overwrite the row slab starting at `start_row` with the rows of `src`.
    ///
    /// # Panics
    ///
    /// Will panic if column counts differ or the slab exceeds the matrix.
    pub fn overwrite_rows(&mut self, start_row: usize, src: &BitMatrix) {
        assert_eq!(self.column_count, src.column_count);
        assert!(start_row + src.row_count <= self.row_count);
        for src_row in 0..src.row_count {
            self.row_mut(start_row + src_row).copy_from_slice(src.row(src_row));
        }
    }

    fn mask_row_padding(&mut self) {
        let excess_bits = self.column_count % Word::BITS as usize;
        let full_words = self.column_count / Word::BITS as usize;
        let words_per_row = self.words_per_row();
        for row in 0..self.row_count {
            let words = self.row_words_mut(row);
            if full_words < words_per_row {
                if excess_bits > 0 {
                    words[full_words] &= (1u64 << excess_bits) - 1;
                } else {
                    words[full_words] = 0;
                }
                for word in &mut words[full_words + 1..] {
                    *word = 0;
                }
            }
        }
    }
}

#[inline]
fn lane_words(lanes: &[Lane]) -> &[Word] {
    unsafe { std::slice::from_raw_parts(lanes.as_ptr().cast::<Word>(), lanes.len() * LANE_WORD_COUNT) }
}

#[inline]
fn lane_words_mut(lanes: &mut [Lane]) -> &mut [Word] {
    unsafe { std::slice::from_raw_parts_mut(lanes.as_mut_ptr().cast::<Word>(), lanes.len() * LANE_WORD_COUNT) }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row_index in 0..self.row_count {
            for column_index in 0..self.column_count {
                let value = i32::from(self.get((row_index, column_index)));
                write!(f, "{value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitMatrix(shape={:?})", self.shape())
    }
}
