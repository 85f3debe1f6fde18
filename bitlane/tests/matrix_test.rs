use bitlane::{BitMatrix, BitVec, LANE_BIT_LEN, word_count_for};
use proptest::prelude::*;
use rand::prelude::*;

fn arbitrary_bitmatrix(max_dimension: usize) -> impl Strategy<Value = BitMatrix> {
    ((0..max_dimension), (0..max_dimension), any::<u64>()).prop_map(|(rows, columns, seed)| {
        let mut rng = StdRng::seed_from_u64(seed);
        BitMatrix::random_with_rng(rows, columns, &mut rng)
    })
}

fn nonempty_bitmatrix(max_dimension: usize) -> impl Strategy<Value = BitMatrix> {
    ((1..max_dimension), (1..max_dimension), any::<u64>()).prop_map(|(rows, columns, seed)| {
        let mut rng = StdRng::seed_from_u64(seed);
        BitMatrix::random_with_rng(rows, columns, &mut rng)
    })
}

proptest! {
    #[test]
    fn shape(row_count in 0..200usize, column_count in 0..200usize) {
        let matrix = BitMatrix::zeros(row_count, column_count);
        prop_assert_eq!(matrix.row_count(), row_count);
        prop_assert_eq!(matrix.column_count(), column_count);
        prop_assert_eq!(matrix.shape(), (row_count, column_count));
        prop_assert!(matrix.is_zero());
    }

    #[test]
    fn set_then_get(matrix in nonempty_bitmatrix(100), raw_index in (0..100usize, 0..100usize)) {
        let mut matrix = matrix;
        let index = (raw_index.0 % matrix.row_count(), raw_index.1 % matrix.column_count());
        matrix.set(index, true);
        prop_assert!(matrix.get(index));
        matrix.negate(index);
        prop_assert!(!matrix.get(index));
    }

    #[test]
    fn padding_stays_zero(matrix in arbitrary_bitmatrix(100)) {
        let excess = matrix.column_count() % 64;
        let full_words = matrix.column_count() / 64;
        for row in 0..matrix.row_count() {
            let words = matrix.row_words(row);
            if excess > 0 {
                prop_assert_eq!(words[full_words] & !((1u64 << excess) - 1), 0);
            }
            for &word in &words[(full_words + usize::from(excess > 0))..] {
                prop_assert_eq!(word, 0);
            }
        }
    }

    #[test]
    fn swap_rows(matrix in nonempty_bitmatrix(100), raw_rows in (0..100usize, 0..100usize)) {
        let rows = (raw_rows.0 % matrix.row_count(), raw_rows.1 % matrix.row_count());
        let mut swapped = matrix.clone();
        swapped.swap_rows(rows.0, rows.1);
        for column in 0..matrix.column_count() {
            prop_assert_eq!(matrix.get((rows.0, column)), swapped.get((rows.1, column)));
            prop_assert_eq!(matrix.get((rows.1, column)), swapped.get((rows.0, column)));
        }
    }

    #[test]
    fn add_into_row_is_gf2_addition(matrix in nonempty_bitmatrix(100), raw_rows in (0..100usize, 0..100usize)) {
        let to_index = raw_rows.0 % matrix.row_count();
        let from_index = raw_rows.1 % matrix.row_count();
        prop_assume!(to_index != from_index);
        let mut summed = matrix.clone();
        summed.add_into_row(to_index, from_index);
        for column in 0..matrix.column_count() {
            let expected = matrix.get((to_index, column)) ^ matrix.get((from_index, column));
            prop_assert_eq!(summed.get((to_index, column)), expected);
        }
    }

    #[test]
    fn transpose_matches_pointwise(matrix in arbitrary_bitmatrix(150)) {
        let transposed = matrix.transposed();
        prop_assert_eq!(transposed.shape(), (matrix.column_count(), matrix.row_count()));
        for row in 0..matrix.row_count() {
            for column in 0..matrix.column_count() {
                prop_assert_eq!(matrix.get((row, column)), transposed.get((column, row)));
            }
        }
    }

    #[test]
    fn transpose_is_an_involution(matrix in arbitrary_bitmatrix(150)) {
        prop_assert_eq!(matrix.transposed().transposed(), matrix);
    }

    #[test]
    fn slab_transpose_round_trips_through_overwrite(seed in any::<u64>(), rows in 2..100usize, columns in 1..100usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let matrix = BitMatrix::random_with_rng(rows, columns, &mut rng);
        let slab_rows = rows / 2;
        let slab = matrix.transposed_rows(rows - slab_rows, slab_rows);
        let mut rebuilt = matrix.clone();
        rebuilt.overwrite_rows(rows - slab_rows, &slab.transposed());
        prop_assert_eq!(rebuilt, matrix);
    }

    #[test]
    fn bitvec_support_matches_indexing(bits in proptest::collection::vec(any::<bool>(), 0..300)) {
        let vec = BitVec::from_iter_with_len(bits.iter().copied(), bits.len());
        let expected: Vec<usize> = bits.iter().enumerate().filter_map(|(i, &b)| b.then_some(i)).collect();
        prop_assert_eq!(vec.support().collect::<Vec<_>>(), expected);
        prop_assert_eq!(vec.weight(), bits.iter().filter(|&&b| b).count());
    }
}

#[test]
fn zero_size_matrices_are_valid() {
    let empty = BitMatrix::zeros(0, 0);
    assert!(empty.is_zero());
    assert_eq!(empty.transposed().shape(), (0, 0));

    let no_columns = BitMatrix::zeros(5, 0);
    assert_eq!(no_columns.words_per_row(), 0);
    assert!(no_columns.row_is_zero(4));
}

#[test]
fn large_dimensions_do_not_overflow_stride_arithmetic() {
    let qubits = 1024;
    let mut matrix = BitMatrix::zeros(4 * qubits, qubits);
    matrix.set((4 * qubits - 1, qubits - 1), true);
    assert!(matrix.get((4 * qubits - 1, qubits - 1)));
    assert_eq!(matrix.words_per_row(), word_count_for(qubits));
    let transposed = matrix.transposed();
    assert!(transposed.get((qubits - 1, 4 * qubits - 1)));
}

#[test]
fn try_zeros_reports_allocation_failure() {
    assert!(BitMatrix::try_zeros(8, LANE_BIT_LEN).is_ok());
    assert!(BitMatrix::try_zeros(usize::MAX / LANE_BIT_LEN, LANE_BIT_LEN).is_err());
}

#[test]
fn ones_masks_padding() {
    let vec = BitVec::ones(70);
    assert_eq!(vec.weight(), 70);
    assert_eq!(vec.as_words()[1] & !((1u64 << 6) - 1), 0);
}
