//! Transformation tables
//!
//! Each facelet table is a gather permutation: after applying the move,
//! `new[i] = old[table[i]]`. Rows below are the six face blocks
//! (`U R F D L B`), nine facelets each, row-major as seen looking at the face.
//!
//! The orientation tables apply the same way to the six-entry mapping of
//! physical directions (`up right front down left back`) to logical faces and
//! exist for whole-cube rotations only.

use super::{FACE_COUNT, NUM_FACELETS};

/// Number of table-backed quarter moves
pub const QUARTER_MOVE_COUNT: usize = 18;

/// Facelet permutations, indexed by `QuarterMove::table_index`
#[rustfmt::skip]
pub const FACELET_TABLES: [[u8; NUM_FACELETS]; QUARTER_MOVE_COUNT] = [
    // U
    [
         6,  3,  0,  7,  4,  1,  8,  5,  2,
        45, 46, 47, 12, 13, 14, 15, 16, 17,
         9, 10, 11, 21, 22, 23, 24, 25, 26,
        27, 28, 29, 30, 31, 32, 33, 34, 35,
        18, 19, 20, 39, 40, 41, 42, 43, 44,
        36, 37, 38, 48, 49, 50, 51, 52, 53,
    ],
    // U'
    [
         2,  5,  8,  1,  4,  7,  0,  3,  6,
        18, 19, 20, 12, 13, 14, 15, 16, 17,
        36, 37, 38, 21, 22, 23, 24, 25, 26,
        27, 28, 29, 30, 31, 32, 33, 34, 35,
        45, 46, 47, 39, 40, 41, 42, 43, 44,
         9, 10, 11, 48, 49, 50, 51, 52, 53,
    ],
    // R
    [
         0,  1, 20,  3,  4, 23,  6,  7, 26,
        15, 12,  9, 16, 13, 10, 17, 14, 11,
        18, 19, 29, 21, 22, 32, 24, 25, 35,
        27, 28, 51, 30, 31, 48, 33, 34, 45,
        36, 37, 38, 39, 40, 41, 42, 43, 44,
         8, 46, 47,  5, 49, 50,  2, 52, 53,
    ],
    // R'
    [
         0,  1, 51,  3,  4, 48,  6,  7, 45,
        11, 14, 17, 10, 13, 16,  9, 12, 15,
        18, 19,  2, 21, 22,  5, 24, 25,  8,
        27, 28, 20, 30, 31, 23, 33, 34, 26,
        36, 37, 38, 39, 40, 41, 42, 43, 44,
        35, 46, 47, 32, 49, 50, 29, 52, 53,
    ],
    // F
    [
         0,  1,  2,  3,  4,  5, 44, 41, 38,
         6, 10, 11,  7, 13, 14,  8, 16, 17,
        24, 21, 18, 25, 22, 19, 26, 23, 20,
        15, 12,  9, 30, 31, 32, 33, 34, 35,
        36, 37, 27, 39, 40, 28, 42, 43, 29,
        45, 46, 47, 48, 49, 50, 51, 52, 53,
    ],
    // F'
    [
         0,  1,  2,  3,  4,  5,  9, 12, 15,
        29, 10, 11, 28, 13, 14, 27, 16, 17,
        20, 23, 26, 19, 22, 25, 18, 21, 24,
        38, 41, 44, 30, 31, 32, 33, 34, 35,
        36, 37,  8, 39, 40,  7, 42, 43,  6,
        45, 46, 47, 48, 49, 50, 51, 52, 53,
    ],
    // D
    [
         0,  1,  2,  3,  4,  5,  6,  7,  8,
         9, 10, 11, 12, 13, 14, 24, 25, 26,
        18, 19, 20, 21, 22, 23, 42, 43, 44,
        33, 30, 27, 34, 31, 28, 35, 32, 29,
        36, 37, 38, 39, 40, 41, 51, 52, 53,
        45, 46, 47, 48, 49, 50, 15, 16, 17,
    ],
    // D'
    [
         0,  1,  2,  3,  4,  5,  6,  7,  8,
         9, 10, 11, 12, 13, 14, 51, 52, 53,
        18, 19, 20, 21, 22, 23, 15, 16, 17,
        29, 32, 35, 28, 31, 34, 27, 30, 33,
        36, 37, 38, 39, 40, 41, 24, 25, 26,
        45, 46, 47, 48, 49, 50, 42, 43, 44,
    ],
    // L
    [
        53,  1,  2, 50,  4,  5, 47,  7,  8,
         9, 10, 11, 12, 13, 14, 15, 16, 17,
         0, 19, 20,  3, 22, 23,  6, 25, 26,
        18, 28, 29, 21, 31, 32, 24, 34, 35,
        42, 39, 36, 43, 40, 37, 44, 41, 38,
        45, 46, 33, 48, 49, 30, 51, 52, 27,
    ],
    // L'
    [
        18,  1,  2, 21,  4,  5, 24,  7,  8,
         9, 10, 11, 12, 13, 14, 15, 16, 17,
        27, 19, 20, 30, 22, 23, 33, 25, 26,
        53, 28, 29, 50, 31, 32, 47, 34, 35,
        38, 41, 44, 37, 40, 43, 36, 39, 42,
        45, 46,  6, 48, 49,  3, 51, 52,  0,
    ],
    // B
    [
        11, 14, 17,  3,  4,  5,  6,  7,  8,
         9, 10, 35, 12, 13, 34, 15, 16, 33,
        18, 19, 20, 21, 22, 23, 24, 25, 26,
        27, 28, 29, 30, 31, 32, 36, 39, 42,
         2, 37, 38,  1, 40, 41,  0, 43, 44,
        51, 48, 45, 52, 49, 46, 53, 50, 47,
    ],
    // B'
    [
        42, 39, 36,  3,  4,  5,  6,  7,  8,
         9, 10,  0, 12, 13,  1, 15, 16,  2,
        18, 19, 20, 21, 22, 23, 24, 25, 26,
        27, 28, 29, 30, 31, 32, 17, 14, 11,
        33, 37, 38, 34, 40, 41, 35, 43, 44,
        47, 50, 53, 46, 49, 52, 45, 48, 51,
    ],
    // x
    [
        18, 19, 20, 21, 22, 23, 24, 25, 26,
        15, 12,  9, 16, 13, 10, 17, 14, 11,
        27, 28, 29, 30, 31, 32, 33, 34, 35,
        53, 52, 51, 50, 49, 48, 47, 46, 45,
        38, 41, 44, 37, 40, 43, 36, 39, 42,
         8,  7,  6,  5,  4,  3,  2,  1,  0,
    ],
    // x'
    [
        53, 52, 51, 50, 49, 48, 47, 46, 45,
        11, 14, 17, 10, 13, 16,  9, 12, 15,
         0,  1,  2,  3,  4,  5,  6,  7,  8,
        18, 19, 20, 21, 22, 23, 24, 25, 26,
        42, 39, 36, 43, 40, 37, 44, 41, 38,
        35, 34, 33, 32, 31, 30, 29, 28, 27,
    ],
    // y
    [
         6,  3,  0,  7,  4,  1,  8,  5,  2,
        45, 46, 47, 48, 49, 50, 51, 52, 53,
         9, 10, 11, 12, 13, 14, 15, 16, 17,
        29, 32, 35, 28, 31, 34, 27, 30, 33,
        18, 19, 20, 21, 22, 23, 24, 25, 26,
        36, 37, 38, 39, 40, 41, 42, 43, 44,
    ],
    // y'
    [
         2,  5,  8,  1,  4,  7,  0,  3,  6,
        18, 19, 20, 21, 22, 23, 24, 25, 26,
        36, 37, 38, 39, 40, 41, 42, 43, 44,
        33, 30, 27, 34, 31, 28, 35, 32, 29,
        45, 46, 47, 48, 49, 50, 51, 52, 53,
         9, 10, 11, 12, 13, 14, 15, 16, 17,
    ],
    // z
    [
        42, 39, 36, 43, 40, 37, 44, 41, 38,
         6,  3,  0,  7,  4,  1,  8,  5,  2,
        24, 21, 18, 25, 22, 19, 26, 23, 20,
        15, 12,  9, 16, 13, 10, 17, 14, 11,
        33, 30, 27, 34, 31, 28, 35, 32, 29,
        47, 50, 53, 46, 49, 52, 45, 48, 51,
    ],
    // z'
    [
        11, 14, 17, 10, 13, 16,  9, 12, 15,
        29, 32, 35, 28, 31, 34, 27, 30, 33,
        20, 23, 26, 19, 22, 25, 18, 21, 24,
        38, 41, 44, 37, 40, 43, 36, 39, 42,
         2,  5,  8,  1,  4,  7,  0,  3,  6,
        51, 48, 45, 52, 49, 46, 53, 50, 47,
    ],
];

/// Orientation permutations, indexed by `QuarterMove::orientation_index`
#[rustfmt::skip]
pub const ORIENTATION_TABLES: [[u8; FACE_COUNT]; 6] = [
    [2, 1, 3, 5, 4, 0], // x
    [5, 1, 0, 2, 4, 3], // x'
    [0, 5, 1, 3, 2, 4], // y
    [0, 2, 4, 3, 5, 1], // y'
    [4, 0, 2, 1, 3, 5], // z
    [1, 3, 2, 4, 0, 5], // z'
];

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation<const N: usize>(table: &[u8; N]) -> bool {
        let mut seen = [false; N];
        for &i in table {
            let i = i as usize;
            if i >= N || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        true
    }

    fn compose<const N: usize>(first: &[u8; N], second: &[u8; N]) -> [u8; N] {
        // Applying `first` then `second` gathers through both tables
        let mut out = [0u8; N];
        for i in 0..N {
            out[i] = first[second[i] as usize];
        }
        out
    }

    fn identity<const N: usize>() -> [u8; N] {
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = i as u8;
        }
        out
    }

    #[test]
    fn test_tables_are_permutations() {
        for table in FACELET_TABLES.iter() {
            assert!(is_permutation(table));
        }
        for table in ORIENTATION_TABLES.iter() {
            assert!(is_permutation(table));
        }
    }

    #[test]
    fn test_prime_tables_invert_quarter_tables() {
        for pair in FACELET_TABLES.chunks(2) {
            assert_eq!(compose(&pair[0], &pair[1]), identity());
            assert_eq!(compose(&pair[1], &pair[0]), identity());
        }
        for pair in ORIENTATION_TABLES.chunks(2) {
            assert_eq!(compose(&pair[0], &pair[1]), identity());
        }
    }

    #[test]
    fn test_four_quarters_are_identity() {
        for table in FACELET_TABLES.iter() {
            let twice = compose(table, table);
            assert_eq!(compose(&twice, &twice), identity());
        }
    }

    #[test]
    fn test_face_turns_keep_centers() {
        // Centers sit at position 4 of each block
        for table in FACELET_TABLES[..12].iter() {
            for face in 0..FACE_COUNT {
                let center = face * 9 + 4;
                assert_eq!(table[center] as usize, center);
            }
        }
    }
}
