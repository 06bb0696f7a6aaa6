//! Fixed sheet geometry and the back-to-back index permutation
//!
//! Both tables are declared once here so the physical alignment invariant
//! (a flipped calendar sheet must line up with its address sheet) lives in
//! a single place instead of being scattered through the renderers.

use crate::types::Uprn;

/// Paste offsets for the four grid cells on the blank SRA3 sheet:
/// top-left, top-right, bottom-left, bottom-right.
pub const CARD_OFFSETS: [(u32, u32); 4] = [(82, 47), (2657, 47), (82, 1890), (2657, 1890)];

/// Remap a 1-based card index for the calendar side: 1↔2, 3↔4.
///
/// The two sides are printed back to back, so when the sheet is flipped the
/// left and right columns trade places. The permutation is its own inverse.
pub fn flip_index(index: usize) -> usize {
    debug_assert!((1..=4).contains(&index));
    match index {
        1 => 2,
        2 => 1,
        3 => 4,
        _ => 3,
    }
}

/// Apply the same pair swap to a whole group of UPRNs.
pub fn flip_group(group: &[Uprn; 4]) -> [Uprn; 4] {
    [
        group[1].clone(),
        group[0].clone(),
        group[3].clone(),
        group[2].clone(),
    ]
}
