//! Line module - the canonical slide/merge of a single row or column
//!
//! Every move reduces to sliding four lines toward index 0 (see
//! [`line_coords`](crate::board::line_coords)). Merging is a single pass in
//! travel order: a freshly merged tile never merges again in the same move,
//! so `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]` and `[2, 2, 2, 0]` becomes
//! `[4, 2, 0, 0]`. Tiles at [`MAX_TILE`](crate::types::MAX_TILE) do not merge.

use arrayvec::ArrayVec;

use crate::board::Line;
use crate::types::{can_merge, Tile, BOARD_SIZE};

/// Result of sliding one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideOutcome {
    pub line: Line,
    /// Sum of the merged tile values
    pub score: u32,
    /// Number of merges performed
    pub merges: u8,
}

impl SlideOutcome {
    /// Whether the slide changed the line (element-wise).
    pub fn changed_from(&self, before: &Line) -> bool {
        self.line != *before
    }
}

/// Slide a line toward index 0, merging equal neighbors once.
pub fn slide_line(line: Line) -> SlideOutcome {
    // Compaction: drop empties, keep order.
    let packed: ArrayVec<Tile, BOARD_SIZE> = line.iter().copied().filter(|&v| v != 0).collect();

    let mut out = [0; BOARD_SIZE];
    let mut write = 0usize;
    let mut score = 0u32;
    let mut merges = 0u8;

    let mut read = 0usize;
    while read < packed.len() {
        let v = packed[read];
        if read + 1 < packed.len() && can_merge(v, packed[read + 1]) {
            let merged = v * 2;
            out[write] = merged;
            score = score.saturating_add(merged);
            merges += 1;
            // Skip the consumed partner.
            read += 2;
        } else {
            out[write] = v;
            read += 1;
        }
        write += 1;
    }

    SlideOutcome {
        line: out,
        score,
        merges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_TILE;

    #[test]
    fn test_four_equal_tiles_merge_pairwise() {
        let out = slide_line([2, 2, 2, 2]);
        assert_eq!(out.line, [4, 4, 0, 0]);
        assert_eq!(out.score, 8);
        assert_eq!(out.merges, 2);
    }

    #[test]
    fn test_three_equal_tiles_merge_leading_pair() {
        let out = slide_line([2, 2, 2, 0]);
        assert_eq!(out.line, [4, 2, 0, 0]);
        assert_eq!(out.score, 4);
        assert_eq!(out.merges, 1);
    }

    #[test]
    fn test_no_cascading_merge() {
        // 4+4 makes 8, which must not merge with the existing 8 in this move.
        let out = slide_line([4, 4, 8, 0]);
        assert_eq!(out.line, [8, 8, 0, 0]);
        assert_eq!(out.score, 8);
    }

    #[test]
    fn test_max_tiles_stay_apart() {
        let out = slide_line([MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(out.line, [MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(out.score, 0);
        assert_eq!(out.merges, 0);

        let half = MAX_TILE / 2;
        let out = slide_line([half, half, MAX_TILE, 0]);
        assert_eq!(out.line, [MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(out.score, MAX_TILE);
    }

    #[test]
    fn test_merge_across_gaps() {
        let out = slide_line([2, 0, 0, 2]);
        assert_eq!(out.line, [4, 0, 0, 0]);
        assert_eq!(out.score, 4);
    }

    #[test]
    fn test_compaction_only() {
        let before = [0, 2, 0, 4];
        let out = slide_line(before);
        assert_eq!(out.line, [2, 4, 0, 0]);
        assert_eq!(out.score, 0);
        assert!(out.changed_from(&before));
    }

    #[test]
    fn test_unchanged_line() {
        let before = [2, 4, 8, 16];
        let out = slide_line(before);
        assert_eq!(out.line, before);
        assert_eq!(out.score, 0);
        assert!(!out.changed_from(&before));

        let empty = slide_line([0; 4]);
        assert_eq!(empty.line, [0; 4]);
        assert_eq!(empty.merges, 0);
    }

    #[test]
    fn test_non_adjacent_equal_tiles_do_not_merge() {
        let out = slide_line([2, 4, 2, 0]);
        assert_eq!(out.line, [2, 4, 2, 0]);
        assert_eq!(out.score, 0);
    }
}
