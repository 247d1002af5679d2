//! Chunk merging and post-processing.

use super::char_len;
use super::pipeline::ChunkConfig;
use super::splitters::rebalance;
use std::collections::VecDeque;

/// Fold pieces shorter than `min_chunk_size` into a neighbor.
///
/// A short piece is prepended to the next piece when the result fits
/// `max_chunk_size`, otherwise appended to the previous one when that fits.
/// When neither fits, the piece is prepended to the next one anyway and the
/// combined text is split again, so only the final piece can stay short.
/// Content is never dropped.
pub fn absorb_short_pieces(pieces: Vec<String>, config: &ChunkConfig, separator: &str) -> Vec<String> {
    let separator_len = char_len(separator);
    let fits = |a: &str, b: &str| char_len(a) + separator_len + char_len(b) <= config.max_chunk_size;

    let mut merged: Vec<String> = Vec::with_capacity(pieces.len());
    let mut queue: VecDeque<String> = pieces.into();

    while let Some(piece) = queue.pop_front() {
        if char_len(&piece) >= config.min_chunk_size {
            merged.push(piece);
            continue;
        }

        if let Some(next) = queue.front_mut() {
            if fits(&piece, next) {
                *next = format!("{}{}{}", piece, separator, next);
                continue;
            }
        }

        if let Some(previous) = merged.last_mut() {
            if fits(previous, &piece) {
                previous.push_str(separator);
                previous.push_str(&piece);
                continue;
            }
        }

        let Some(next) = queue.pop_front() else {
            merged.push(piece);
            continue;
        };

        let combined = format!("{}{}{}", piece, separator, next);
        let mut resplit = rebalance(&combined, config).into_iter();
        if let Some(first) = resplit.next() {
            merged.push(first);
        }
        for rest in resplit.rev() {
            queue.push_front(rest);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_piece_prepended_to_next() {
        let config = ChunkConfig::new(20, 5);
        let result = absorb_short_pieces(pieces(&["ab", "cdefgh", "ijklmn"]), &config, " ");
        assert_eq!(result, vec!["ab cdefgh", "ijklmn"]);
    }

    #[test]
    fn test_short_tail_appended_to_previous() {
        let config = ChunkConfig::new(20, 5);
        let result = absorb_short_pieces(pieces(&["abcdefgh", "ij"]), &config, "\n\n");
        assert_eq!(result, vec!["abcdefgh\n\nij"]);
    }

    #[test]
    fn test_short_piece_resplit_with_next_when_nothing_fits() {
        let config = ChunkConfig::new(8, 5);
        let result = absorb_short_pieces(pieces(&["abcdefgh", "ij", "klmnopqr"]), &config, " ");

        assert_eq!(result, vec!["abcdefgh", "ij klmno", "pqr"]);
        assert!(result.iter().all(|p| p.chars().count() <= 8));
    }

    #[test]
    fn test_single_short_piece_survives() {
        let config = ChunkConfig::new(20, 5);
        let result = absorb_short_pieces(pieces(&["ab"]), &config, " ");
        assert_eq!(result, vec!["ab"]);
    }
}
