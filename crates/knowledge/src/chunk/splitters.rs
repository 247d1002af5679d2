//! Structural and fallback splitters.
//!
//! Every splitter works on normalized text and measures length in characters.

use super::char_len;
use super::merging::absorb_short_pieces;
use super::pipeline::ChunkConfig;
use unicode_segmentation::UnicodeSegmentation;

pub(crate) const PARAGRAPH_SEPARATOR: &str = "\n\n";
const UNIT_SEPARATOR: &str = " ";

/// Split on blank lines and accumulate paragraphs up to `max_chunk_size`.
///
/// A single paragraph longer than the bound is emitted on its own; the
/// pipeline reduces it afterwards.
pub fn split_paragraphs(text: &str, config: &ChunkConfig) -> Vec<String> {
    let paragraphs = text
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    accumulate(paragraphs, config.max_chunk_size, PARAGRAPH_SEPARATOR)
}

/// Reduce an oversized block to pieces that each fit `max_chunk_size`.
///
/// Uses the coarsest unit that fits: sentences, then word boundaries for
/// any sentence still too long, then grapheme windows for any word still
/// too long.
pub fn reduce_oversized(text: &str, config: &ChunkConfig) -> Vec<String> {
    let pieces = sentence_pieces(text, config.max_chunk_size);
    absorb_short_pieces(pieces, config, UNIT_SEPARATOR)
}

/// Re-split `text` so its first piece reaches `min_chunk_size`.
///
/// Tries sentences, then words, then graphemes, and returns the first
/// granularity whose leading piece is long enough. Every piece fits
/// `max_chunk_size`.
pub(crate) fn rebalance(text: &str, config: &ChunkConfig) -> Vec<String> {
    let levels: [fn(&str, usize) -> Vec<String>; 3] = [sentence_pieces, word_pieces, grapheme_pieces];
    let max = config.max_chunk_size;

    let mut pieces = Vec::new();
    for level in levels {
        pieces = level(text, max);
        if pieces.first().is_some_and(|p| char_len(p) >= config.min_chunk_size) {
            break;
        }
    }
    pieces
}

/// Greedy accumulation: append while the running block stays within `max`.
pub(crate) fn accumulate(
    units: impl Iterator<Item = String>,
    max: usize,
    separator: &str,
) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut blocks = Vec::new();
    let mut running = String::new();
    let mut running_len = 0;

    for unit in units {
        let unit_len = char_len(&unit);
        if running.is_empty() {
            running = unit;
            running_len = unit_len;
        } else if running_len + separator_len + unit_len <= max {
            running.push_str(separator);
            running.push_str(&unit);
            running_len += separator_len + unit_len;
        } else {
            blocks.push(std::mem::take(&mut running));
            running = unit;
            running_len = unit_len;
        }
    }

    if !running.is_empty() {
        blocks.push(running);
    }

    blocks
}

fn sentence_pieces(text: &str, max: usize) -> Vec<String> {
    let sentences = text
        .split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut pieces = Vec::new();
    for block in accumulate(sentences, max, UNIT_SEPARATOR) {
        if char_len(&block) <= max {
            pieces.push(block);
        } else {
            pieces.extend(word_pieces(&block, max));
        }
    }
    pieces
}

/// Word-boundary tokens keep their own spacing, so they join without a separator.
fn word_pieces(text: &str, max: usize) -> Vec<String> {
    let mut tokens = Vec::new();
    for token in text.split_word_bounds() {
        if char_len(token) <= max {
            tokens.push(token.to_string());
        } else {
            tokens.extend(grapheme_pieces(token, max));
        }
    }
    trimmed(accumulate(tokens.into_iter(), max, ""))
}

/// Windows of at most `max` characters that never cut a grapheme cluster.
fn grapheme_pieces(text: &str, max: usize) -> Vec<String> {
    trimmed(accumulate(text.graphemes(true).map(str::to_string), max, ""))
}

fn trimmed(blocks: Vec<String>) -> Vec<String> {
    blocks
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max: usize, min: usize) -> ChunkConfig {
        ChunkConfig::new(max, min)
    }

    #[test]
    fn test_paragraphs_accumulate_within_bound() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let blocks = split_paragraphs(text, &config(10, 1));
        assert_eq!(blocks, vec!["aaaa\n\nbbbb", "cccc"]);
    }

    #[test]
    fn test_oversized_paragraph_kept_whole() {
        let text = "short\n\nthis paragraph is much longer than ten";
        let blocks = split_paragraphs(text, &config(10, 1));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], "this paragraph is much longer than ten");
    }

    #[test]
    fn test_sentence_pieces_one_per_sentence_when_tight() {
        let pieces = sentence_pieces("First one. Second one!  Third?\nFourth", 12);
        assert_eq!(pieces, vec!["First one.", "Second one!", "Third?", "Fourth"]);
    }

    #[test]
    fn test_decimal_points_do_not_split() {
        let pieces = sentence_pieces("Fines reach 4.5 percent. Done.", 25);
        assert_eq!(pieces, vec!["Fines reach 4.5 percent.", "Done."]);
    }

    #[test]
    fn test_grapheme_windows_keep_clusters() {
        assert_eq!(grapheme_pieces("ééééé", 2), vec!["éé", "éé", "é"]);

        let combining = "e\u{301}e\u{301}e\u{301}";
        let pieces = grapheme_pieces(combining, 3);
        assert_eq!(pieces, vec!["e\u{301}", "e\u{301}", "e\u{301}"]);
    }

    #[test]
    fn test_rebalance_reaches_min_size() {
        let config = config(20, 8);
        let text = "Short. abcdefghijklmnopqrst";
        let pieces = rebalance(text, &config);

        assert!(char_len(&pieces[0]) >= 8, "first piece {:?}", pieces[0]);
        assert!(pieces.iter().all(|p| char_len(p) <= 20));
        let joined: String = pieces.concat().split_whitespace().collect();
        assert_eq!(joined, "Short.abcdefghijklmnopqrst");
    }

    #[test]
    fn test_reduce_prefers_sentences() {
        let text = "One two three. Four five six. Seven eight nine.";
        let pieces = reduce_oversized(text, &config(30, 1));
        assert_eq!(pieces, vec!["One two three. Four five six.", "Seven eight nine."]);
    }

    #[test]
    fn test_reduce_falls_back_to_words_and_chars() {
        let text = "abcdefghijklmnop qr";
        let pieces = reduce_oversized(text, &config(6, 1));
        assert!(pieces.iter().all(|p| char_len(p) <= 6));
        let joined: String = pieces.concat().split_whitespace().collect();
        assert_eq!(joined, "abcdefghijklmnopqr");
    }
}
