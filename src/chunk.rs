//! Sentence-aware overlapping text chunker.
//!
//! Splits an entry's text into windows of at most `chunk_size` characters,
//! scanning backward from each window's end (at most [`SENTENCE_LOOKBACK`]
//! characters) for a sentence terminator followed by whitespace so chunks
//! avoid mid-sentence splits. Consecutive windows overlap by `overlap`
//! characters. All arithmetic is in characters, not bytes, so multi-byte
//! text never splits inside a scalar value.

/// How far back from a window's end to search for a sentence boundary.
pub const SENTENCE_LOOKBACK: usize = 100;

/// Deterministic chunk identifier: `<date>_chunk_<index>`.
///
/// A pure function of `(date, chunk_index)` — re-ingesting an unchanged
/// entry produces identical ids, which is what makes ingestion idempotent.
pub fn chunk_id(date: &str, index: usize) -> String {
    format!("{}_chunk_{}", date, index)
}

/// Split `text` into ordered, overlapping, whitespace-trimmed chunks.
///
/// Text of `chunk_size` characters or fewer is returned unchanged as a
/// single chunk. `overlap >= chunk_size` is a caller error rejected at
/// config validation; here it is clamped so the function never stalls.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = start + chunk_size;

        if end < chars.len() {
            // Prefer ending right after a sentence terminator near the
            // window boundary.
            let floor = (start + chunk_size).saturating_sub(SENTENCE_LOOKBACK).max(start);
            let mut i = end - 1;
            while i > floor {
                if matches!(chars[i], '.' | '!' | '?')
                    && chars.get(i + 1).is_some_and(|c| c.is_whitespace())
                {
                    end = i + 1;
                    break;
                }
                i -= 1;
            }
        }

        let slice_end = end.min(chars.len());
        let piece: String = chars[start..slice_end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        // Next window begins `overlap` characters before this one ended.
        // If a boundary shortened the window by more than that, step to
        // `end` instead so the walk always makes forward progress.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_passthrough() {
        let text = "I went hiking in the mountains today.";
        let chunks = chunk_text(text, 500, 50);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn test_exact_size_passthrough() {
        let text = "x".repeat(100);
        let chunks = chunk_text(&text, 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text);
    }

    #[test]
    fn test_long_text_multiple_chunks() {
        let text = "word ".repeat(200); // 1000 chars
        let chunks = chunk_text(&text, 100, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "word ".repeat(200);
        let a = chunk_text(&text, 100, 10);
        let b = chunk_text(&text, 100, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_breaks_after_sentence_terminator() {
        // The terminator sits inside the lookback window, so the first
        // chunk should end right after it rather than at chunk_size.
        let first = "This is the first sentence and it rambles on for a while. ";
        let second = "The second sentence continues with more detail about the day.";
        let text = format!("{}{}", first, second);
        let chunks = chunk_text(&text, 80, 10);
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0], first.trim());
    }

    #[test]
    fn test_no_boundary_cuts_at_chunk_size() {
        let text = "a".repeat(250);
        let chunks = chunk_text(&text, 100, 0);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[1].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn test_zero_overlap_is_contiguous() {
        let text = "b".repeat(300);
        let chunks = chunk_text(&text, 100, 0);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_overlap_repeats_tail_of_previous_chunk() {
        let text = "c".repeat(300);
        let chunks = chunk_text(&text, 100, 20);
        let tail: String = chunks[0].chars().rev().take(20).collect::<Vec<_>>().into_iter().rev().collect();
        assert!(chunks[1].starts_with(&tail));
    }

    #[test]
    fn test_oversized_overlap_clamped() {
        // overlap >= chunk_size must not hang or panic.
        let text = "d".repeat(250);
        let chunks = chunk_text(&text, 100, 100);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "héllo wörld. ".repeat(30);
        let chunks = chunk_text(&text, 50, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn test_chunk_id_format() {
        assert_eq!(chunk_id("2025-02-01", 0), "2025-02-01_chunk_0");
        assert_eq!(chunk_id("2025-02-01", 12), "2025-02-01_chunk_12");
    }
}
