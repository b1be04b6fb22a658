//! Splits long documents into request-sized pieces.

/// A contiguous piece of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The chunk text.
    pub text: String,
    /// Character offset of the chunk's first character in the source.
    pub char_offset: usize,
}

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// A chunk ends after the last newline or sentence terminator in the second
/// half of its window, otherwise after the last whitespace, otherwise exactly
/// at `max_chars`. Chunks are contiguous so offsets map straight back into the
/// source. Whitespace-only chunks are dropped.
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<TextChunk> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = if chars.len() - start <= max_chars {
            chars.len()
        } else {
            let window = &chars[start..start + max_chars];
            start + break_point(window).unwrap_or(max_chars)
        };
        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            chunks.push(TextChunk {
                text: piece,
                char_offset: start,
            });
        }
        start = end;
    }

    chunks
}

/// Exclusive end of the preferred break inside `window`.
fn break_point(window: &[char]) -> Option<usize> {
    let half = window.len() / 2;
    let after_newline = window
        .iter()
        .rposition(|c| *c == '\n')
        .map(|i| i + 1)
        .filter(|&end| end > half);
    let after_sentence = || {
        (1..window.len())
            .rev()
            .find(|&i| matches!(window[i - 1], '.' | '!' | '?') && window[i].is_whitespace())
            .map(|i| i + 1)
            .filter(|&end| end > half)
    };
    let after_space = || {
        window
            .iter()
            .rposition(|c| c.is_whitespace())
            .map(|i| i + 1)
    };
    after_newline
        .or_else(after_sentence)
        .or_else(after_space)
        .filter(|&end| end > 0)
}
