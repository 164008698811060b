//! Boundary scans over a character buffer.
//!
//! Every function takes a character offset and returns a valid offset in
//! `0..=buf.len()`. When no boundary exists in the requested direction the
//! input offset is returned unchanged.

use std::ops::Range;

/// Word separators. Consecutive separators count as one.
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\n' || c == '\t' || c == '\r'
}

/// Offset of the first character of the line containing `pos`.
pub fn line_start(buf: &[char], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    buf[..pos]
        .iter()
        .rposition(|&c| c == '\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Offset of the newline ending the line containing `pos`, or `buf.len()`.
pub fn line_end(buf: &[char], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    buf[pos..]
        .iter()
        .position(|&c| c == '\n')
        .map(|i| pos + i)
        .unwrap_or(buf.len())
}

/// Zero-based `(line, column)` of `pos`.
pub fn line_col(buf: &[char], pos: usize) -> (usize, usize) {
    let pos = pos.min(buf.len());
    let line = buf[..pos].iter().filter(|&&c| c == '\n').count();
    (line, pos - line_start(buf, pos))
}

pub fn line_count(buf: &[char]) -> usize {
    buf.iter().filter(|&&c| c == '\n').count() + 1
}

/// Offset of `(line, col)`, with `col` clamped to the line length and
/// `line` clamped to the last line.
pub fn offset_at(buf: &[char], line: usize, col: usize) -> usize {
    let mut start = 0;
    for _ in 0..line {
        match buf[start..].iter().position(|&c| c == '\n') {
            Some(i) => start += i + 1,
            None => break,
        }
    }
    let end = line_end(buf, start);
    start + col.min(end - start)
}

/// Start of the next word (`w`).
pub fn next_word_start(buf: &[char], pos: usize) -> usize {
    let len = buf.len();
    if pos >= len {
        return pos.min(len);
    }
    let mut i = pos;
    while i < len && !is_blank(buf[i]) {
        i += 1;
    }
    while i < len && is_blank(buf[i]) {
        i += 1;
    }
    if i >= len {
        pos
    } else {
        i
    }
}

/// Start of the word before `pos`, or of the word `pos` is inside (`b`).
pub fn prev_word_start(buf: &[char], pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    while i > 0 && is_blank(buf[i - 1]) {
        i -= 1;
    }
    while i > 0 && !is_blank(buf[i - 1]) {
        i -= 1;
    }
    i
}

/// Last character of the next word end after `pos` (`e`).
pub fn next_word_end(buf: &[char], pos: usize) -> usize {
    let len = buf.len();
    let mut i = pos + 1;
    while i < len && is_blank(buf[i]) {
        i += 1;
    }
    if i >= len {
        return pos.min(len);
    }
    while i + 1 < len && !is_blank(buf[i + 1]) {
        i += 1;
    }
    i
}

/// The non-blank run containing `pos`. Empty when `pos` sits on a blank
/// or past the end.
pub fn word_range(buf: &[char], pos: usize) -> Range<usize> {
    let len = buf.len();
    if pos >= len || is_blank(buf[pos]) {
        let pos = pos.min(len);
        return pos..pos;
    }
    let mut start = pos;
    while start > 0 && !is_blank(buf[start - 1]) {
        start -= 1;
    }
    let mut end = pos;
    while end < len && !is_blank(buf[end]) {
        end += 1;
    }
    start..end
}
