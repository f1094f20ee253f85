// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The anchor scanners that actually walk text: a literal scanner
//! (`memchr`), and `scan16` (design notes §9), a 16-byte-at-a-time
//! discrete-byte membership probe backing the start/end-of-line scanner,
//! whose needle set is always `{\n, \r}`. `x86_64` guarantees SSE2, so the
//! vector path needs no runtime feature detection — just the `target_arch`
//! gate. Bracket/class scanning uses the portable per-byte range check
//! directly: encoding arbitrary byte ranges into a fixed-width SIMD compare
//! is the one shape of "vectorized character-class search" this reference
//! backend doesn't implement: see DESIGN.md.

use super::AnchorKind;

/// Finds the first index in `haystack` (0-based within `haystack`, not
/// `needles`) whose byte is in `needles`, or `haystack.len()` (capped at 16
/// — callers pass at most a 16-byte window) if none matches.
pub fn scan16(needles: &[u8], haystack: &[u8]) -> usize {
    debug_assert!(haystack.len() <= 16);
    #[cfg(target_arch = "x86_64")]
    {
        if haystack.len() == 16 && needles.len() <= 8 {
            return unsafe { scan16_sse2(needles, haystack) };
        }
    }
    scan16_scalar(needles, haystack)
}

fn scan16_scalar(needles: &[u8], haystack: &[u8]) -> usize {
    for (i, &b) in haystack.iter().enumerate() {
        if needles.contains(&b) {
            return i;
        }
    }
    haystack.len()
}

#[cfg(target_arch = "x86_64")]
unsafe fn scan16_sse2(needles: &[u8], haystack: &[u8]) -> usize {
    use std::arch::x86_64::*;
    let hay = _mm_loadu_si128(haystack.as_ptr() as *const __m128i);
    let mut mask = 0i32;
    for &n in needles {
        let needle = _mm_set1_epi8(n as i8);
        let eq = _mm_cmpeq_epi8(hay, needle);
        mask |= _mm_movemask_epi8(eq);
    }
    if mask == 0 {
        16
    } else {
        mask.trailing_zeros() as usize
    }
}

/// Scans `text[from..]` for the next occurrence of `kind`, returning its
/// half-open `[start, end)` span (empty for zero-width anchors).
pub fn find(text: &[u8], from: usize, kind: &AnchorKind) -> Option<(usize, usize)> {
    match kind {
        AnchorKind::Literal(bytes) => {
            if bytes.is_empty() || from > text.len() {
                return None;
            }
            memchr::memmem::find(&text[from..], bytes).map(|i| (from + i, from + i + bytes.len()))
        }
        AnchorKind::Bracket(class, negated) => find_class(text, from, class, *negated).map(|i| (i, i + 1)),
        AnchorKind::StartOfLine => find_start_of_line(text, from).map(|i| (i, i)),
        AnchorKind::EndOfLine => find_end_of_line(text, from).map(|i| (i, i)),
    }
}

/// A bracket class is a set of ranges, not a small discrete needle set, so
/// `scan16` (built for the latter) doesn't apply here — a plain per-byte
/// scan is the whole implementation.
fn find_class(text: &[u8], from: usize, class: &crate::char_class::CharClass, negated: bool) -> Option<usize> {
    (from..text.len()).find(|&i| class.contains(text[i]) != negated)
}

const LINE_BREAKS: &[u8] = b"\n\r";

/// Scans `text[at..]` in 16-byte windows for the next `\n`/`\r`, returning
/// its absolute index via `scan16`'s SIMD path (or the scalar fallback for a
/// trailing short window).
fn scan_for_line_break(text: &[u8], at: usize) -> Option<usize> {
    let mut i = at;
    while i < text.len() {
        let window_end = (i + 16).min(text.len());
        let window = &text[i..window_end];
        let off = if window.len() == 16 { scan16(LINE_BREAKS, window) } else { scan16_scalar(LINE_BREAKS, window) };
        if off < window.len() {
            return Some(i + off);
        }
        i = window_end;
    }
    None
}

fn find_start_of_line(text: &[u8], from: usize) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    if from == 0 {
        return Some(0);
    }
    // i == 0 can't hold (from >= 1 here), so a start-of-line at i >= from
    // reduces to "the preceding byte is a line break": scan text[from-1..]
    // for the next `\n`/`\r` and report the position right after it.
    scan_for_line_break(text, from - 1).map(|j| j + 1)
}

fn find_end_of_line(text: &[u8], from: usize) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    Some(scan_for_line_break(text, from).unwrap_or(text.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_class::CharClass;

    #[test]
    fn scan16_scalar_finds_first_needle_hit() {
        let hay = b"abcdefgXijklmnop";
        assert_eq!(scan16_scalar(b"X", hay), 7);
    }

    #[test]
    fn scan16_scalar_reports_len_on_miss() {
        let hay = b"abcdefghijklmnop";
        assert_eq!(scan16_scalar(b"Z", hay), 16);
    }

    #[test]
    fn scan16_matches_scalar_on_full_block() {
        let hay: [u8; 16] = *b"0123456789abXdef";
        assert_eq!(scan16(b"X", &hay), scan16_scalar(b"X", &hay));
        assert_eq!(scan16(b"X", &hay), 12);
    }

    #[test]
    fn find_literal_returns_span() {
        let (s, e) = find(b"___needle___", 0, &AnchorKind::Literal(b"needle".to_vec())).unwrap();
        assert_eq!((s, e), (3, 9));
    }

    #[test]
    fn find_class_skips_non_members() {
        let class = CharClass::from_ranges(vec![(b'0', b'9')]);
        let (s, e) = find(b"abc5def", 0, &AnchorKind::Bracket(class, false)).unwrap();
        assert_eq!((s, e), (3, 4));
    }

    #[test]
    fn find_end_of_line_matches_eos() {
        let (s, e) = find(b"abc", 0, &AnchorKind::EndOfLine).unwrap();
        assert_eq!((s, e), (3, 3));
    }

    #[test]
    fn find_end_of_line_stops_at_embedded_newline() {
        let (s, e) = find(b"abc\ndef", 0, &AnchorKind::EndOfLine).unwrap();
        assert_eq!((s, e), (3, 3));
    }

    #[test]
    fn find_start_of_line_after_embedded_newline() {
        let (s, e) = find(b"abc\ndef", 0, &AnchorKind::StartOfLine).unwrap();
        assert_eq!((s, e), (0, 0));
        let (s2, e2) = find(b"abc\ndef", 1, &AnchorKind::StartOfLine).unwrap();
        assert_eq!((s2, e2), (4, 4));
    }

    #[test]
    fn line_scan_crosses_multiple_16_byte_windows() {
        let mut text = vec![b'a'; 20];
        text.push(b'\n');
        text.extend(vec![b'b'; 5]);
        let (s, e) = find(&text, 0, &AnchorKind::EndOfLine).unwrap();
        assert_eq!((s, e), (20, 20));
        let (s2, e2) = find(&text, 0, &AnchorKind::StartOfLine).unwrap();
        assert_eq!((s2, e2), (0, 0));
        let (s3, e3) = find(&text, 1, &AnchorKind::StartOfLine).unwrap();
        assert_eq!((s3, e3), (21, 21));
    }
}
