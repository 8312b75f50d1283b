//! WinAnsi text encoding and Helvetica metrics.
//!
//! The certificate uses the standard Type1 Helvetica family with
//! WinAnsiEncoding, so the supported alphabet is exactly the WinAnsi
//! (Windows-1252) set: ASCII, the Latin-1 supplement, and a handful of
//! typographic extras such as the euro sign. Anything else is a hard
//! [`EncodingError`] — the renderer refuses to mojibake or silently drop
//! characters. There is deliberately no Unicode fallback.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("character {ch:?} is outside the supported WinAnsi encoding")]
pub struct EncodingError {
    pub ch: char,
}

/// Map one character to its WinAnsi code, if it has one.
fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' => Some(ch as u8),
        '\u{a0}'..='\u{ff}' => Some(ch as u8),
        '\u{20ac}' => Some(0x80), // €
        '\u{201a}' => Some(0x82),
        '\u{0192}' => Some(0x83),
        '\u{201e}' => Some(0x84),
        '\u{2026}' => Some(0x85), // …
        '\u{2020}' => Some(0x86),
        '\u{2021}' => Some(0x87),
        '\u{02c6}' => Some(0x88),
        '\u{2030}' => Some(0x89),
        '\u{0160}' => Some(0x8a),
        '\u{2039}' => Some(0x8b),
        '\u{0152}' => Some(0x8c),
        '\u{017d}' => Some(0x8e),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201c}' => Some(0x93),
        '\u{201d}' => Some(0x94),
        '\u{2022}' => Some(0x95), // •
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{02dc}' => Some(0x98),
        '\u{2122}' => Some(0x99),
        '\u{0161}' => Some(0x9a),
        '\u{203a}' => Some(0x9b),
        '\u{0153}' => Some(0x9c),
        '\u{017e}' => Some(0x9e),
        '\u{0178}' => Some(0x9f),
        _ => None,
    }
}

/// Encode a string to WinAnsi bytes, failing loudly on the first character
/// that has no code point.
pub fn encode(text: &str) -> Result<Vec<u8>, EncodingError> {
    text.chars()
        .map(|ch| win_ansi_byte(ch).ok_or(EncodingError { ch }))
        .collect()
}

// ── Helvetica AFM widths (per 1000 font units), chars 0x20..=0x7E ────────────

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for WinAnsi codes above the ASCII table. Close enough for
/// wrapping and alignment; these occur only in free-text fields.
const FALLBACK_WIDTH: u16 = 556;

fn byte_width_units(byte: u8, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD_WIDTHS } else { &HELVETICA_WIDTHS };
    match byte {
        0x20..=0x7e => table[(byte - 0x20) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of encoded text in points at the given font size.
/// Oblique shares the regular widths, so `bold` is the only axis.
pub(crate) fn text_width(bytes: &[u8], bold: bool, size: f32) -> f32 {
    let units: u32 = bytes.iter().map(|&b| byte_width_units(b, bold) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap of encoded text to a maximum line width in points.
///
/// Splits on spaces; a single word wider than the line is hard-broken so
/// content is never clipped. Always returns at least one (possibly empty)
/// line.
pub(crate) fn wrap(bytes: &[u8], bold: bool, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in bytes.split(|&b| b == b' ') {
        let word = if text_width(word, bold, size) > max_width {
            // Hard-break an oversized word, flushing the line first.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut rest = word;
            loop {
                let mut take = rest.len();
                while take > 1 && text_width(&rest[..take], bold, size) > max_width {
                    take -= 1;
                }
                if take == rest.len() {
                    break;
                }
                lines.push(rest[..take].to_vec());
                rest = &rest[take..];
            }
            rest
        } else {
            word
        };

        let needed = if current.is_empty() {
            text_width(word, bold, size)
        } else {
            text_width(&current, bold, size) + text_width(b" ", bold, size) + text_width(word, bold, size)
        };

        if needed > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(b' ');
        }
        current.extend_from_slice(word);
    }

    lines.push(current);
    lines
}
