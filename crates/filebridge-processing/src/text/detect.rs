//! Conservative text detection.
//!
//! Detection decides whether a file is offered for transcoding at all, so it prefers
//! reporting "not text" over guessing. A transcode still strictly decodes the full content.

use filebridge_core::models::UNKNOWN_ENCODING;

use super::codec::decode_strict;
use super::TextEncoding;

/// Only the head of a file is inspected.
pub const SNIFF_SAMPLE_BYTES: usize = 64 * 1024;

/// Any share of disallowed control bytes above this marks content as binary.
const MAX_BAD_CONTROL_RATIO: f64 = 0.01;

const MIN_PRINTABLE_RATIO: f64 = 0.95;

/// Single-byte encodings decode any input, so they need stronger evidence.
const MIN_PRINTABLE_RATIO_SINGLE_BYTE: f64 = 0.98;
const MIN_CHARS_SINGLE_BYTE: usize = 20;

struct Candidate {
    encoding: TextEncoding,
    min_printable_ratio: f64,
    min_chars: usize,
}

/// Tried in order after UTF-8; the first one that decodes cleanly wins.
const CANDIDATES: [Candidate; 5] = [
    Candidate {
        encoding: TextEncoding::Gb18030,
        min_printable_ratio: MIN_PRINTABLE_RATIO,
        min_chars: 0,
    },
    Candidate {
        encoding: TextEncoding::Gbk,
        min_printable_ratio: MIN_PRINTABLE_RATIO,
        min_chars: 0,
    },
    Candidate {
        encoding: TextEncoding::Big5,
        min_printable_ratio: MIN_PRINTABLE_RATIO,
        min_chars: 0,
    },
    Candidate {
        encoding: TextEncoding::Windows1252,
        min_printable_ratio: MIN_PRINTABLE_RATIO_SINGLE_BYTE,
        min_chars: MIN_CHARS_SINGLE_BYTE,
    },
    Candidate {
        encoding: TextEncoding::Iso8859_1,
        min_printable_ratio: MIN_PRINTABLE_RATIO_SINGLE_BYTE,
        min_chars: MIN_CHARS_SINGLE_BYTE,
    },
];

/// Result of [`sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniff {
    pub is_text: bool,
    pub encoding: Option<TextEncoding>,
}

impl Sniff {
    /// Encoding name as stored on a file record.
    pub fn encoding_label(&self) -> &'static str {
        self.encoding.map_or(UNKNOWN_ENCODING, |e| e.as_str())
    }
}

/// Classify content as text or binary and guess its encoding. Never fails.
pub fn sniff(bytes: &[u8]) -> Sniff {
    let encoding = detect_encoding(bytes);
    Sniff {
        is_text: encoding.is_some(),
        encoding,
    }
}

/// Best-guess encoding of `bytes`, or `None` when the content is binary or ambiguous.
pub fn detect_encoding(bytes: &[u8]) -> Option<TextEncoding> {
    let truncated = bytes.len() > SNIFF_SAMPLE_BYTES;
    let sample = &bytes[..bytes.len().min(SNIFF_SAMPLE_BYTES)];

    if looks_binary(sample) {
        return None;
    }

    if let Ok(text) = decode_strict(sample, TextEncoding::Utf8, !truncated) {
        if printable_ratio(&text).0 >= MIN_PRINTABLE_RATIO {
            return Some(TextEncoding::Utf8);
        }
    }

    CANDIDATES
        .iter()
        .find(|candidate| accepts(sample, candidate, !truncated))
        .map(|candidate| candidate.encoding)
}

fn accepts(sample: &[u8], candidate: &Candidate, last: bool) -> bool {
    let Ok(text) = decode_strict(sample, candidate.encoding, last) else {
        return false;
    };
    if text.contains(char::REPLACEMENT_CHARACTER) {
        return false;
    }
    let (ratio, chars) = printable_ratio(&text);
    chars > 0 && ratio >= candidate.min_printable_ratio && chars >= candidate.min_chars
}

fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() || sample.contains(&0x00) {
        return true;
    }

    let bad_control = sample
        .iter()
        .filter(|&&c| !matches!(c, b'\t' | b'\n' | b'\r') && (c < 0x20 || c == 0x7F))
        .count();

    bad_control as f64 / sample.len() as f64 > MAX_BAD_CONTROL_RATIO
}

fn is_printable(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' | ' ' => true,
        char::REPLACEMENT_CHARACTER => false,
        _ => !c.is_control() && !c.is_whitespace(),
    }
}

/// Share of printable characters, and the character count.
fn printable_ratio(text: &str) -> (f64, usize) {
    let (printable, total) = text.chars().fold((0usize, 0usize), |(p, t), c| {
        (p + usize::from(is_printable(c)), t + 1)
    });
    if total == 0 {
        return (0.0, 0);
    }
    (printable as f64 / total as f64, total)
}
