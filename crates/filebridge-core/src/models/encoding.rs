//! Text encodings accepted by the transcoder.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Encoding label reported for binary or undetectable content.
pub const UNKNOWN_ENCODING: &str = "Unknown";

/// Source label that asks the engine to detect the encoding.
pub const AUTO_ENCODING: &str = "auto";

/// The fixed allow-list of text encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TextEncoding {
    #[serde(rename = "UTF-8")]
    Utf8,
    #[serde(rename = "GB18030")]
    Gb18030,
    #[serde(rename = "GBK")]
    Gbk,
    #[serde(rename = "Big5")]
    Big5,
    #[serde(rename = "Windows-1252")]
    Windows1252,
    #[serde(rename = "ISO-8859-1")]
    Iso8859_1,
}

impl TextEncoding {
    /// All supported encodings, in display order.
    pub const ALL: [TextEncoding; 6] = [
        TextEncoding::Utf8,
        TextEncoding::Gb18030,
        TextEncoding::Gbk,
        TextEncoding::Big5,
        TextEncoding::Windows1252,
        TextEncoding::Iso8859_1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Gb18030 => "GB18030",
            TextEncoding::Gbk => "GBK",
            TextEncoding::Big5 => "Big5",
            TextEncoding::Windows1252 => "Windows-1252",
            TextEncoding::Iso8859_1 => "ISO-8859-1",
        }
    }
}

impl FromStr for TextEncoding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TextEncoding::ALL
            .into_iter()
            .find(|enc| enc.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::UnsupportedEncoding(wanted.to_string()))
    }
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Source side of a transcode: a declared encoding or detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Auto,
    Declared(TextEncoding),
}

impl FromStr for SourceEncoding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(AUTO_ENCODING) {
            Ok(SourceEncoding::Auto)
        } else {
            s.parse().map(SourceEncoding::Declared)
        }
    }
}

impl Display for SourceEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SourceEncoding::Auto => f.write_str(AUTO_ENCODING),
            SourceEncoding::Declared(enc) => enc.fmt(f),
        }
    }
}

/// Encodings the transcode endpoint accepts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EncodingsResponse {
    /// "auto" followed by every supported encoding
    pub source_encodings: Vec<String>,
    pub target_encodings: Vec<String>,
}

impl EncodingsResponse {
    pub fn supported() -> Self {
        let targets: Vec<String> = TextEncoding::ALL
            .iter()
            .map(|e| e.as_str().to_string())
            .collect();
        let mut sources = Vec::with_capacity(targets.len() + 1);
        sources.push(AUTO_ENCODING.to_string());
        sources.extend(targets.iter().cloned());
        Self {
            source_encodings: sources,
            target_encodings: targets,
        }
    }
}
