use super::codec::{decode, encode};
use super::error::TextError;
use super::{SourceEncoding, TextEncoding};

/// Output of [`transcode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub bytes: Vec<u8>,
    /// Declared source, or the detected one for `auto`
    pub source: TextEncoding,
    pub target: TextEncoding,
    /// Characters replaced with `?`; always zero unless `allow_lossy` was set
    pub replaced: usize,
}

/// Strictly decode `bytes` and re-encode them as `target`.
///
/// With `allow_lossy == false`, any unrepresentable character fails the whole conversion.
pub fn transcode(
    bytes: &[u8],
    source: SourceEncoding,
    target: TextEncoding,
    allow_lossy: bool,
) -> Result<Transcoded, TextError> {
    let decoded = decode(bytes, source)?;
    let encoded = encode(&decoded.text, target);

    if !allow_lossy && !encoded.is_lossless() {
        return Err(TextError::Unrepresentable {
            encoding: target.as_str(),
            count: encoded.replaced,
        });
    }

    tracing::debug!(
        source = %decoded.encoding,
        target = %target,
        input_bytes = bytes.len(),
        output_bytes = encoded.bytes.len(),
        replaced = encoded.replaced,
        "Transcoded text"
    );

    Ok(Transcoded {
        bytes: encoded.bytes,
        source: decoded.encoding,
        target,
        replaced: encoded.replaced,
    })
}
