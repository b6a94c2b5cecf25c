use encoding_rs::{DecoderResult, EncoderResult, Encoding};

use super::detect::detect_encoding;
use super::error::TextError;
use super::{SourceEncoding, TextEncoding};

/// Substitution byte for characters the target encoding cannot represent.
pub const SUBSTITUTION_BYTE: u8 = b'?';

/// Output of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// The declared encoding, or the detected one for `auto`
    pub encoding: TextEncoding,
}

/// Output of [`encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Number of characters replaced with [`SUBSTITUTION_BYTE`]
    pub replaced: usize,
}

impl Encoded {
    pub fn is_lossless(&self) -> bool {
        self.replaced == 0
    }
}

/// How each supported encoding is implemented.
///
/// ISO-8859-1 is handled by hand: encoding_rs follows WHATWG, which aliases it to windows-1252.
enum Codec {
    Utf8,
    Latin1,
    Legacy(&'static Encoding),
}

fn codec_for(encoding: TextEncoding) -> Codec {
    match encoding {
        TextEncoding::Utf8 => Codec::Utf8,
        TextEncoding::Iso8859_1 => Codec::Latin1,
        TextEncoding::Gb18030 => Codec::Legacy(encoding_rs::GB18030),
        TextEncoding::Gbk => Codec::Legacy(encoding_rs::GBK),
        TextEncoding::Big5 => Codec::Legacy(encoding_rs::BIG5),
        TextEncoding::Windows1252 => Codec::Legacy(encoding_rs::WINDOWS_1252),
    }
}

/// Strictly decode `bytes` as `source`, detecting the encoding first for `auto`.
pub fn decode(bytes: &[u8], source: SourceEncoding) -> Result<Decoded, TextError> {
    let encoding = match source {
        SourceEncoding::Declared(encoding) => encoding,
        SourceEncoding::Auto => detect_encoding(bytes).ok_or(TextError::DetectionFailed)?,
    };
    let text = decode_strict(bytes, encoding, true)?;
    Ok(Decoded { text, encoding })
}

/// Strict decode. With `last == false` an incomplete sequence at the very end is dropped
/// instead of rejected, which is what a truncated sample needs.
pub(crate) fn decode_strict(
    bytes: &[u8],
    encoding: TextEncoding,
    last: bool,
) -> Result<String, TextError> {
    match codec_for(encoding) {
        Codec::Utf8 => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(e) if !last && e.error_len().is_none() => {
                let valid = &bytes[..e.valid_up_to()];
                Ok(String::from_utf8_lossy(valid).into_owned())
            }
            Err(e) => Err(TextError::Malformed {
                encoding: encoding.as_str(),
                offset: e.valid_up_to(),
            }),
        },
        Codec::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        Codec::Legacy(legacy) => decode_legacy(legacy, encoding, bytes, last),
    }
}

fn decode_legacy(
    legacy: &'static Encoding,
    encoding: TextEncoding,
    bytes: &[u8],
    last: bool,
) -> Result<String, TextError> {
    let mut decoder = legacy.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len().saturating_mul(3));
    let mut out = String::with_capacity(capacity);
    let mut src = bytes;
    let mut consumed = 0usize;

    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(src, &mut out, last);
        consumed += read;
        src = &src[read..];
        match result {
            DecoderResult::InputEmpty => return reversible(legacy, encoding, bytes, out, last),
            DecoderResult::OutputFull => {
                let more = decoder
                    .max_utf8_buffer_length_without_replacement(src.len())
                    .unwrap_or(src.len().saturating_mul(3))
                    .max(16);
                out.reserve(more);
            }
            DecoderResult::Malformed(bad, extra) => {
                return Err(TextError::Malformed {
                    encoding: encoding.as_str(),
                    offset: consumed.saturating_sub(bad as usize + extra as usize),
                });
            }
        }
    }
}

/// Accepts decoded text only if encoding it again reproduces the input bytes.
///
/// The GB18030 and Big5 decoders accept sequences their encoders never emit (GB18030 `0x80` and
/// `A3 A0`, the Big5-HKSCS range, Big5 pairs that decode to two code points). Such input is
/// treated as invalid in that encoding. With `last == false` the input may end in a partial
/// sequence the decoder held back, so only a prefix has to match.
fn reversible(
    legacy: &'static Encoding,
    encoding: TextEncoding,
    bytes: &[u8],
    text: String,
    last: bool,
) -> Result<String, TextError> {
    let encoded = encode_legacy(legacy, &text);
    let matches = encoded.is_lossless()
        && if last {
            encoded.bytes == bytes
        } else {
            bytes.starts_with(&encoded.bytes)
        };
    if matches {
        return Ok(text);
    }

    let offset = encoded
        .bytes
        .iter()
        .zip(bytes)
        .take_while(|(a, b)| a == b)
        .count();
    Err(TextError::Malformed {
        encoding: encoding.as_str(),
        offset,
    })
}

/// Encode `text` into `target`. Never fails: unrepresentable characters become `?`.
pub fn encode(text: &str, target: TextEncoding) -> Encoded {
    match codec_for(target) {
        Codec::Utf8 => Encoded {
            bytes: text.as_bytes().to_vec(),
            replaced: 0,
        },
        Codec::Latin1 => {
            let mut replaced = 0;
            let bytes = text
                .chars()
                .map(|c| match u8::try_from(u32::from(c)) {
                    Ok(b) => b,
                    Err(_) => {
                        replaced += 1;
                        SUBSTITUTION_BYTE
                    }
                })
                .collect();
            Encoded { bytes, replaced }
        }
        Codec::Legacy(legacy) => encode_legacy(legacy, text),
    }
}

fn encode_legacy(legacy: &'static Encoding, text: &str) -> Encoded {
    let mut encoder = legacy.new_encoder();
    let mut bytes = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 4096];
    let mut src = text;
    let mut replaced = 0;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(src, &mut buffer, true);
        bytes.extend_from_slice(&buffer[..written]);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => {
                bytes.push(SUBSTITUTION_BYTE);
                replaced += 1;
            }
        }
    }

    Encoded { bytes, replaced }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[(TextEncoding, &str)] = &[
        (TextEncoding::Utf8, "hello, 世界 🙂\n"),
        (TextEncoding::Gb18030, "中文测试, abc 🙂\n"),
        (TextEncoding::Gbk, "中文测试, abc\n"),
        (TextEncoding::Big5, "繁體中文測試\n"),
        (TextEncoding::Windows1252, "café – “quoted” €5\n"),
        (TextEncoding::Iso8859_1, "café déjà vu ±½\n"),
    ];

    #[test]
    fn encode_then_decode_reproduces_bytes() {
        for &(encoding, text) in SAMPLES {
            let encoded = encode(text, encoding);
            assert!(encoded.is_lossless(), "{} lost characters", encoding);

            let decoded = decode(&encoded.bytes, SourceEncoding::Declared(encoding)).unwrap();
            assert_eq!(decoded.text, text);
            assert_eq!(decoded.encoding, encoding);

            let again = encode(&decoded.text, encoding);
            assert_eq!(again.bytes, encoded.bytes, "{} round trip", encoding);
        }
    }

    const ALL: [TextEncoding; 6] = [
        TextEncoding::Utf8,
        TextEncoding::Gb18030,
        TextEncoding::Gbk,
        TextEncoding::Big5,
        TextEncoding::Windows1252,
        TextEncoding::Iso8859_1,
    ];

    /// Bytes either decode to text that encodes back to the same bytes, or fail to decode.
    fn assert_reversible_or_rejected(bytes: &[u8], encoding: TextEncoding) -> bool {
        match decode(bytes, SourceEncoding::Declared(encoding)) {
            Ok(decoded) => {
                let encoded = encode(&decoded.text, encoding);
                assert_eq!(
                    encoded.bytes, bytes,
                    "{} {:02x?} decoded to {:?}",
                    encoding, bytes, decoded.text
                );
                true
            }
            Err(e) => {
                assert!(
                    matches!(e, TextError::Malformed { .. }),
                    "{} {:02x?}: {:?}",
                    encoding,
                    bytes,
                    e
                );
                false
            }
        }
    }

    #[test]
    fn every_single_byte_decodes_back_to_itself_or_is_rejected() {
        for encoding in ALL {
            for b in 0u8..=255 {
                assert_reversible_or_rejected(&[b], encoding);
            }
        }
        for b in 0u8..=255 {
            assert!(assert_reversible_or_rejected(&[b], TextEncoding::Windows1252));
            assert!(assert_reversible_or_rejected(&[b], TextEncoding::Iso8859_1));
        }
    }

    #[test]
    fn every_double_byte_pair_decodes_back_to_itself_or_is_rejected() {
        for encoding in [TextEncoding::Gbk, TextEncoding::Gb18030, TextEncoding::Big5] {
            let mut accepted = 0;
            for lead in 0x80u8..=0xFF {
                for trail in 0u8..=255 {
                    if assert_reversible_or_rejected(&[lead, trail], encoding) {
                        accepted += 1;
                    }
                }
            }
            assert!(accepted > 10_000, "{} accepted only {} pairs", encoding, accepted);
        }
    }

    #[test]
    fn gb18030_four_byte_sequences_decode_back_to_themselves() {
        let first = decode(
            &[0x81, 0x30, 0x81, 0x30],
            SourceEncoding::Declared(TextEncoding::Gb18030),
        )
        .unwrap();
        assert_eq!(first.text, "\u{80}");

        let astral = decode(
            &[0x90, 0x30, 0x81, 0x30],
            SourceEncoding::Declared(TextEncoding::Gb18030),
        )
        .unwrap();
        assert_eq!(astral.text, "\u{10000}");

        for b1 in [0x81u8, 0x84, 0x90, 0xE3] {
            for b2 in 0x30u8..=0x39 {
                for b3 in 0x81u8..=0xFE {
                    for b4 in 0x30u8..=0x39 {
                        assert_reversible_or_rejected(&[b1, b2, b3, b4], TextEncoding::Gb18030);
                    }
                }
            }
        }
    }

    #[test]
    fn decoder_only_sequences_are_rejected() {
        let cases: &[(TextEncoding, &[u8])] = &[
            (TextEncoding::Gb18030, &[0x80]),
            (TextEncoding::Gb18030, &[0xA3, 0xA0]),
            (TextEncoding::Gbk, &[0xA3, 0xA0]),
            // Big5-HKSCS
            (TextEncoding::Big5, &[0x87, 0x40]),
            // Two code points from one pair
            (TextEncoding::Big5, &[0x88, 0x62]),
        ];
        for &(encoding, bytes) in cases {
            let err = decode(bytes, SourceEncoding::Declared(encoding)).unwrap_err();
            assert!(
                matches!(err, TextError::Malformed { .. }),
                "{} {:02x?}",
                encoding,
                bytes
            );
        }

        let mut text = b"hkscs: ".to_vec();
        text.extend_from_slice(&[0x87, 0x40]);
        let err = decode(&text, SourceEncoding::Declared(TextEncoding::Big5)).unwrap_err();
        assert!(matches!(
            err,
            TextError::Malformed {
                encoding: "Big5",
                offset: 7
            }
        ));
    }

    #[test]
    fn iso_8859_1_decodes_every_byte_and_round_trips() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let decoded = decode(&bytes, SourceEncoding::Declared(TextEncoding::Iso8859_1)).unwrap();
        assert_eq!(decoded.text.chars().count(), 256);
        assert_eq!(encode(&decoded.text, TextEncoding::Iso8859_1).bytes, bytes);
    }

    #[test]
    fn iso_8859_1_differs_from_windows_1252() {
        // 0x80 is a C1 control in Latin-1 but the euro sign in windows-1252
        let latin1 = decode(&[0x80], SourceEncoding::Declared(TextEncoding::Iso8859_1)).unwrap();
        let cp1252 = decode(&[0x80], SourceEncoding::Declared(TextEncoding::Windows1252)).unwrap();
        assert_eq!(latin1.text, "\u{80}");
        assert_eq!(cp1252.text, "€");
    }

    #[test]
    fn invalid_utf8_is_rejected_with_offset() {
        let err = decode(b"ok\xff\xfe", SourceEncoding::Declared(TextEncoding::Utf8)).unwrap_err();
        assert!(matches!(
            err,
            TextError::Malformed {
                encoding: "UTF-8",
                offset: 2
            }
        ));
    }

    #[test]
    fn invalid_gbk_is_rejected() {
        // 0x81 lead byte followed by an invalid trail byte
        let err = decode(b"ab\x81\x20", SourceEncoding::Declared(TextEncoding::Gbk)).unwrap_err();
        assert!(matches!(err, TextError::Malformed { encoding: "GBK", .. }));
    }

    #[test]
    fn truncated_multibyte_tail_is_dropped_only_when_not_last() {
        let bytes = "中文".as_bytes();
        let cut = &bytes[..bytes.len() - 1];
        assert!(decode_strict(cut, TextEncoding::Utf8, true).is_err());
        assert_eq!(decode_strict(cut, TextEncoding::Utf8, false).unwrap(), "中");

        let gb = encode("中文", TextEncoding::Gb18030).bytes;
        let cut = &gb[..gb.len() - 1];
        assert!(decode_strict(cut, TextEncoding::Gb18030, true).is_err());
        assert_eq!(decode_strict(cut, TextEncoding::Gb18030, false).unwrap(), "中");
    }

    #[test]
    fn unrepresentable_characters_become_question_marks() {
        let encoded = encode("hello🙂", TextEncoding::Gbk);
        assert_eq!(encoded.bytes, b"hello?");
        assert_eq!(encoded.replaced, 1);

        let encoded = encode("Ωmega €", TextEncoding::Iso8859_1);
        assert_eq!(encoded.bytes, b"?mega ?");
        assert_eq!(encoded.replaced, 2);
    }

    #[test]
    fn gb18030_holds_everything() {
        let text = "emoji 🙂 and 𝄞";
        let encoded = encode(text, TextEncoding::Gb18030);
        assert!(encoded.is_lossless());
    }

    #[test]
    fn auto_decode_reports_detected_encoding() {
        let decoded = decode("plain ascii text\n".as_bytes(), SourceEncoding::Auto).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf8);

        let err = decode(&[0u8, 1, 2, 3], SourceEncoding::Auto).unwrap_err();
        assert!(matches!(err, TextError::DetectionFailed));
    }
}
