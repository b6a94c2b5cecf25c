//! `Content-Disposition` for downloads of user-named files.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 5987 `attr-char` minus alphanumerics: everything else gets percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Replaces characters that could break out of the header or imply a path.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\0' | '\r' | '\n' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// `attachment; filename="<ascii>"; filename*=UTF-8''<encoded>`
pub fn attachment(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    let fallback: String = sanitized
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(&sanitized, ATTR_CHAR);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_header_breaking_characters() {
        assert_eq!(sanitize_filename("a/b\\c\r\nd\0e"), "a_b_c__d_e");
    }

    #[test]
    fn keeps_plain_names_readable() {
        assert_eq!(
            attachment("notes.txt"),
            "attachment; filename=\"notes.txt\"; filename*=UTF-8''notes.txt"
        );
    }

    #[test]
    fn encodes_unicode_and_quotes() {
        let header = attachment("会议 \"记录\".txt");
        assert!(header.contains("filename=\"__ ____.txt\""));
        assert!(header
            .contains("filename*=UTF-8''%E4%BC%9A%E8%AE%AE%20%22%E8%AE%B0%E5%BD%95%22.txt"));
    }
}
