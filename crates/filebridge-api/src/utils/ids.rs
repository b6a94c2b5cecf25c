use filebridge_core::AppError;
use uuid::Uuid;

/// Parses a file id taken from a URL path. Anything that is not a UUID cannot name a file.
pub fn parse_file_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("File {} not found", raw)))
}

/// Leading characters of a token, safe to put in logs.
pub fn token_prefix(token: &str) -> &str {
    token
        .char_indices()
        .nth(TOKEN_LOG_PREFIX_CHARS)
        .map_or(token, |(i, _)| &token[..i])
}

const TOKEN_LOG_PREFIX_CHARS: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_ids_are_not_found() {
        assert!(matches!(
            parse_file_id("not-a-uuid").unwrap_err(),
            AppError::NotFound(_)
        ));
        let id = Uuid::new_v4();
        assert_eq!(parse_file_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn token_prefix_truncates() {
        assert_eq!(token_prefix("abcdefghijklmnop"), "abcdefgh");
        assert_eq!(token_prefix("short"), "short");
        assert_eq!(token_prefix("会议纪要会议纪要会议"), "会议纪要会议纪要");
    }
}
