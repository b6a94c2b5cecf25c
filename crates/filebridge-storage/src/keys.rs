//! Shared key generation for storage backends.

use uuid::Uuid;

/// Storage key for one revision of a file's bytes.
pub fn file_key(file_id: Uuid, revision: u64) -> String {
    format!("files/{}/r{}", file_id, revision)
}

/// Rejects keys that could escape a backend's namespace.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/') && !key.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_get_distinct_keys() {
        let id = Uuid::new_v4();
        assert_ne!(file_key(id, 0), file_key(id, 1));
        assert!(file_key(id, 3).ends_with("/r3"));
        assert!(is_valid_key(&file_key(id, 0)));
    }

    #[test]
    fn rejects_traversal() {
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key("/abs"));
        assert!(!is_valid_key("files\\x"));
        assert!(!is_valid_key(""));
    }
}
