use filebridge_core::models::{FileRecord, SourceEncoding, TextEncoding};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a target encoding name, rejecting anything the server would reject.
pub fn parse_target_encoding(raw: &str) -> anyhow::Result<TextEncoding> {
    raw.parse::<TextEncoding>()
        .map_err(|_| anyhow::anyhow!("{}", unsupported(raw)))
}

/// Parse a source encoding name; "auto" asks the server to detect it.
pub fn parse_source_encoding(raw: &str) -> anyhow::Result<SourceEncoding> {
    raw.parse::<SourceEncoding>()
        .map_err(|_| anyhow::anyhow!("{}", unsupported(raw)))
}

fn unsupported(raw: &str) -> String {
    let names: Vec<&str> = TextEncoding::ALL.iter().map(|e| e.as_str()).collect();
    format!(
        "Unsupported encoding '{}'. Supported: {}",
        raw,
        names.join(", ")
    )
}

/// Reject names the server would reject as empty.
pub fn validate_name(name: &str) -> anyhow::Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Name must not be empty"));
    }
    Ok(trimmed)
}

/// One line per file: id, size, encoding, name.
pub fn format_table(files: &[FileRecord]) -> String {
    let mut out = format!(
        "{:<36}  {:>10}  {:<12}  {}\n",
        "ID", "SIZE", "ENCODING", "NAME"
    );
    for file in files {
        out.push_str(&format!(
            "{:<36}  {:>10}  {:<12}  {}\n",
            file.id,
            file.size_bytes,
            file.encoding,
            truncate_string(&file.name, 48)
        ));
    }
    out
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
