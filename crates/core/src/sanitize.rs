const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turns a rendered template into something every supported filesystem accepts.
pub fn sanitize_filename(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|ch| if is_disallowed_char(ch) { '_' } else { ch })
        .collect();

    let mut out = replaced.trim_end_matches([' ', '.']).trim().to_string();

    if out.is_empty() {
        out = "untitled".to_string();
    }

    if is_windows_reserved(&out) {
        out.push_str("_file");
    }

    out
}

/// Shortens `base` so that `base + suffix + extension` fits in `limit` chars.
pub fn truncate_filename_if_needed(
    base: &str,
    suffix: &str,
    extension_with_dot: &str,
    limit: usize,
) -> String {
    let reserved = suffix.chars().count() + extension_with_dot.chars().count();
    let keep = limit.saturating_sub(reserved).max(1);
    if base.chars().count() <= keep {
        return base.to_string();
    }
    base.chars().take(keep).collect()
}

fn is_disallowed_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch.is_control()
}

fn is_windows_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
}
