//! Normalization of Read tool output.
//!
//! The Read tool returns file content in `cat -n` form (`     1→line`) and the
//! assistant runtime may append a `<system-reminder>` block. Neither is part
//! of the file.

use regex::Regex;
use std::sync::OnceLock;

fn line_prefix_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"^[ \t]*\d+→").expect("line prefix regex must compile"))
}

fn system_reminder_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?s)\n*<system-reminder>.*?</system-reminder>\s*$")
            .expect("system reminder regex must compile")
    })
}

/// Recover file content from raw Read output.
pub fn normalize_read_output(raw: &str) -> String {
    let without_reminder = strip_system_reminder(raw);
    strip_line_prefixes(&without_reminder)
}

/// Remove a trailing `<system-reminder>` block.
pub fn strip_system_reminder(raw: &str) -> String {
    system_reminder_regex().replace(raw, "").into_owned()
}

/// Remove `cat -n` prefixes, but only when every non-empty line has one.
///
/// Content that merely contains a line such as `3→x` is left alone.
pub fn strip_line_prefixes(raw: &str) -> String {
    let prefix = line_prefix_regex();
    let mut saw_prefix = false;
    for line in raw.split('\n').filter(|line| !line.is_empty()) {
        if !prefix.is_match(line) {
            return raw.to_string();
        }
        saw_prefix = true;
    }
    if !saw_prefix {
        return raw.to_string();
    }

    raw.split('\n')
        .map(|line| prefix.replace(line, ""))
        .collect::<Vec<_>>()
        .join("\n")
}
