//! Markdown dialect shared by the memory file and the daily logs.
//!
//! Memory file:
//! ```text
//! # Memory
//!
//! ## Config
//!
//! - **database_host**: localhost:5432
//! ```
//!
//! Daily log:
//! ```text
//! # Daily Log — 2026-02-18
//!
//! - `09:15:02` User completed onboarding
//! ```
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::schema::{CategoryMap, DEFAULT_CATEGORY, Entry, LogEntry};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.+)$").expect("valid heading regex"));
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \*\*(.+?)\*\*:\s*(.+)$").expect("valid entry regex"));
static LOG_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- `(.+?)`\s+(.+)$").expect("valid log line regex"));

/// Parse a memory file.  Lines that are neither a `##` heading nor an entry
/// bullet are ignored; entries before the first heading, or under a heading
/// with a blank name, land in `general`.
pub fn parse_memory(text: &str) -> CategoryMap {
    let mut map = CategoryMap::new();
    let mut current = DEFAULT_CATEGORY.to_string();

    for (line_idx, line) in text.lines().enumerate() {
        if let Some(caps) = HEADING_RE.captures(line) {
            let name = caps[1].trim().to_lowercase();
            if name.is_empty() {
                debug!(line = line_idx + 1, "blank heading in memory file, using general");
                current = DEFAULT_CATEGORY.to_string();
            } else {
                current = name;
                map.entries_mut(&current);
            }
            continue;
        }

        if let Some(caps) = ENTRY_RE.captures(line) {
            map.entries_mut(&current)
                .push(Entry::new(&caps[1], &caps[2]));
        } else if line.starts_with("- ") {
            debug!(line = line_idx + 1, "skipping unrecognised bullet in memory file");
        }
    }

    map
}

/// Render a memory file.  Empty categories are kept as bare headings.
pub fn render_memory(map: &CategoryMap) -> String {
    let mut lines: Vec<String> = vec!["# Memory\n".to_string()];
    for (category, entries) in map.iter() {
        lines.push(format!("## {}\n", heading_for(category)));
        for entry in entries {
            lines.push(format!("- **{}**: {}", entry.key, entry.value));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn log_header(date_label: &str) -> String {
    format!("# Daily Log — {date_label}\n\n")
}

pub fn render_log_line(entry: &LogEntry) -> String {
    format!("- `{}` {}\n", entry.timestamp, entry.text)
}

pub fn parse_log(text: &str) -> Vec<LogEntry> {
    text.lines()
        .filter_map(|line| LOG_LINE_RE.captures(line))
        .map(|caps| LogEntry {
            timestamp: caps[1].to_string(),
            text: caps[2].to_string(),
        })
        .collect()
}

/// Title-cased heading, or the name as-is when lower-casing the title would
/// not give the name back (`ß` upper-cases to `SS`).
fn heading_for(category: &str) -> String {
    let titled = title_case(category);
    if titled.to_lowercase() == category {
        titled
    } else {
        category.to_string()
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
/// `cat_a` → `Cat_A`; parsing lower-cases the heading again.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
