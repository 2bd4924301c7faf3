use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::config::HistoryConfig;

/// `10/18/2026, 3:04:05 PM`
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const TEXT_SEPARATOR: &str = "\n----\n";
const HTML_SEPARATOR: &str = "<hr style=\"opacity:0.06\">";

/// One completed computation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    title: String,
    detail: String,
    timestamp: String,
}

impl HistoryEntry {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn to_html(&self) -> String {
        format!(
            "<div class=\"hist-item\"><b>{}</b><div class=\"muted\" style=\"font-size:12px\">{}</div><div>{}</div></div>",
            escape_html(&self.title),
            escape_html(&self.timestamp),
            escape_html(&self.detail)
        )
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.title, self.timestamp, self.detail)
    }
}

/// Session history, newest entry first. Unbounded unless a limit is
/// configured, in which case the oldest entries are dropped
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(cfg: &HistoryConfig) -> Self {
        History {
            entries: VecDeque::new(),
            limit: cfg.limit,
        }
    }

    /// Records a computation stamped with the current local time
    pub fn record(&mut self, title: &str, detail: &str) -> &HistoryEntry {
        self.record_at(title, detail, Local::now())
    }

    pub fn record_at<Tz: TimeZone>(&mut self, title: &str, detail: &str, at: DateTime<Tz>) -> &HistoryEntry
    where
        Tz::Offset: fmt::Display,
    {
        let entry = HistoryEntry {
            title: title.to_string(),
            detail: detail.to_string(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        };
        log::debug!("history: {} ({})", entry.title, entry.detail);
        self.entries.push_front(entry);
        if let Some(limit) = self.limit {
            self.entries.truncate(limit.max(1));
        }
        &self.entries[0]
    }

    /// All entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain text view of the whole history
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join(TEXT_SEPARATOR)
    }

    /// Markup for the history panel; all user text is escaped
    pub fn render_html(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_html())
            .collect::<Vec<String>>()
            .join(HTML_SEPARATOR)
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
