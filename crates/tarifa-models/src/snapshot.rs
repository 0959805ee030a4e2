use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::price::PriceEntry;

/// Format of the date key stored on the first line of the slot file.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Default slot file name, relative to the working directory.
pub const DEFAULT_SLOT_FILE: &str = "today.csv";

/// Format a date the way the slot file keys it (`DD/MM/YYYY`).
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `DD/MM/YYYY` key. Returns `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Display header shown above the ranked lines.
pub fn header(date_key: &str) -> String {
    format!("Hoy {date_key}")
}

/// The cheapest slots of one day, in upstream order (ascending price).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub entries: Vec<PriceEntry>,
}

impl DailySnapshot {
    pub fn new(date: NaiveDate, entries: Vec<PriceEntry>) -> Self {
        Self { date, entries }
    }

    pub fn date_key(&self) -> String {
        format_date(self.date)
    }

    /// Ranked entry lines, rank starting at 1. Order is never changed.
    pub fn render_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.render(i + 1))
            .collect()
    }

    pub fn to_record(&self) -> SlotRecord {
        SlotRecord {
            date: self.date_key(),
            lines: self.render_lines(),
        }
    }
}

/// The single persisted record.
///
/// ```text
/// 05/06/2024
/// 1. <b>03-04</b>: 0.101 € / kWh.
/// 2. <b>04-05</b>: 0.104 € / kWh.
/// ...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    /// Date key, `DD/MM/YYYY`.
    pub date: String,
    /// Pre-rendered ranked lines.
    pub lines: Vec<String>,
}

impl SlotRecord {
    /// Serialize to the line-oriented file layout.
    pub fn to_file_contents(&self) -> String {
        let mut out = String::with_capacity(16 + self.lines.len() * 48);
        out.push_str(&self.date);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Split file contents into date key and lines. Accepts `\n` and `\r\n`.
    /// The date line is kept verbatim so that only an exact key is a hit.
    /// Returns `None` when the file has no first line.
    pub fn from_file_contents(contents: &str) -> Option<Self> {
        let mut lines = contents.lines();
        let date = lines.next()?.to_string();
        let lines = lines
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        Some(Self { date, lines })
    }

    /// Header followed by the ranked lines, as returned to callers.
    pub fn display_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 1);
        out.push(header(&self.date));
        out.extend(self.lines.iter().cloned());
        out
    }
}
