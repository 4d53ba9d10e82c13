//! CSV export of join requests.
//!
//! The format is deliberately small: an unquoted header row, then one row per
//! request with every field double-quoted and embedded quotes doubled.

use chrono::{DateTime, Utc};

/// Header row of the join request export.
pub const JOIN_REQUEST_HEADER: &str = "Event Title,Name,Email,Phone,Message,Joined Date";

/// One exported join request.
#[derive(Debug, Clone, Copy)]
pub struct JoinRequestRow<'a> {
    pub event_title: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub message: Option<&'a str>,
    pub joined_at: DateTime<Utc>,
}

/// Quote a single field, doubling any embedded quotes.
#[must_use]
pub fn quote_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Format a join timestamp the way the export shows it.
#[must_use]
pub fn format_joined_at(joined_at: DateTime<Utc>) -> String {
    joined_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Render join requests as CSV: header line plus one line per row, `\n`-separated.
#[must_use]
pub fn join_requests_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = JoinRequestRow<'a>>,
{
    let mut lines = vec![JOIN_REQUEST_HEADER.to_owned()];
    for row in rows {
        let joined = format_joined_at(row.joined_at);
        let fields = [
            row.event_title,
            row.name,
            row.email,
            row.phone.unwrap_or(""),
            row.message.unwrap_or(""),
            joined.as_str(),
        ];
        lines.push(
            fields
                .iter()
                .map(|f| quote_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// File name for a join request export, e.g. `join-requests-2026-05-01.csv`.
#[must_use]
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("join-requests-{}.csv", now.format("%Y-%m-%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_quote_field() {
        assert_eq!(quote_field("plain"), "\"plain\"");
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field(""), "\"\"");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = join_requests_csv(std::iter::empty());
        assert_eq!(csv, JOIN_REQUEST_HEADER);
    }

    #[test]
    fn test_n_rows_give_n_plus_one_lines() {
        let rows: Vec<JoinRequestRow<'_>> = (0..3)
            .map(|_| JoinRequestRow {
                event_title: "Launch, v2",
                name: "Ada \"The\" Countess",
                email: "ada@example.com",
                phone: None,
                message: Some("See you there"),
                joined_at: at(),
            })
            .collect();
        let csv = join_requests_csv(rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], JOIN_REQUEST_HEADER);
        assert_eq!(
            lines[1],
            "\"Launch, v2\",\"Ada \"\"The\"\" Countess\",\"ada@example.com\",\"\",\"See you there\",\"2026-05-01 09:30:00 UTC\""
        );
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(at()), "join-requests-2026-05-01.csv");
    }
}
