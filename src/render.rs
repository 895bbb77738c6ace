use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::{
    state::Load,
    status::{Tone, badge},
    submission::{Confirmation, SubmissionState},
    trees::{StatusFilter, TreeRecord},
    upload::FilePreviewController,
};

/// e.g. `Saturday, June 01, 2024 at 9:30 AM`
pub fn long_date(at: &DateTime<FixedOffset>) -> String {
    at.format("%A, %B %d, %Y at %-I:%M %p").to_string()
}

pub fn confirmation(c: &Confirmation) -> String {
    format!("✔ {}\n  {}", c.title, long_date(&c.placed_at))
}

/// One line per state; `None` while idle.
pub fn submission(state: &SubmissionState) -> Option<String> {
    match state {
        SubmissionState::Idle => None,
        SubmissionState::Submitting => Some("Placing order...".to_string()),
        SubmissionState::Success(c) => Some(confirmation(c)),
        SubmissionState::Failure(f) => Some(format!("Error: {}", f.message())),
    }
}

pub fn file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Name, size and preview lines for the current upload selection.
pub fn selection(ctl: &FilePreviewController) -> String {
    let mut out = String::new();
    if let Some(url) = ctl.preview_url() {
        let _ = writeln!(out, "Preview: {}", url);
    }
    if let Some(name) = ctl.file_name() {
        let _ = writeln!(out, "Selected file: {}", name);
    }
    if let Some(size) = ctl.file_size() {
        let _ = writeln!(out, "Size: {}", file_size(size));
    }
    out
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Yellow => "(!)",
        Tone::Blue => "(~)",
        Tone::Green => "(+)",
        Tone::Slate => "( )",
    }
}

/// Tab strip with the active tab bracketed.
pub fn tabs(active: StatusFilter) -> String {
    StatusFilter::TABS
        .iter()
        .map(|t| {
            if *t == active {
                format!("[{}]", t)
            } else {
                format!(" {} ", t)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tree_table(rows: &[TreeRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<14} {:>6} {:>9} {:>7}  {}",
        "Name", "Status", "Age", "Diameter", "Height", "GeoLocation"
    );
    for row in rows {
        let b = badge(&row.status);
        let _ = writeln!(
            out,
            "{:<24} {} {:<10} {:>6} {:>9} {:>7}  {}",
            row.name,
            tone_marker(b.tone),
            b.label,
            row.age.to_string(),
            row.diameter.to_string(),
            row.height.to_string(),
            row.geo_location
        );
    }
    let _ = write!(out, "{} tree(s)", rows.len());
    out
}

pub fn listing(view: &Load<Vec<TreeRecord>>) -> String {
    match view {
        Load::Loading => "Loading trees...".to_string(),
        Load::Failed(message) => format!("Error: {}", message),
        Load::Loaded(rows) => tree_table(rows),
    }
}
