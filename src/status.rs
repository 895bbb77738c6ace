use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a tree record, as the trees API encodes it.
///
/// Unknown codes are kept verbatim so a new server-side state still shows up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TreeStatus {
    #[default]
    Pending,
    Approved,
    Processed,
    Other(String),
}

impl TreeStatus {
    pub fn code(&self) -> &str {
        match self {
            TreeStatus::Pending => "P",
            TreeStatus::Approved => "A",
            TreeStatus::Processed => "E",
            TreeStatus::Other(code) => code,
        }
    }
}

impl From<String> for TreeStatus {
    fn from(code: String) -> Self {
        match code.as_str() {
            "P" => TreeStatus::Pending,
            "A" => TreeStatus::Approved,
            "E" => TreeStatus::Processed,
            _ => TreeStatus::Other(code),
        }
    }
}

impl From<TreeStatus> for String {
    fn from(status: TreeStatus) -> Self {
        status.code().to_string()
    }
}

impl fmt::Display for TreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(badge(self).label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Yellow,
    Blue,
    Green,
    Slate,
}

/// How a status is shown in the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge<'a> {
    pub label: &'a str,
    pub tone: Tone,
}

pub fn badge(status: &TreeStatus) -> Badge<'_> {
    match status {
        TreeStatus::Pending => Badge {
            label: "Pending",
            tone: Tone::Yellow,
        },
        TreeStatus::Approved => Badge {
            label: "Approved",
            tone: Tone::Blue,
        },
        TreeStatus::Processed => Badge {
            label: "Processed",
            tone: Tone::Green,
        },
        TreeStatus::Other(code) => Badge {
            label: code,
            tone: Tone::Slate,
        },
    }
}
