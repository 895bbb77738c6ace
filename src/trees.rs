use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::status::TreeStatus;

/// A measurement the trees API sends either as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(serde_json::Number),
    Text(String),
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Text(String::new())
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Number(n) => write!(f, "{}", n),
            Measure::Text(s) => f.write_str(s),
        }
    }
}

/// Any JSON scalar as display text. `null` and missing become empty.
fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn measure<'de, D: Deserializer<'de>>(de: D) -> Result<Measure, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => Measure::Number(n),
        other => Measure::Text(text(other).map_err(serde::de::Error::custom)?),
    })
}

fn tree_status<'de, D: Deserializer<'de>>(de: D) -> Result<TreeStatus, D::Error> {
    let code = text(de)?;
    Ok(if code.is_empty() {
        TreeStatus::default()
    } else {
        TreeStatus::from(code)
    })
}

/// A tree as listed by the trees API. Read-only on this side.
///
/// Decoding never fails on a field's value: one malformed record must not
/// take the whole listing down with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeRecord {
    #[serde(rename = "_id", deserialize_with = "text")]
    pub id: String,
    #[serde(deserialize_with = "measure")]
    pub tree_id: Measure,
    #[serde(deserialize_with = "text")]
    pub species: String,
    #[serde(deserialize_with = "text")]
    pub image: String,
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "tree_status")]
    pub status: TreeStatus,
    #[serde(deserialize_with = "measure")]
    pub age: Measure,
    #[serde(deserialize_with = "measure")]
    pub diameter: Measure,
    #[serde(deserialize_with = "measure")]
    pub height: Measure,
    #[serde(deserialize_with = "text")]
    pub geo_location: String,
    #[serde(deserialize_with = "text")]
    pub enter_user: String,
    #[serde(deserialize_with = "text")]
    pub enter_date: String,
}

/// Which tab of the listing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Processed,
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Approved,
        StatusFilter::Processed,
    ];

    /// Status code used in `/find/{code}`; `None` lists everything.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some("P"),
            StatusFilter::Approved => Some("A"),
            StatusFilter::Processed => Some("E"),
        }
    }

    pub fn url(&self, trees_api: &str) -> String {
        match self.code() {
            None => trees_api.to_string(),
            Some(code) => format!("{}/find/{}", trees_api, code),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusFilter::All => "All",
            StatusFilter::Pending => "Pending",
            StatusFilter::Approved => "Approved",
            StatusFilter::Processed => "Processed",
        };
        f.write_str(label)
    }
}

impl FromStr for StatusFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "p" | "pending" => Ok(StatusFilter::Pending),
            "a" | "approved" => Ok(StatusFilter::Approved),
            "e" | "processed" => Ok(StatusFilter::Processed),
            _ => Err(format!("unknown status tab: `{}`", s)),
        }
    }
}
