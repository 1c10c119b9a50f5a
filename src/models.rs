//! Wire and domain records shared by the review engine and the gateway
//!
//! Field names follow the review service's camelCase JSON.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Processing status of an uploaded sermon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SermonStatus {
    Uploaded,
    Processing,
    Ready,
    Error,
}

impl std::fmt::Display for SermonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SermonStatus::Uploaded => write!(f, "uploaded"),
            SermonStatus::Processing => write!(f, "processing"),
            SermonStatus::Ready => write!(f, "ready"),
            SermonStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for SermonStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(SermonStatus::Uploaded),
            "processing" => Ok(SermonStatus::Processing),
            "ready" => Ok(SermonStatus::Ready),
            "error" => Ok(SermonStatus::Error),
            _ => Err(Error::Config(format!("Unknown sermon status: {}", s))),
        }
    }
}

/// An uploaded sermon presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sermon {
    pub id: String,
    pub sermon_name: String,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub week_or_date: Option<String>,
    #[serde(default)]
    pub pastor_name: Option<String>,
    pub status: SermonStatus,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    /// Service wall-clock time; the service may omit the offset
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// ISO-8601 timestamps with or without a UTC offset.
///
/// Offset timestamps keep their wall-clock time; the offset is dropped.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(NAIVE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(dt.naive_local()));
        }
        NaiveDateTime::parse_from_str(&raw, NAIVE_FORMAT)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}

impl Sermon {
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_at.map(|dt| dt.date())
    }

    /// Date label for listings: the week/date label, else the creation date
    pub fn display_date(&self) -> String {
        match self.week_or_date.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => self
                .created_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// One page of a sermon's presentation with its extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub slide_id: String,
    pub slide_number: u32,
    #[serde(default)]
    pub original_text: String,
}

/// One proposed textual edit produced by analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub category: String,
    pub original: String,
    pub proposed: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Suggestion {
    /// Confidence as a whole percentage, or `-` when absent
    pub fn confidence_label(&self) -> String {
        match self.confidence {
            Some(c) => format!("{:.0}%", c * 100.0),
            None => "-".to_string(),
        }
    }
}

/// A reviewer's verdict on a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Accepted,
    Rejected,
    Edited,
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionKind::Accepted => write!(f, "accepted"),
            DecisionKind::Rejected => write!(f, "rejected"),
            DecisionKind::Edited => write!(f, "edited"),
        }
    }
}

/// A persisted decision entry, as exchanged with the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEntry {
    pub suggestion_id: String,
    pub decision: DecisionKind,
    /// Always serialized; `null` means "no edit text"
    #[serde(default)]
    pub final_text: Option<String>,
}

/// Analysis result for a single slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideAnalysis {
    pub slide_id: String,
    pub slide_number: u32,
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

/// All analysis results recorded for a sermon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDocument {
    #[serde(default)]
    pub sermon_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub slides: Vec<SlideAnalysis>,
}

/// Persisted decisions for a single slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDecisions {
    pub slide_id: String,
    pub slide_number: u32,
    #[serde(default)]
    pub decisions: Vec<DecisionEntry>,
}

/// All persisted decisions for a sermon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionsDocument {
    #[serde(default)]
    pub sermon_id: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub slides: Vec<SlideDecisions>,
}

/// Body of a save-decisions request; replaces the slide's stored decisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDecisionsPayload {
    pub decisions: Vec<DecisionEntry>,
}

/// Acknowledgement from output generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReceipt {
    pub status: String,
}

/// Form fields for uploading a new sermon
#[derive(Debug, Clone)]
pub struct SermonUpload {
    pub sermon_name: String,
    pub series_name: Option<String>,
    pub week_or_date: Option<String>,
    pub pastor_name: Option<String>,
    pub file: PathBuf,
}

impl SermonUpload {
    /// Reject anything other than a `.pptx` presentation
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.sermon_name.trim().is_empty() {
            return Err(Error::Config("Sermon name is required".to_string()));
        }
        let is_pptx = self
            .file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pptx"))
            .unwrap_or(false);
        if !is_pptx {
            return Err(Error::UnsupportedFile(format!(
                "{} (only .pptx files are supported)",
                self.file.display()
            )));
        }
        Ok(())
    }
}

/// The first Sunday strictly after `today`
pub fn next_sunday(today: NaiveDate) -> NaiveDate {
    let from_sunday = today.weekday().num_days_from_sunday() as i64;
    let days = if from_sunday == 0 { 7 } else { 7 - from_sunday };
    today + Duration::days(days)
}

/// Case-insensitive substring filters over the sermon listing; status matches exactly
#[derive(Debug, Clone, Default)]
pub struct SermonFilter {
    pub name: Option<String>,
    pub series: Option<String>,
    pub date: Option<String>,
    pub presenter: Option<String>,
    pub status: Option<SermonStatus>,
}

impl SermonFilter {
    pub fn matches(&self, sermon: &Sermon) -> bool {
        fn field_matches(filter: &Option<String>, value: Option<&str>) -> bool {
            match filter.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(needle) => value
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
            }
        }

        field_matches(&self.name, Some(&sermon.sermon_name))
            && field_matches(&self.series, sermon.series_name.as_deref())
            && field_matches(&self.date, sermon.week_or_date.as_deref())
            && field_matches(&self.presenter, sermon.pastor_name.as_deref())
            && self.status.map_or(true, |status| sermon.status == status)
    }

    pub fn apply<'a>(&self, sermons: &'a [Sermon]) -> Vec<&'a Sermon> {
        sermons.iter().filter(|s| self.matches(s)).collect()
    }
}
