use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::i18n::{self, Language};

pub const MATRICULE_MIN: u32 = 22001;
pub const MATRICULE_MAX: u32 = 23119;
// Number of entries the stats feed shows
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Parse a student id. Accepts only a whole integer inside the campaign range.
pub fn parse_matricule(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (MATRICULE_MIN..=MATRICULE_MAX).contains(m))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    #[default]
    For,
    Against,
}

impl Choice {
    pub fn as_str(self) -> &'static str {
        match self {
            Choice::For => "for",
            Choice::Against => "against",
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        i18n::t(lang, self.as_str())
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "for" => Ok(Choice::For),
            "against" => Ok(Choice::Against),
            other => Err(format!("Unknown choice: {}", other)),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Justification attached to an "against" vote: one of the known categories
/// or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Opinion {
    EnglishExam,
    PvIssue,
    Other(String),
}

impl Opinion {
    pub fn as_str(&self) -> &str {
        match self {
            Opinion::EnglishExam => "english_exam",
            Opinion::PvIssue => "pv_issue",
            Opinion::Other(text) => text,
        }
    }

    /// Known categories render through the translation table, free text verbatim.
    pub fn label(&self, lang: Language) -> String {
        match self {
            Opinion::EnglishExam => i18n::t(lang, "englishExamIssue").to_string(),
            Opinion::PvIssue => i18n::t(lang, "pvIssue").to_string(),
            Opinion::Other(text) => i18n::lookup(lang, text)
                .map(str::to_string)
                .unwrap_or_else(|| text.clone()),
        }
    }
}

impl From<String> for Opinion {
    fn from(value: String) -> Self {
        match value.as_str() {
            "english_exam" => Opinion::EnglishExam,
            "pv_issue" => Opinion::PvIssue,
            _ => Opinion::Other(value),
        }
    }
}

impl From<&str> for Opinion {
    fn from(value: &str) -> Self {
        Opinion::from(value.to_string())
    }
}

impl From<Opinion> for String {
    fn from(value: Opinion) -> Self {
        match value {
            Opinion::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

/// A vote record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub matricule: String,
    #[serde(default)]
    pub name: String,
    pub choice: Choice,
    #[serde(default, deserialize_with = "optional_opinion")]
    pub opinion: Option<Opinion>,
    #[serde(
        rename = "createdAt",
        alias = "timestamp",
        default,
        deserialize_with = "optional_datetime"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Vote {
    pub fn display_name(&self, lang: Language) -> &str {
        if self.name.trim().is_empty() {
            i18n::t(lang, "anonymous")
        } else {
            &self.name
        }
    }

    pub fn formatted_date(&self, lang: Language) -> String {
        self.created_at
            .map(|dt| dt.format(lang.date_format()).to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn opinion_label(&self, lang: Language) -> Option<String> {
        self.opinion.as_ref().map(|o| o.label(lang))
    }
}

/// Payload of `POST /api/vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVote {
    pub matricule: String,
    pub name: String,
    pub choice: Choice,
    pub opinion: String,
}

/// Full-replace payload of `PUT /api/votes/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteUpdate {
    pub choice: Choice,
    pub opinion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChoiceStats {
    #[serde(default)]
    pub count: u64,
    // Kept exactly as the backend rounded it
    #[serde(default, deserialize_with = "string_or_number")]
    pub percentage: String,
}

/// Aggregate tally returned by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub stats: BTreeMap<String, ChoiceStats>,
    #[serde(rename = "latestVotes", default, deserialize_with = "lenient_votes")]
    pub latest_votes: Vec<Vote>,
}

impl StatsSnapshot {
    pub fn for_choice(&self, choice: Choice) -> Option<&ChoiceStats> {
        self.stats.get(choice.as_str())
    }

    /// At most the first five entries, in the order received.
    pub fn recent_activity(&self) -> &[Vote] {
        let end = self.latest_votes.len().min(RECENT_ACTIVITY_LIMIT);
        &self.latest_votes[..end]
    }
}

/// Decode vote records one by one, dropping the ones that do not parse.
pub fn votes_from_values(items: &[Value]) -> Vec<Vote> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Vote>(item.clone()) {
            Ok(vote) => Some(vote),
            Err(e) => {
                warn!("Skipping malformed vote record: {}", e);
                None
            }
        })
        .collect()
}

fn lenient_votes<'de, D>(deserializer: D) -> Result<Vec<Vote>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(votes_from_values(&items.unwrap_or_default()))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn optional_opinion<'de, D>(deserializer: D) -> Result<Option<Opinion>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(Opinion::from))
}

fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| log::debug!("Ignoring unparseable date '{}': {}", s, e))
            .ok()
    }))
}
