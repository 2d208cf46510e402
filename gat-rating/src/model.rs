//! Wire model of the rating provider response
//!
//! Every optional field has a local default so a sparse or partially null
//! payload still parses. Only a record's `id` is mandatory.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::options::FilterOptions;

/// Treat an explicit JSON `null` the same as an absent field
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept an identifier sent either as a JSON string or a number
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// One ranked participant as sent by the provider
///
/// Immutable once received: the accumulator only appends or replaces whole pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: u64,
    /// Full display name as composed by the provider ("last first")
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub last_name: String,
    #[serde(default, rename = "school", deserialize_with = "null_default")]
    pub school_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub school_id: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub grade: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub section: String,
    /// Exam label, e.g. "GAT-3"
    #[serde(default, rename = "exam", deserialize_with = "null_default")]
    pub exam_code: String,
    #[serde(default, rename = "day")]
    pub day_number: Option<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub score: f64,
    /// Per-subject sub-scores, in provider order
    #[serde(default, deserialize_with = "null_default")]
    pub badges: Vec<Badge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ResultRecord {
    /// Name to show; falls back to "last first" when the provider sent none
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        format!("{} {}", self.last_name, self.first_name).trim().to_string()
    }

    /// Class label in "grade-section" form
    pub fn class_label(&self) -> String {
        format!("{}-{}", self.grade, self.section)
    }
}

/// Per-subject sub-score attached to a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,
    /// Short subject label (provider field `name`)
    #[serde(default, rename = "name", deserialize_with = "null_default")]
    pub label: String,
    #[serde(default)]
    pub score: SubScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Sub-score value; the provider sends "-" when a subject has no score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum SubScore {
    Points(f64),
    #[default]
    Absent,
}

impl SubScore {
    pub fn points(&self) -> Option<f64> {
        match self {
            SubScore::Points(p) => Some(*p),
            SubScore::Absent => None,
        }
    }
}

impl From<Value> for SubScore {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(SubScore::Points).unwrap_or_default(),
            Value::String(s) => s.trim().parse::<f64>().map(SubScore::Points).unwrap_or_default(),
            _ => SubScore::Absent,
        }
    }
}

impl From<SubScore> for Value {
    fn from(score: SubScore) -> Self {
        match score {
            SubScore::Points(p) => serde_json::json!(p),
            SubScore::Absent => Value::String("-".to_string()),
        }
    }
}

/// Aggregate statistics over the whole filtered set (not per page)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "null_default")]
    pub participants: u64,
    #[serde(default, rename = "avgScore", deserialize_with = "null_default")]
    pub avg_score: f64,
}

/// Kind of entity the leader summary refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderKind {
    #[default]
    School,
    Student,
    Class,
}

/// Leader summary (label key plus locale-dependent display value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    #[serde(default = "default_leader_key", deserialize_with = "leader_key_or_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub params: Map<String, Value>,
    #[serde(default = "default_leader_value", deserialize_with = "leader_value_or_default")]
    pub value: String,
    #[serde(default, rename = "type", deserialize_with = "null_default")]
    pub kind: LeaderKind,
}

fn default_leader_key() -> String {
    "leader_school".to_string()
}

fn default_leader_value() -> String {
    "-".to_string()
}

fn leader_key_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_leader_key))
}

fn leader_value_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_leader_value))
}

impl Default for Leader {
    fn default() -> Self {
        Self {
            key: default_leader_key(),
            params: Map::new(),
            value: default_leader_value(),
            kind: LeaderKind::School,
        }
    }
}

/// Pagination block of a page response
///
/// `page` and `total` stay unset when the provider leaves them out; the
/// accumulator then falls back to the requested page and the received count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub limit: u32,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub has_next: bool,
}

/// `meta` block: filter options plus pagination
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(flatten)]
    pub options: FilterOptions,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// One fetch response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageEnvelope {
    /// Server-ranked records, descending score
    #[serde(default, deserialize_with = "null_default")]
    pub data: Vec<ResultRecord>,
    #[serde(default, deserialize_with = "null_default")]
    pub meta: PageMeta,
    #[serde(default, deserialize_with = "null_default")]
    pub stats: Stats,
    #[serde(default, deserialize_with = "null_default")]
    pub leader: Leader,
}

/// Render a score without a trailing ".0" for whole numbers
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.is_finite() {
        format!("{}", score as i64)
    } else {
        format!("{:.1}", score)
    }
}
