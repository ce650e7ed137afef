use std::borrow::Cow;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Difficulty levels recognized by the recommendation skill-level filter.
pub const DIFFICULTY_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

/// A single course record from the catalog.
///
/// Only the searchable fields are typed. Everything else, including the
/// descriptive `duration`, `provider`, `rating` and `enrollment_count`, stays in
/// `extra` exactly as the source had it and is read through lenient accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier, e.g. "c1". Numeric ids are read as their decimal text.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Coarse topic, e.g. "programming", "ml"
    pub category: String,
    /// Difficulty level, usually one of [`DIFFICULTY_LEVELS`] but not restricted to it
    pub difficulty: String,
    pub skills: Vec<String>,
    pub prerequisites: Prerequisites,
    /// Remaining fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    /// Course length as free text, e.g. "6 weeks".
    pub fn duration(&self) -> Option<String> {
        self.text_field("duration")
    }

    pub fn provider(&self) -> Option<String> {
        self.text_field("provider")
    }

    /// Average rating out of 5. Numeric strings are accepted.
    pub fn rating(&self) -> Option<f64> {
        self.number_field("rating")
    }

    pub fn enrollment_count(&self) -> Option<u64> {
        self.number_field("enrollment_count")
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    }

    fn text_field(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn number_field(&self, key: &str) -> Option<f64> {
        let value = match self.extra.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|n| n.is_finite())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "invalid course id {other}, expected a string or number"
        ))),
    }
}

/// Course prerequisites. Catalogs list them either as a sequence or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prerequisites {
    List(Vec<String>),
    Text(String),
}

impl Prerequisites {
    /// Space-joined form used for search text.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Prerequisites::List(items) => Cow::Owned(items.join(" ")),
            Prerequisites::Text(text) => Cow::Borrowed(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Prerequisites::List(items) => items.is_empty(),
            Prerequisites::Text(text) => text.trim().is_empty(),
        }
    }
}

impl Default for Prerequisites {
    fn default() -> Self {
        Prerequisites::List(Vec::new())
    }
}

impl fmt::Display for Prerequisites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerequisites::List(items) if items.is_empty() => f.write_str("None"),
            Prerequisites::List(items) => f.write_str(&items.join(", ")),
            Prerequisites::Text(text) => f.write_str(text),
        }
    }
}

/// A ranked copy of a course, annotated with its score against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub course: Course,
    /// Relevance in [0, 1]
    pub similarity_score: f32,
    /// 1-based position within the returned page
    pub rank: usize,
}

/// Optional attribute filters. Stages compose as a conjunction; empty values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl CourseFilter {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }
}

/// Inputs for interest-based recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_interests: String,
    #[serde(default)]
    pub user_background: String,
    #[serde(default)]
    pub skill_level: String,
    #[serde(default = "default_recommendation_count")]
    pub top_k: usize,
}

fn default_recommendation_count() -> usize {
    3
}

impl RecommendationRequest {
    pub fn new(user_interests: impl Into<String>) -> Self {
        Self {
            user_interests: user_interests.into(),
            user_background: String::new(),
            skill_level: String::new(),
            top_k: default_recommendation_count(),
        }
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.user_background = background.into();
        self
    }

    pub fn skill_level(mut self, skill_level: impl Into<String>) -> Self {
        self.skill_level = skill_level.into();
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A category present in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub course_count: usize,
}

/// One turn of a conversation with the advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// What we know about the learner, gathered from a profile form or a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub interests: String,
    pub background: String,
    pub skill_level: String,
}
