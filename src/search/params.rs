use crate::search::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_QUERY_CHARS: usize = 500;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 50;
pub const DEFAULT_LIMIT: u32 = 10;

/// Result language filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Auto,
    En,
    Zh,
    Ja,
    Ko,
    Es,
    Fr,
    De,
    Ru,
    Pt,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::Auto,
        Language::En,
        Language::Zh,
        Language::Ja,
        Language::Ko,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Ru,
        Language::Pt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::En => "en",
            Language::Zh => "zh",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Ru => "ru",
            Language::Pt => "pt",
        }
    }
}

impl FromStr for Language {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| {
                SearchError::Validation(format!(
                    "language must be one of: {}",
                    Language::ALL.map(|l| l.as_str()).join(", ")
                ))
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recency filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Year,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

impl FromStr for Timeframe {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| {
                SearchError::Validation(format!(
                    "timeframe must be one of: {}",
                    Timeframe::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated search parameters.
///
/// Only constructed through [`SearchParams::new`] or
/// [`SearchParams::from_value`], so every instance satisfies the query and
/// limit bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    query: String,
    limit: u32,
    language: Language,
    timeframe: Option<Timeframe>,
}

/// Untrusted tool input, before validation
#[derive(Debug, Deserialize)]
struct RawSearchParams {
    query: Option<String>,
    limit: Option<i64>,
    language: Option<String>,
    timeframe: Option<String>,
}

impl SearchParams {
    pub fn new(
        query: &str,
        limit: Option<i64>,
        language: Option<&str>,
        timeframe: Option<&str>,
    ) -> Result<Self, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::Validation("query cannot be empty".into()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(SearchError::Validation(format!(
                "query must be at most {MAX_QUERY_CHARS} characters"
            )));
        }

        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(n) if (MIN_LIMIT as i64..=MAX_LIMIT as i64).contains(&n) => n as u32,
            Some(n) => {
                return Err(SearchError::Validation(format!(
                    "limit must be between {MIN_LIMIT} and {MAX_LIMIT}, got {n}"
                )))
            }
        };

        let language = match language {
            None => Language::Auto,
            Some(s) => s.parse()?,
        };
        let timeframe = timeframe.map(str::parse).transpose()?;

        Ok(Self {
            query: query.to_string(),
            limit,
            language,
            timeframe,
        })
    }

    /// Validate tool-call arguments
    pub fn from_value(value: serde_json::Value) -> Result<Self, SearchError> {
        let raw: RawSearchParams = serde_json::from_value(value)
            .map_err(|e| SearchError::Validation(e.to_string()))?;
        let query = raw
            .query
            .ok_or_else(|| SearchError::Validation("query is required".into()))?;

        Self::new(
            &query,
            raw.limit,
            raw.language.as_deref(),
            raw.timeframe.as_deref(),
        )
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn timeframe(&self) -> Option<Timeframe> {
        self.timeframe
    }
}
