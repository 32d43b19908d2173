use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    #[default]
    Basic,
    Intermediate,
    Detailed,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [
        DetailLevel::Basic,
        DetailLevel::Intermediate,
        DetailLevel::Detailed,
    ];

    pub fn next(self) -> Self {
        match self {
            DetailLevel::Basic => DetailLevel::Intermediate,
            DetailLevel::Intermediate => DetailLevel::Detailed,
            DetailLevel::Detailed => DetailLevel::Basic,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DetailLevel::Basic => DetailLevel::Detailed,
            DetailLevel::Intermediate => DetailLevel::Basic,
            DetailLevel::Detailed => DetailLevel::Intermediate,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DetailLevel::Basic => "basic",
            DetailLevel::Intermediate => "intermediate",
            DetailLevel::Detailed => "detailed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailLevel::Basic => "Basic",
            DetailLevel::Intermediate => "Intermediate",
            DetailLevel::Detailed => "Detailed",
        }
    }
}

impl std::str::FromStr for DetailLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        DetailLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidInput(format!("unknown detail level '{s}'")))
    }
}

/// Form input collected on submit. Consumed by a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    pub duration: i64,
    pub detail_level: DetailLevel,
}

/// Body of the content-generation call.
#[derive(Debug, Serialize)]
pub struct ContentRequestBody<'a> {
    pub topic: &'a str,
    pub duration: i64,
    #[serde(rename = "detailLevel")]
    pub detail_level: DetailLevel,
}

/// Body of the single-call generation endpoint.
#[derive(Debug, Serialize)]
pub struct SingleRequestBody<'a> {
    pub topic: &'a str,
    pub duration: i64,
    pub level: DetailLevel,
}

impl GenerationRequest {
    pub fn content_body(&self) -> ContentRequestBody<'_> {
        ContentRequestBody {
            topic: &self.topic,
            duration: self.duration,
            detail_level: self.detail_level,
        }
    }

    pub fn single_body(&self) -> SingleRequestBody<'_> {
        SingleRequestBody {
            topic: &self.topic,
            duration: self.duration,
            level: self.detail_level,
        }
    }
}

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid duration pattern"));

/// Parse a duration the way a lenient integer input does: leading
/// whitespace and sign, then digits, anything after is ignored.
pub fn parse_duration(input: &str) -> Result<i64> {
    let digits = LEADING_INTEGER
        .captures(input)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| AppError::InvalidInput("duration must be a whole number of minutes".to_string()))?;

    digits
        .as_str()
        .parse::<i64>()
        .map_err(|e| AppError::InvalidInput(format!("duration out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "Photosynthesis".to_string(),
            duration: 5,
            detail_level: DetailLevel::Basic,
        }
    }

    #[test]
    fn content_body_uses_camel_case_detail_level() {
        let body = serde_json::to_value(request().content_body()).unwrap();
        assert_eq!(
            body,
            json!({ "topic": "Photosynthesis", "duration": 5, "detailLevel": "basic" })
        );
    }

    #[test]
    fn single_body_uses_level_key() {
        let mut req = request();
        req.detail_level = DetailLevel::Detailed;
        let body = serde_json::to_value(req.single_body()).unwrap();
        assert_eq!(
            body,
            json!({ "topic": "Photosynthesis", "duration": 5, "level": "detailed" })
        );
    }

    #[test]
    fn duration_parses_leading_integer() {
        assert_eq!(parse_duration("5").unwrap(), 5);
        assert_eq!(parse_duration("  12 minutes").unwrap(), 12);
        assert_eq!(parse_duration("-3").unwrap(), -3);
        assert_eq!(parse_duration("7.9").unwrap(), 7);
    }

    #[test]
    fn duration_without_digits_is_rejected() {
        assert!(matches!(parse_duration(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_duration("five"), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn detail_level_cycles_both_ways() {
        for level in DetailLevel::ALL {
            assert_eq!(level.next().prev(), level);
        }
        assert_eq!(DetailLevel::Detailed.next(), DetailLevel::Basic);
        assert_eq!("Detailed".parse::<DetailLevel>().unwrap(), DetailLevel::Detailed);
        assert!("expert".parse::<DetailLevel>().is_err());
    }
}
