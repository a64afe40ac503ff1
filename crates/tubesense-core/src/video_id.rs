//! Canonical 11-character video identifiers.
//!
//! Accepts watch URLs, short links, embed URLs, or a bare id and reduces them
//! to the id the remote API expects.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Length of every canonical video id.
pub const VIDEO_ID_LEN: usize = 11;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("invalid video identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Characters allowed in a video id.
const ID_CHARS: &str = "[a-zA-Z0-9_-]";

/// URL prefixes tried in order; the first capture wins.
const URL_PREFIXES: [&str; 5] = [
    r"youtube\.com/watch\?v=",
    r"youtu\.be/",
    r"youtube\.com/embed/",
    r"youtube\.com/watch\?.*v=",
    r"youtube\.com/shorts/",
];

static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    URL_PREFIXES
        .iter()
        .map(|prefix| {
            Regex::new(&format!("{prefix}({ID_CHARS}{{{VIDEO_ID_LEN}}})"))
                .expect("static video id pattern")
        })
        .collect()
});

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{ID_CHARS}{{{VIDEO_ID_LEN}}}$")).expect("static bare id pattern")
});

/// A validated video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Extract a video id from a URL or bare id.
    ///
    /// URL patterns are tried against the trimmed input first. If none match,
    /// the trimmed input is accepted verbatim only when it already has the
    /// 11-character id shape.
    pub fn extract(input: &str) -> Result<Self, IdentifierError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::InvalidIdentifier(input.to_string()));
        }

        for pattern in URL_PATTERNS.iter() {
            if let Some(id) = pattern.captures(trimmed).and_then(|c| c.get(1)) {
                debug!(video_id = id.as_str(), pattern = pattern.as_str(), "extracted video id");
                return Ok(Self(id.as_str().to_string()));
            }
        }

        if BARE_ID.is_match(trimmed) {
            debug!(video_id = trimmed, "input is a bare video id");
            return Ok(Self(trimmed.to_string()));
        }

        Err(IdentifierError::InvalidIdentifier(trimmed.to_string()))
    }

    /// Extract from an untyped value as handed over by a request layer.
    ///
    /// Anything other than a JSON string is rejected.
    pub fn extract_value(value: &serde_json::Value) -> Result<Self, IdentifierError> {
        match value {
            serde_json::Value::String(s) => Self::extract(s),
            other => Err(IdentifierError::InvalidIdentifier(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for VideoId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::extract(s)
    }
}

impl TryFrom<String> for VideoId {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if BARE_ID.is_match(&s) {
            Ok(Self(s))
        } else {
            Err(IdentifierError::InvalidIdentifier(s))
        }
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn url_variants_agree() {
        let inputs = [
            format!("https://www.youtube.com/watch?v={ID}"),
            format!("https://youtube.com/watch?v={ID}&t=42s"),
            format!("https://youtu.be/{ID}"),
            format!("https://youtu.be/{ID}?si=abc"),
            format!("https://www.youtube.com/embed/{ID}"),
            format!("https://www.youtube.com/watch?feature=share&v={ID}"),
            format!("https://m.youtube.com/watch?v={ID}"),
            format!("https://www.youtube.com/shorts/{ID}"),
            ID.to_string(),
        ];
        for input in &inputs {
            let id = VideoId::extract(input).unwrap();
            assert_eq!(id.as_str(), ID, "input {input}");
            assert_eq!(id.as_str().len(), VIDEO_ID_LEN);
        }
    }

    #[test]
    fn long_token_in_url_yields_first_id_chars() {
        let id = VideoId::extract(&format!("https://youtu.be/{ID}X")).unwrap();
        assert_eq!(id.as_str(), ID);
    }

    #[test]
    fn trims_whitespace() {
        let id = VideoId::extract(&format!("  {ID}\n")).unwrap();
        assert_eq!(id.as_str(), ID);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            VideoId::extract(""),
            Err(IdentifierError::InvalidIdentifier(_))
        ));
        assert!(VideoId::extract("   ").is_err());
    }

    #[test]
    fn rejects_wrong_length_tokens() {
        assert!(VideoId::extract("dQw4w9WgXc").is_err());
        assert!(VideoId::extract("dQw4w9WgXcQQ").is_err());
    }

    #[test]
    fn rejects_bad_characters() {
        assert!(VideoId::extract("dQw4w9WgX!Q").is_err());
        assert!(VideoId::extract("https://example.com/watch?x=1").is_err());
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(VideoId::extract_value(&serde_json::json!(42)).is_err());
        assert!(VideoId::extract_value(&serde_json::Value::Null).is_err());
        assert_eq!(
            VideoId::extract_value(&serde_json::json!(ID)).unwrap().as_str(),
            ID
        );
    }

    #[test]
    fn serde_validates_shape() {
        let id: VideoId = serde_json::from_str(&format!("\"{ID}\"")).unwrap();
        assert_eq!(id.as_str(), ID);
        assert!(serde_json::from_str::<VideoId>("\"short\"").is_err());
    }
}
