//! Channel and coordinate types shared by every layer of the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LecternError;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A navigation context with its own history.
///
/// `Primary` and `Secondary` are live surfaces with an active coordinate;
/// `External` only logs opened standalone documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Primary,
    Secondary,
    External,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Primary, Channel::Secondary, Channel::External];
    pub const LIVE: [Channel; 2] = [Channel::Primary, Channel::Secondary];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::External => "external",
        }
    }

    /// Parse a channel name. The legacy `main`/`study` names are accepted.
    pub fn parse(raw: &str) -> Result<Self, LecternError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "primary" | "main" => Ok(Self::Primary),
            "secondary" | "study" => Ok(Self::Secondary),
            "external" => Ok(Self::External),
            other => Err(LecternError::UnknownChannel(other.to_owned())),
        }
    }

    /// Whether this channel is backed by a tab group.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Primary | Self::Secondary)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A (book, chapter, verse) location plus the identifier of the text it is
/// read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub source: String,
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
}

impl Coordinate {
    #[must_use]
    pub fn new(source: impl Into<String>, book: u32, chapter: u32, verse: u32) -> Self {
        Self {
            source: source.into(),
            book,
            chapter,
            verse,
        }
    }

    #[must_use]
    pub fn bcv(&self) -> (u32, u32, u32) {
        (self.book, self.chapter, self.verse)
    }

    /// Book, chapter and verse all zero: the top of the document.
    #[must_use]
    pub fn is_anchorless(&self) -> bool {
        self.bcv() == (0, 0, 0)
    }

    /// Element id of the verse anchor in rendered content, e.g. `v43.3.16`.
    #[must_use]
    pub fn anchor_id(&self) -> String {
        anchor_id(self.book, self.chapter, self.verse)
    }
}

/// Element id for a (book, chapter, verse) triple.
#[must_use]
pub fn anchor_id(book: u32, chapter: u32, verse: u32) -> String {
    format!("v{book}.{chapter}.{verse}")
}

/// Element id of the top-of-document landing anchor.
#[must_use]
pub fn top_anchor_id() -> String {
    anchor_id(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_parse_accepts_legacy_names() {
        assert_eq!(Channel::parse("main").ok(), Some(Channel::Primary));
        assert_eq!(Channel::parse(" Study ").ok(), Some(Channel::Secondary));
        assert_eq!(Channel::parse("external").ok(), Some(Channel::External));
        assert_eq!(
            Channel::parse("instant"),
            Err(LecternError::UnknownChannel("instant".to_owned()))
        );
    }

    #[test]
    fn only_primary_and_secondary_are_live() {
        let live: Vec<Channel> = Channel::ALL.into_iter().filter(|c| c.is_live()).collect();
        assert_eq!(live, Channel::LIVE.to_vec());
    }

    #[test]
    fn anchorless_coordinate_lands_on_top_anchor() {
        let coordinate = Coordinate::new("KJV", 0, 0, 0);
        assert!(coordinate.is_anchorless());
        assert_eq!(coordinate.anchor_id(), top_anchor_id());
        assert_eq!(top_anchor_id(), "v0.0.0");
    }

    #[test]
    fn anchor_id_uses_dotted_triple() {
        assert_eq!(Coordinate::new("NET", 43, 3, 16).anchor_id(), "v43.3.16");
    }
}
