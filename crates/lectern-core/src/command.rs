//! Router-owned conventions on otherwise opaque command strings.
//!
//! Commands are parsed only by the external parser. The router itself looks
//! at two things: the leading internal marker, and the sentinel titles that
//! rendered documents report when no navigation took place.

/// Leading marker of internal, never-recorded commands.
pub const INTERNAL_PREFIX: char = '_';

/// Title every rendered document carries until a link rewrites it.
pub const NEUTRAL_TITLE: &str = "Lectern";

/// Payload the parser returns for a command it rejects.
pub const INVALID_COMMAND_PAYLOAD: &str = "INVALID_COMMAND_ENTERED";

/// Parser target meaning "put the payload into the command line".
pub const COMMAND_LINE_TARGET: &str = "command";

/// Keywords whose tab label shows the keyword instead of the text source.
pub const COMPARISON_KEYWORDS: [&str; 2] = ["compare", "parallel"];

#[must_use]
pub fn is_internal(command: &str) -> bool {
    command.starts_with(INTERNAL_PREFIX)
}

/// How a surface title should be treated when it arrives as a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    /// No navigation occurred; ignore.
    Sentinel,
    /// Internal command: dispatch without recording.
    Internal,
    /// User-meaningful command: dispatch and record.
    Navigation,
}

/// Classifies surface titles using the sentinel-string convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFilter {
    exact: Vec<String>,
}

impl Default for TitleFilter {
    fn default() -> Self {
        Self::new(["main.html", "study.html"])
    }
}

impl TitleFilter {
    /// Build a filter that additionally treats the given temp file names as
    /// sentinels (a surface loaded from file reports its file name as title).
    pub fn new<I, S>(file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut exact = vec![NEUTRAL_TITLE.to_owned(), "about:blank".to_owned()];
        for name in file_names {
            let name = name.into();
            if !name.is_empty() && !exact.contains(&name) {
                exact.push(name);
            }
        }
        Self { exact }
    }

    #[must_use]
    pub fn classify(&self, title: &str) -> TitleKind {
        if title.trim().is_empty()
            || title.starts_with("data:text/html;")
            || title.starts_with("file:///")
            || title.ends_with(".txt")
            || self.exact.iter().any(|sentinel| sentinel == title)
        {
            return TitleKind::Sentinel;
        }
        if is_internal(title) {
            return TitleKind::Internal;
        }
        TitleKind::Navigation
    }
}
