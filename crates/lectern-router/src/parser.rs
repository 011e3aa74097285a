//! Command parser seam.

use lectern_core::command::INVALID_COMMAND_PAYLOAD;
use lectern_core::models::{Channel, Coordinate};

/// What the parser made of a command string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    /// Symbolic destination: `primary`, `secondary`, `instant`,
    /// `overlay.<name>`, `command`, or empty for "no navigation".
    pub target: String,
    pub payload: String,
    /// Coordinate the destination should now be showing, when the command
    /// addresses one.
    pub reference: Option<Coordinate>,
    /// Leading command keyword, used for tab labels.
    pub keyword: Option<String>,
}

impl ParsedCommand {
    pub fn new(target: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            payload: payload.into(),
            reference: None,
            keyword: None,
        }
    }

    /// The rejection result.
    #[must_use]
    pub fn invalid() -> Self {
        Self::new("", INVALID_COMMAND_PAYLOAD)
    }

    #[must_use]
    pub fn with_reference(mut self, reference: Coordinate) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.payload == INVALID_COMMAND_PAYLOAD
    }
}

/// Turns an opaque command string into a target and payload.
///
/// `context` is the active reference of `channel` at the time of the call.
pub trait CommandParser {
    fn parse(&mut self, command: &str, channel: Channel, context: &Coordinate) -> ParsedCommand;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_is_recognised_by_payload() {
        assert!(ParsedCommand::invalid().is_invalid());
        assert!(ParsedCommand::new("primary", INVALID_COMMAND_PAYLOAD).is_invalid());
        assert!(!ParsedCommand::new("primary", "<p>ok</p>").is_invalid());
    }

    #[test]
    fn builders_fill_optional_fields() {
        let parsed = ParsedCommand::new("secondary", "x")
            .with_reference(Coordinate::new("NET", 43, 3, 16))
            .with_keyword("study");
        assert_eq!(parsed.reference.map(|r| r.bcv()), Some((43, 3, 16)));
        assert_eq!(parsed.keyword.as_deref(), Some("study"));
    }
}
