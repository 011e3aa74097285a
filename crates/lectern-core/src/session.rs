//! Active reference store: the coordinate currently shown on each live channel.

use crate::config::ReferenceDefaults;
use crate::models::{Channel, Coordinate};

/// Owned session state holding the active reference of the primary and
/// secondary channels.
///
/// The router is the only writer; everything else reads through the
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    primary: Coordinate,
    secondary: Coordinate,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::from_defaults(&ReferenceDefaults::default())
    }
}

impl SessionState {
    #[must_use]
    pub fn from_defaults(defaults: &ReferenceDefaults) -> Self {
        Self {
            primary: defaults.primary.clone(),
            secondary: defaults.secondary.clone(),
        }
    }

    /// Active reference for `channel`. The external channel has none and
    /// reads as the primary reference.
    #[must_use]
    pub fn active(&self, channel: Channel) -> &Coordinate {
        match channel {
            Channel::Secondary => &self.secondary,
            Channel::Primary | Channel::External => &self.primary,
        }
    }

    /// Replace the active reference of a live channel. Returns whether the
    /// stored value changed; writes to the external channel are ignored.
    pub fn set_active(&mut self, channel: Channel, coordinate: Coordinate) -> bool {
        let slot = match channel {
            Channel::Primary => &mut self.primary,
            Channel::Secondary => &mut self.secondary,
            Channel::External => return false,
        };
        if *slot == coordinate {
            return false;
        }
        log::debug!(
            "active {channel} reference -> {} {}.{}.{}",
            coordinate.source,
            coordinate.book,
            coordinate.chapter,
            coordinate.verse
        );
        *slot = coordinate;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_seed_both_channels() {
        let state = SessionState::default();
        assert_eq!(state.active(Channel::Primary), &Coordinate::new("KJV", 1, 1, 1));
        assert_eq!(
            state.active(Channel::Secondary),
            &Coordinate::new("NET", 43, 3, 16)
        );
    }

    #[test]
    fn set_active_reports_change() {
        let mut state = SessionState::default();
        assert!(state.set_active(Channel::Primary, Coordinate::new("KJV", 43, 3, 16)));
        assert!(!state.set_active(Channel::Primary, Coordinate::new("KJV", 43, 3, 16)));
        assert_eq!(state.active(Channel::Primary).book, 43);
    }

    #[test]
    fn external_channel_is_not_writable() {
        let mut state = SessionState::default();
        assert!(!state.set_active(Channel::External, Coordinate::new("X", 9, 9, 9)));
        assert_eq!(state.active(Channel::External), state.active(Channel::Primary));
    }
}
