//! Bounded per-channel command history with a navigation pointer.

use crate::command::is_internal;
use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::error::LecternError;
use crate::models::Channel;

/// One channel's ordered command log.
///
/// Invariants: no two consecutive entries are equal, the log never exceeds
/// its capacity, and the pointer indexes a valid entry whenever the log is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelLog {
    entries: Vec<String>,
    pointer: usize,
}

impl ChannelLog {
    /// Build a log from persisted data, re-establishing every invariant.
    #[must_use]
    pub fn restore(entries: Vec<String>, pointer: Option<usize>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut log = Self::default();
        // Index of the pointed-to entry after collapsing duplicates.
        let mut mapped_pointer = None;
        for (index, entry) in entries.into_iter().enumerate() {
            if log.entries.last() != Some(&entry) {
                log.entries.push(entry);
            }
            if pointer == Some(index) {
                mapped_pointer = Some(log.entries.len() - 1);
            }
        }
        let dropped = log.trim(capacity);
        log.pointer = match mapped_pointer {
            Some(p) => p.saturating_sub(dropped),
            _ => log.entries.len().saturating_sub(1),
        };
        log.clamp_pointer();
        log
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pointer into the log, `None` while the log is empty.
    #[must_use]
    pub fn pointer(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.pointer)
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.pointer).map(String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Append `command` unless it equals the last entry. Either way the
    /// pointer lands on the last entry. Returns whether the log grew.
    pub fn push(&mut self, command: &str, capacity: usize) -> bool {
        if self.last() == Some(command) {
            self.pointer = self.entries.len() - 1;
            return false;
        }
        self.entries.push(command.to_owned());
        self.trim(capacity.max(1));
        self.pointer = self.entries.len() - 1;
        true
    }

    pub fn step_back(&mut self) -> Option<&str> {
        if self.entries.is_empty() || self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        self.current()
    }

    pub fn step_forward(&mut self) -> Option<&str> {
        if self.pointer + 1 >= self.entries.len() {
            return None;
        }
        self.pointer += 1;
        self.current()
    }

    pub fn jump(&mut self, index: usize) -> Option<&str> {
        if index >= self.entries.len() {
            return None;
        }
        self.pointer = index;
        self.current()
    }

    /// Move `entry` to the end of the log, adding it if absent.
    fn move_to_end(&mut self, entry: &str, capacity: usize) {
        if self.last() != Some(entry) {
            self.entries.retain(|existing| existing != entry);
            self.entries.push(entry.to_owned());
            self.trim(capacity.max(1));
        }
        self.pointer = self.entries.len().saturating_sub(1);
    }

    /// Drop from the front until the log fits; returns how many were dropped.
    fn trim(&mut self, capacity: usize) -> usize {
        if self.entries.len() <= capacity {
            return 0;
        }
        let drop_count = self.entries.len() - capacity;
        self.entries.drain(0..drop_count);
        self.pointer = self.pointer.saturating_sub(drop_count);
        drop_count
    }

    fn clamp_pointer(&mut self) {
        let max = self.entries.len().saturating_sub(1);
        if self.pointer > max {
            self.pointer = max;
        }
    }
}

/// Owns the command log of every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryManager {
    capacity: usize,
    primary: ChannelLog,
    secondary: ChannelLog,
    external: ChannelLog,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            primary: ChannelLog::default(),
            secondary: ChannelLog::default(),
            external: ChannelLog::default(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn log(&self, channel: Channel) -> &ChannelLog {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Secondary => &self.secondary,
            Channel::External => &self.external,
        }
    }

    fn log_mut(&mut self, channel: Channel) -> &mut ChannelLog {
        match channel {
            Channel::Primary => &mut self.primary,
            Channel::Secondary => &mut self.secondary,
            Channel::External => &mut self.external,
        }
    }

    /// Record a navigation. Internal commands are never recorded; the
    /// external channel uses move-to-end semantics.
    pub fn push(&mut self, channel: Channel, command: &str) -> bool {
        if command.is_empty() || is_internal(command) {
            return false;
        }
        if channel == Channel::External {
            self.record_external(command);
            return true;
        }
        let capacity = self.capacity;
        let grew = self.log_mut(channel).push(command, capacity);
        if grew {
            log::debug!(
                "{channel} history push {command:?} (len {})",
                self.log(channel).len()
            );
        }
        grew
    }

    pub fn step_back(&mut self, channel: Channel) -> Option<String> {
        self.log_mut(channel).step_back().map(str::to_owned)
    }

    pub fn step_forward(&mut self, channel: Channel) -> Option<String> {
        self.log_mut(channel).step_forward().map(str::to_owned)
    }

    pub fn jump(&mut self, channel: Channel, index: usize) -> Result<String, LecternError> {
        let log = self.log_mut(channel);
        let len = log.len();
        log.jump(index)
            .map(str::to_owned)
            .ok_or(LecternError::HistoryIndexOutOfRange {
                channel,
                index,
                len,
            })
    }

    #[must_use]
    pub fn pointer(&self, channel: Channel) -> Option<usize> {
        self.log(channel).pointer()
    }

    #[must_use]
    pub fn current(&self, channel: Channel) -> Option<&str> {
        self.log(channel).current()
    }

    #[must_use]
    pub fn entries(&self, channel: Channel) -> &[String] {
        self.log(channel).entries()
    }

    /// `(index, command)` pairs, oldest to newest.
    #[must_use]
    pub fn listing(&self, channel: Channel) -> Vec<(usize, String)> {
        self.entries(channel)
            .iter()
            .cloned()
            .enumerate()
            .collect()
    }

    /// Log an opened standalone document; a file already present moves to
    /// the end instead of being duplicated.
    pub fn record_external(&mut self, path: &str) {
        if path.trim().is_empty() {
            return;
        }
        let capacity = self.capacity;
        self.external.move_to_end(path, capacity);
    }

    #[must_use]
    pub fn latest_external(&self) -> Option<&str> {
        self.external.last()
    }

    /// External entry by index; negative indices count from the end.
    #[must_use]
    pub fn external(&self, index: isize) -> Option<&str> {
        let len = self.external.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        if resolved < 0 {
            return None;
        }
        self.external
            .entries()
            .get(resolved as usize)
            .map(String::as_str)
    }

    /// Replace one channel's log with persisted data. The external log is
    /// replayed through `record_external`, so a file listed twice keeps only
    /// its latest position; its pointer always lands on the last entry.
    pub fn restore(&mut self, channel: Channel, entries: Vec<String>, pointer: Option<usize>) {
        if channel == Channel::External {
            self.external = ChannelLog::default();
            for entry in &entries {
                self.record_external(entry);
            }
            return;
        }
        let capacity = self.capacity;
        *self.log_mut(channel) = ChannelLog::restore(entries, pointer, capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, commands: &[&str]) -> HistoryManager {
        let mut history = HistoryManager::new(capacity);
        for command in commands {
            history.push(Channel::Primary, command);
        }
        history
    }

    #[test]
    fn duplicate_push_keeps_length() {
        let mut history = filled(50, &["BIBLE:::KJV:::Genesis 1:1"]);
        assert!(!history.push(Channel::Primary, "BIBLE:::KJV:::Genesis 1:1"));
        assert_eq!(history.entries(Channel::Primary).len(), 1);
        assert_eq!(history.pointer(Channel::Primary), Some(0));
    }

    #[test]
    fn duplicate_push_after_stepping_back_returns_pointer_to_end() {
        let mut history = filled(50, &["a", "b"]);
        assert_eq!(history.step_back(Channel::Primary).as_deref(), Some("a"));
        history.push(Channel::Primary, "b");
        assert_eq!(history.pointer(Channel::Primary), Some(1));
    }

    #[test]
    fn capacity_keeps_most_recent_in_order() {
        let commands: Vec<String> = (0..53).map(|i| format!("cmd-{i}")).collect();
        let refs: Vec<&str> = commands.iter().map(String::as_str).collect();
        let history = filled(50, &refs);
        let entries = history.entries(Channel::Primary);
        assert_eq!(entries.len(), 50);
        assert_eq!(entries.first().map(String::as_str), Some("cmd-3"));
        assert_eq!(entries.last().map(String::as_str), Some("cmd-52"));
        assert_eq!(history.pointer(Channel::Primary), Some(49));
    }

    #[test]
    fn step_back_at_start_is_a_noop() {
        let mut history = filled(50, &["a", "b"]);
        assert_eq!(history.step_back(Channel::Primary).as_deref(), Some("a"));
        assert_eq!(history.step_back(Channel::Primary), None);
        assert_eq!(history.pointer(Channel::Primary), Some(0));
    }

    #[test]
    fn step_forward_at_end_is_a_noop() {
        let mut history = filled(50, &["a", "b"]);
        assert_eq!(history.step_forward(Channel::Primary), None);
        assert_eq!(history.pointer(Channel::Primary), Some(1));
    }

    #[test]
    fn steps_on_empty_log_are_noops() {
        let mut history = HistoryManager::default();
        assert_eq!(history.step_back(Channel::Secondary), None);
        assert_eq!(history.step_forward(Channel::Secondary), None);
        assert_eq!(history.pointer(Channel::Secondary), None);
    }

    #[test]
    fn jump_sets_pointer_and_rejects_out_of_range() {
        let mut history = filled(50, &["a", "b", "c"]);
        assert_eq!(history.jump(Channel::Primary, 1).ok().as_deref(), Some("b"));
        assert_eq!(history.current(Channel::Primary), Some("b"));
        assert_eq!(
            history.jump(Channel::Primary, 3),
            Err(LecternError::HistoryIndexOutOfRange {
                channel: Channel::Primary,
                index: 3,
                len: 3,
            })
        );
        assert_eq!(history.pointer(Channel::Primary), Some(1));
    }

    #[test]
    fn internal_commands_are_never_recorded() {
        let mut history = HistoryManager::default();
        assert!(!history.push(Channel::Primary, "_menu:::"));
        assert!(history.entries(Channel::Primary).is_empty());
    }

    #[test]
    fn push_after_back_appends_at_end() {
        let mut history = filled(50, &["a", "b", "c"]);
        history.step_back(Channel::Primary);
        history.step_back(Channel::Primary);
        history.push(Channel::Primary, "d");
        assert_eq!(history.entries(Channel::Primary), ["a", "b", "c", "d"]);
        assert_eq!(history.pointer(Channel::Primary), Some(3));
    }

    #[test]
    fn external_log_moves_reopened_files_to_end() {
        let mut history = HistoryManager::default();
        history.record_external("a.docx");
        history.record_external("b.pdf");
        history.record_external("a.docx");
        assert_eq!(history.entries(Channel::External), ["b.pdf", "a.docx"]);
        assert_eq!(history.latest_external(), Some("a.docx"));
        assert_eq!(history.external(-2), Some("b.pdf"));
        assert_eq!(history.external(5), None);
        assert_eq!(history.external(-3), None);
    }

    #[test]
    fn listing_is_oldest_first() {
        let history = filled(50, &["a", "b"]);
        assert_eq!(
            history.listing(Channel::Primary),
            vec![(0, "a".to_owned()), (1, "b".to_owned())]
        );
    }

    #[test]
    fn restore_collapses_duplicates_and_trims() {
        let log = ChannelLog::restore(
            vec!["a".into(), "a".into(), "b".into(), "c".into(), "c".into(), "d".into()],
            Some(4),
            3,
        );
        assert_eq!(log.entries(), ["b", "c", "d"]);
        assert_eq!(log.pointer(), Some(1));
    }

    #[test]
    fn restore_clamps_invalid_pointer() {
        let log = ChannelLog::restore(vec!["a".into(), "b".into()], Some(9), 50);
        assert_eq!(log.pointer(), Some(1));
        let trimmed_away = ChannelLog::restore(
            vec!["a".into(), "b".into(), "c".into()],
            Some(0),
            2,
        );
        assert_eq!(trimmed_away.pointer(), Some(0));
        assert_eq!(trimmed_away.current(), Some("b"));
    }

    #[test]
    fn external_restore_matches_live_recording() {
        let paths = ["a.docx", "b.pdf", "a.docx"];
        let mut live = HistoryManager::new(50);
        for path in paths {
            live.record_external(path);
        }

        let mut restored = HistoryManager::new(50);
        restored.restore(
            Channel::External,
            paths.iter().map(|p| (*p).to_owned()).collect(),
            Some(0),
        );
        assert_eq!(restored.entries(Channel::External), ["b.pdf", "a.docx"]);
        assert_eq!(restored.entries(Channel::External), live.entries(Channel::External));
        assert_eq!(restored.latest_external(), Some("a.docx"));
        assert_eq!(restored.pointer(Channel::External), Some(1));
    }
}
