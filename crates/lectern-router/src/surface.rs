//! Surface multiplexer: symbolic target names → concrete render targets.
//!
//! Primary and secondary each own a tab group; only the selected tab of a
//! group is bound to the router (its title/loaded/print signals are honored,
//! and dispatches land on it). Overlays are created on demand and the
//! instant surface always exists.

use std::fmt;

use lectern_core::config::TabsConfig;
use lectern_core::error::LecternError;
use lectern_core::models::Channel;

// ---------------------------------------------------------------------------
// RenderTarget
// ---------------------------------------------------------------------------

/// A concrete addressable rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Tab { channel: Channel, index: usize },
    Overlay(String),
    Instant,
}

impl RenderTarget {
    /// Channel of a tab target; overlays and the instant surface have none.
    #[must_use]
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Self::Tab { channel, .. } => Some(*channel),
            Self::Overlay(_) | Self::Instant => None,
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tab { channel, index } => write!(f, "{channel}[{index}]"),
            Self::Overlay(name) => write!(f, "overlay.{name}"),
            Self::Instant => f.write_str("instant"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tab state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
}

/// Redraw bookkeeping for one tab.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabState {
    last_rendered: Option<(usize, String)>,
    forced_reload: bool,
    load_state: LoadState,
}

impl TabState {
    #[must_use]
    pub fn last_rendered(&self) -> Option<(usize, &str)> {
        self.last_rendered
            .as_ref()
            .map(|(index, command)| (*index, command.as_str()))
    }

    #[must_use]
    pub fn forced_reload(&self) -> bool {
        self.forced_reload
    }

    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TabGroup {
    tabs: Vec<TabState>,
    selected: usize,
}

impl TabGroup {
    fn new(count: usize) -> Self {
        Self {
            tabs: vec![TabState::default(); count.max(1)],
            selected: 0,
        }
    }

    fn selected_mut(&mut self) -> &mut TabState {
        // `selected` is only ever set to a valid index.
        let index = self.selected.min(self.tabs.len() - 1);
        &mut self.tabs[index]
    }
}

// ---------------------------------------------------------------------------
// Multiplexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMultiplexer {
    primary: TabGroup,
    secondary: TabGroup,
    secondary_visible: bool,
}

impl Default for SurfaceMultiplexer {
    fn default() -> Self {
        Self::new(&TabsConfig::default())
    }
}

impl SurfaceMultiplexer {
    #[must_use]
    pub fn new(tabs: &TabsConfig) -> Self {
        Self {
            primary: TabGroup::new(tabs.count(Channel::Primary)),
            secondary: TabGroup::new(tabs.count(Channel::Secondary)),
            secondary_visible: true,
        }
    }

    fn group(&self, channel: Channel) -> Result<&TabGroup, LecternError> {
        match channel {
            Channel::Primary => Ok(&self.primary),
            Channel::Secondary => Ok(&self.secondary),
            Channel::External => Err(LecternError::NotALiveChannel(channel)),
        }
    }

    fn group_mut(&mut self, channel: Channel) -> Result<&mut TabGroup, LecternError> {
        match channel {
            Channel::Primary => Ok(&mut self.primary),
            Channel::Secondary => Ok(&mut self.secondary),
            Channel::External => Err(LecternError::NotALiveChannel(channel)),
        }
    }

    /// Resolve a parser target name.
    ///
    /// Accepts `primary`/`main`, `secondary`/`study`, `instant`, and
    /// `overlay.<name>` (or the older `popover.<name>`).
    pub fn resolve(&self, target: &str) -> Result<RenderTarget, LecternError> {
        let target = target.trim();
        if let Some(name) = target
            .strip_prefix("overlay.")
            .or_else(|| target.strip_prefix("popover."))
        {
            if name.is_empty() {
                return Err(LecternError::UnknownTarget(target.to_owned()));
            }
            return Ok(RenderTarget::Overlay(name.to_owned()));
        }
        if target == "instant" {
            return Ok(RenderTarget::Instant);
        }
        match Channel::parse(target) {
            Ok(channel) if channel.is_live() => Ok(RenderTarget::Tab {
                channel,
                index: self.group(channel)?.selected,
            }),
            _ => Err(LecternError::UnknownTarget(target.to_owned())),
        }
    }

    /// Select the tab that receives dispatches and whose signals are bound.
    pub fn select_tab(&mut self, channel: Channel, index: usize) -> Result<(), LecternError> {
        let group = self.group_mut(channel)?;
        if index >= group.tabs.len() {
            return Err(LecternError::TabOutOfRange {
                channel,
                index,
                tabs: group.tabs.len(),
            });
        }
        if group.selected != index {
            log::debug!("{channel} tab {} -> {index}", group.selected);
            group.selected = index;
        }
        Ok(())
    }

    #[must_use]
    pub fn selected_tab(&self, channel: Channel) -> Option<usize> {
        self.group(channel).ok().map(|group| group.selected)
    }

    /// The currently bound tab of `channel` as a render target.
    #[must_use]
    pub fn active_target(&self, channel: Channel) -> Option<RenderTarget> {
        self.selected_tab(channel)
            .map(|index| RenderTarget::Tab { channel, index })
    }

    /// Whether signals from `target` should reach the router.
    #[must_use]
    pub fn is_bound(&self, target: &RenderTarget) -> bool {
        match target {
            RenderTarget::Tab { channel, index } => self.selected_tab(*channel) == Some(*index),
            RenderTarget::Overlay(_) | RenderTarget::Instant => true,
        }
    }

    #[must_use]
    pub fn tab(&self, channel: Channel, index: usize) -> Option<&TabState> {
        self.group(channel).ok()?.tabs.get(index)
    }

    #[must_use]
    pub fn tab_count(&self, channel: Channel) -> usize {
        self.group(channel).map_or(0, |group| group.tabs.len())
    }

    /// Idempotence check for the bound tab of `channel`.
    ///
    /// Returns `false` (skip) only when `(tab, command)` equals the last
    /// rendered marker and no forced reload is pending. The forced-reload
    /// flag is cleared either way.
    pub fn redraw_decision(&mut self, channel: Channel, command: &str) -> bool {
        let Ok(group) = self.group_mut(channel) else {
            return true;
        };
        let index = group.selected;
        let tab = group.selected_mut();
        let unchanged = tab
            .last_rendered
            .as_ref()
            .is_some_and(|(last_index, last_command)| {
                *last_index == index && last_command == command
            });
        let redraw = tab.forced_reload || !unchanged;
        tab.forced_reload = false;
        redraw
    }

    /// Record that `command` is being drawn on the bound tab of `channel`.
    pub fn begin_load(&mut self, channel: Channel, command: &str) {
        let Ok(group) = self.group_mut(channel) else {
            return;
        };
        let index = group.selected;
        let tab = group.selected_mut();
        tab.last_rendered = Some((index, command.to_owned()));
        tab.load_state = LoadState::Loading;
    }

    /// Mark the bound tab of `channel` as loaded. Returns `false` when it
    /// was not loading.
    pub fn finish_load(&mut self, channel: Channel) -> bool {
        let Ok(group) = self.group_mut(channel) else {
            return false;
        };
        let tab = group.selected_mut();
        let was_loading = tab.load_state == LoadState::Loading;
        tab.load_state = LoadState::Loaded;
        was_loading
    }

    /// Force the next dispatch to the bound tab of `channel` to redraw.
    pub fn force_reload(&mut self, channel: Channel) {
        if let Ok(group) = self.group_mut(channel) {
            group.selected_mut().forced_reload = true;
        }
    }

    /// The bound tab of `channel` now shows something no command produced:
    /// drop its marker and force the next dispatch to redraw.
    pub fn invalidate(&mut self, channel: Channel) {
        if let Ok(group) = self.group_mut(channel) {
            let tab = group.selected_mut();
            tab.last_rendered = None;
            tab.forced_reload = true;
        }
    }

    #[must_use]
    pub fn secondary_visible(&self) -> bool {
        self.secondary_visible
    }

    pub fn set_secondary_visible(&mut self, visible: bool) {
        self.secondary_visible = visible;
    }
}
