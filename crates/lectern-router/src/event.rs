//! Typed navigation events emitted by rendering surfaces.
//!
//! Surfaces push events; the router drains them strictly in arrival order.

use std::collections::VecDeque;
use std::path::PathBuf;

use lectern_core::models::Channel;

use crate::surface::RenderTarget;

/// The kind of a navigation event, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationEventKind {
    NavigationRequested,
    TitleChanged,
    LoadFinished,
    PrintFinished,
}

impl std::fmt::Display for NavigationEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NavigationRequested => "navigation_requested",
            Self::TitleChanged => "title_changed",
            Self::LoadFinished => "load_finished",
            Self::PrintFinished => "print_finished",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// A link or control asked for a command to run.
    NavigationRequested {
        command: String,
        channel: Channel,
        record_history: bool,
    },
    /// A surface reported a new document title.
    TitleChanged { target: RenderTarget, title: String },
    LoadFinished { target: RenderTarget },
    PrintFinished { path: PathBuf, success: bool },
}

impl NavigationEvent {
    #[must_use]
    pub fn kind(&self) -> NavigationEventKind {
        match self {
            Self::NavigationRequested { .. } => NavigationEventKind::NavigationRequested,
            Self::TitleChanged { .. } => NavigationEventKind::TitleChanged,
            Self::LoadFinished { .. } => NavigationEventKind::LoadFinished,
            Self::PrintFinished { .. } => NavigationEventKind::PrintFinished,
        }
    }

    pub fn navigate(command: impl Into<String>, channel: Channel) -> Self {
        Self::NavigationRequested {
            command: command.into(),
            channel,
            record_history: true,
        }
    }

    pub fn title(target: RenderTarget, title: impl Into<String>) -> Self {
        Self::TitleChanged {
            target,
            title: title.into(),
        }
    }
}

/// FIFO of pending navigation events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending: VecDeque<NavigationEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NavigationEvent) {
        log::trace!("queued {}", event.kind());
        self.pending.push_back(event);
    }

    pub fn pop(&mut self) -> Option<NavigationEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
