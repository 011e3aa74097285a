//! Test doubles for the router's collaborators.
//!
//! `ScriptedParser` answers from a fixed table, `RecordingHost` records every
//! side effect in order.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lectern_core::models::{Channel, Coordinate};
use lectern_render::links::BookNumberTranslator;

use crate::host::SurfaceHost;
use crate::parser::{CommandParser, ParsedCommand};
use crate::surface::RenderTarget;

/// A recorded parser invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCall {
    pub command: String,
    pub channel: Channel,
    pub context: Coordinate,
}

/// Parser with pre-configured answers. Unknown commands are invalid.
#[derive(Debug, Default)]
pub struct ScriptedParser {
    answers: HashMap<String, ParsedCommand>,
    calls: Arc<Mutex<Vec<ParseCall>>>,
}

impl ScriptedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `parsed`.
    pub fn with(mut self, command: impl Into<String>, parsed: ParsedCommand) -> Self {
        self.answers.insert(command.into(), parsed);
        self
    }

    /// Shared handle to the call log; stays readable after the parser has
    /// been moved into a router.
    pub fn calls(&self) -> Arc<Mutex<Vec<ParseCall>>> {
        Arc::clone(&self.calls)
    }
}

impl CommandParser for ScriptedParser {
    fn parse(&mut self, command: &str, channel: Channel, context: &Coordinate) -> ParsedCommand {
        let call = ParseCall {
            command: command.to_owned(),
            channel,
            context: context.clone(),
        };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
        self.answers
            .get(command)
            .cloned()
            .unwrap_or_else(ParsedCommand::invalid)
    }
}

/// A recorded host side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    LoadHtml { target: RenderTarget, html: String },
    LoadFile { target: RenderTarget, path: PathBuf },
    SetTabLabel { target: RenderTarget, label: String },
    ScrollTo { target: RenderTarget, anchor: String },
    Notify(String),
    SetCommandLine { text: String, focus: bool },
    ResetTitle { channel: Channel, title: String },
    RevealSecondary,
    OpenExternal(PathBuf),
}

/// Host that records calls. Every anchor exists unless marked missing.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    missing_anchors: HashSet<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `scroll_to` report that `anchor` does not exist.
    pub fn with_missing_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.missing_anchors.insert(anchor.into());
        self
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn notifications(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Notify(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of documents loaded into `target`, inline or from file.
    pub fn loads(&self, target: &RenderTarget) -> usize {
        self.calls
            .iter()
            .filter(|call| match call {
                HostCall::LoadHtml { target: t, .. } | HostCall::LoadFile { target: t, .. } => {
                    t == target
                }
                _ => false,
            })
            .count()
    }

    pub fn last_html(&self, target: &RenderTarget) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::LoadHtml { target: t, html } if t == target => Some(html.as_str()),
            _ => None,
        })
    }

    pub fn last_label(&self, target: &RenderTarget) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::SetTabLabel { target: t, label } if t == target => Some(label.as_str()),
            _ => None,
        })
    }

    pub fn command_line(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::SetCommandLine { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl SurfaceHost for RecordingHost {
    fn load_html(&mut self, target: &RenderTarget, html: &str) {
        self.calls.push(HostCall::LoadHtml {
            target: target.clone(),
            html: html.to_owned(),
        });
    }

    fn load_file(&mut self, target: &RenderTarget, path: &Path) {
        self.calls.push(HostCall::LoadFile {
            target: target.clone(),
            path: path.to_path_buf(),
        });
    }

    fn set_tab_label(&mut self, target: &RenderTarget, label: &str) {
        self.calls.push(HostCall::SetTabLabel {
            target: target.clone(),
            label: label.to_owned(),
        });
    }

    fn scroll_to(&mut self, target: &RenderTarget, anchor_id: &str) -> bool {
        self.calls.push(HostCall::ScrollTo {
            target: target.clone(),
            anchor: anchor_id.to_owned(),
        });
        !self.missing_anchors.contains(anchor_id)
    }

    fn notify(&mut self, message: &str) {
        self.calls.push(HostCall::Notify(message.to_owned()));
    }

    fn set_command_line(&mut self, text: &str, focus: bool) {
        self.calls.push(HostCall::SetCommandLine {
            text: text.to_owned(),
            focus,
        });
    }

    fn reset_title(&mut self, channel: Channel, title: &str) {
        self.calls.push(HostCall::ResetTitle {
            channel,
            title: title.to_owned(),
        });
    }

    fn reveal_secondary(&mut self) {
        self.calls.push(HostCall::RevealSecondary);
    }

    fn open_external(&mut self, path: &Path) {
        self.calls.push(HostCall::OpenExternal(path.to_path_buf()));
    }
}

/// `"b.c.v"` reference text.
pub fn numeric_reference(book: u32, chapter: u32, verse: u32) -> String {
    format!("{book}.{chapter}.{verse}")
}

/// Book-number table; unmapped codes pass through.
#[derive(Debug, Clone, Default)]
pub struct MapTranslator {
    table: HashMap<u32, u32>,
}

impl MapTranslator {
    pub fn new<I: IntoIterator<Item = (u32, u32)>>(pairs: I) -> Self {
        Self {
            table: pairs.into_iter().collect(),
        }
    }
}

impl BookNumberTranslator for MapTranslator {
    fn translate_book_number(&self, code: u32) -> u32 {
        self.table.get(&code).copied().unwrap_or(code)
    }
}
