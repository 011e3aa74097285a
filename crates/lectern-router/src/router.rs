//! Command router: the single entry point for navigation.
//!
//! A dispatch parses the command, updates the active reference, renders the
//! payload, resolves the destination surface, skips identical redraws, and
//! records history. Surface signals arrive as [`NavigationEvent`]s and are
//! drained in order by [`CommandRouter::process_pending`].

use std::path::{Path, PathBuf};

use lectern_core::command::{is_internal, TitleFilter, TitleKind, COMMAND_LINE_TARGET, NEUTRAL_TITLE};
use lectern_core::config::Config;
use lectern_core::error::LecternError;
use lectern_core::history::HistoryManager;
use lectern_core::models::{Channel, Coordinate};
use lectern_core::session::SessionState;
use lectern_core::session_store::PersistedSession;
use lectern_render::delivery::Delivery;
use lectern_render::label::{tab_label, ReferenceFormatter};
use lectern_render::links::BookNumberTranslator;
use lectern_render::pipeline::{scroll_anchor, RenderPipeline};

use crate::event::{EventQueue, NavigationEvent};
use crate::host::SurfaceHost;
use crate::parser::{CommandParser, ParsedCommand};
use crate::surface::{RenderTarget, SurfaceMultiplexer};

/// What a dispatch did. Callers are free to ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The parser rejected the command.
    Invalid,
    /// The parser named a destination that does not exist.
    UnknownTarget(String),
    /// Empty target; the originating title was reset.
    NoNavigation,
    /// Payload was placed into the command line.
    CommandLine(String),
    Rendered { target: RenderTarget, via_file: bool },
    /// Same command already on screen.
    Skipped { target: RenderTarget },
    DeliveryFailed { target: RenderTarget, error: LecternError },
}

impl DispatchOutcome {
    #[must_use]
    pub fn redrew(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

pub struct CommandRouter<H: SurfaceHost> {
    session: SessionState,
    history: HistoryManager,
    surfaces: SurfaceMultiplexer,
    pipeline: RenderPipeline,
    titles: TitleFilter,
    parser: Box<dyn CommandParser>,
    formatter: Box<dyn ReferenceFormatter>,
    host: H,
    queue: EventQueue,
    last_keyword: Option<String>,
}

impl<H: SurfaceHost> CommandRouter<H> {
    pub fn new(
        config: &Config,
        parser: Box<dyn CommandParser>,
        formatter: Box<dyn ReferenceFormatter>,
        translator: Box<dyn BookNumberTranslator>,
        host: H,
    ) -> Self {
        Self {
            session: SessionState::from_defaults(&config.defaults),
            history: HistoryManager::new(config.history.capacity),
            surfaces: SurfaceMultiplexer::new(&config.tabs),
            pipeline: RenderPipeline::new(config, translator),
            titles: TitleFilter::new([
                config.render.primary_file.clone(),
                config.render.secondary_file.clone(),
            ]),
            parser,
            formatter,
            host,
            queue: EventQueue::new(),
            last_keyword: None,
        }
    }

    /// Replace the render pipeline (delivery policy, font size).
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: RenderPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn surfaces(&self) -> &SurfaceMultiplexer {
        &self.surfaces
    }

    pub fn active_reference(&self, channel: Channel) -> &Coordinate {
        self.session.active(channel)
    }

    pub fn last_keyword(&self) -> Option<&str> {
        self.last_keyword.as_deref()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Run `command` on behalf of `channel`.
    pub fn dispatch(&mut self, command: &str, channel: Channel, record_history: bool) -> DispatchOutcome {
        let context = self.session.active(channel).clone();
        let parsed = self.parser.parse(command, channel, &context);
        if parsed.is_invalid() {
            self.report(&LecternError::InvalidCommand(command.to_owned()));
            return DispatchOutcome::Invalid;
        }
        self.last_keyword = parsed.keyword.clone();

        let target_name = parsed.target.trim().to_owned();
        if target_name.is_empty() {
            self.host.reset_title(channel, NEUTRAL_TITLE);
            return DispatchOutcome::NoNavigation;
        }
        if target_name == COMMAND_LINE_TARGET {
            self.host.set_command_line(&parsed.payload, true);
            return DispatchOutcome::CommandLine(parsed.payload);
        }

        let target = match self.surfaces.resolve(&target_name) {
            Ok(target) => target,
            Err(err) => {
                self.report(&err);
                return DispatchOutcome::UnknownTarget(target_name);
            }
        };

        let outcome = self.draw(target.clone(), command, parsed);
        let Some(destination) = target.channel() else {
            return outcome;
        };
        let failed = matches!(outcome, DispatchOutcome::DeliveryFailed { .. });
        if record_history && !failed && !is_internal(command) && self.history.push(destination, command)
        {
            log::debug!("{destination} history <- {command:?}");
        }
        outcome
    }

    fn draw(&mut self, target: RenderTarget, command: &str, parsed: ParsedCommand) -> DispatchOutcome {
        let RenderTarget::Tab { channel, .. } = target else {
            // Overlays and the instant surface carry no reference globals and
            // always redraw inline.
            let document = self.pipeline.render(&parsed.payload, None);
            self.host.load_html(&target, document.html());
            return DispatchOutcome::Rendered { target, via_file: false };
        };

        if let Some(reference) = parsed.reference {
            self.session.set_active(channel, reference);
        }
        if !self.surfaces.redraw_decision(channel, command) {
            log::debug!("{target} already shows {command:?}");
            return DispatchOutcome::Skipped { target };
        }

        let active = self.session.active(channel).clone();
        let document = self.pipeline.render(&parsed.payload, Some(&active));
        let delivery = match self.pipeline.deliver(channel, document) {
            Ok(delivery) => delivery,
            Err(error) => {
                log::error!("delivery to {target} failed");
                self.report(&error);
                return DispatchOutcome::DeliveryFailed { target, error };
            }
        };

        self.reveal_if_hidden(channel);
        self.surfaces.begin_load(channel, command);
        let via_file = delivery.is_file();
        match delivery {
            Delivery::Inline(html) => self.host.load_html(&target, &html),
            Delivery::File(path) => self.host.load_file(&target, &path),
        }
        let label = tab_label(&active, self.formatter.as_ref(), self.last_keyword.as_deref());
        self.host.set_tab_label(&target, &label);
        DispatchOutcome::Rendered { target, via_file }
    }

    /// Log `err`, and show it to the user when it is theirs to act on.
    fn report(&mut self, err: &LecternError) {
        log::warn!("{err}");
        if err.is_user_facing() {
            self.host.notify(&err.to_string());
        }
    }

    fn reveal_if_hidden(&mut self, channel: Channel) {
        if channel == Channel::Secondary && !self.surfaces.secondary_visible() {
            self.surfaces.set_secondary_visible(true);
            self.host.reveal_secondary();
        }
    }

    // -----------------------------------------------------------------------
    // History navigation
    // -----------------------------------------------------------------------

    fn replay(&mut self, channel: Channel, command: String) -> DispatchOutcome {
        if channel == Channel::Primary {
            self.host.set_command_line(&command, false);
        }
        self.dispatch(&command, channel, false)
    }

    /// Re-dispatch the previous history entry. `None` when already at the
    /// oldest entry.
    pub fn step_back(&mut self, channel: Channel) -> Option<DispatchOutcome> {
        self.reveal_if_hidden(channel);
        let command = self.history.step_back(channel)?;
        Some(self.replay(channel, command))
    }

    /// Re-dispatch the next history entry. `None` when already at the newest.
    pub fn step_forward(&mut self, channel: Channel) -> Option<DispatchOutcome> {
        self.reveal_if_hidden(channel);
        let command = self.history.step_forward(channel)?;
        Some(self.replay(channel, command))
    }

    /// Re-dispatch the entry at `index`. On the external channel the file is
    /// reopened instead and moved to the end of the log.
    pub fn jump(&mut self, channel: Channel, index: usize) -> Result<DispatchOutcome, LecternError> {
        if channel == Channel::External {
            let path = self.history.jump(channel, index)?;
            self.open_external_file(Path::new(&path));
            return Ok(DispatchOutcome::NoNavigation);
        }
        self.reveal_if_hidden(channel);
        let command = self.history.jump(channel, index)?;
        Ok(self.replay(channel, command))
    }

    /// `(index, command)` pairs, oldest to newest.
    pub fn history_list(&self, channel: Channel) -> Vec<(usize, String)> {
        self.history.listing(channel)
    }

    /// Draw the history picker for `channel`. Live channels show it on their
    /// own active tab, the external log goes to the secondary surface. The
    /// receiving tab forgets its last-rendered command, so whatever is
    /// dispatched next redraws even if a delivery fails in between.
    pub fn show_history(&mut self, channel: Channel) {
        let surface = match channel {
            Channel::Primary => Channel::Primary,
            Channel::Secondary | Channel::External => Channel::Secondary,
        };
        let Some(target) = self.surfaces.active_target(surface) else {
            return;
        };
        let entries = self.history.listing(channel);
        let active = self.session.active(surface).clone();
        let document = self.pipeline.render_history(channel, &entries, Some(&active));
        self.surfaces.invalidate(surface);
        self.reveal_if_hidden(surface);
        self.host.load_html(&target, document.html());
        log::debug!("{channel} history shown on {target} ({} entries)", entries.len());
    }

    /// Redraw both live channels from their current history entry.
    pub fn reload_current(&mut self) {
        for channel in Channel::LIVE {
            self.surfaces.force_reload(channel);
            if let Some(command) = self.history.current(channel).map(str::to_owned) {
                self.dispatch(&command, channel, false);
            }
        }
    }

    // -----------------------------------------------------------------------
    // External files
    // -----------------------------------------------------------------------

    pub fn record_external_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_string_lossy();
        if !path.is_empty() {
            self.history.record_external(&path);
        }
    }

    pub fn latest_external_file(&self) -> Option<PathBuf> {
        self.history.latest_external().map(PathBuf::from)
    }

    /// Entry of the external log; negative indices count from the end.
    pub fn external_file(&self, index: isize) -> Option<PathBuf> {
        self.history.external(index).map(PathBuf::from)
    }

    fn open_external_file(&mut self, path: &Path) {
        self.record_external_file(path);
        self.host.open_external(path);
    }

    // -----------------------------------------------------------------------
    // Tabs & events
    // -----------------------------------------------------------------------

    pub fn select_tab(&mut self, channel: Channel, index: usize) -> Result<(), LecternError> {
        self.surfaces.select_tab(channel, index)
    }

    pub fn set_secondary_visible(&mut self, visible: bool) {
        self.surfaces.set_secondary_visible(visible);
    }

    pub fn enqueue(&mut self, event: NavigationEvent) {
        self.queue.push(event);
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Drain the event queue in order. Returns the number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    fn handle_event(&mut self, event: NavigationEvent) {
        log::trace!("handling {}", event.kind());
        match event {
            NavigationEvent::NavigationRequested {
                command,
                channel,
                record_history,
            } => {
                self.dispatch(&command, channel, record_history);
            }
            NavigationEvent::TitleChanged { target, title } => self.handle_title(&target, &title),
            NavigationEvent::LoadFinished { target } => self.handle_load_finished(&target),
            NavigationEvent::PrintFinished { path, success } => {
                if success {
                    self.open_external_file(&path);
                } else {
                    log::warn!("printing to {} failed", path.display());
                    self.host.notify("Failed to print pdf");
                }
            }
        }
    }

    fn handle_title(&mut self, target: &RenderTarget, title: &str) {
        if !self.surfaces.is_bound(target) {
            log::trace!("ignoring title from unbound {target}");
            return;
        }
        // Overlays and the instant surface navigate on behalf of primary.
        let origin = target.channel().unwrap_or(Channel::Primary);
        match self.titles.classify(title) {
            TitleKind::Sentinel => {}
            TitleKind::Internal => {
                self.dispatch(title, origin, false);
            }
            TitleKind::Navigation => {
                if origin == Channel::Primary {
                    self.host.set_command_line(title, false);
                }
                self.dispatch(title, origin, true);
            }
        }
    }

    fn handle_load_finished(&mut self, target: &RenderTarget) {
        let RenderTarget::Tab { channel, .. } = target else {
            return;
        };
        if !self.surfaces.is_bound(target) {
            log::trace!("ignoring load finished from unbound {target}");
            return;
        }
        self.surfaces.finish_load(*channel);
        let anchor = scroll_anchor(self.session.active(*channel));
        if !self.host.scroll_to(target, &anchor.target) {
            log::debug!("{target} has no element {}; scrolling to top", anchor.target);
            self.host.scroll_to(target, &anchor.fallback);
        }
    }

    // -----------------------------------------------------------------------
    // Persistence hooks
    // -----------------------------------------------------------------------

    pub fn session_snapshot(&self) -> PersistedSession {
        PersistedSession::capture(&self.history, &self.session)
    }

    pub fn restore_session(&mut self, snapshot: PersistedSession) {
        snapshot.apply(&mut self.history, &mut self.session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{numeric_reference, HostCall, RecordingHost, ScriptedParser};

    fn router(parser: ScriptedParser) -> CommandRouter<RecordingHost> {
        CommandRouter::new(
            &Config::default(),
            Box::new(parser),
            Box::new(numeric_reference),
            Box::new(|code: u32| code),
            RecordingHost::default(),
        )
    }

    #[test]
    fn command_target_fills_command_line() {
        let parser = ScriptedParser::new().with("_copy", ParsedCommand::new("command", "BIBLE:::KJV"));
        let mut router = router(parser);
        let outcome = router.dispatch("_copy", Channel::Primary, true);
        assert_eq!(outcome, DispatchOutcome::CommandLine("BIBLE:::KJV".to_owned()));
        assert_eq!(
            router.host().calls(),
            &[HostCall::SetCommandLine { text: "BIBLE:::KJV".to_owned(), focus: true }]
        );
        assert!(router.history_list(Channel::Primary).is_empty());
    }

    #[test]
    fn empty_target_resets_title() {
        let parser = ScriptedParser::new().with("noop", ParsedCommand::new("", "x"));
        let mut router = router(parser);
        assert_eq!(router.dispatch("noop", Channel::Secondary, true), DispatchOutcome::NoNavigation);
        assert_eq!(
            router.host().calls(),
            &[HostCall::ResetTitle { channel: Channel::Secondary, title: NEUTRAL_TITLE.to_owned() }]
        );
    }

    #[test]
    fn unknown_target_is_reported() {
        let parser = ScriptedParser::new().with("x", ParsedCommand::new("sidebar", "x"));
        let mut router = router(parser);
        assert_eq!(
            router.dispatch("x", Channel::Primary, true),
            DispatchOutcome::UnknownTarget("sidebar".to_owned())
        );
        assert_eq!(router.host().notifications().len(), 1);
        assert!(router.history_list(Channel::Primary).is_empty());
    }

    #[test]
    fn overlays_always_redraw_and_are_never_recorded() {
        let parser = ScriptedParser::new().with("pop", ParsedCommand::new("overlay.notes", "<p>n</p>"));
        let mut router = router(parser);
        assert!(router.dispatch("pop", Channel::Primary, true).redrew());
        assert!(router.dispatch("pop", Channel::Primary, true).redrew());
        assert!(router.history_list(Channel::Primary).is_empty());
        let html = router.host().last_html(&RenderTarget::Overlay("notes".to_owned()));
        match html {
            Some(html) => assert!(!html.contains("activeB")),
            None => panic!("overlay was not loaded"),
        }
    }

    #[test]
    fn print_result_opens_or_notifies() {
        let mut router = router(ScriptedParser::new());
        router.enqueue(NavigationEvent::PrintFinished { path: PathBuf::from("/tmp/out.pdf"), success: true });
        router.enqueue(NavigationEvent::PrintFinished { path: PathBuf::from("/tmp/bad.pdf"), success: false });
        assert_eq!(router.process_pending(), 2);
        assert_eq!(
            router.host().calls(),
            &[
                HostCall::OpenExternal(PathBuf::from("/tmp/out.pdf")),
                HostCall::Notify("Failed to print pdf".to_owned()),
            ]
        );
        assert_eq!(router.latest_external_file(), Some(PathBuf::from("/tmp/out.pdf")));
    }
}
