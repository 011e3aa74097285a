//! UI side-effect seam.
//!
//! The router never touches a widget directly; every visible effect goes
//! through a `SurfaceHost`.

use std::path::Path;

use lectern_core::models::Channel;

use crate::surface::RenderTarget;

pub trait SurfaceHost {
    /// Inject a complete document into `target`. Overlays are opened and the
    /// instant surface is shown by this call.
    fn load_html(&mut self, target: &RenderTarget, html: &str);

    /// Point `target` at a document written to disk.
    fn load_file(&mut self, target: &RenderTarget, path: &Path);

    /// Set both the tab label and its tooltip.
    fn set_tab_label(&mut self, target: &RenderTarget, label: &str);

    /// Scroll `target` to the element with `anchor_id`. Returns `false` when
    /// no such element exists.
    fn scroll_to(&mut self, target: &RenderTarget, anchor_id: &str) -> bool;

    /// Show a user-visible message.
    fn notify(&mut self, message: &str);

    /// Replace the command line text, optionally focusing it.
    fn set_command_line(&mut self, text: &str, focus: bool);

    /// Reset the title of the surface `channel` is bound to.
    fn reset_title(&mut self, channel: Channel, title: &str);

    /// Un-collapse the secondary surface.
    fn reveal_secondary(&mut self);

    /// Hand a file to the platform opener.
    fn open_external(&mut self, path: &Path);
}
