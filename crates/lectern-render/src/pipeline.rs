//! Payload → document → delivery.

use lectern_core::config::Config;
use lectern_core::error::LecternError;
use lectern_core::models::{top_anchor_id, Channel, Coordinate};

use crate::delivery::{Delivery, DeliveryPolicy};
use crate::document::{wrap_document, wrap_plain_text};
use crate::history_page::history_page;
use crate::links::{rewrite_links, BookNumberTranslator};

/// A complete, link-rewritten document ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    html: String,
}

impl Document {
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Serialized size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.html.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    #[must_use]
    pub fn into_html(self) -> String {
        self.html
    }
}

/// Where to scroll once a document has loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollAnchor {
    /// Element tagged with the active verse.
    pub target: String,
    /// Top-of-document anchor used when `target` is missing.
    pub fallback: String,
}

#[must_use]
pub fn scroll_anchor(active: &Coordinate) -> ScrollAnchor {
    ScrollAnchor {
        target: active.anchor_id(),
        fallback: top_anchor_id(),
    }
}

pub struct RenderPipeline {
    font_size: u32,
    delivery: DeliveryPolicy,
    translator: Box<dyn BookNumberTranslator>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("font_size", &self.font_size)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    #[must_use]
    pub fn new(config: &Config, translator: Box<dyn BookNumberTranslator>) -> Self {
        Self {
            font_size: config.render.font_size,
            delivery: DeliveryPolicy::from_config(config),
            translator,
        }
    }

    #[must_use]
    pub fn with_delivery(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }

    #[must_use]
    pub fn delivery_policy(&self) -> &DeliveryPolicy {
        &self.delivery
    }

    /// Wrap `payload` in the document shell and rewrite its links. `active`
    /// is the destination channel's reference, absent for overlays and the
    /// instant surface.
    #[must_use]
    pub fn render(&self, payload: &str, active: Option<&Coordinate>) -> Document {
        let html = wrap_document(payload, active, self.font_size);
        Document {
            html: rewrite_links(&html, self.translator.as_ref()),
        }
    }

    /// The history picker for `channel` as a complete document.
    #[must_use]
    pub fn render_history(
        &self,
        channel: Channel,
        entries: &[(usize, String)],
        active: Option<&Coordinate>,
    ) -> Document {
        let body = wrap_plain_text(&history_page(channel, entries), true);
        self.render(&body, active)
    }

    /// Plan delivery of `document` to a `channel` surface.
    pub fn deliver(&self, channel: Channel, document: Document) -> Result<Delivery, LecternError> {
        self.delivery.prepare(channel, document.into_html())
    }
}
