//! lectern-render: turns parser payloads into complete documents.
//!
//! The pipeline wraps a payload in the fixed document shell, rewrites
//! embedded click handlers into live jump/preview pairs, and plans how the
//! result reaches a surface (direct HTML or a temp file for oversized
//! documents). Tab labels, history pages, and scroll anchors are derived here
//! as well so the router only decides *whether* and *where* to draw.

pub mod delivery;
pub mod document;
pub mod history_page;
pub mod label;
pub mod links;
pub mod pipeline;

pub use delivery::{Delivery, DeliveryPolicy};
pub use label::ReferenceFormatter;
pub use links::BookNumberTranslator;
pub use pipeline::{Document, RenderPipeline};
