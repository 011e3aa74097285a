//! Command routing, surface multiplexing and navigation events.

pub mod event;
pub mod host;
pub mod mock;
pub mod parser;
pub mod router;
pub mod surface;

pub use event::{EventQueue, NavigationEvent};
pub use host::SurfaceHost;
pub use parser::{CommandParser, ParsedCommand};
pub use router::{CommandRouter, DispatchOutcome};
pub use surface::{LoadState, RenderTarget, SurfaceMultiplexer};
