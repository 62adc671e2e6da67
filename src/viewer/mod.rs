//! Tracked PDF viewer
//!
//! Renders one page at a time through PDF.js and reports which pages were
//! seen, and for how long, to the analytics endpoint.

pub mod app;
pub mod controller;
pub mod pdfjs;
pub mod scheduler;
pub mod session;
pub mod telemetry;

pub use app::ViewerApp;
pub use controller::{Navigation, PageControls, RenderOutcome, ViewerController, ViewerPhase};
pub use scheduler::RenderScheduler;
pub use session::{AnalyticsPayload, SessionId, ViewerAttributes, ViewerSession};
pub use telemetry::{AnalyticsTransport, BrowserTransport, Reporter, TrackRequest};
