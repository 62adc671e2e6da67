//! Upload form support
//!
//! Validation and progress are plain Rust; `gate` binds them to the page.

pub mod gate;
pub mod policy;
pub mod progress;

pub use gate::UploadGate;
pub use policy::{format_file_size, FeedbackTone, FileDescriptor, UploadPolicy, Verdict};
pub use progress::SyntheticProgress;
