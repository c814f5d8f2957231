//! Image classification pipeline components.
//!
//! - **validate**: Existence and extension checks
//! - **mime**: MIME type resolution
//! - **encode**: File read and base64 data URI construction
//! - **state**: Per-run state machine
//! - **processor**: Orchestrates the full pipeline

pub mod encode;
pub mod mime;
pub mod processor;
pub mod state;
pub mod validate;

pub use encode::ImageEncoder;
pub use mime::resolve_mime_type;
pub use processor::{ImagePipeline, PipelineRun};
pub use state::PipelineState;
pub use validate::Validator;
