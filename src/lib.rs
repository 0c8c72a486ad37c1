pub mod archive;
pub mod bundle;
pub mod config;
pub mod convert;
pub mod error;
pub mod process;

// Re-export commonly used types
pub use archive::{ArchiveKind, ExtractedEntry};
pub use bundle::{bundle, OutputPayload};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use process::{process_upload, process_uploads, ConvertedImage, UploadItem};
