use thiserror::Error;

/// Failures the pipeline can hit while handling a single image or archive.
///
/// None of these ever abort a batch: each one is caught at the smallest
/// enclosing scope (one image, one archive), logged, and the offending
/// unit is dropped from the result. An unrecognized filename suffix is a
/// classification, not an error, and has no variant here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("image decode failed: {0}")]
    Decode(image::ImageError),

    #[error("JPEG encode failed: {0}")]
    Encode(image::ImageError),

    #[error("could not open archive: {0}")]
    ArchiveOpen(String),

    #[error("could not read archive entry: {0}")]
    ArchiveRead(String),
}
