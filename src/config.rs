/// Filename suffix that marks an upload as a bare WebP image.
pub const WEBP_SUFFIX: &str = ".webp";

/// Fixed settings the pipeline runs with. Built once at process start and
/// passed by reference into the entry points; nothing reads ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// JPEG quality on the encoder's 0-100 scale.
    pub jpeg_quality: u8,
    /// Name given to the ZIP bundle when more than one image converts.
    pub bundle_filename: String,
    /// Largest upload the caller should hand to the pipeline, in bytes.
    /// Enforced by the caller (HTTP layer or CLI), not by the pipeline.
    pub max_upload_size: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            bundle_filename: "converted_images.zip".to_string(),
            max_upload_size: 500 * 1024 * 1024,
        }
    }
}
