//! Upload classification and batch aggregation.

use crate::archive::{self, ArchiveKind};
use crate::config::{PipelineConfig, WEBP_SUFFIX};
use crate::convert;

/// One uploaded blob, as handed over by the caller.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A successfully converted image. `output_name` is always the source
/// name's stem plus `.jpg`, whatever the source extension's case was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub output_name: String,
    pub data: Vec<u8>,
}

/// Route one upload through the pipeline.
///
/// Archives are extracted and every WebP entry converted; a bare `.webp`
/// is converted directly; anything else contributes nothing. Failures are
/// per image: a broken entry is logged and skipped, the rest of the batch
/// goes through.
pub fn process_upload(item: &UploadItem, config: &PipelineConfig) -> Vec<ConvertedImage> {
    if let Some(kind) = ArchiveKind::from_name(&item.filename) {
        let entries = archive::extract_webp_entries(&item.data, kind);
        let mut converted = Vec::with_capacity(entries.len());

        for entry in entries {
            match convert::webp_to_jpeg(&entry.data, config) {
                Ok(jpeg) => converted.push(ConvertedImage {
                    output_name: output_name(&entry.name),
                    data: jpeg,
                }),
                Err(e) => log::warn!("skipping {}: {e}", entry.name),
            }
        }

        converted
    } else if has_webp_suffix(&item.filename) {
        match convert::webp_to_jpeg(&item.data, config) {
            Ok(jpeg) => vec![ConvertedImage {
                output_name: output_name(&item.filename),
                data: jpeg,
            }],
            Err(e) => {
                log::warn!("skipping {}: {e}", item.filename);
                Vec::new()
            }
        }
    } else {
        log::debug!("ignoring {}: not a WebP or a supported archive", item.filename);
        Vec::new()
    }
}

/// Run a whole upload batch, in order. Items with an empty filename are
/// skipped; everything else flows through [`process_upload`].
pub fn process_uploads<'a, I>(items: I, config: &PipelineConfig) -> Vec<ConvertedImage>
where
    I: IntoIterator<Item = &'a UploadItem>,
{
    let mut converted = Vec::new();

    for item in items {
        if item.filename.is_empty() {
            continue;
        }
        converted.extend(process_upload(item, config));
    }

    log::info!("converted {} images", converted.len());
    converted
}

fn has_webp_suffix(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(WEBP_SUFFIX)
}

/// `stem + ".jpg"`, dropping only the final extension segment. A leading
/// dot is part of the stem, not an extension.
fn output_name(source: &str) -> String {
    let stem = match source.rfind('.') {
        Some(i) if i > 0 => &source[..i],
        _ => source,
    };
    format!("{stem}.jpg")
}
