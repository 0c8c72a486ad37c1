//! Response shaping: single JPEG or an in-memory ZIP bundle.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::PipelineConfig;
use crate::process::ConvertedImage;

pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";
pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// What the caller sends back, decided purely on how many images
/// converted — never on the shape of the original upload.
#[derive(Debug)]
pub enum OutputPayload {
    /// Nothing converted. The caller surfaces this as a user-facing
    /// "no valid file" failure, not a crash.
    Empty,
    /// Exactly one image; its JPEG bytes verbatim.
    Single {
        filename: String,
        data: Vec<u8>,
        media_type: &'static str,
    },
    /// Two or more images, zipped flat under their output names.
    Archive {
        filename: String,
        data: Vec<u8>,
        media_type: &'static str,
    },
}

pub fn bundle(mut images: Vec<ConvertedImage>, config: &PipelineConfig) -> OutputPayload {
    match images.len() {
        0 => OutputPayload::Empty,
        1 => {
            let image = images.swap_remove(0);
            OutputPayload::Single {
                filename: image.output_name,
                data: image.data,
                media_type: JPEG_MEDIA_TYPE,
            }
        }
        n => {
            log::debug!("bundling {n} images into {}", config.bundle_filename);
            OutputPayload::Archive {
                filename: config.bundle_filename.clone(),
                data: write_bundle(&images),
                media_type: ZIP_MEDIA_TYPE,
            }
        }
    }
}

/// Serialize the images into a ZIP held in memory, one flat entry per
/// output name, in insertion order.
fn write_bundle(images: &[ConvertedImage]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for image in images {
        zip.start_file(image.output_name.as_str(), options)
            .expect("writing to vec should never fail");
        zip.write_all(&image.data)
            .expect("writing to vec should never fail");
    }

    zip.finish()
        .expect("writing to vec should never fail")
        .into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    fn image(name: &str, data: &[u8]) -> ConvertedImage {
        ConvertedImage {
            output_name: name.to_string(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn zero_images_is_empty() {
        let payload = bundle(Vec::new(), &PipelineConfig::default());
        assert!(matches!(payload, OutputPayload::Empty));
    }

    #[test]
    fn one_image_passes_through_verbatim() {
        let payload = bundle(vec![image("only.jpg", b"jpeg bytes")], &PipelineConfig::default());

        match payload {
            OutputPayload::Single {
                filename,
                data,
                media_type,
            } => {
                assert_eq!(filename, "only.jpg");
                assert_eq!(data, b"jpeg bytes");
                assert_eq!(media_type, JPEG_MEDIA_TYPE);
            }
            other => panic!("expected Single, got {other:?}"),
        }
    }

    #[test]
    fn two_images_become_a_zip_bundle() {
        let config = PipelineConfig::default();
        let payload = bundle(
            vec![image("a.jpg", b"first"), image("b.jpg", b"second")],
            &config,
        );

        let (filename, data, media_type) = match payload {
            OutputPayload::Archive {
                filename,
                data,
                media_type,
            } => (filename, data, media_type),
            other => panic!("expected Archive, got {other:?}"),
        };

        assert_eq!(filename, "converted_images.zip");
        assert_eq!(media_type, ZIP_MEDIA_TYPE);

        let mut zip = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(zip.len(), 2);

        let mut names = Vec::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            names.push((entry.name().to_string(), content));
        }

        assert_eq!(names[0], ("a.jpg".to_string(), b"first".to_vec()));
        assert_eq!(names[1], ("b.jpg".to_string(), b"second".to_vec()));
    }
}
