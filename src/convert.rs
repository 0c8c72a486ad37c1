//! WebP to JPEG conversion

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Convert one WebP byte buffer to JPEG bytes.
///
/// Pure function of its input: decode, flatten any alpha onto white
/// (JPEG has no transparency), encode at the configured quality.
pub fn webp_to_jpeg(data: &[u8], config: &PipelineConfig) -> Result<Vec<u8>, PipelineError> {
    let img = image::load_from_memory(data).map_err(PipelineError::Decode)?;
    let rgb = flatten_onto_white(&img);

    let mut buf = Vec::with_capacity(rgb.len());
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, config.jpeg_quality);
    encoder.encode_image(&rgb).map_err(PipelineError::Encode)?;

    Ok(buf)
}

/// Normalize a decoded image to opaque RGB.
///
/// RGBA images are blended toward white per pixel using their alpha
/// channel. Gray-with-alpha images are pasted onto the white canvas with
/// the alpha discarded — no blending. The asymmetry reproduces the
/// behavior of the system this was ported from and is intentional.
/// Everything else converts straight to RGB.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgba8(rgba) => blend_onto_white(rgba),
        DynamicImage::ImageRgba16(_) | DynamicImage::ImageRgba32F(_) => {
            blend_onto_white(&img.to_rgba8())
        }
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
            DynamicImage::ImageLuma8(img.to_luma8()).to_rgb8()
        }
        _ => img.to_rgb8(),
    }
}

fn blend_onto_white(rgba: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let a = src[3] as u32;
        for c in 0..3 {
            // Linear blend toward white; exact at a == 0 and a == 255.
            dst[c] = ((src[c] as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        }
    }

    out
}
