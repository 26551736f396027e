use std::io::Cursor;

use image::{DynamicImage, ImageError, codecs::jpeg::JpegEncoder, imageops::FilterType};

pub const THUMBNAIL_SIZE: u32 = 400;
pub const JPEG_QUALITY: u8 = 90;

/// Normalize an uploaded product image: decode, convert to RGB, resize to a
/// fixed 400x400 and re-encode as JPEG quality 90. Every image persisted on a
/// product row has gone through this.
pub fn normalize(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let resized = rgb.resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    resized.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([12, 180, 40, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn output_is_exactly_400x400_jpeg() {
        let input = png_fixture(64, 32);
        let out = normalize(&input).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), THUMBNAIL_SIZE);
        assert_eq!(decoded.height(), THUMBNAIL_SIZE);
    }

    #[test]
    fn already_square_input_is_still_reencoded() {
        let input = png_fixture(400, 400);
        let out = normalize(&input).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(normalize(b"definitely not an image").is_err());
    }
}
