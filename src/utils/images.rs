use crate::error::{Error, Result};
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;

/// Check that a downloaded payload decodes to an image with sane dimensions.
pub fn validate_image(bytes: &[u8]) -> Result<()> {
    if bytes.len() < 100 {
        return Err(Error::InvalidInput(
            "Image payload too small, likely corrupted".to_string(),
        ));
    }

    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    if width < 10 || height < 10 {
        return Err(Error::InvalidInput(format!(
            "Image dimensions too small ({}x{})",
            width, height
        )));
    }

    Ok(())
}

/// Rotate an encoded image by 180 degrees and re-encode it as JPEG.
///
/// Used for the bottom half of flip cards, which is printed upside down.
pub fn rotate_half_turn(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let rotated = image::DynamicImage::ImageRgb8(img.rotate180().into_rgb8());

    let mut out = Cursor::new(Vec::new());
    rotated.write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(out.into_inner())
}
