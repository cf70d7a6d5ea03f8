//! Image processing module.
//!
//! Decodes an image file, fits it to the panel and streams it as RGB565 rows.

pub mod transform;

pub use transform::{transform_image, Rotation, TransformOptions};

use crate::config::Config;
use crate::display::color::pack_color;
use crate::display::{DisplayController, DisplayError};
use image::RgbImage;
use std::path::Path;
use thiserror::Error;

/// Image processing errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),
}

/// Convert an RGB image into RGB565 rows, one `Vec` per scanline, produced on demand
pub fn rgb565_rows(img: &RgbImage) -> impl Iterator<Item = Vec<u16>> + '_ {
    img.rows().map(|row| {
        row.map(|px| {
            let [r, g, b] = px.0;
            pack_color(r, g, b)
        })
        .collect()
    })
}

/// Decode `path`, transform it per `config` and draw it full-screen
pub async fn show_image<P: AsRef<Path>>(
    display: &DisplayController,
    path: P,
    config: &Config,
) -> Result<(), ImageError> {
    let path = path.as_ref();
    tracing::info!("Loading image {}", path.display());

    let img = image::open(path)?;

    display.init().await?;
    let (width, height) = display
        .dimensions()
        .await
        .ok_or(DisplayError::NotInitialized)?;

    let options = TransformOptions {
        rotation: Rotation::from(config.rotation),
        mirror_h: config.mirror_h,
        mirror_v: config.mirror_v,
        scale_to_fit: config.scale_to_fit,
        background: config.background,
        target_width: width as u32,
        target_height: height as u32,
    };
    let rgb_image = transform_image(img, &options);

    display.show_rows(0, 0, rgb565_rows(&rgb_image)).await?;

    tracing::info!("Image displayed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::{BLUE, RED, WHITE};
    use image::Rgb;

    #[test]
    fn rows_pack_each_pixel() {
        let mut img = RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(2, 1, Rgb([0, 0, 255]));

        let rows: Vec<Vec<u16>> = rgb565_rows(&img).collect();
        assert_eq!(rows, vec![vec![RED, WHITE, WHITE], vec![WHITE, WHITE, BLUE]]);
    }

    #[test]
    fn rows_are_lazy() {
        let img = RgbImage::new(4, 100);
        let mut rows = rgb565_rows(&img);
        assert_eq!(rows.next().map(|r| r.len()), Some(4));
        assert_eq!(rows.count(), 99);
    }
}
