//! Image transformation operations.
//!
//! Rotation, mirroring and scaling down to the panel geometry.

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

/// Rotation angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl From<u16> for Rotation {
    fn from(degrees: u16) -> Self {
        match degrees {
            90 => Rotation::Rotate90,
            180 => Rotation::Rotate180,
            270 => Rotation::Rotate270,
            _ => Rotation::None,
        }
    }
}

/// Image transformation options
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub rotation: Rotation,
    pub mirror_h: bool,
    pub mirror_v: bool,
    /// Letterbox into the panel (true) or crop to fill it (false)
    pub scale_to_fit: bool,
    /// Letterbox fill
    pub background: [u8; 3],
    pub target_width: u32,
    pub target_height: u32,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            rotation: Rotation::None,
            mirror_h: false,
            mirror_v: false,
            scale_to_fit: true,
            background: [0, 0, 0],
            target_width: 160,
            target_height: 128,
        }
    }
}

/// Transform an image for display: rotation, then mirroring, then scaling
pub fn transform_image(img: DynamicImage, options: &TransformOptions) -> RgbImage {
    let img = apply_rotation(img, options.rotation);
    let img = apply_mirroring(img, options.mirror_h, options.mirror_v);

    let (target_width, target_height) = (options.target_width, options.target_height);

    if options.scale_to_fit {
        scale_to_fit(img, target_width, target_height, options.background)
    } else {
        scale_to_fill(img, target_width, target_height)
    }
}

fn apply_rotation(img: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => img,
        Rotation::Rotate90 => img.rotate90(),
        Rotation::Rotate180 => img.rotate180(),
        Rotation::Rotate270 => img.rotate270(),
    }
}

fn apply_mirroring(mut img: DynamicImage, mirror_h: bool, mirror_v: bool) -> DynamicImage {
    if mirror_h {
        img = img.fliph();
    }
    if mirror_v {
        img = img.flipv();
    }
    img
}

/// Scale image to fit within dimensions (letterbox/pillarbox)
fn scale_to_fit(
    img: DynamicImage,
    max_width: u32,
    max_height: u32,
    background: [u8; 3],
) -> RgbImage {
    let (src_width, src_height) = img.dimensions();

    let scale_w = max_width as f32 / src_width as f32;
    let scale_h = max_height as f32 / src_height as f32;
    let scale = scale_w.min(scale_h);

    let new_width = ((src_width as f32 * scale) as u32).clamp(1, max_width);
    let new_height = ((src_height as f32 * scale) as u32).clamp(1, max_height);

    tracing::debug!(
        "Scaling {}x{} -> {}x{} (fit into {}x{})",
        src_width,
        src_height,
        new_width,
        new_height,
        max_width,
        max_height
    );

    let resized = img
        .resize_exact(new_width, new_height, image::imageops::FilterType::Triangle)
        .into_rgb8();

    let mut canvas = RgbImage::from_pixel(max_width, max_height, Rgb(background));

    let offset_x = (max_width - new_width) / 2;
    let offset_y = (max_height - new_height) / 2;

    image::imageops::overlay(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    canvas
}

/// Scale image to fill dimensions (crop overflow)
fn scale_to_fill(img: DynamicImage, target_width: u32, target_height: u32) -> RgbImage {
    let (src_width, src_height) = img.dimensions();

    let scale_w = target_width as f32 / src_width as f32;
    let scale_h = target_height as f32 / src_height as f32;
    let scale = scale_w.max(scale_h);

    let new_width = ((src_width as f32 * scale).ceil() as u32).max(target_width);
    let new_height = ((src_height as f32 * scale).ceil() as u32).max(target_height);

    tracing::debug!(
        "Scaling {}x{} -> {}x{} (fill {}x{})",
        src_width,
        src_height,
        new_width,
        new_height,
        target_width,
        target_height
    );

    let resized = img.resize_exact(new_width, new_height, image::imageops::FilterType::Triangle);

    let crop_x = (new_width - target_width) / 2;
    let crop_y = (new_height - target_height) / 2;

    resized
        .crop_imm(crop_x, crop_y, target_width, target_height)
        .into_rgb8()
}
