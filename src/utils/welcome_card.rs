// Welcome card compositing
// Fixed pipeline: circular avatar pasted on a bordered disc over the guild's
// background, with the rendered welcome text underneath.

use ab_glyph::{Font, PxScale};
use image::{imageops, DynamicImage, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut, text_size, Blend};
use thiserror::Error;

/// Avatars are normalized to this square size before masking
pub const AVATAR_SIZE: u32 = 250;
/// Width of the solid disc ring behind the avatar
pub const BORDER_WIDTH: i32 = 15;

const BORDER_COLOR: Rgba<u8> = Rgba([255, 255, 255, 200]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_SCALE: f32 = 30.0;
const TEXT_GAP: i32 = 10;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("could not decode avatar image: {0}")]
    Avatar(image::ImageError),
    #[error("could not encode welcome card: {0}")]
    Encode(image::ImageError),
}

/// Decode an avatar, resize it to 250x250 and mask it to a circle with
/// transparent corners.
pub fn circular_avatar(avatar_bytes: &[u8]) -> Result<RgbaImage, CardError> {
    let avatar = image::load_from_memory(avatar_bytes).map_err(CardError::Avatar)?;
    let mut avatar = avatar
        .resize_exact(AVATAR_SIZE, AVATAR_SIZE, imageops::FilterType::Triangle)
        .to_rgba8();

    let radius = AVATAR_SIZE as f32 / 2.0;
    for (x, y, pixel) in avatar.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if dx * dx + dy * dy > radius * radius {
            pixel[3] = 0;
        }
    }
    Ok(avatar)
}

/// Background at origin, white disc centered at (w/2, h/3), avatar on top
fn compose_canvas(avatar: &RgbaImage, background: &DynamicImage) -> RgbaImage {
    let canvas = background.to_rgba8();
    let (center_x, center_y) = disc_center(canvas.width(), canvas.height());

    let mut canvas = Blend(canvas);
    draw_filled_circle_mut(
        &mut canvas,
        (center_x, center_y),
        AVATAR_SIZE as i32 / 2 + BORDER_WIDTH,
        BORDER_COLOR,
    );
    let mut canvas = canvas.0;

    imageops::overlay(
        &mut canvas,
        avatar,
        (center_x - AVATAR_SIZE as i32 / 2) as i64,
        (center_y - AVATAR_SIZE as i32 / 2) as i64,
    );
    canvas
}

fn disc_center(width: u32, height: u32) -> (i32, i32) {
    (width as i32 / 2, height as i32 / 3)
}

/// Produce the finished welcome card as PNG bytes.
///
/// `text` is the already-rendered welcome message; it is drawn centered,
/// 10px below the avatar. The pipeline is fully deterministic for identical
/// inputs.
pub fn compose(
    avatar_bytes: &[u8],
    background: &DynamicImage,
    font: &impl Font,
    text: &str,
) -> Result<Vec<u8>, CardError> {
    let avatar = circular_avatar(avatar_bytes)?;
    let mut canvas = compose_canvas(&avatar, background);

    let (width, height) = canvas.dimensions();
    let (_, center_y) = disc_center(width, height);
    let scale = PxScale::from(TEXT_SCALE);
    let (text_width, _) = text_size(scale, font, text);
    let text_x = (width as i32 - text_width as i32) / 2;
    let text_y = center_y + AVATAR_SIZE as i32 / 2 + TEXT_GAP;
    draw_text_mut(&mut canvas, TEXT_COLOR, text_x, text_y, scale, font, text);

    encode_png(&canvas)
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, CardError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(CardError::Encode)?;
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_of(color: Rgba<u8>, width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, color);
        encode_png(&img).unwrap()
    }

    #[test]
    fn avatar_is_resized_and_masked() {
        let avatar = png_of(Rgba([200, 30, 30, 255]), 64, 64);
        let circle = circular_avatar(&avatar).unwrap();

        assert_eq!(circle.dimensions(), (AVATAR_SIZE, AVATAR_SIZE));
        // corners fall outside the circle, center inside
        assert_eq!(circle.get_pixel(0, 0)[3], 0);
        assert_eq!(circle.get_pixel(AVATAR_SIZE - 1, AVATAR_SIZE - 1)[3], 0);
        assert_eq!(circle.get_pixel(AVATAR_SIZE / 2, AVATAR_SIZE / 2)[3], 255);
    }

    #[test]
    fn invalid_avatar_bytes_are_rejected() {
        assert!(matches!(
            circular_avatar(b"not an image"),
            Err(CardError::Avatar(_))
        ));
    }

    #[test]
    fn canvas_matches_background_size_and_disc_is_drawn() {
        let avatar = circular_avatar(&png_of(Rgba([10, 200, 10, 255]), 32, 32)).unwrap();
        let background =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(600, 900, Rgba([0, 0, 0, 255])));
        let canvas = compose_canvas(&avatar, &background);

        assert_eq!(canvas.dimensions(), (600, 900));
        // disc center sits at (300, 300); the ring just outside the avatar
        // is background blended with rgba(255,255,255,200)
        let ring = canvas.get_pixel(300 + AVATAR_SIZE / 2 + 5, 300);
        assert!(ring[0] > 150 && ring[1] > 150 && ring[2] > 150);
        // far corner stays untouched background
        assert_eq!(*canvas.get_pixel(5, 890), Rgba([0, 0, 0, 255]));
        // avatar center covers the disc
        let center = canvas.get_pixel(300, 300);
        assert!(center[1] > 150 && center[0] < 100);
    }

    #[test]
    fn composition_is_deterministic() {
        let avatar_png = png_of(Rgba([5, 5, 250, 255]), 40, 40);
        let background =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(500, 600, Rgba([20, 20, 20, 255])));

        let avatar = circular_avatar(&avatar_png).unwrap();
        let first = encode_png(&compose_canvas(&avatar, &background)).unwrap();
        let avatar = circular_avatar(&avatar_png).unwrap();
        let second = encode_png(&compose_canvas(&avatar, &background)).unwrap();
        assert_eq!(first, second);
    }
}
