//! Headless capture: PNG screenshots.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::video::FrameBuffer;

/// Save a frame buffer as a PNG file.
///
/// The frame buffer is ARGB32; the alpha byte is ignored and every
/// pixel is written opaque.
pub fn save_screenshot(framebuffer: &FrameBuffer, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), FrameBuffer::WIDTH, FrameBuffer::HEIGHT);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&to_rgba(framebuffer))?;
    Ok(())
}

/// Convert ARGB32 pixels to RGBA bytes.
fn to_rgba(framebuffer: &FrameBuffer) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(framebuffer.pixels().len() * 4);
    for &pixel in framebuffer.pixels() {
        let [_, r, g, b] = pixel.to_be_bytes();
        rgba.extend_from_slice(&[r, g, b, 0xFF]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;
    use crate::video::PixelSink;

    #[test]
    fn rgba_conversion() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, 2); // red
        let rgba = to_rgba(&fb);
        assert_eq!(rgba.len(), fb.pixels().len() * 4);
        assert_eq!(&rgba[0..4], &[0xF0, 0x00, 0x00, 0xFF]);
        assert_eq!(PALETTE[0].to_be_bytes()[1..], rgba[4..7]);
    }

    #[test]
    fn writes_png_file() {
        let path = std::env::temp_dir().join(format!("vic20-capture-{}.png", std::process::id()));
        save_screenshot(&FrameBuffer::new(), &path).expect("save");
        let bytes = fs::read(&path).expect("read back");
        assert_eq!(&bytes[1..4], b"PNG");
        let _ = fs::remove_file(&path);
    }
}
