//! QR codes for bridge links.

use filebridge_core::{AppError, AppResult};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

/// Renders a string into an image the second device can scan.
pub trait QrRenderer: Send + Sync {
    /// MIME type of the rendered image
    fn content_type(&self) -> &'static str;

    fn render(&self, data: &str) -> AppResult<Vec<u8>>;
}

/// PNG renderer backed by `qrcode` and `image`
#[derive(Debug, Clone, Copy)]
pub struct PngQrRenderer {
    min_size: u32,
}

impl PngQrRenderer {
    pub const DEFAULT_SIZE: u32 = 256;

    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl Default for PngQrRenderer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl QrRenderer for PngQrRenderer {
    fn content_type(&self) -> &'static str {
        "image/png"
    }

    fn render(&self, data: &str) -> AppResult<Vec<u8>> {
        let code = QrCode::new(data.as_bytes())
            .map_err(|e| AppError::InvalidArgument(format!("Cannot encode QR code: {}", e)))?;
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_size, self.min_size)
            .build();

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| AppError::Internal(format!("Failed to encode QR PNG: {}", e)))?;
        Ok(png.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_png_of_at_least_requested_size() {
        let renderer = PngQrRenderer::default();
        let png = renderer
            .render("https://files.example.com/m/upload/abc")
            .unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert!(decoded.width() >= PngQrRenderer::DEFAULT_SIZE);
        assert_eq!(renderer.content_type(), "image/png");
    }
}
