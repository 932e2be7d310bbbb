//! Renders signed payloads as QR code images.
//!
//! Rendering parameters are fixed for every code the generator produces so
//! that scan reliability is the same across all printed codes: error
//! correction level H, 12 px per module and an 8-module light border.

use crate::error::{GeneratorError, Result};
use common::model::payload::SignedPayload;
use image::{GrayImage, ImageBuffer, Luma};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use qrcode::{Color, EcLevel, QrCode};

pub const ERROR_CORRECTION: EcLevel = EcLevel::H;
pub const MODULE_SIZE: u32 = 12;
pub const BORDER_MODULES: u32 = 8;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// A rendered code: the raster plus its PNG serialization.
pub struct CodeImage {
    pub raster: GrayImage,
    pub png: Vec<u8>,
}

pub struct CodeEncoder {
    base_url: String,
}

impl CodeEncoder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The URL a phone opens after scanning: `{base_url}/scan?d={payload}`.
    pub fn scan_url(&self, payload: &SignedPayload) -> String {
        format!("{}/scan?d={}", self.base_url, payload)
    }

    pub fn encode(&self, payload: &SignedPayload) -> Result<CodeImage> {
        let url = self.scan_url(payload);
        let code = QrCode::with_error_correction_level(url.as_bytes(), ERROR_CORRECTION)
            .map_err(|e| GeneratorError::Encoding(e.to_string()))?;
        let raster = render(&code);
        let png = encode_png(&raster)?;
        Ok(CodeImage { raster, png })
    }
}

fn render(code: &QrCode) -> GrayImage {
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 2 * BORDER_MODULES) * MODULE_SIZE;

    ImageBuffer::from_fn(side, side, |x, y| {
        let mx = (x / MODULE_SIZE).checked_sub(BORDER_MODULES);
        let my = (y / MODULE_SIZE).checked_sub(BORDER_MODULES);
        match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                match colors[(my * modules + mx) as usize] {
                    Color::Dark => DARK,
                    Color::Light => LIGHT,
                }
            }
            _ => LIGHT,
        }
    })
}

fn encode_png(raster: &GrayImage) -> Result<Vec<u8>> {
    let to_err = |e: png::EncodingError| GeneratorError::Encoding(e.to_string());
    let mut bytes = Vec::new();
    {
        let mut encoder = PngEncoder::new(&mut bytes, raster.width(), raster.height());
        encoder.set_color(PngColorType::Grayscale);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header().map_err(to_err)?;
        writer.write_image_data(raster.as_raw()).map_err(to_err)?;
        writer.finish().map_err(to_err)?;
    }
    Ok(bytes)
}
