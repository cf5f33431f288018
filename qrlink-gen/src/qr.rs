//! QR code image generation
//!
//! Encodes a text payload as a QR symbol and writes it as a PNG of exactly the
//! requested pixel size. The symbol is scaled by the largest whole module size
//! that still leaves a four-module quiet zone, then centred on a white canvas.

use crate::models::EncodedArtifact;
use image::{ImageBuffer, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use qrlink_common::{StageError, StageResult};
use std::path::Path;
use tracing::{debug, error, info};

/// Quiet zone width in modules on each side of the symbol
const QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// QR encoder with a fixed error-correction level
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    ec_level: EcLevel,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self { ec_level: EcLevel::L }
    }
}

impl QrEncoder {
    /// Encode `text` and write a `width` × `height` PNG to `output_path`
    ///
    /// Any existing file at `output_path` is overwritten. Nothing is written
    /// when validation or encoding fails.
    pub fn encode(
        &self,
        text: &str,
        width: u32,
        height: u32,
        output_path: &Path,
    ) -> StageResult<EncodedArtifact> {
        validate(text, width, height, output_path)?;

        info!(url = text, "Generating QR code");

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)
            .map_err(|e| {
                error!(error = %e, "Error encoding data to QR code");
                StageError::Encoding(e.to_string())
            })?;

        let image = render(&code, width, height)?;

        image
            .save_with_format(output_path, ImageFormat::Png)
            .map_err(|e| {
                error!(path = %output_path.display(), error = %e, "Error writing QR code to file");
                StageError::Write(format!("{}: {}", output_path.display(), e))
            })?;

        info!(path = %output_path.display(), "QR code generated");

        Ok(EncodedArtifact {
            source_text: text.to_string(),
            width,
            height,
            output_path: output_path.to_path_buf(),
            success: true,
        })
    }
}

fn validate(text: &str, width: u32, height: u32, output_path: &Path) -> StageResult<()> {
    if text.trim().is_empty() {
        error!("QR payload cannot be empty");
        return Err(StageError::InvalidArgument(
            "text cannot be empty".to_string(),
        ));
    }
    if width == 0 || height == 0 {
        error!(width, height, "QR dimensions must be positive");
        return Err(StageError::InvalidArgument(format!(
            "width and height must be positive (got {}x{})",
            width, height
        )));
    }
    if output_path.to_string_lossy().trim().is_empty() {
        error!("QR output path cannot be empty");
        return Err(StageError::InvalidArgument(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Rasterise the module matrix onto an exact-size canvas
fn render(code: &QrCode, width: u32, height: u32) -> StageResult<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let modules = code.width() as u32;
    let with_quiet_zone = modules + 2 * QUIET_ZONE;
    let scale = (width / with_quiet_zone).min(height / with_quiet_zone);

    if scale == 0 {
        error!(width, height, modules, "Requested size too small for QR symbol");
        return Err(StageError::Encoding(format!(
            "{}x{} pixels cannot hold a {}-module symbol with quiet zone",
            width, height, modules
        )));
    }

    let left = (width - modules * scale) / 2;
    let top = (height - modules * scale) / 2;
    debug!(modules, scale, left, top, "Rendering QR symbol");

    let mut image = ImageBuffer::from_pixel(width, height, LIGHT);
    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let column = index as u32 % modules;
        let row = index as u32 / modules;
        for dy in 0..scale {
            for dx in 0..scale {
                image.put_pixel(left + column * scale + dx, top + row * scale + dy, DARK);
            }
        }
    }

    Ok(image)
}
