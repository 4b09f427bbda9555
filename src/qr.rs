use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::{AirgapError, Result};

const PIXEL_SCALE: u32 = 4;

fn qr_code(text: &str) -> Result<QrCode> {
    // Base45 text is a subset of the QR alphanumeric charset, so the
    // library picks alphanumeric mode on its own. Level M keeps frames
    // near MAX_CHUNK_SIZE scannable by commodity cameras.
    QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
        .map_err(|_| AirgapError::Unknown)
}

/// Renders a frame string as a PNG image, returned as in-memory bytes.
pub fn render_png(text: &str) -> Result<Vec<u8>> {
    let code = qr_code(text)?;

    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(PIXEL_SCALE, PIXEL_SCALE)
        .build();

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::L8,
        )
        .map_err(|_| AirgapError::Unknown)?;

    Ok(png)
}

/// Renders a frame string as half-block characters for terminal display.
/// Two QR rows share one terminal row, which keeps the code roughly square.
pub fn render_terminal(text: &str) -> Result<String> {
    let code = qr_code(text)?;

    let qr_size = code.width();
    let colors = code.to_colors();
    let qr_with_quiet = qr_size + 4;

    let is_dark = |row: usize, col: usize| -> bool {
        if row >= 2 && row < qr_size + 2 && col >= 2 && col < qr_size + 2 {
            colors[(row - 2) * qr_size + (col - 2)] == Color::Dark
        } else {
            false
        }
    };

    let mut result = String::new();
    for row_pair in 0..(qr_with_quiet + 1) / 2 {
        let top = row_pair * 2;
        let bottom = top + 1;

        for col in 0..qr_with_quiet {
            let top_dark = is_dark(top, col);
            let bottom_dark = bottom < qr_with_quiet && is_dark(bottom, col);

            result.push(match (top_dark, bottom_dark) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        result.push('\n');
    }

    Ok(result)
}

/// Whether the rendered code fits the current terminal, leaving a few rows
/// for the carousel header.
pub fn fits_in_terminal(text: &str) -> Result<bool> {
    use terminal_size::{terminal_size, Height, Width};

    let code = qr_code(text)?;
    let qr_with_quiet = code.width() + 4;

    let (term_width, term_height) = terminal_size()
        .map(|(Width(w), Height(h))| (w as usize, h as usize))
        .unwrap_or((120, 60));

    Ok(qr_with_quiet <= term_width && (qr_with_quiet + 1) / 2 + 6 <= term_height)
}
