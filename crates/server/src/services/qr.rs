//! QR symbol rendering for check-in codes.
//!
//! The QR payload is the raw 4-character code, nothing else. Decoding is the
//! scanner's job (the browser, on the scan page); this module only renders.

use qrcode::QrCode;
use qrcode::render::svg;
use thiserror::Error;

use gatecheck_core::CheckInCode;

/// Rendered symbol size in pixels.
const MIN_DIMENSIONS: u32 = 240;

/// Errors that can occur while rendering a QR symbol.
#[derive(Debug, Error)]
pub enum QrError {
    /// The encoder rejected the payload.
    #[error("QR encoding failed: {0:?}")]
    Encode(qrcode::types::QrError),
}

/// Render a check-in code as an SVG QR symbol.
///
/// # Errors
///
/// Returns `QrError::Encode` if the payload cannot be encoded; a
/// 4-character alphanumeric payload always fits, so this is unreachable in
/// practice but propagated rather than unwrapped.
pub fn render_svg(code: &CheckInCode) -> Result<String, QrError> {
    let qr = QrCode::new(code.as_str().as_bytes()).map_err(QrError::Encode)?;

    let image = qr
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_DIMENSIONS, MIN_DIMENSIONS)
        .dark_color(svg::Color("#111111"))
        .light_color(svg::Color("#ffffff"))
        .build();

    Ok(image)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_svg_produces_svg_markup() {
        let code = CheckInCode::parse("7K2Q").unwrap();
        let svg = render_svg(&code).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }
}
