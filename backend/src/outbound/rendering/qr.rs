//! QR module matrix for the verification link.

use qrcode::{Color, EcLevel, QrCode};
use tracing::warn;

/// Square grid of QR modules, row-major, `true` for dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Encode `payload` at medium error correction.
    ///
    /// Returns `None` when the payload cannot be encoded; the certificate is
    /// then drawn without a code.
    pub fn encode(payload: &str) -> Option<Self> {
        match QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M) {
            Ok(code) => Some(Self {
                width: code.width(),
                modules: code
                    .to_colors()
                    .into_iter()
                    .map(|color| color == Color::Dark)
                    .collect(),
            }),
            Err(error) => {
                warn!(%error, payload_len = payload.len(), "verification QR code omitted");
                None
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Iterate over the `(column, row)` of every dark module.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(index, _)| (index % width, index / width))
    }
}
