//! Certificate rendering adapters.
//!
//! [`PdfCertificateRenderer`] draws the A4 certificate with `printpdf`; the
//! verification QR code is encoded with `qrcode` and painted as vector
//! modules.

mod pdf;
mod qr;

pub use pdf::PdfCertificateRenderer;
pub use qr::QrMatrix;
