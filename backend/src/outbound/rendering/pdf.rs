//! A4 certificate drawn with `printpdf`.
//!
//! Coordinates are millimetres from the bottom-left corner of the page. Text
//! uses the builtin Helvetica faces, so centring relies on an average glyph
//! width rather than real font metrics.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

use crate::domain::CertificateDocument;
use crate::domain::ports::{CertificateRenderError, CertificateRenderer};

use super::qr::QrMatrix;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const PT_TO_MM: f32 = 0.3528;
const AVERAGE_GLYPH_EM: f32 = 0.5;

const HEADERS: [&str; 7] = [
    "No",
    "Nama Lomba",
    "Penyelenggara",
    "Kategori",
    "Juara",
    "Tingkat",
    "Tahun",
];
const COLUMN_WIDTHS: [f32; 7] = [8.0, 45.0, 35.0, 22.0, 18.0, 22.0, 15.0];
const HEADER_ROW_HEIGHT: f32 = 7.0;
const BODY_ROW_HEIGHT: f32 = 6.0;

const QR_SIZE: f32 = 35.0;
const SIGNATURE_WIDTH: f32 = 65.0;

const NAVY: (f32, f32, f32) = (0.0, 0.2, 0.4);
const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const WHITE: (f32, f32, f32) = (1.0, 1.0, 1.0);
const GREY: (f32, f32, f32) = (0.5, 0.5, 0.5);
const STRIPE: (f32, f32, f32) = (0.94, 0.96, 1.0);
const RED: (f32, f32, f32) = (0.75, 0.0, 0.0);

const OPENING: &str =
    "Yang bertanda tangan di bawah ini, Kepala Sekolah menerangkan bahwa siswa berikut:";
const ACHIEVEMENTS_INTRO: &str = "Telah meraih prestasi sebagai berikut:";
const CLOSING: &str = "Surat keterangan ini dibuat dengan sebenarnya untuk dapat dipergunakan \
                       sebagaimana mestinya.";
const REVOKED_NOTICE: &str = "DICABUT - surat keterangan ini tidak berlaku lagi";

/// Renders [`CertificateDocument`]s to PDF bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCertificateRenderer;

impl PdfCertificateRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVERAGE_GLYPH_EM * PT_TO_MM
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Drawing cursor over the single page layer.
struct Canvas {
    layer: PdfLayerReference,
    fonts: Fonts,
    y: f32,
}

enum Align {
    Left,
    Center,
}

impl Canvas {
    fn text(&self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    /// Write `text` inside the horizontal band `[x, x + width]` at the cursor.
    fn cell(&self, text: &str, size: f32, x: f32, width: f32, align: Align, font: &IndirectFontRef) {
        let left = match align {
            Align::Left => x + 1.0,
            Align::Center => x + ((width - text_width(text, size)) / 2.0).max(0.0),
        };
        self.text(text, size, left, self.y, font);
    }

    fn centered_line(&mut self, text: &str, size: f32, height: f32, bold: bool) {
        self.y -= height;
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.cell(text, size, MARGIN, CONTENT_WIDTH, Align::Center, font);
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: (f32, f32, f32)) {
        self.layer.set_fill_color(rgb(color));
        self.layer.add_rect(
            Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + height)).with_mode(PaintMode::Fill),
        );
    }

    fn rule(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y2)), false),
            ],
            is_closed: false,
        });
    }

    fn header(&mut self, document: &CertificateDocument) {
        self.layer.set_fill_color(rgb(NAVY));
        self.centered_line(&document.school.name, 14.0, 8.0, true);
        self.layer.set_fill_color(rgb(BLACK));
        self.centered_line(&document.school.address, 10.0, 5.0, false);

        self.layer.set_outline_color(rgb(NAVY));
        self.layer.set_outline_thickness(2.0);
        self.y -= 3.0;
        self.rule(MARGIN, self.y, PAGE_WIDTH - MARGIN, self.y);
        self.y -= 5.0;

        self.centered_line("SURAT KETERANGAN PRESTASI", 13.0, 8.0, true);
        self.centered_line(&format!("Nomor: {}", document.number), 10.0, 5.0, false);
        self.y -= 5.0;
    }

    fn student(&mut self, document: &CertificateDocument) {
        self.y -= 6.0;
        self.cell(OPENING, 10.0, MARGIN, CONTENT_WIDTH, Align::Left, &self.fonts.regular);
        self.y -= 3.0;

        let student = &document.student;
        let rows = [
            ("Nama Lengkap", student.full_name.as_str()),
            ("NISN", student.nisn.as_str()),
            ("Tempat, Tanggal Lahir", student.birth_place_and_date.as_str()),
            ("Kelas", student.class_name.as_str()),
        ];
        for (label, value) in rows {
            self.y -= 6.0;
            self.cell(label, 10.0, MARGIN, 50.0, Align::Left, &self.fonts.regular);
            self.cell(":", 10.0, MARGIN + 50.0, 5.0, Align::Center, &self.fonts.regular);
            self.cell(value, 10.0, MARGIN + 55.0, 115.0, Align::Left, &self.fonts.regular);
        }
        self.y -= 4.0;

        self.y -= 6.0;
        self.cell(
            ACHIEVEMENTS_INTRO,
            10.0,
            MARGIN,
            CONTENT_WIDTH,
            Align::Left,
            &self.fonts.regular,
        );
        self.y -= 3.0;
    }

    fn table(&mut self, document: &CertificateDocument) {
        let table_width: f32 = COLUMN_WIDTHS.iter().sum();
        let top = self.y;

        self.fill_rect(MARGIN, top - HEADER_ROW_HEIGHT, table_width, HEADER_ROW_HEIGHT, NAVY);
        self.layer.set_fill_color(rgb(WHITE));
        self.y = top - HEADER_ROW_HEIGHT + 2.0;
        let mut x = MARGIN;
        for (header, width) in HEADERS.iter().zip(COLUMN_WIDTHS) {
            self.cell(header, 9.0, x, width, Align::Center, &self.fonts.bold);
            x += width;
        }

        let mut row_top = top - HEADER_ROW_HEIGHT;
        for (index, row) in document.rows.iter().enumerate() {
            let row_bottom = row_top - BODY_ROW_HEIGHT;
            if index % 2 == 0 {
                self.fill_rect(MARGIN, row_bottom, table_width, BODY_ROW_HEIGHT, STRIPE);
            }
            self.layer.set_fill_color(rgb(BLACK));
            self.y = row_bottom + 1.8;

            let position = row.position.to_string();
            let year = row.year.to_string();
            let cells = [
                (position.as_str(), Align::Center),
                (row.competition.as_str(), Align::Left),
                (row.organizer.as_str(), Align::Left),
                (row.category.as_str(), Align::Center),
                (row.rank.as_str(), Align::Center),
                (row.level.as_str(), Align::Center),
                (year.as_str(), Align::Center),
            ];
            let mut x = MARGIN;
            for ((text, align), width) in cells.into_iter().zip(COLUMN_WIDTHS) {
                self.cell(text, 8.0, x, width, align, &self.fonts.regular);
                x += width;
            }
            row_top = row_bottom;
        }

        self.grid(top, row_top, table_width);
        self.y = row_top - 5.0;
    }

    fn grid(&self, top: f32, bottom: f32, table_width: f32) {
        self.layer.set_outline_color(rgb(BLACK));
        self.layer.set_outline_thickness(0.5);

        let mut y = top;
        self.rule(MARGIN, y, MARGIN + table_width, y);
        y -= HEADER_ROW_HEIGHT;
        while y >= bottom - f32::EPSILON {
            self.rule(MARGIN, y, MARGIN + table_width, y);
            y -= BODY_ROW_HEIGHT;
        }

        let mut x = MARGIN;
        self.rule(x, top, x, bottom);
        for width in COLUMN_WIDTHS {
            x += width;
            self.rule(x, top, x, bottom);
        }
    }

    fn closing(&mut self, document: &CertificateDocument) {
        self.layer.set_fill_color(rgb(BLACK));
        self.y -= 6.0;
        self.cell(CLOSING, 10.0, MARGIN, CONTENT_WIDTH, Align::Left, &self.fonts.regular);
        if let Some(valid_until) = &document.valid_until {
            self.y -= 6.0;
            let line = format!("Berlaku sampai dengan {valid_until}.");
            self.cell(&line, 10.0, MARGIN, CONTENT_WIDTH, Align::Left, &self.fonts.regular);
        }
        self.y -= 5.0;
    }

    fn qr_block(&self, document: &CertificateDocument, top: f32) {
        let Some(matrix) = QrMatrix::encode(&document.verification_url) else {
            return;
        };
        self.layer.set_fill_color(rgb(BLACK));
        self.text(
            "Scan untuk verifikasi:",
            8.0,
            MARGIN,
            top - 5.0,
            &self.fonts.regular,
        );

        let module = QR_SIZE / matrix.width() as f32;
        let origin_top = top - 6.0;
        for (column, row) in matrix.dark_modules() {
            let x = MARGIN + column as f32 * module;
            let y = origin_top - (row as f32 + 1.0) * module;
            self.fill_rect(x, y, module, module, BLACK);
        }
    }

    fn signature(&mut self, document: &CertificateDocument) {
        let top = self.y;
        self.qr_block(document, top);

        let x = MARGIN + CONTENT_WIDTH - SIGNATURE_WIDTH;
        self.layer.set_fill_color(rgb(BLACK));
        self.y = top - 5.0;
        let issued = format!("Diterbitkan, {}", document.issued_on);
        self.cell(&issued, 10.0, x, SIGNATURE_WIDTH, Align::Center, &self.fonts.regular);
        self.y -= 5.0;
        self.cell(
            "Kepala Sekolah,",
            10.0,
            x,
            SIGNATURE_WIDTH,
            Align::Center,
            &self.fonts.regular,
        );
        self.y -= 23.0;
        self.cell(
            &document.school.headmaster_name,
            10.0,
            x,
            SIGNATURE_WIDTH,
            Align::Center,
            &self.fonts.bold,
        );
        if let Some(nip) = &document.school.headmaster_nip {
            self.y -= 5.0;
            let line = format!("NIP. {nip}");
            self.cell(&line, 9.0, x, SIGNATURE_WIDTH, Align::Center, &self.fonts.regular);
        }
    }

    fn revoked_notice(&mut self) {
        self.layer.set_fill_color(rgb(RED));
        self.y = 40.0;
        self.cell(
            REVOKED_NOTICE,
            12.0,
            MARGIN,
            CONTENT_WIDTH,
            Align::Center,
            &self.fonts.bold,
        );
    }

    fn footer(&mut self, document: &CertificateDocument) {
        self.layer.set_fill_color(rgb(GREY));
        self.y = 15.0;
        let line = format!(
            "Dokumen ini diterbitkan secara digital pada {} | Verifikasi keaslian dokumen dengan \
             scan QR Code",
            document.issued_stamp
        );
        self.cell(&line, 7.0, MARGIN, CONTENT_WIDTH, Align::Center, &self.fonts.italic);
    }
}

impl CertificateRenderer for PdfCertificateRenderer {
    fn render(&self, document: &CertificateDocument) -> Result<Vec<u8>, CertificateRenderError> {
        let title = format!("Surat Keterangan Prestasi {}", document.number);
        let (pdf, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Certificate");

        let font = |builtin| {
            pdf.add_builtin_font(builtin)
                .map_err(|err| CertificateRenderError::layout(err.to_string()))
        };
        let fonts = Fonts {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
        };

        let mut canvas = Canvas {
            layer: pdf.get_page(page).get_layer(layer),
            fonts,
            y: PAGE_HEIGHT - MARGIN,
        };
        canvas.header(document);
        canvas.student(document);
        canvas.table(document);
        canvas.closing(document);
        canvas.signature(document);
        if document.revoked {
            canvas.revoked_notice();
        }
        canvas.footer(document);

        pdf.save_to_bytes()
            .map_err(|err| CertificateRenderError::encode(err.to_string()))
    }
}
