//! The audit-certificate document: a fixed single-document layout built
//! top-to-bottom — header, status banner, summary table, discrepancy list,
//! line-item table, footer.

use pdf_writer::{Name, Pdf, Rect, Ref};
use thiserror::Error;

use concordia_core::ExtractionData;

use crate::clock::{Clock, SystemClock};
use crate::encoding::EncodingError;
use crate::layout::{Align, CellStyle, Font, Sheet, MARGIN_MM, MM_TO_PT, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

#[derive(Debug, Error)]
pub enum RenderError {
    /// A field contains a character the certificate encoding cannot
    /// represent. The whole render is aborted — no partial document.
    #[error("certificate text cannot be encoded: {0}")]
    Encoding(#[from] EncodingError),
}

/// Renders a snapshot plus its discrepancy list into a PDF byte stream.
///
/// Pure and deterministic apart from the generation timestamp, which comes
/// from the injected [`Clock`]: the same snapshot, discrepancies and clock
/// instant produce byte-identical output.
pub struct CertificateRenderer<C: Clock = SystemClock> {
    organization: String,
    clock: C,
}

impl CertificateRenderer<SystemClock> {
    pub fn new(organization: impl Into<String>) -> Self {
        Self { organization: organization.into(), clock: SystemClock }
    }
}

impl<C: Clock> CertificateRenderer<C> {
    pub fn with_clock(organization: impl Into<String>, clock: C) -> Self {
        Self { organization: organization.into(), clock }
    }

    pub fn render(
        &self,
        data: &ExtractionData,
        discrepancies: &[String],
    ) -> Result<Vec<u8>, RenderError> {
        let mut sheet = Sheet::new();

        self.header(&mut sheet)?;
        status_banner(&mut sheet, discrepancies.is_empty())?;
        summary_table(&mut sheet, data)?;
        discrepancy_list(&mut sheet, discrepancies)?;
        line_item_table(&mut sheet, data)?;
        self.footer(&mut sheet)?;

        Ok(assemble(sheet))
    }

    fn header(&self, sheet: &mut Sheet) -> Result<(), RenderError> {
        sheet.set_font(Font::Bold, 16.0);
        sheet.set_text_color(0, 0, 0);
        sheet.cell(0.0, 10.0, &self.organization, CellStyle::plain(Align::Center), true)?;

        sheet.set_font(Font::Regular, 10.0);
        sheet.set_text_color(128, 128, 128);
        sheet.cell(0.0, 6.0, "OFFICIAL AUDIT CERTIFICATE", CellStyle::plain(Align::Center), true)?;
        sheet.ln(5.0);
        Ok(())
    }

    fn footer(&self, sheet: &mut Sheet) -> Result<(), RenderError> {
        let timestamp = self.clock.now_utc().format("%Y-%m-%d %H:%M:%S UTC");
        sheet.set_font(Font::Oblique, 8.0);
        sheet.set_text_color(128, 128, 128);
        sheet.ensure_room(5.0);
        sheet.cell(
            0.0,
            5.0,
            &format!("Generated by {} AI Compliance Engine | {timestamp}", self.organization),
            CellStyle::plain(Align::Center),
            true,
        )?;
        Ok(())
    }
}

/// Full-width colored block — the single visual indicator of the outcome.
fn status_banner(sheet: &mut Sheet, passed: bool) -> Result<(), RenderError> {
    if passed {
        sheet.set_fill_color(34, 197, 94);
    } else {
        sheet.set_fill_color(239, 68, 68);
    }
    sheet.set_text_color(255, 255, 255);
    sheet.set_font(Font::Bold, 14.0);
    let label = if passed { "PASSED / COMPLIANT" } else { "FAILED / DISCREPANCIES FOUND" };
    sheet.cell(0.0, 12.0, label, CellStyle::banner(), true)?;
    sheet.ln(8.0);
    sheet.set_text_color(0, 0, 0);
    Ok(())
}

/// Fixed two-column key/value table with exactly six rows.
fn summary_table(sheet: &mut Sheet, data: &ExtractionData) -> Result<(), RenderError> {
    sheet.set_font(Font::Bold, 12.0);
    sheet.cell(0.0, 8.0, "Document Summary", CellStyle::plain(Align::Left), true)?;
    sheet.ln(2.0);

    sheet.set_font(Font::Bold, 10.0);
    sheet.set_fill_color(240, 240, 240);
    sheet.cell(70.0, 8.0, "Field", CellStyle::shaded(Align::Left), false)?;
    sheet.cell(120.0, 8.0, "Value", CellStyle::shaded(Align::Left), true)?;

    sheet.set_font(Font::Regular, 10.0);
    let invoice = &data.invoice;
    let packing = &data.packing_list;
    let rows = [
        ("Invoice Number", invoice.invoice_number.clone()),
        ("Bill of Lading Number", data.bill_of_lading.bol_number.clone()),
        ("Total Weight (kg)", format!("{} kg", packing.gross_weight_kg.normalize())),
        ("Total Packages", packing.total_packages.to_string()),
        ("Invoice Total Amount", format!("{:.2} {}", invoice.total_amount, invoice.currency)),
        ("Total Units Count", packing.total_units_count.normalize().to_string()),
    ];
    for (field, value) in rows {
        sheet.ensure_room(8.0);
        sheet.cell(70.0, 8.0, field, CellStyle::boxed(Align::Left), false)?;
        sheet.cell(120.0, 8.0, &value, CellStyle::boxed(Align::Left), true)?;
    }
    sheet.ln(8.0);
    Ok(())
}

/// Bulleted, word-wrapped warning paragraphs. Omitted entirely — heading
/// included — when there is nothing to report.
fn discrepancy_list(sheet: &mut Sheet, discrepancies: &[String]) -> Result<(), RenderError> {
    if discrepancies.is_empty() {
        return Ok(());
    }

    sheet.set_font(Font::Bold, 12.0);
    sheet.set_text_color(239, 68, 68);
    sheet.ensure_room(8.0 + 2.0 + 6.0);
    sheet.cell(0.0, 8.0, "Discrepancies Found:", CellStyle::plain(Align::Left), true)?;
    sheet.ln(2.0);

    sheet.set_font(Font::Regular, 10.0);
    for message in discrepancies {
        sheet.ensure_room(6.0);
        sheet.set_x(MARGIN_MM + 5.0);
        sheet.multi_cell(0.0, 6.0, &format!("* {message}"), false)?;
    }
    sheet.ln(3.0);
    sheet.set_text_color(0, 0, 0);
    Ok(())
}

const DESC_W: f32 = 80.0;
const QTY_W: f32 = 25.0;
const UNIT_W: f32 = 30.0;
const TOTAL_W: f32 = 35.0;
const ROW_H: f32 = 7.0;

fn line_item_table(sheet: &mut Sheet, data: &ExtractionData) -> Result<(), RenderError> {
    sheet.set_font(Font::Bold, 12.0);
    sheet.ensure_room(8.0 + 2.0 + 2.0 * ROW_H);
    sheet.cell(0.0, 8.0, "Invoice Line Items", CellStyle::plain(Align::Left), true)?;
    sheet.ln(2.0);

    sheet.set_font(Font::Bold, 9.0);
    sheet.set_fill_color(240, 240, 240);
    sheet.cell(DESC_W, ROW_H, "Description", CellStyle::shaded(Align::Left), false)?;
    sheet.cell(QTY_W, ROW_H, "Quantity", CellStyle::shaded(Align::Right), false)?;
    sheet.cell(UNIT_W, ROW_H, "Unit Price", CellStyle::shaded(Align::Right), false)?;
    sheet.cell(TOTAL_W, ROW_H, "Total Price", CellStyle::shaded(Align::Right), true)?;

    sheet.set_font(Font::Regular, 9.0);
    for item in &data.invoice.line_items {
        // Reserve the whole wrapped row so its four cells share a page.
        let height = sheet.line_count(DESC_W, &item.description)? as f32 * ROW_H;
        if height <= PAGE_HEIGHT_MM - 2.0 * MARGIN_MM {
            sheet.ensure_room(height);
        }

        // The description may wrap; the numeric cells stretch to the wrapped
        // height so the row borders stay aligned.
        let x = sheet.x();
        let (row_top, row_h) = sheet.multi_cell(DESC_W, ROW_H, &item.description, true)?;
        sheet.set_xy(x + DESC_W, row_top);
        sheet.cell(
            QTY_W,
            row_h,
            &item.quantity.normalize().to_string(),
            CellStyle::boxed(Align::Right),
            false,
        )?;
        sheet.cell(
            UNIT_W,
            row_h,
            &format!("{:.2}", item.unit_price),
            CellStyle::boxed(Align::Right),
            false,
        )?;
        sheet.cell(
            TOTAL_W,
            row_h,
            &format!("{:.2}", item.total_price),
            CellStyle::boxed(Align::Right),
            true,
        )?;
    }

    // Deliberately the stated total, not a recomputed sum — when the sums
    // disagree, the discrepancy list above is where that surfaces.
    sheet.set_font(Font::Bold, 9.0);
    sheet.set_fill_color(220, 220, 220);
    sheet.ensure_room(ROW_H);
    sheet.cell(
        DESC_W + QTY_W + UNIT_W,
        ROW_H,
        "TOTAL",
        CellStyle::shaded(Align::Right),
        false,
    )?;
    sheet.cell(
        TOTAL_W,
        ROW_H,
        &format!("{:.2} {}", data.invoice.total_amount, data.invoice.currency),
        CellStyle::shaded(Align::Right),
        true,
    )?;
    sheet.ln(10.0);
    Ok(())
}

// ── PDF assembly ──────────────────────────────────────────────────────────────

fn catalog_ref() -> Ref {
    Ref::new(1)
}

fn page_tree_ref() -> Ref {
    Ref::new(2)
}

/// Object ids 3..=5 are the Helvetica family, in `Font` declaration order.
fn font_ref(font: Font) -> Ref {
    match font {
        Font::Regular => Ref::new(3),
        Font::Bold => Ref::new(4),
        Font::Oblique => Ref::new(5),
    }
}

fn page_ref(index: usize) -> Ref {
    Ref::new(6 + 2 * index as i32)
}

fn content_ref(index: usize) -> Ref {
    Ref::new(7 + 2 * index as i32)
}

/// Turn finished page contents into the final document. Every object here
/// is derived from the input, so output bytes are fully deterministic.
fn assemble(sheet: Sheet) -> Vec<u8> {
    let contents = sheet.finish();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_ref()).pages(page_tree_ref());
    pdf.pages(page_tree_ref())
        .kids((0..contents.len()).map(page_ref))
        .count(contents.len() as i32);

    for (index, content) in contents.into_iter().enumerate() {
        {
            let mut page = pdf.page(page_ref(index));
            page.media_box(Rect::new(
                0.0,
                0.0,
                PAGE_WIDTH_MM * MM_TO_PT,
                PAGE_HEIGHT_MM * MM_TO_PT,
            ));
            page.parent(page_tree_ref());
            page.contents(content_ref(index));
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for font in [Font::Regular, Font::Bold, Font::Oblique] {
                fonts.pair(font.resource(), font_ref(font));
            }
        }
        pdf.stream(content_ref(index), &content.finish());
    }

    for (font, base) in [
        (Font::Regular, "Helvetica"),
        (Font::Bold, "Helvetica-Bold"),
        (Font::Oblique, "Helvetica-Oblique"),
    ] {
        pdf.type1_font(font_ref(font))
            .base_font(Name(base.as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    pdf.finish()
}
