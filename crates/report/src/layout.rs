//! Millimetre-grid layout on top of `pdf-writer` content streams.
//!
//! The writing position is an explicit cursor (x/y in mm, y growing
//! downward from the top of the page) threaded through every call — no
//! ambient state. Graphics state (colors, line width) is re-emitted per
//! operation, so a page break never leaks state between pages.

use pdf_writer::{Content, Name};

use crate::encoding::{self, EncodingError};

pub(crate) const PAGE_WIDTH_MM: f32 = 210.0;
pub(crate) const PAGE_HEIGHT_MM: f32 = 297.0;
pub(crate) const MARGIN_MM: f32 = 10.0;
/// Automatic page-break trigger, as distance from the bottom edge.
const BOTTOM_MARGIN_MM: f32 = 20.0;
/// Inner horizontal cell padding.
const PAD_MM: f32 = 1.0;
pub(crate) const MM_TO_PT: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    /// Resource name under which the font is registered on every page.
    pub(crate) fn resource(self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"F1"),
            Font::Bold => Name(b"F2"),
            Font::Oblique => Name(b"F3"),
        }
    }

    /// Oblique shares the regular widths.
    fn is_bold(self) -> bool {
        self == Font::Bold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CellStyle {
    pub border: bool,
    pub fill: bool,
    pub align: Align,
}

impl CellStyle {
    pub(crate) const fn plain(align: Align) -> Self {
        Self { border: false, fill: false, align }
    }

    pub(crate) const fn boxed(align: Align) -> Self {
        Self { border: true, fill: false, align }
    }

    pub(crate) const fn shaded(align: Align) -> Self {
        Self { border: true, fill: true, align }
    }

    /// Borderless filled block (the status banner).
    pub(crate) const fn banner() -> Self {
        Self { border: false, fill: true, align: Align::Center }
    }
}

/// A growing sequence of pages with a single layout cursor.
pub(crate) struct Sheet {
    pages: Vec<Content>,
    content: Content,
    x: f32,
    y: f32,
    font: Font,
    size: f32,
    text_color: [f32; 3],
    fill_color: [f32; 3],
}

impl Sheet {
    pub(crate) fn new() -> Self {
        let mut sheet = Self {
            pages: Vec::new(),
            content: Content::new(),
            x: MARGIN_MM,
            y: MARGIN_MM,
            font: Font::Regular,
            size: 10.0,
            text_color: [0.0, 0.0, 0.0],
            fill_color: [1.0, 1.0, 1.0],
        };
        sheet.begin_page();
        sheet
    }

    pub(crate) fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.size = size;
    }

    pub(crate) fn set_text_color(&mut self, r: u8, g: u8, b: u8) {
        self.text_color = rgb(r, g, b);
    }

    pub(crate) fn set_fill_color(&mut self, r: u8, g: u8, b: u8) {
        self.fill_color = rgb(r, g, b);
    }

    pub(crate) fn x(&self) -> f32 {
        self.x
    }

    #[cfg(test)]
    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    pub(crate) fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    pub(crate) fn ln(&mut self, h: f32) {
        self.x = MARGIN_MM;
        self.y += h;
    }

    #[cfg(test)]
    pub(crate) fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    /// Break to a new page unless `height` more millimetres fit on this one.
    ///
    /// Callers reserve a full row before drawing it; `cell` itself never
    /// breaks, so the cells of one row always land on the same page.
    pub(crate) fn ensure_room(&mut self, height: f32) {
        if self.y + height > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::replace(&mut self.content, Content::new());
        self.pages.push(finished);
        self.x = MARGIN_MM;
        self.y = MARGIN_MM;
        self.begin_page();
    }

    fn begin_page(&mut self) {
        self.content.set_line_width(0.2 * MM_TO_PT);
    }

    /// Draw one fixed-height cell at the cursor and advance it: to the next
    /// line when `ln` is set, otherwise to the cell's right edge.
    /// `w == 0.0` extends the cell to the right margin.
    pub(crate) fn cell(
        &mut self,
        w: f32,
        h: f32,
        text: &str,
        style: CellStyle,
        ln: bool,
    ) -> Result<(), EncodingError> {
        let w = self.resolve_width(w);
        if style.fill || style.border {
            self.rect(self.x, self.y, w, h, style.fill, style.border);
        }

        let bytes = encoding::encode(text)?;
        if !bytes.is_empty() {
            let text_w = encoding::text_width(&bytes, self.font.is_bold(), self.size) / MM_TO_PT;
            let tx = match style.align {
                Align::Left => self.x + PAD_MM,
                Align::Center => self.x + (w - text_w) / 2.0,
                Align::Right => self.x + w - PAD_MM - text_w,
            };
            let baseline = self.y + 0.5 * h + 0.3 * self.size / MM_TO_PT;
            self.text_line(tx, baseline, &bytes);
        }

        if ln {
            self.ln(h);
        } else {
            self.x += w;
        }
        Ok(())
    }

    /// Word-wrapped paragraph cell. Spills over page breaks line by line,
    /// closing and reopening the border per page, so text is never clipped.
    ///
    /// Returns the top y and height of the final segment (for row mates
    /// that must stretch to the wrapped height) and parks the cursor at the
    /// left margin just below the block.
    pub(crate) fn multi_cell(
        &mut self,
        w: f32,
        line_h: f32,
        text: &str,
        border: bool,
    ) -> Result<(f32, f32), EncodingError> {
        let w = self.resolve_width(w);
        let bytes = encoding::encode(text)?;
        let lines = encoding::wrap(
            &bytes,
            self.font.is_bold(),
            self.size,
            (w - 2.0 * PAD_MM) * MM_TO_PT,
        );

        let x = self.x;
        let mut seg_top = self.y;
        let mut seg_lines = 0usize;
        for line in &lines {
            if self.y + line_h > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
                if border && seg_lines > 0 {
                    self.rect(x, seg_top, w, self.y - seg_top, false, true);
                }
                self.new_page();
                seg_top = self.y;
                seg_lines = 0;
            }
            let baseline = self.y + 0.5 * line_h + 0.3 * self.size / MM_TO_PT;
            self.text_line(x + PAD_MM, baseline, line);
            self.y += line_h;
            seg_lines += 1;
        }

        let seg_h = self.y - seg_top;
        if border {
            self.rect(x, seg_top, w, seg_h, false, true);
        }
        self.x = MARGIN_MM;
        Ok((seg_top, seg_h))
    }

    /// Number of wrapped lines `text` needs in a cell of width `w` with the
    /// current font — for reserving row height up front.
    pub(crate) fn line_count(&self, w: f32, text: &str) -> Result<usize, EncodingError> {
        let w = self.resolve_width(w);
        let bytes = encoding::encode(text)?;
        let lines = encoding::wrap(
            &bytes,
            self.font.is_bold(),
            self.size,
            (w - 2.0 * PAD_MM) * MM_TO_PT,
        );
        Ok(lines.len())
    }

    pub(crate) fn finish(mut self) -> Vec<Content> {
        self.pages.push(self.content);
        self.pages
    }

    fn resolve_width(&self, w: f32) -> f32 {
        if w == 0.0 {
            PAGE_WIDTH_MM - MARGIN_MM - self.x
        } else {
            w
        }
    }

    fn rect(&mut self, x: f32, y_top: f32, w: f32, h: f32, fill: bool, stroke: bool) {
        let [r, g, b] = self.fill_color;
        if fill {
            self.content.set_fill_rgb(r, g, b);
        }
        self.content.rect(
            x * MM_TO_PT,
            (PAGE_HEIGHT_MM - y_top - h) * MM_TO_PT,
            w * MM_TO_PT,
            h * MM_TO_PT,
        );
        match (fill, stroke) {
            (true, true) => self.content.fill_nonzero_and_stroke(),
            (true, false) => self.content.fill_nonzero(),
            (false, _) => self.content.stroke(),
        };
    }

    /// Show one encoded line with its baseline `y_baseline` mm from the top.
    fn text_line(&mut self, x: f32, y_baseline: f32, bytes: &[u8]) {
        let [r, g, b] = self.text_color;
        self.content.set_fill_rgb(r, g, b);
        self.content.begin_text();
        self.content.set_font(self.font.resource(), self.size);
        self.content
            .next_line(x * MM_TO_PT, (PAGE_HEIGHT_MM - y_baseline) * MM_TO_PT);
        self.content.show(pdf_writer::Str(bytes));
        self.content.end_text();
    }
}

fn rgb(r: u8, g: u8, b: u8) -> [f32; 3] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}
