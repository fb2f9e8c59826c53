use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use super::layout::{Font, Op, Page, PAGE_HEIGHT, PAGE_WIDTH, ROW_HEIGHT};

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

const TABLE_FONT_SIZE: f32 = 10.0;

/// Helvetica glyphs average about half an em
const AVG_GLYPH_WIDTH: f32 = 0.5;

struct Writer {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    regular_id: Ref,
    bold_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
}

impl Writer {
    fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let regular_id = Ref::new(3);
        let bold_id = Ref::new(4);

        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            regular_id,
            bold_id,
            page_refs: Vec::new(),
            next_id: 5,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn page(&mut self, page: &Page) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        {
            let mut writer = self.pdf.page(page_id);
            writer.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
                .contents(content_id);

            writer.resources().fonts()
                .pair(REGULAR, self.regular_id)
                .pair(BOLD, self.bold_id);
        }

        let mut content = Content::new();
        for op in &page.ops {
            match op {
                Op::Text { x, y, size, font, centered, text } => {
                    let x = if *centered { x - text_width(text, *size) / 2.0 } else { *x };
                    draw_text(&mut content, x, *y, *size, *font, text);
                },
                Op::Table { x, bottom, columns, rows } => draw_table(&mut content, *x, *bottom, columns, rows),
            }
        }

        self.pdf.stream(content_id, &content.finish());
    }

    fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf.pages(self.pages_id)
            .count(self.page_refs.len() as i32)
            .kids(self.page_refs.iter().copied());

        self.pdf.finish()
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Latin-1 subset of WinAnsi, anything outside prints as `?`
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn draw_text(content: &mut Content, x: f32, y: f32, size: f32, font: Font, text: &str) {
    let font = match font {
        Font::Regular => REGULAR,
        Font::Bold => BOLD,
    };
    let encoded = encode_text(text);

    content.begin_text();
    content.set_font(font, size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(&encoded));
    content.end_text();
}

fn fill_row(content: &mut Content, x: f32, y: f32, width: f32, rgb: (f32, f32, f32)) {
    content.save_state();
    content.set_fill_rgb(rgb.0, rgb.1, rgb.2);
    content.rect(x, y, width, ROW_HEIGHT);
    content.fill_nonzero();
    content.restore_state();
}

fn draw_table(content: &mut Content, x: f32, bottom: f32, columns: &[f32], rows: &[Vec<String>]) {
    let width = columns.iter().sum::<f32>();
    let last = rows.len().saturating_sub(1);

    for (i, row) in rows.iter().enumerate() {
        let y = bottom + (rows.len() - 1 - i) as f32 * ROW_HEIGHT;

        if i == 0 {
            // light blue header
            fill_row(content, x, y, width, (0.68, 0.85, 0.90));
        } else if i == last {
            // light grey totals
            fill_row(content, x, y, width, (0.83, 0.83, 0.83));
        }

        let font = if i == 0 { Font::Bold } else { Font::Regular };
        let mut cell_x = x;
        for (cell, w) in row.iter().zip(columns) {
            draw_text(content, cell_x + 4.0, y + 5.0, TABLE_FONT_SIZE, font, cell);

            content.save_state();
            content.set_stroke_rgb(0.0, 0.0, 0.0);
            content.rect(cell_x, y, *w, ROW_HEIGHT);
            content.stroke();
            content.restore_state();

            cell_x += w;
        }
    }
}

/// Encodes the laid out pages as a PDF document
pub fn encode(pages: &[Page]) -> Vec<u8> {
    let mut writer = Writer::new();

    for page in pages {
        writer.page(page);
    }

    writer.finish()
}
