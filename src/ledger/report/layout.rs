//! Greedy top-down placement of a weekly report onto A4 pages.
//!
//! Each section checks the room left on the current page before drawing and starts
//! a fresh page (header included) when it runs short. Nothing is ever moved back.

use super::{ReportSections, WorkerSection};
use crate::utils::format_amount;

pub const CM: f32 = 28.3465;

pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

const LEFT: f32 = 2.0 * CM;
const INDENT: f32 = 2.5 * CM;
const BODY_TOP: f32 = PAGE_HEIGHT - 4.0 * CM;

/// Room a new section needs before it may start on the current page
const SECTION_MIN: f32 = 6.0 * CM;
/// Room a table needs below it
const TABLE_MIN: f32 = 4.0 * CM;
/// Room a single list line needs
const LINE_MIN: f32 = 3.0 * CM;

pub const ROW_HEIGHT: f32 = 0.6 * CM;
pub const COLUMN_WIDTHS: [f32; 3] = [6.0 * CM, 4.0 * CM, 4.0 * CM];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        centered: bool,
        text: String,
    },
    /// First row is the column header, last row the totals
    Table {
        x: f32,
        bottom: f32,
        columns: Vec<f32>,
        rows: Vec<Vec<String>>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
}

struct Layout<'a> {
    sections: &'a ReportSections,
    pages: Vec<Page>,
    y: f32,
}

impl<'a> Layout<'a> {
    fn new(sections: &'a ReportSections) -> Self {
        let mut layout = Self {
            sections,
            pages: Vec::new(),
            y: BODY_TOP,
        };
        layout.new_page();
        layout
    }

    fn new_page(&mut self) {
        let mut page = Page::default();

        page.ops.push(Op::Text {
            x: PAGE_WIDTH / 2.0,
            y: PAGE_HEIGHT - 2.0 * CM,
            size: 16.0,
            font: Font::Bold,
            centered: true,
            text: format!("Weekly Report - Week {}", self.sections.week_number),
        });
        page.ops.push(Op::Text {
            x: PAGE_WIDTH / 2.0,
            y: PAGE_HEIGHT - 2.7 * CM,
            size: 12.0,
            font: Font::Regular,
            centered: true,
            text: format!("Contract: {}", self.sections.contract_name),
        });

        self.pages.push(page);
        self.y = BODY_TOP;
    }

    fn ensure(&mut self, room: f32) {
        if self.y < room {
            self.new_page();
        }
    }

    fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, x: f32, size: f32, font: Font, text: String) {
        let y = self.y;
        self.push(Op::Text { x, y, size, font, centered: false, text });
    }

    fn worker(&mut self, worker: &WorkerSection) {
        self.ensure(SECTION_MIN);

        self.text(LEFT, 13.0, Font::Bold, format!("Worker: {}", worker.name));
        self.y -= CM;

        let rows = worker_rows(worker);
        let table_height = rows.len() as f32 * ROW_HEIGHT + CM;
        if self.y - table_height < TABLE_MIN {
            self.new_page();
        }

        let row_count = rows.len() as f32;
        let bottom = self.y - row_count * ROW_HEIGHT;
        self.push(Op::Table {
            x: LEFT,
            bottom,
            columns: COLUMN_WIDTHS.to_vec(),
            rows,
        });
        self.y -= (row_count + 1.5) * ROW_HEIGHT;
    }

    fn list(&mut self, heading: &str, gap_before: f32, lines: &[String]) {
        if lines.is_empty() {
            return;
        }

        self.ensure(SECTION_MIN);
        self.y -= gap_before;
        self.text(LEFT, 12.0, Font::Bold, heading.to_string());
        self.y -= 0.7 * CM;

        for line in lines {
            self.ensure(LINE_MIN);
            self.text(INDENT, 11.0, Font::Regular, line.clone());
            self.y -= 0.5 * CM;
        }
    }
}

fn worker_rows(worker: &WorkerSection) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(worker.days.len() + 2);

    rows.push(vec!["Day".to_string(), "Units".to_string(), "Pay".to_string()]);
    rows.extend(worker.days.iter().map(|day| vec![
        day.day.clone(),
        day.units.to_string(),
        format_amount(day.pay),
    ]));
    rows.push(vec!["Total".to_string(), worker.total_units.to_string(), format_amount(worker.total_pay)]);

    rows
}

pub fn layout(sections: &ReportSections) -> Vec<Page> {
    let mut layout = Layout::new(sections);

    for worker in &sections.workers {
        layout.worker(worker);
    }

    layout.list("Non-working days:", 0.0, &sections.non_working_days);
    layout.list("Recorded expenses:", CM, &sections.expenses);

    layout.pages
}
