// Row-based tables with wrapping cells, column spans and page breaks

use super::canvas::{Align, Canvas, Rgb8, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::metrics::{baseline_offset_mm, line_height_mm, wrap_text, FontWeight};
use tracing::debug;

/// Page margin used by tables on every side (40pt)
pub const TABLE_MARGIN_MM: f32 = 40.0 * 25.4 / 72.0;

/// Fill for alternating body rows of a striped table
const STRIPE_FILL: Rgb8 = Rgb8(245, 245, 245);

#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    /// Number of columns this cell covers
    pub col_span: usize,
    pub weight: FontWeight,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Cell {
            text: text.into(),
            col_span: 1,
            weight: FontWeight::Regular,
        }
    }

    pub fn span(mut self, columns: usize) -> Self {
        self.col_span = columns.max(1);
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row { cells }
    }

    /// Row of plain single-column cells.
    pub fn plain<S: AsRef<str>>(values: &[S]) -> Self {
        Row::new(values.iter().map(|v| Cell::new(v.as_ref())).collect())
    }
}

/// Table layout and content. Head rows repeat at the top of every page the
/// table runs onto; foot rows are drawn once after the body.
pub struct Table {
    /// Column widths in mm
    pub columns: Vec<f32>,
    pub head: Vec<Row>,
    pub body: Vec<Row>,
    pub foot: Vec<Row>,
    pub font_size: f32,
    /// Padding on all four sides, in mm
    pub padding: f32,
    pub head_fill: Option<Rgb8>,
    pub foot_fill: Option<Rgb8>,
    /// Shade every other body row
    pub striped: bool,
}

impl Table {
    /// Table spanning the page between the standard margins, with columns
    /// sized by the given ratios.
    pub fn with_ratios(ratios: &[f32]) -> Self {
        let available = PAGE_WIDTH_MM - 2.0 * TABLE_MARGIN_MM;
        let total: f32 = ratios.iter().sum();
        Table {
            columns: ratios.iter().map(|r| available * r / total).collect(),
            head: Vec::new(),
            body: Vec::new(),
            foot: Vec::new(),
            font_size: 10.0,
            padding: 1.76,
            head_fill: None,
            foot_fill: None,
            striped: true,
        }
    }

    pub fn width(&self) -> f32 {
        self.columns.iter().sum()
    }

    /// (x offset, width) of each cell in the row, honouring spans.
    fn cell_boxes(&self, row: &Row) -> Vec<(f32, f32)> {
        let mut boxes = Vec::with_capacity(row.cells.len());
        let mut col = 0;
        let mut x = 0.0;
        for cell in &row.cells {
            let end = (col + cell.col_span).min(self.columns.len());
            let width: f32 = self.columns[col.min(end)..end].iter().sum();
            boxes.push((x, width));
            x += width;
            col = end;
        }
        boxes
    }

    fn wrapped(&self, row: &Row, weight_override: Option<FontWeight>) -> Vec<Vec<String>> {
        self.cell_boxes(row)
            .iter()
            .zip(&row.cells)
            .map(|(&(_, width), cell)| {
                let weight = weight_override.unwrap_or(cell.weight);
                wrap_text(&cell.text, width - 2.0 * self.padding, weight, self.font_size)
            })
            .collect()
    }

    /// Height of a row once its cells are wrapped.
    pub fn row_height(&self, row: &Row, weight_override: Option<FontWeight>) -> f32 {
        let lines = self
            .wrapped(row, weight_override)
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(1)
            .max(1);
        lines as f32 * line_height_mm(self.font_size) + 2.0 * self.padding
    }

    /// Height of the head rows, repeated at the top of continuation pages.
    fn head_height(&self) -> f32 {
        self.head.iter().map(|row| self.row_height(row, Some(FontWeight::Bold))).sum()
    }

    /// Splits the table into per-page row segments starting at `start_y`.
    /// A row that fits on a fresh page is moved there whole; a taller row is
    /// cut between lines and continued below the repeated head rows.
    pub fn layout(&self, start_y: f32) -> TableLayout<'_> {
        let mut pager = Pager {
            table: self,
            segments: Vec::new(),
            y: start_y,
            new_page: false,
            at_top: false,
        };

        for row in &self.head {
            pager.place(row, Some(FontWeight::Bold), self.head_fill, false);
        }
        for (index, row) in self.body.iter().enumerate() {
            let fill = if self.striped && index % 2 == 0 { Some(STRIPE_FILL) } else { None };
            pager.place(row, None, fill, true);
        }
        for row in &self.foot {
            pager.place(row, None, self.foot_fill, false);
        }

        TableLayout {
            end_y: pager.y,
            segments: pager.segments,
        }
    }

    /// Draws the table with its top edge at `start_y` and returns the y
    /// just below the last row (on whichever page that ends up being).
    pub fn draw(&self, canvas: &mut Canvas, start_y: f32) -> f32 {
        let layout = self.layout(start_y);
        for segment in &layout.segments {
            if segment.new_page {
                canvas.add_page();
            }
            self.draw_segment(canvas, segment);
        }
        layout.end_y
    }

    fn draw_segment(&self, canvas: &mut Canvas, segment: &Segment<'_>) {
        let left = TABLE_MARGIN_MM;

        if let Some(color) = segment.fill {
            canvas.fill_rect(left, segment.y, self.width(), segment.height, color);
        }

        let line_height = line_height_mm(self.font_size);
        let baseline = segment.y + self.padding + baseline_offset_mm(self.font_size);

        for (((x, _), cell), lines) in self
            .cell_boxes(segment.row)
            .into_iter()
            .zip(&segment.row.cells)
            .zip(&segment.lines)
        {
            let weight = segment.weight.unwrap_or(cell.weight);
            for (i, line) in lines.iter().enumerate() {
                canvas.text(
                    line,
                    self.font_size,
                    weight,
                    left + x + self.padding,
                    baseline + i as f32 * line_height,
                    Align::Left,
                );
            }
        }
    }
}

/// The part of one row drawn on one page.
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    pub row: &'a Row,
    /// Start a new page before drawing this segment
    pub new_page: bool,
    pub y: f32,
    pub height: f32,
    /// Wrapped lines of each cell that fall in this segment
    pub lines: Vec<Vec<String>>,
    pub fill: Option<Rgb8>,
    pub weight: Option<FontWeight>,
}

#[derive(Debug, Clone)]
pub struct TableLayout<'a> {
    pub segments: Vec<Segment<'a>>,
    /// Bottom edge of the last segment
    pub end_y: f32,
}

impl TableLayout<'_> {
    /// Number of pages the table starts beyond the one it began on.
    pub fn page_breaks(&self) -> usize {
        self.segments.iter().filter(|s| s.new_page).count()
    }
}

struct Pager<'a> {
    table: &'a Table,
    segments: Vec<Segment<'a>>,
    y: f32,
    /// Next segment goes on a new page
    new_page: bool,
    /// Nothing but repeated head rows on the current page so far
    at_top: bool,
}

impl<'a> Pager<'a> {
    fn bottom_limit() -> f32 {
        PAGE_HEIGHT_MM - TABLE_MARGIN_MM
    }

    fn place(&mut self, row: &'a Row, weight: Option<FontWeight>, fill: Option<Rgb8>, repeat_head: bool) {
        let table = self.table;
        let wrapped = table.wrapped(row, weight);
        let total = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let line_height = line_height_mm(table.font_size);
        let padding = 2.0 * table.padding;
        let fresh_top = TABLE_MARGIN_MM + if repeat_head { table.head_height() } else { 0.0 };

        let mut start = 0;
        loop {
            let remaining = total - start;
            let room = Self::bottom_limit() - self.y;
            if remaining as f32 * line_height + padding <= room {
                self.push(row, &wrapped, start, remaining, weight, fill);
                return;
            }

            let fits_fresh_page = fresh_top + remaining as f32 * line_height + padding <= Self::bottom_limit();
            let fitting = ((room - padding) / line_height).floor().max(0.0) as usize;
            if !self.at_top && ((start == 0 && fits_fresh_page) || fitting == 0) {
                self.break_page(repeat_head);
                continue;
            }

            let take = fitting.clamp(1, remaining);
            self.push(row, &wrapped, start, take, weight, fill);
            start += take;
            if start >= total {
                return;
            }
            self.break_page(repeat_head);
        }
    }

    fn push(
        &mut self,
        row: &'a Row,
        wrapped: &[Vec<String>],
        start: usize,
        count: usize,
        weight: Option<FontWeight>,
        fill: Option<Rgb8>,
    ) {
        let lines = wrapped
            .iter()
            .map(|cell| {
                let from = start.min(cell.len());
                let to = (start + count).min(cell.len());
                cell[from..to].to_vec()
            })
            .collect();
        let height = count as f32 * line_height_mm(self.table.font_size) + 2.0 * self.table.padding;
        self.segments.push(Segment {
            row,
            new_page: std::mem::take(&mut self.new_page),
            y: self.y,
            height,
            lines,
            fill,
            weight,
        });
        self.y += height;
        self.at_top = false;
    }

    fn break_page(&mut self, repeat_head: bool) {
        debug!("Table continues on a new page");
        self.new_page = true;
        self.y = TABLE_MARGIN_MM;
        if repeat_head {
            let table = self.table;
            for head in &table.head {
                let wrapped = table.wrapped(head, Some(FontWeight::Bold));
                let count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
                self.push(head, &wrapped, 0, count, Some(FontWeight::Bold), table.head_fill);
            }
        }
        self.at_top = true;
    }
}
