//! Renders the full expense record set into a paginated, styled PDF report
//! and serves it as a file download.
//!
//! The report is assembled on letter pages with half-inch margins: a bold
//! title, a "Generated on" subtitle, a bordered table with one row per
//! expense, and a total line below the table. Rows are atomic with respect
//! to page breaks, a row that does not fit starts the next page.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
    path::PaintMode,
};
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{AppState, Error, models::Expense, stores::ExpenseStore};

/// Letter page width.
const PAGE_WIDTH: Mm = Mm(215.9);
/// Letter page height.
const PAGE_HEIGHT: Mm = Mm(279.4);
/// Half-inch margin on all sides.
const MARGIN: Mm = Mm(12.7);

const TITLE_FONT_SIZE: f32 = 18.0;
const SUBTITLE_FONT_SIZE: f32 = 11.0;
const CELL_FONT_SIZE: f32 = 10.0;
const TOTAL_FONT_SIZE: f32 = 13.0;

/// Vertical gap between the title and the subtitle (0.2 inch).
const TITLE_SPACER: f32 = 5.08;
/// Vertical gap between the subtitle and the table, and between the table
/// and the total line (0.4 inch).
const SECTION_SPACER: f32 = 10.16;

/// The height of a data row.
const ROW_HEIGHT: Mm = Mm(9.0);
/// The height of the table header row, slightly taller than a data row for
/// extra bottom padding.
const HEADER_ROW_HEIGHT: Mm = Mm(10.5);

/// The stroke weight of the cell grid, in points.
const GRID_WEIGHT: f32 = 1.0;

/// Per-column share of the table width.
const COLUMN_WEIGHTS: [f32; 5] = [0.10, 0.34, 0.16, 0.22, 0.18];

const HEADER_LABELS: [&str; 5] = ["ID", "Title", "Amount ($)", "Category", "Date"];

/// The long-form date used in the subtitle, e.g. "January 05, 2024".
const SUBTITLE_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day], [year]");

/// The format for expense dates in table cells, e.g. "2024-01-05".
const CELL_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Indigo fill behind the table header row (#4F46E5).
fn header_fill() -> Color {
    Color::Rgb(Rgb::new(0.310, 0.275, 0.898, None))
}

/// Near-white text on the table header row.
fn header_text() -> Color {
    Color::Rgb(Rgb::new(0.961, 0.961, 0.961, None))
}

/// Light grey fill behind the data rows (#F3F4F6).
fn row_fill() -> Color {
    Color::Rgb(Rgb::new(0.953, 0.957, 0.965, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

fn report_error(error: impl std::fmt::Display) -> Error {
    Error::ReportError(error.to_string())
}

/// The vertical space consumed by the title and subtitle block at the top of
/// the first page.
fn title_block_height() -> f32 {
    pt_to_mm(TITLE_FONT_SIZE) + TITLE_SPACER + pt_to_mm(SUBTITLE_FONT_SIZE) + SECTION_SPACER
}

/// The number of data rows that fit on the first page, below the title block
/// and the table header row.
fn first_page_row_capacity() -> usize {
    let available = PAGE_HEIGHT.0 - 2.0 * MARGIN.0 - title_block_height() - HEADER_ROW_HEIGHT.0;

    (available / ROW_HEIGHT.0) as usize
}

/// The number of data rows that fit on an overflow page.
fn overflow_page_row_capacity() -> usize {
    ((PAGE_HEIGHT.0 - 2.0 * MARGIN.0) / ROW_HEIGHT.0) as usize
}

/// Assign `row_count` table rows to pages, never splitting a row.
///
/// Returns the number of rows on each page. There is always at least one
/// page, so an empty record set yields a single page with zero rows.
fn layout_rows(row_count: usize) -> Vec<usize> {
    let first_page_rows = row_count.min(first_page_row_capacity());
    let mut pages = vec![first_page_rows];

    let mut remaining = row_count - first_page_rows;
    while remaining > 0 {
        let page_rows = remaining.min(overflow_page_row_capacity());
        pages.push(page_rows);
        remaining -= page_rows;
    }

    pages
}

/// Format `expenses` as table cell text: amounts to two decimal places and
/// dates as `YYYY-MM-DD`.
fn table_rows(expenses: &[Expense]) -> Result<Vec<[String; 5]>, Error> {
    expenses
        .iter()
        .map(|expense| {
            Ok([
                expense.id.to_string(),
                expense.title.clone(),
                format!("{:.2}", expense.amount),
                expense.category.clone(),
                expense.date.format(CELL_DATE_FORMAT).map_err(report_error)?,
            ])
        })
        .collect()
}

/// The summary line below the table.
///
/// The total is the arithmetic sum of the amounts over exactly the record
/// set rendered in the table.
fn total_line(expenses: &[Expense]) -> String {
    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();

    format!("Total Expenses: ${total:.2}")
}

/// Approximate the width of `text` rendered in Helvetica at `font_size`.
///
/// printpdf does not expose glyph metrics for the built-in fonts, so cell
/// centering assumes an average advance of half the font size per glyph.
fn approximate_text_width(text: &str, font_size: f32) -> f32 {
    pt_to_mm(text.chars().count() as f32 * font_size * 0.5)
}

/// Shorten `text` so its approximate rendered width fits within `max_width`.
///
/// Text that would overflow is cut and given a trailing ellipsis so it never
/// paints over the neighboring column.
fn fit_text(text: &str, font_size: f32, max_width: f32) -> String {
    let glyph_capacity = (max_width / pt_to_mm(font_size * 0.5)) as usize;
    if text.chars().count() <= glyph_capacity {
        return text.to_owned();
    }

    let kept: String = text.chars().take(glyph_capacity.saturating_sub(3)).collect();

    format!("{kept}...")
}

fn column_widths() -> [f32; 5] {
    let content_width = PAGE_WIDTH.0 - 2.0 * MARGIN.0;

    COLUMN_WEIGHTS.map(|weight| weight * content_width)
}

/// Paint one table row with `y_bottom` as the bottom edge of its cells.
///
/// Every cell gets a background fill, a grid border and center-aligned text.
/// Cell text that would overflow the column is shortened with an ellipsis.
fn draw_table_row(
    layer: &PdfLayerReference,
    y_bottom: f32,
    height: f32,
    cells: &[String; 5],
    font: &IndirectFontRef,
    fill: Color,
    text_color: Color,
) {
    let mut x = MARGIN.0;

    for (cell, width) in cells.iter().zip(column_widths()) {
        layer.set_fill_color(fill.clone());
        layer.set_outline_color(black());
        layer.set_outline_thickness(GRID_WEIGHT);
        layer.add_rect(
            Rect::new(Mm(x), Mm(y_bottom), Mm(x + width), Mm(y_bottom + height))
                .with_mode(PaintMode::FillStroke),
        );

        let text = fit_text(cell, CELL_FONT_SIZE, width - 2.0);
        let text_width = approximate_text_width(&text, CELL_FONT_SIZE);
        let text_x = x + ((width - text_width) / 2.0).max(1.0);
        let baseline = y_bottom + (height - pt_to_mm(CELL_FONT_SIZE)) / 2.0 + 1.0;

        layer.set_fill_color(text_color.clone());
        layer.use_text(text, CELL_FONT_SIZE, Mm(text_x), Mm(baseline), font);

        x += width;
    }
}

/// Render `expenses` as a paginated PDF report.
///
/// `generated_on` is the date shown in the subtitle. An empty record set
/// still produces a valid document with the title, subtitle, table header
/// and a total of zero.
///
/// # Errors
/// This function will return an [Error::ReportError] if document assembly
/// fails. No partial document is returned.
pub fn render_report(expenses: &[Expense], generated_on: Date) -> Result<Vec<u8>, Error> {
    let (document, first_page, first_layer) =
        PdfDocument::new("Expense Report", PAGE_WIDTH, PAGE_HEIGHT, "Page 1");

    let regular = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(report_error)?;
    let bold = document
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(report_error)?;

    let rows = table_rows(expenses)?;
    let pages = layout_rows(rows.len());

    let mut layer = document.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT.0 - MARGIN.0;

    // Title and subtitle.
    y -= pt_to_mm(TITLE_FONT_SIZE);
    layer.set_fill_color(black());
    layer.use_text("Expense Report", TITLE_FONT_SIZE, MARGIN, Mm(y), &bold);

    y -= TITLE_SPACER + pt_to_mm(SUBTITLE_FONT_SIZE);
    let subtitle = format!(
        "Generated on: {}",
        generated_on
            .format(SUBTITLE_DATE_FORMAT)
            .map_err(report_error)?
    );
    layer.use_text(subtitle, SUBTITLE_FONT_SIZE, MARGIN, Mm(y), &regular);
    y -= SECTION_SPACER;

    // Table header. Overflow pages continue with data rows only.
    y -= HEADER_ROW_HEIGHT.0;
    let header_cells = HEADER_LABELS.map(|label| label.to_owned());
    draw_table_row(
        &layer,
        y,
        HEADER_ROW_HEIGHT.0,
        &header_cells,
        &bold,
        header_fill(),
        header_text(),
    );

    let mut next_row = 0;
    for (page_index, &row_count) in pages.iter().enumerate() {
        if page_index > 0 {
            let (page, layer_index) = document.add_page(
                PAGE_WIDTH,
                PAGE_HEIGHT,
                format!("Page {}", page_index + 1),
            );
            layer = document.get_page(page).get_layer(layer_index);
            y = PAGE_HEIGHT.0 - MARGIN.0;
        }

        for row in &rows[next_row..next_row + row_count] {
            y -= ROW_HEIGHT.0;
            draw_table_row(&layer, y, ROW_HEIGHT.0, row, &regular, row_fill(), black());
        }

        next_row += row_count;
    }

    // Total line, moved to a fresh page if the last table page is full.
    y -= SECTION_SPACER + pt_to_mm(TOTAL_FONT_SIZE);
    if y < MARGIN.0 {
        let (page, layer_index) = document.add_page(
            PAGE_WIDTH,
            PAGE_HEIGHT,
            format!("Page {}", pages.len() + 1),
        );
        layer = document.get_page(page).get_layer(layer_index);
        y = PAGE_HEIGHT.0 - MARGIN.0 - pt_to_mm(TOTAL_FONT_SIZE);
    }

    layer.set_fill_color(black());
    layer.use_text(total_line(expenses), TOTAL_FONT_SIZE, MARGIN, Mm(y), &bold);

    document.save_to_bytes().map_err(report_error)
}

/// A route handler for downloading every expense as a PDF report.
pub async fn export_pdf_endpoint<E>(State(state): State<AppState<E>>) -> Response
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    let expenses = match state.expense_store.get_all() {
        Ok(expenses) => expenses,
        Err(error) => {
            tracing::error!("An unexpected error occurred while listing expenses: {error}");
            return error.into_response();
        }
    };

    let generated_on = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date();

    match render_report(&expenses, generated_on) {
        Ok(bytes) => (
            [
                (CONTENT_TYPE, "application/pdf"),
                (CONTENT_DISPOSITION, "attachment; filename=expenses.pdf"),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while rendering the PDF report: {error}");
            error.into_response()
        }
    }
}
