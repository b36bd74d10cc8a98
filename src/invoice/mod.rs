// Invoice document builder: lays out the PDF and hands it to a sink

pub mod canvas;
pub mod gallery;
pub mod metrics;
pub mod sink;
pub mod table;

use chrono::NaiveDate;
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, CompanyProfile};
use crate::error::AppError;
use crate::format::{format_fixed_price, format_invoice_date, format_price, generate_invoice_number, today};
use crate::listing::ListingRecord;
use canvas::{Align, Canvas, Rgb8, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use gallery::{GalleryAssembler, CONTINUATION_TITLE_Y, IMAGE_HEIGHT_MM, IMAGE_OPACITY, IMAGE_WIDTH_MM, MAX_GALLERY_IMAGES, TITLE_TO_ROW_MM};
use metrics::FontWeight;
use table::{Cell, Row, Table};

pub use gallery::{FinalizePolicy, HttpImageLoader, ImageLoader};
pub use sink::{DirectorySink, DocumentSink, MemorySink, SavedDocument};

// ============================================================================
// Layout Constants
// ============================================================================

/// Font sizes in points
const TITLE_FONT_SIZE: f32 = 14.0;
const BODY_FONT_SIZE: f32 = 12.0;

/// Company block, left aligned
const HEADER_X_MM: f32 = 10.0;
const HEADER_LINE_Y: [f32; 4] = [20.0, 27.0, 34.0, 41.0];

/// Invoice details block, right aligned this far from the right edge
const DETAILS_RIGHT_MARGIN_MM: f32 = 20.0;
const DETAILS_LINE_Y: [f32; 5] = [20.0, 27.0, 34.0, 41.0, 48.0];

const SUMMARY_TABLE_Y: f32 = 58.0;
const TABLE_CELL_PADDING_MM: f32 = 4.0;

/// Header and footer fill of the summary table
const ACCENT_FILL: Rgb8 = Rgb8(255, 204, 153);

/// Offsets below the previous table for a section title and its content
const SECTION_TITLE_GAP_MM: f32 = 10.0;
const SECTION_CONTENT_GAP_MM: f32 = 20.0;

/// The photo section moves to a new page when it would start below this
const GALLERY_START_LIMIT_MM: f32 = PAGE_HEIGHT_MM - 40.0;

const DETAILS_TITLE: &str = "Full Item Details";
const PHOTOS_TITLE: &str = "Item Photos";

// ============================================================================
// Data Structures
// ============================================================================

/// Per-document identity printed in the details block.
#[derive(Debug, Clone)]
pub struct InvoiceMeta {
    pub invoice_number: String,
    pub date: NaiveDate,
}

impl InvoiceMeta {
    pub fn generate() -> Self {
        InvoiceMeta {
            invoice_number: generate_invoice_number(),
            date: today(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// No listing was supplied; nothing was drawn or saved.
    Skipped,
    Saved {
        file_name: String,
        pages: usize,
        images_placed: usize,
    },
    /// The gallery never reached its finalization trigger, so the document
    /// was not saved.
    Abandoned { images_placed: usize },
}

/// Seam between the modal controller and document generation.
pub trait DocumentBuilder {
    fn build(
        &self,
        listing: Option<&ListingRecord>,
        name: &str,
        email: &str,
    ) -> Result<BuildOutcome, AppError>;
}

pub struct InvoiceBuilder<'a> {
    company: CompanyProfile,
    policy: FinalizePolicy,
    loader: Arc<dyn ImageLoader>,
    sink: &'a dyn DocumentSink,
}

impl DocumentBuilder for InvoiceBuilder<'_> {
    fn build(
        &self,
        listing: Option<&ListingRecord>,
        name: &str,
        email: &str,
    ) -> Result<BuildOutcome, AppError> {
        self.build_with_meta(listing, &InvoiceMeta::generate(), name, email)
    }
}

// ============================================================================
// Document Assembly
// ============================================================================

impl<'a> InvoiceBuilder<'a> {
    pub fn new(config: &AppConfig, loader: Arc<dyn ImageLoader>, sink: &'a dyn DocumentSink) -> Self {
        InvoiceBuilder {
            company: config.company.clone(),
            policy: config.finalize,
            loader,
            sink,
        }
    }

    pub fn build_with_meta(
        &self,
        listing: Option<&ListingRecord>,
        meta: &InvoiceMeta,
        name: &str,
        email: &str,
    ) -> Result<BuildOutcome, AppError> {
        let Some(listing) = listing else {
            debug!("No listing supplied; skipping invoice build");
            return Ok(BuildOutcome::Skipped);
        };
        info!("Building invoice {} for listing {}", meta.invoice_number, listing.id);

        let (canvas, details_end) = self.draw_text_sections(listing, meta, name, email)?;

        let file_name = invoice_file_name(name);
        let sources: Vec<&str> = listing
            .image_urls
            .iter()
            .take(MAX_GALLERY_IMAGES)
            .map(String::as_str)
            .collect();

        if sources.is_empty() {
            return self.finish(canvas, &file_name, 0);
        }
        self.draw_gallery(canvas, &sources, details_end, &file_name)
    }

    /// Lays out everything except the photos: company block, invoice
    /// details and both tables. Returns the y just below the detail table.
    pub fn draw_text_sections(
        &self,
        listing: &ListingRecord,
        meta: &InvoiceMeta,
        name: &str,
        email: &str,
    ) -> Result<(Canvas, f32), AppError> {
        let mut canvas = Canvas::new(&format!("Garage Listing Invoice for {}", name))?;

        draw_company_block(&mut canvas, &self.company);
        draw_invoice_details(&mut canvas, listing, meta, name, email);

        let summary_end = summary_table(listing).draw(&mut canvas, SUMMARY_TABLE_Y);

        canvas.text(
            DETAILS_TITLE,
            TITLE_FONT_SIZE,
            FontWeight::Bold,
            PAGE_WIDTH_MM / 2.0,
            summary_end + SECTION_TITLE_GAP_MM,
            Align::Center,
        );
        let details_end = detail_table(listing).draw(&mut canvas, summary_end + SECTION_CONTENT_GAP_MM);
        Ok((canvas, details_end))
    }

    /// Starts one detached loader per photo and places each as it arrives.
    /// Returns as soon as the finalization trigger fires, or once every
    /// loader has reported without it firing. Loads still running after
    /// the save finish on their own and are ignored.
    fn draw_gallery(
        &self,
        mut canvas: Canvas,
        sources: &[&str],
        details_end: f32,
        file_name: &str,
    ) -> Result<BuildOutcome, AppError> {
        let mut section_y = details_end + SECTION_CONTENT_GAP_MM;
        if section_y > GALLERY_START_LIMIT_MM {
            canvas.add_page();
            section_y = CONTINUATION_TITLE_Y;
        }
        draw_photos_title(&mut canvas, section_y);

        let mut assembler = GalleryAssembler::new(self.policy, sources.len(), section_y + TITLE_TO_ROW_MM);

        let (tx, rx) = mpsc::channel();
        for (index, source) in sources.iter().enumerate() {
            let tx = tx.clone();
            let loader = Arc::clone(&self.loader);
            let source = source.to_string();
            thread::Builder::new()
                .name(format!("photo-{}", index))
                .spawn(move || {
                    // receiver is gone once the document has been saved
                    let _ = tx.send((index, loader.load(&source)));
                })?;
        }
        drop(tx);

        let mut placed = 0;
        for (index, result) in rx {
            let image = match result {
                Ok(image) => Some(image),
                Err(e) => {
                    gallery::report_failure(index, sources[index], &e);
                    None
                }
            };

            let step = assembler.on_complete(index, image.is_some());
            if let (Some(slot), Some(image)) = (step.place, image.as_ref()) {
                if slot.new_page {
                    canvas.add_page();
                    draw_photos_title(&mut canvas, CONTINUATION_TITLE_Y);
                }
                canvas.image(image, slot.x, slot.y, IMAGE_WIDTH_MM, IMAGE_HEIGHT_MM, IMAGE_OPACITY);
                placed += 1;
            }

            if step.finalize {
                return self.finish(canvas, file_name, placed);
            }
        }

        warn!(
            "Invoice {} was never saved: finalization trigger did not fire ({} of {} photos placed)",
            file_name,
            placed,
            sources.len()
        );
        Ok(BuildOutcome::Abandoned { images_placed: placed })
    }

    fn finish(&self, canvas: Canvas, file_name: &str, images_placed: usize) -> Result<BuildOutcome, AppError> {
        let pages = canvas.page_count();
        let bytes = canvas.finish()?;
        self.sink.save(file_name, &bytes)?;
        info!("Invoice {} finalized: {} page(s), {} photo(s)", file_name, pages, images_placed);
        Ok(BuildOutcome::Saved {
            file_name: file_name.to_string(),
            pages,
            images_placed,
        })
    }
}

// ============================================================================
// Sections
// ============================================================================

fn draw_company_block(canvas: &mut Canvas, company: &CompanyProfile) {
    canvas.text(&company.name, TITLE_FONT_SIZE, FontWeight::Bold, HEADER_X_MM, HEADER_LINE_Y[0], Align::Left);

    let lines = [
        format!("Website: {}", company.website),
        format!("Phone: {}", company.phone),
        format!("Address: {}", company.address),
    ];
    for (line, y) in lines.iter().zip(&HEADER_LINE_Y[1..]) {
        canvas.text(line, BODY_FONT_SIZE, FontWeight::Regular, HEADER_X_MM, *y, Align::Left);
    }
}

fn draw_invoice_details(canvas: &mut Canvas, listing: &ListingRecord, meta: &InvoiceMeta, name: &str, email: &str) {
    let right_x = PAGE_WIDTH_MM - DETAILS_RIGHT_MARGIN_MM;
    let lines = [
        format!("Invoice #: {}", meta.invoice_number),
        format!("Date: {}", format_invoice_date(&meta.date)),
        format!("Balance Due: {}", format_price(listing.selling_price)),
        format!("Bill To: {}", name),
        format!("Email: {}", email),
    ];
    for (line, y) in lines.iter().zip(DETAILS_LINE_Y) {
        canvas.text(line, BODY_FONT_SIZE, FontWeight::Regular, right_x, y, Align::Right);
    }
}

fn draw_photos_title(canvas: &mut Canvas, y: f32) {
    canvas.text(PHOTOS_TITLE, TITLE_FONT_SIZE, FontWeight::Bold, PAGE_WIDTH_MM / 2.0, y, Align::Center);
}

fn summary_table(listing: &ListingRecord) -> Table {
    let price = format_price(listing.selling_price);

    let mut table = Table::with_ratios(&[3.0, 1.0, 1.0]);
    table.font_size = BODY_FONT_SIZE;
    table.padding = TABLE_CELL_PADDING_MM;
    table.head_fill = Some(ACCENT_FILL);
    table.foot_fill = Some(ACCENT_FILL);

    table.head.push(Row::plain(&["Item", "Quantity", "Price"]));
    table.body.push(Row::plain(&[listing.listing_title.as_str(), "1", price.as_str()]));
    table.foot = vec![
        Row::new(vec![Cell::new("Subtotal").span(2), Cell::new(price.as_str())]),
        Row::new(vec![Cell::new("Tax").span(2), Cell::new("$0.00")]),
        Row::new(vec![Cell::new("Total").span(2).bold(), Cell::new(price.as_str())]),
    ];
    table
}

/// Key/value rows for the full item details table.
pub fn detail_rows(listing: &ListingRecord) -> Vec<(&'static str, String)> {
    vec![
        ("Item", listing.listing_title.clone()),
        ("Quantity", "1".to_string()),
        ("Price", format_fixed_price(listing.selling_price)),
        ("Brand", listing.item_brand.clone()),
        ("Description", listing.listing_description.clone()),
        ("Shippable", listing.shippable_display().to_string()),
        ("Weight", listing.weight_display()),
        ("Location", listing.compose_location()),
    ]
}

fn detail_table(listing: &ListingRecord) -> Table {
    let mut table = Table::with_ratios(&[1.0, 3.0]);
    table.font_size = BODY_FONT_SIZE;
    table.padding = TABLE_CELL_PADDING_MM;
    table.body = detail_rows(listing)
        .iter()
        .map(|(key, value)| Row::plain(&[*key, value.as_str()]))
        .collect();
    table
}

/// `GarageInvoice-<name>.pdf`, with characters that are unsafe in file
/// names replaced by `_`.
pub fn invoice_file_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("GarageInvoice-{}.pdf", sanitized)
}
