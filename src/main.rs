// garage-invoice: fetch a Garage listing and generate its PDF invoice

use clap::Parser;
use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use garage_invoice::config::{AppConfig, CompanyProfile, DEFAULT_BACKEND_URL};
use garage_invoice::error::AppError;
use garage_invoice::fetch::ListingClient;
use garage_invoice::form::{FormState, Submission};
use garage_invoice::invoice::{
    BuildOutcome, DirectorySink, DocumentBuilder, FinalizePolicy, HttpImageLoader, InvoiceBuilder,
};
use garage_invoice::listing::ListingRecord;
use garage_invoice::modal::{ModalState, ReviewSummary, StatusTone};

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a PDF invoice for a Garage listing")]
struct Args {
    /// Listing URL (https://www.withgarage.com/listing/<uuid>)
    #[arg(short, long, default_value = "")]
    url: String,

    /// Requester name printed as "Bill To"
    #[arg(short, long, default_value = "")]
    name: String,

    /// Requester email
    #[arg(short, long, default_value = "")]
    email: String,

    /// Directory the invoice is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Listing backend base URL
    #[arg(long, env = "GARAGE_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// When the document is saved relative to photo loads
    #[arg(long, value_enum, default_value_t = FinalizePolicy::AllSettled)]
    finalize: FinalizePolicy,

    /// Timeout for the listing fetch and each photo download (photos default to 30 s)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Request the invoice by email instead of downloading it
    #[arg(long)]
    send_email: bool,

    /// Listing JSON file to use instead of fetching from the backend
    #[arg(long)]
    listing_file: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            output_dir: self.output_dir.clone(),
            finalize: self.finalize,
            timeout: self.timeout_secs.map(Duration::from_secs),
            company: CompanyProfile::default(),
        }
    }
}

/// Remembers what the real builder returned so the summary can report it.
struct RecordingBuilder<'a> {
    inner: InvoiceBuilder<'a>,
    outcome: RefCell<Option<BuildOutcome>>,
}

impl DocumentBuilder for RecordingBuilder<'_> {
    fn build(
        &self,
        listing: Option<&ListingRecord>,
        name: &str,
        email: &str,
    ) -> Result<BuildOutcome, AppError> {
        let outcome = self.inner.build(listing, name, email)?;
        *self.outcome.borrow_mut() = Some(outcome.clone());
        Ok(outcome)
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the request ended with a success status.
fn run() -> Result<bool, AppError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config();
    debug!("Configuration: {:?}", config);

    let Some(listing) = load_listing(&args, &config)? else {
        return Ok(false);
    };

    let summary = ReviewSummary::of(&listing);
    println!("Listing: {}", summary.title);
    println!("  Price: {}", summary.price);
    if !summary.location.is_empty() {
        println!("  Location: {}", summary.location);
    }

    let mut modal = ModalState::new();
    modal.open();
    modal.set_name(&args.name);
    modal.set_email(&args.email);

    if args.send_email {
        modal.send_email();
        return Ok(report_status(&modal));
    }

    let loader = Arc::new(HttpImageLoader::new(config.image_agent()));
    let sink = DirectorySink::new(&config.output_dir);
    let builder = RecordingBuilder {
        inner: InvoiceBuilder::new(&config, loader, &sink),
        outcome: RefCell::new(None),
    };

    if !modal.generate(Some(&listing), &builder) {
        for message in [modal.name_error, modal.email_error].into_iter().flatten() {
            eprintln!("✗ {}", message);
        }
        return Ok(false);
    }

    match builder.outcome.into_inner() {
        Some(BuildOutcome::Saved { file_name, pages, images_placed }) => {
            println!("✓ Generated: {}", sink.path_for(&file_name).display());
            println!("  Pages: {}", pages);
            println!("  Photos: {}", images_placed);
        }
        Some(BuildOutcome::Abandoned { images_placed }) => {
            println!("! Invoice was not saved ({} photo(s) placed before loading stalled)", images_placed);
        }
        Some(BuildOutcome::Skipped) | None => {}
    }

    Ok(report_status(&modal))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

/// Resolves the listing either from `--listing-file` or through the form
/// flow against the backend. `None` means the form rejected the request and
/// its message has been printed.
fn load_listing(args: &Args, config: &AppConfig) -> Result<Option<ListingRecord>, AppError> {
    if let Some(path) = &args.listing_file {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::InvalidInput(format!("{}: {}", path.display(), e)))?;
        let listing: ListingRecord = serde_json::from_str(&content)
            .map_err(|e| AppError::InvalidInput(format!("Invalid listing JSON: {}", e)))?;
        info!("Loaded listing {} from {}", listing.id, path.display());
        return Ok(Some(listing));
    }

    let client = ListingClient::new(config);
    let mut form = FormState::new();
    form.set_url(&args.url);

    match form.submit(&client) {
        Submission::Loaded => Ok(form.listing),
        Submission::Invalid => {
            eprintln!("✗ {}", form.url_error.unwrap_or_default());
            Ok(None)
        }
        Submission::NotFound | Submission::FetchFailed => {
            eprintln!("✗ {}", form.error.unwrap_or_default());
            Ok(None)
        }
    }
}

fn report_status(modal: &ModalState) -> bool {
    match (modal.status, modal.status_tone()) {
        (Some(status), Some(StatusTone::Success)) => {
            println!("{}", status);
            true
        }
        (Some(status), _) => {
            eprintln!("✗ {}", status);
            false
        }
        (None, _) => false,
    }
}
