// garage-invoice: turn a Garage listing URL into a downloadable PDF invoice

pub mod config;
pub mod error;
pub mod fetch;
pub mod form;
pub mod format;
pub mod invoice;
pub mod listing;
pub mod modal;
pub mod validate;

pub use config::{AppConfig, CompanyProfile};
pub use error::AppError;
pub use fetch::{ListingClient, ListingSource};
pub use form::{FormState, Submission};
pub use invoice::{BuildOutcome, DocumentBuilder, FinalizePolicy, InvoiceBuilder, InvoiceMeta};
pub use listing::ListingRecord;
pub use modal::{ModalState, ReviewSummary, StatusTone};
