// Invoice request modal: requester details, generate and send-email actions

use tracing::{info, warn};

use crate::invoice::DocumentBuilder;
use crate::listing::ListingRecord;
use crate::validate::{email_error, name_error};

pub const STATUS_GENERATED: &str = "PDF generated successfully! Download will begin momentarily...";
pub const STATUS_NO_LISTING: &str = "Failed to generate PDF. Listing data unavailable";
pub const STATUS_BUILD_FAILED: &str = "Failed to generate PDF.";
pub const STATUS_EMAIL_STUB: &str =
    "The email feature is still under construction. Please click \"Download PDF\" to get your invoice!";

/// How the status line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Failure,
}

/// Short listing summary shown above the requester form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub title: String,
    pub price: String,
    pub location: String,
}

impl ReviewSummary {
    pub fn of(listing: &ListingRecord) -> Self {
        ReviewSummary {
            title: listing.listing_title.clone(),
            price: listing.review_price(),
            location: listing.review_location(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ModalState {
    pub name: String,
    pub email: String,
    pub name_error: Option<&'static str>,
    pub email_error: Option<&'static str>,
    pub status: Option<&'static str>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears inputs, field errors and the status line.
    pub fn open(&mut self) {
        *self = ModalState::default();
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        if !name.trim().is_empty() {
            self.name_error = None;
        }
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
        if !email.trim().is_empty() {
            self.email_error = None;
        }
    }

    /// Updates both field errors; true when the request can proceed.
    pub fn validate(&mut self) -> bool {
        self.name_error = name_error(&self.name);
        self.email_error = email_error(&self.email);
        self.name_error.is_none() && self.email_error.is_none()
    }

    /// Validates, then builds the invoice. Returns false when validation
    /// failed and nothing was attempted.
    pub fn generate(&mut self, listing: Option<&ListingRecord>, builder: &dyn DocumentBuilder) -> bool {
        if !self.validate() {
            return false;
        }
        self.status = None;

        let Some(listing) = listing else {
            self.status = Some(STATUS_NO_LISTING);
            return true;
        };

        self.status = match builder.build(Some(listing), &self.name, &self.email) {
            Ok(outcome) => {
                info!("Invoice build finished: {:?}", outcome);
                Some(STATUS_GENERATED)
            }
            Err(e) => {
                warn!("Invoice build failed: {}", e);
                Some(STATUS_BUILD_FAILED)
            }
        };
        true
    }

    /// Email delivery is not available; only reports that.
    pub fn send_email(&mut self) {
        self.status = Some(STATUS_EMAIL_STUB);
    }

    pub fn status_tone(&self) -> Option<StatusTone> {
        self.status.map(|status| {
            if status.starts_with("Failed") {
                StatusTone::Failure
            } else {
                StatusTone::Success
            }
        })
    }
}
