// Listing request form: URL validation, fetch, and the review hand-off

use tracing::{debug, info};

use crate::fetch::ListingSource;
use crate::listing::ListingRecord;
use crate::validate::{listing_id_from_url, listing_url_error};

pub const NO_LISTING_FOUND: &str = "No listing data found.";
pub const FETCH_FAILED: &str = "Failed to fetch listing data.";

#[derive(Debug, Default, Clone)]
pub struct FormState {
    pub url: String,
    pub is_valid: bool,
    /// Inline message next to the URL field
    pub url_error: Option<&'static str>,
    /// Top-level message below the form
    pub error: Option<&'static str>,
    pub listing: Option<ListingRecord>,
    pub review_open: bool,
}

/// Result of one submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Failed validation; nothing was fetched.
    Invalid,
    Loaded,
    NotFound,
    FetchFailed,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live validation as the URL is edited.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
        self.error = None;
        self.apply_url_validation();
    }

    fn apply_url_validation(&mut self) -> bool {
        self.url_error = listing_url_error(&self.url);
        self.is_valid = self.url_error.is_none();
        self.is_valid
    }

    pub fn submit(&mut self, source: &dyn ListingSource) -> Submission {
        self.error = None;
        if !self.apply_url_validation() {
            debug!("Rejected listing URL {:?}", self.url);
            return Submission::Invalid;
        }

        let id = listing_id_from_url(&self.url).to_string();
        match source.fetch_listing(&id) {
            Ok(Some(listing)) => {
                info!("Loaded listing {}", listing.id);
                self.is_valid = true;
                self.listing = Some(listing);
                self.review_open = true;
                Submission::Loaded
            }
            Ok(None) => {
                self.error = Some(NO_LISTING_FOUND);
                self.url_error = None;
                self.is_valid = false;
                self.review_open = false;
                Submission::NotFound
            }
            Err(_) => {
                self.error = Some(FETCH_FAILED);
                self.review_open = false;
                Submission::FetchFailed
            }
        }
    }

    pub fn close_review(&mut self) {
        self.review_open = false;
    }
}
