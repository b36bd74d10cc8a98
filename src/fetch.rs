// Listing fetch client: one POST to the backend, no retries, no caching

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::listing::ListingRecord;

/// Anything that can turn a listing id into a record.
///
/// `Ok(None)` means the backend answered but had no listing for the id.
pub trait ListingSource {
    fn fetch_listing(&self, id: &str) -> Result<Option<ListingRecord>, AppError>;
}

/// `{ "result": { "listing": ... } }`
#[derive(Debug, Deserialize)]
struct ListingEnvelope {
    result: ListingResult,
}

#[derive(Debug, Deserialize)]
struct ListingResult {
    #[serde(default)]
    listing: Option<ListingRecord>,
}

pub struct ListingClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ListingClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(config.http_agent(), &config.backend_url)
    }

    pub fn with_base_url(agent: ureq::Agent, base_url: &str) -> Self {
        ListingClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/getListing", self.base_url)
    }
}

impl ListingSource for ListingClient {
    fn fetch_listing(&self, id: &str) -> Result<Option<ListingRecord>, AppError> {
        let url = self.endpoint();
        debug!("Fetching listing {} from {}", id, url);

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(serde_json::json!({ "id": id }))
            .map_err(|e| {
                warn!("Error fetching listing {}: {}", id, e);
                match e {
                    ureq::Error::Status(code, _) => {
                        AppError::Network(format!("backend responded with status {}", code))
                    }
                    ureq::Error::Transport(t) => AppError::Network(t.to_string()),
                }
            })?;

        let body = response.into_string().map_err(|e| {
            warn!("Error reading listing response for {}: {}", id, e);
            AppError::Network(format!("Failed to read response: {}", e))
        })?;

        parse_listing_response(&body).inspect_err(|e| warn!("Error fetching listing {}: {}", id, e))
    }
}

/// Decodes the backend envelope. A missing or null `result` is malformed;
/// a missing or null `result.listing` is "no data".
pub fn parse_listing_response(body: &str) -> Result<Option<ListingRecord>, AppError> {
    let envelope: ListingEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::Network(format!("Malformed listing response: {}", e)))?;
    Ok(envelope.result.listing)
}
