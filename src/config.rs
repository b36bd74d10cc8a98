// Runtime configuration shared by the fetch client and the invoice builder

use std::path::PathBuf;
use std::time::Duration;

use crate::invoice::FinalizePolicy;

pub const DEFAULT_BACKEND_URL: &str = "https://garage-backend.onrender.com";

/// Per-photo download limit when no timeout is configured.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Seller details printed in the invoice header block.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    pub name: String,
    pub website: String,
    pub phone: String,
    pub address: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        CompanyProfile {
            name: "Garage Technologies, Inc.".to_string(),
            website: "https://www.withgarage.com".to_string(),
            phone: "201-293-7164".to_string(),
            address: "New York, NY 10012, US".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the listing backend, without trailing slash.
    pub backend_url: String,
    /// Directory the generated invoice is written to.
    pub output_dir: PathBuf,
    pub finalize: FinalizePolicy,
    /// Applied to the listing fetch and image downloads. `None` leaves the
    /// listing fetch unbounded; photos fall back to `DEFAULT_IMAGE_TIMEOUT`.
    pub timeout: Option<Duration>,
    pub company: CompanyProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            output_dir: PathBuf::from("."),
            finalize: FinalizePolicy::default(),
            timeout: None,
            company: CompanyProfile::default(),
        }
    }
}

impl AppConfig {
    /// HTTP agent used for every outbound request.
    pub fn http_agent(&self) -> ureq::Agent {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// HTTP agent for photo downloads. Always bounded, so one stalled image
    /// host cannot hold up the invoice.
    pub fn image_agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(self.timeout.unwrap_or(DEFAULT_IMAGE_TIMEOUT))
            .build()
    }
}
