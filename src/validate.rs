// Input validation for listing URLs and invoice requester details

use once_cell::sync::Lazy;
use regex::Regex;

static LISTING_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https://www\.withgarage\.com/listing/[a-f0-9\-]{36}$").expect("valid regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid regex"));

pub const URL_EMPTY: &str = "URL cannot be empty";
pub const URL_INVALID: &str = "Invalid URL format";
pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Invalid email format";

pub fn is_listing_url(url: &str) -> bool {
    LISTING_URL_RE.is_match(url)
}

/// Returns the inline error for a listing URL, or `None` when it is usable.
pub fn listing_url_error(url: &str) -> Option<&'static str> {
    if url.is_empty() {
        Some(URL_EMPTY)
    } else if !is_listing_url(url) {
        Some(URL_INVALID)
    } else {
        None
    }
}

/// Final `/`-delimited segment of the URL, verbatim.
pub fn listing_id_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

pub fn name_error(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        Some(NAME_REQUIRED)
    } else {
        None
    }
}

pub fn email_error(email: &str) -> Option<&'static str> {
    if email.trim().is_empty() {
        Some(EMAIL_REQUIRED)
    } else if !EMAIL_RE.is_match(email) {
        Some(EMAIL_INVALID)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "https://www.withgarage.com/listing/2f9e4d2a-1b3c-4d5e-8f70-112233445566";

    #[test]
    fn accepts_listing_url_any_case() {
        assert!(is_listing_url(GOOD));
        assert!(is_listing_url("https://www.withgarage.com/listing/2F9E4D2A-1b3c-4D5E-8f70-112233445566"));
        assert!(is_listing_url("HTTPS://WWW.WITHGARAGE.COM/LISTING/2F9E4D2A-1B3C-4D5E-8F70-112233445566"));
    }

    #[test]
    fn rejects_malformed_urls() {
        let bad = [
            "",
            "http://www.withgarage.com/listing/2f9e4d2a-1b3c-4d5e-8f70-112233445566",
            "https://withgarage.com/listing/2f9e4d2a-1b3c-4d5e-8f70-112233445566",
            "https://www.withgarage.com/listing/2f9e4d2a-1b3c-4d5e-8f70-11223344556",
            "https://www.withgarage.com/listing/2f9e4d2a-1b3c-4d5e-8f70-1122334455667",
            "https://www.withgarage.com/listing/zz9e4d2a-1b3c-4d5e-8f70-112233445566",
            "https://www.withgarage.com/listing/2f9e4d2a-1b3c-4d5e-8f70-112233445566/",
            "https://www.withgarage.com/item/2f9e4d2a-1b3c-4d5e-8f70-112233445566",
        ];
        for url in bad {
            assert!(!is_listing_url(url), "should reject {url:?}");
        }
    }

    #[test]
    fn url_error_messages() {
        assert_eq!(listing_url_error(""), Some(URL_EMPTY));
        assert_eq!(listing_url_error("nope"), Some(URL_INVALID));
        assert_eq!(listing_url_error(GOOD), None);
    }

    #[test]
    fn extracts_last_segment_verbatim() {
        assert_eq!(listing_id_from_url(GOOD), "2f9e4d2a-1b3c-4d5e-8f70-112233445566");
        assert_eq!(listing_id_from_url("no-slashes"), "no-slashes");
    }

    #[test]
    fn name_must_not_be_blank() {
        assert_eq!(name_error(""), Some(NAME_REQUIRED));
        assert_eq!(name_error("   "), Some(NAME_REQUIRED));
        assert_eq!(name_error("Ada"), None);
    }

    #[test]
    fn email_rules() {
        assert_eq!(email_error(" "), Some(EMAIL_REQUIRED));
        assert_eq!(email_error("foo"), Some(EMAIL_INVALID));
        assert_eq!(email_error("foo@bar"), Some(EMAIL_INVALID));
        assert_eq!(email_error("foo@bar.com"), None);
    }
}
