//! Rule-based deceptive link detection.
//!
//! Flags links whose visible text displays one URL while the href points at
//! a different domain - a classic phishing pattern that needs no model.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static URL_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?://)?[\w][\w.-]+\.[a-z]{2,}(/\S*)?$").unwrap());

static HAS_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Check if text looks like a URL
pub fn looks_like_url(text: &str) -> bool {
    URL_LIKE.is_match(text.trim())
}

/// Extract the registrable-ish domain from a URL string: lowercased host
/// with a leading "www." stripped. A missing scheme is assumed http.
pub fn extract_domain(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let with_scheme = if HAS_SCHEME.is_match(raw) {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let parsed = Url::parse(&with_scheme).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Returns true if any link displays as a URL but points to a different
/// domain. Anchors whose visible text is not URL-shaped are ignored: a
/// button labeled "Click here" is not deceptive in this sense.
pub fn url_mismatch(html: &str) -> bool {
    if html.trim().is_empty() {
        return false;
    }

    let document = scraper::Html::parse_document(html);
    let anchor_selector = scraper::Selector::parse("a[href]").unwrap();

    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let display_text = anchor.text().collect::<String>();
        let display_text = display_text.trim();

        if display_text.is_empty() || !looks_like_url(display_text) {
            continue;
        }

        let href_domain = extract_domain(href);
        let display_domain = extract_domain(display_text);

        if let (Some(href_domain), Some(display_domain)) = (href_domain, display_domain) {
            if href_domain != display_domain {
                return true;
            }
        }
    }

    false
}
