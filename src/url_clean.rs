//! Removal of tracking parameters from links users send to the bot.

use url::{form_urlencoded, Url};

/// Prefix shared by all Google Analytics campaign parameters.
const TRACKING_PREFIX: &str = "utm_";

/// Share and referral identifiers that do not change which resource a URL
/// points at.
const TRACKING_PARAMETERS: [&str; 24] = [
    "fbclid",
    "gclid",
    "dclid",
    "gbraid",
    "wbraid",
    "msclkid",
    "yclid",
    "igshid",
    "igsh",
    "mibextid",
    "si",
    "feature",
    "ref",
    "ref_src",
    "ref_url",
    "share_id",
    "share_source",
    "share_medium",
    "share_app_id",
    "is_from_webapp",
    "sender_device",
    "sender_web_id",
    "xmt",
    "spm",
];

/// Whether a query parameter name carries tracking data only.
pub fn is_tracking_parameter(name: &str) -> bool {
    name.starts_with(TRACKING_PREFIX) || TRACKING_PARAMETERS.contains(&name)
}

/// Decoded name of a single `key=value` query segment.
fn segment_name(segment: &str) -> String {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
        .unwrap_or_default()
}

/// Strip tracking parameters from `input`.
///
/// Input that is not an absolute URL is returned unchanged. Surviving
/// parameters keep their order and their original encoding; the `?` is
/// dropped when none survive. The fragment is kept.
pub fn clean_url(input: &str) -> String {
    if Url::parse(input).is_err() {
        return input.to_string();
    }

    let (head, fragment) = match input.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (input, None),
    };

    let Some((base, query)) = head.split_once('?') else {
        return input.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !is_tracking_parameter(&segment_name(segment)))
        .collect();

    let mut result = base.to_string();
    if !kept.is_empty() {
        result.push('?');
        result.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }

    result
}

/// Find the first http(s) link in a message and clean it.
pub fn find_and_clean_url(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|word| word.starts_with("http://") || word.starts_with("https://"))
        .map(clean_url)
}
