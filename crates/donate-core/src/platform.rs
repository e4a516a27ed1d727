//! Platform resolution and platform entry validation
//!
//! Bare addresses carry no platform name, so one is inferred from the host
//! of the address parsed as a URL. Parsing is purely syntactic: no lookup
//! or request ever leaves the process.

use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::PlatformEntry;

/// Hosts with a known platform name
pub const KNOWN_HOSTS: &[(&str, &str)] = &[
    ("givethanks.app", "Thanks"),
    ("paypal.me", "PayPal"),
    ("patreon.com", "Patreon"),
];

/// Platform name for a syntactically valid address on an unlisted host
pub const UNKNOWN_PLATFORM: &str = "Unknown";

const SCHEME_SEPARATOR: &str = "://";
const DEFAULT_SCHEME: &str = "https://";

/// Infer the platform of a bare address.
///
/// Addresses without a scheme are read as `https`. Returns `None` when the
/// address does not parse as a URL; callers drop the entry in that case.
pub fn resolve_platform(address: &str) -> Option<String> {
    let parsed = if address.contains(SCHEME_SEPARATOR) {
        Url::parse(address)
    } else {
        Url::parse(&format!("{}{}", DEFAULT_SCHEME, address))
    };

    let url = match parsed {
        Ok(url) => url,
        Err(e) => {
            trace!(address, error = %e, "address is not a URL");
            return None;
        }
    };

    let platform = url
        .host_str()
        .and_then(platform_for_host)
        .unwrap_or(UNKNOWN_PLATFORM);
    Some(platform.to_string())
}

fn platform_for_host(host: &str) -> Option<&'static str> {
    KNOWN_HOSTS
        .iter()
        .find(|(known, _)| *known == host)
        .map(|(_, platform)| *platform)
}

/// True iff `value` is an object with string `platform` and `address` fields
pub fn is_valid_platform_entry(value: &Value) -> bool {
    entry_fields(value).is_some()
}

fn entry_fields(value: &Value) -> Option<(&str, &str)> {
    let obj = value.as_object()?;
    let platform = obj.get("platform")?.as_str()?;
    let address = obj.get("address")?.as_str()?;
    Some((platform, address))
}

/// Keep the valid entries of a candidate list, projected to `platform`/`address`
pub fn collect_platforms(candidates: &[Value]) -> Vec<PlatformEntry> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| match entry_fields(candidate) {
            Some((platform, address)) => Some(PlatformEntry::new(platform, address)),
            None => {
                trace!(index, "dropping invalid platform entry");
                None
            }
        })
        .collect()
}
