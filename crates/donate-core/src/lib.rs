//! Donate Core - canonical normalizer for donation specs
//!
//! A donation spec is a loosely-typed value describing who should receive a
//! donation and through which payment platforms. It may be a bare address,
//! a single-recipient object, a multi-platform object, or a list of
//! recipients. This crate turns any of those into one fully-resolved shape.
//!
//! # Architecture
//!
//! ```text
//! serde_json::Value → Shape::classify → per-shape extraction → weight normalization → DonateSpec
//!                          ↓
//!                   Platform resolver (bare addresses only)
//! ```
//!
//! # Guarantees
//!
//! - **Total**: every input produces a well-formed `DonateSpec`, never a panic
//! - **Deterministic**: same input always produces an equal output
//! - **Normalized**: recipient weights are finite, positive and sum to 1
//! - **Pure**: no I/O, no shared state

pub mod error;
pub mod normalizer;
pub mod options;
pub mod platform;
pub mod shape;
pub mod weight;

use std::sync::Arc;

use serde::{Deserialize, Deserializer};

pub use error::{Error, Result};
pub use normalizer::{parse, parse_str, parse_with};
pub use options::{BareRecipientAddress, ParseOptions};

/// Normalized donation spec
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DonateSpec {
    pub recipients: Vec<Recipient>,
    /// Opaque pass-through of the input's `reward` field
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub reward: Option<serde_json::Value>,
}

// a present `null` stays `Some(Null)`; only a missing key is `None`
fn present<'de, D>(d: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(d).map(Some)
}

impl DonateSpec {
    /// Sum of all recipient weights (1.0 for any non-empty spec)
    pub fn total_weight(&self) -> f64 {
        self.recipients.iter().map(|r| r.weight).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// One payee with its share of the donation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recipient {
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub platforms: Vec<PlatformEntry>,
}

impl Recipient {
    /// Recipient with the default pre-normalization weight of 1
    pub fn new(platforms: Vec<PlatformEntry>) -> Self {
        Self {
            weight: 1.0,
            name: None,
            email: None,
            platforms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlatformEntry {
    pub platform: String,
    pub address: Address,
}

impl PlatformEntry {
    pub fn new(platform: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            address: Address::Handle(address.into()),
        }
    }
}

/// Address of a recipient on a platform
///
/// `Spec` only appears for bare-string members of a multi-recipient list
/// parsed with [`BareRecipientAddress::WholeSpec`]: the address then holds
/// the entire input spec rather than the member string. Every such entry of
/// one parse shares the same allocation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Address {
    Handle(String),
    Spec(Arc<serde_json::Value>),
}

impl Address {
    /// The address text, if this is a plain handle
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Address::Handle(s) => Some(s),
            Address::Spec(_) => None,
        }
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address::Handle(s.to_string())
    }
}
