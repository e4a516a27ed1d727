//! Parse options
//!
//! Defaults reproduce the long-standing behavior of donation spec consumers.
//! Options deserialize from JSON with every field optional, so a caller can
//! keep them in its own configuration file.

use serde::{Deserialize, Serialize};

/// Address stored for a bare-string member of a multi-recipient list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BareRecipientAddress {
    /// Store the entire input spec as the address.
    ///
    /// Matches what existing spec consumers produce. Likely a defect.
    #[default]
    WholeSpec,
    /// Store the member string itself
    Element,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub bare_recipient_address: BareRecipientAddress,
}

impl ParseOptions {
    /// Options with every known defect corrected
    pub fn corrected() -> Self {
        Self {
            bare_recipient_address: BareRecipientAddress::Element,
        }
    }

    pub fn with_bare_recipient_address(mut self, mode: BareRecipientAddress) -> Self {
        self.bare_recipient_address = mode;
        self
    }
}
