//! Shape classification for donation specs
//!
//! A spec is an untyped value that may match several overlapping shapes.
//! Classification decodes it into exactly one [`Shape`] by running a
//! structural predicate per variant in fixed priority order:
//!
//! 1. `Simple`: a string
//! 2. `Explicit`: string `platform` and `address` fields
//! 3. `ExplicitMultiPlatform`: an array `platforms` field
//! 4. `MultiRecipient`: an array `recipients` field
//!
//! An object with both `platforms` and `recipients` is multi-platform;
//! its `recipients` are never looked at.

use serde_json::{Map, Value};

/// Top-level decode of a donation spec, borrowing from the input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// Bare address of a single recipient
    Simple(&'a str),
    /// One recipient on one platform
    Explicit {
        fields: &'a Map<String, Value>,
        platform: &'a str,
        address: &'a str,
    },
    /// One recipient on several platforms
    ExplicitMultiPlatform {
        fields: &'a Map<String, Value>,
        platforms: &'a [Value],
    },
    /// Several recipients, each decoded as a [`Member`]
    MultiRecipient { elements: &'a [Value] },
}

impl<'a> Shape<'a> {
    /// Decode a spec, or `None` when it matches no shape
    pub fn classify(value: &'a Value) -> Option<Self> {
        let fields = match value {
            Value::String(s) => return Some(Shape::Simple(s)),
            Value::Object(fields) => fields,
            _ => return None,
        };

        if let Some((platform, address)) = explicit_fields(fields) {
            return Some(Shape::Explicit {
                fields,
                platform,
                address,
            });
        }
        if let Some(platforms) = array_field(fields, "platforms") {
            return Some(Shape::ExplicitMultiPlatform { fields, platforms });
        }
        if let Some(elements) = array_field(fields, "recipients") {
            return Some(Shape::MultiRecipient { elements });
        }
        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Simple(_) => "simple",
            Shape::Explicit { .. } => "explicit",
            Shape::ExplicitMultiPlatform { .. } => "explicit_multi_platform",
            Shape::MultiRecipient { .. } => "multi_recipient",
        }
    }
}

/// Decode of one element of a multi-recipient list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'a> {
    Bare(&'a str),
    Single {
        fields: &'a Map<String, Value>,
        platform: &'a str,
        address: &'a str,
    },
    Multi {
        fields: &'a Map<String, Value>,
        platforms: &'a [Value],
    },
}

impl<'a> Member<'a> {
    /// Decode a list element, or `None` when it matches no member shape
    pub fn classify(value: &'a Value) -> Option<Self> {
        match Shape::classify(value)? {
            Shape::Simple(s) => Some(Member::Bare(s)),
            Shape::Explicit {
                fields,
                platform,
                address,
            } => Some(Member::Single {
                fields,
                platform,
                address,
            }),
            Shape::ExplicitMultiPlatform { fields, platforms } => {
                Some(Member::Multi { fields, platforms })
            }
            // lists do not nest
            Shape::MultiRecipient { .. } => None,
        }
    }
}

fn explicit_fields(fields: &Map<String, Value>) -> Option<(&str, &str)> {
    let platform = fields.get("platform")?.as_str()?;
    let address = fields.get("address")?.as_str()?;
    Some((platform, address))
}

fn array_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a [Value]> {
    fields.get(key)?.as_array().map(Vec::as_slice)
}

/// String field of a spec object, ignoring values of any other type
pub fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.as_str().map(str::to_string)
}
