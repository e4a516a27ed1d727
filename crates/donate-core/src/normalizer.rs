//! Spec normalizer: turns any donation spec into a canonical `DonateSpec`
//!
//! # Pipeline
//!
//! `Value → Shape::classify → extract recipients → weight::normalize → DonateSpec`
//!
//! # Guarantees
//!
//! - **Total**: never fails and never panics; malformed parts are dropped
//! - **Single recipients**: simple, explicit and multi-platform specs yield
//!   exactly one recipient of weight 1
//! - **Weights**: multi-recipient weights are finite, positive and sum to 1

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::options::{BareRecipientAddress, ParseOptions};
use crate::platform::{collect_platforms, resolve_platform};
use crate::shape::{string_field, Member, Shape};
use crate::weight::{self, weight_of};
use crate::{Address, DonateSpec, PlatformEntry, Recipient, Result};

// ── Public API ─────────────────────────────────────────────

/// Normalize a donation spec with default options
pub fn parse(data: &Value) -> DonateSpec {
    parse_with(data, &ParseOptions::default())
}

/// Normalize a donation spec
///
/// Inputs that match no recognized shape produce an empty recipient list.
/// `reward` is copied from the input object untouched.
pub fn parse_with(data: &Value, options: &ParseOptions) -> DonateSpec {
    DonateSpec {
        recipients: recipients(data, options),
        reward: data.as_object().and_then(|o| o.get("reward")).cloned(),
    }
}

/// Decode JSON text and normalize it
///
/// # Errors
/// Returns `Error::Json` if `text` is not valid JSON. A valid JSON value of
/// any shape always normalizes.
pub fn parse_str(text: &str) -> Result<DonateSpec> {
    let data: Value = serde_json::from_str(text)?;
    Ok(parse(&data))
}

// ── Recipient extraction ───────────────────────────────────

fn recipients(data: &Value, options: &ParseOptions) -> Vec<Recipient> {
    let Some(shape) = Shape::classify(data) else {
        debug!("spec matches no known shape");
        return Vec::new();
    };
    debug!(shape = shape.name(), "classified spec");

    match shape {
        Shape::Simple(address) => match resolve_platform(address) {
            Some(platform) => vec![Recipient::new(vec![PlatformEntry::new(platform, address)])],
            None => {
                debug!(address, "dropping simple spec with unresolvable address");
                Vec::new()
            }
        },
        Shape::Explicit {
            fields,
            platform,
            address,
        } => vec![Recipient {
            name: string_field(fields, "name"),
            email: string_field(fields, "email"),
            ..Recipient::new(vec![PlatformEntry::new(platform, address)])
        }],
        Shape::ExplicitMultiPlatform { fields, platforms } => vec![Recipient {
            name: string_field(fields, "name"),
            email: string_field(fields, "email"),
            ..Recipient::new(collect_platforms(platforms))
        }],
        Shape::MultiRecipient { elements } => {
            let mut echo = None;
            let candidates = elements
                .iter()
                .enumerate()
                .filter_map(|(index, element)| member(data, &mut echo, index, element, options))
                .collect();
            weight::normalize(candidates)
        }
    }
}

/// `echo` holds the shared copy of `spec` once a bare member needs it
fn member(
    spec: &Value,
    echo: &mut Option<Arc<Value>>,
    index: usize,
    element: &Value,
    options: &ParseOptions,
) -> Option<Recipient> {
    let Some(member) = Member::classify(element) else {
        debug!(index, "dropping unrecognized recipient");
        return None;
    };

    match member {
        Member::Bare(text) => {
            let Some(platform) = resolve_platform(text) else {
                debug!(index, address = text, "dropping recipient with unresolvable address");
                return None;
            };
            let address = match options.bare_recipient_address {
                BareRecipientAddress::WholeSpec => {
                    Address::Spec(Arc::clone(echo.get_or_insert_with(|| Arc::new(spec.clone()))))
                }
                BareRecipientAddress::Element => Address::Handle(text.to_string()),
            };
            Some(Recipient::new(vec![PlatformEntry { platform, address }]))
        }
        Member::Single {
            fields,
            platform,
            address,
        } => Some(Recipient {
            weight: weight_of(fields),
            name: string_field(fields, "name"),
            email: string_field(fields, "email"),
            platforms: vec![PlatformEntry::new(platform, address)],
        }),
        Member::Multi { fields, platforms } => Some(Recipient {
            weight: weight_of(fields),
            name: string_field(fields, "name"),
            email: string_field(fields, "email"),
            platforms: collect_platforms(platforms),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_normalized(spec: &DonateSpec) {
        assert!(
            (spec.total_weight() - 1.0).abs() < 1e-9,
            "weights sum to {}",
            spec.total_weight()
        );
        for r in &spec.recipients {
            assert!(r.weight.is_finite() && r.weight > 0.0);
        }
    }

    // ── Single-recipient shapes ────────────────────────

    #[test]
    fn test_simple_spec() {
        let spec = parse(&json!("givethanks.app/u/bobloblaw"));
        assert_eq!(
            spec.recipients,
            vec![Recipient::new(vec![PlatformEntry::new(
                "Thanks",
                "givethanks.app/u/bobloblaw"
            )])]
        );
        assert_eq!(spec.reward, None);
    }

    #[test]
    fn test_simple_spec_unresolvable() {
        assert!(parse(&json!("")).is_empty());
        assert!(parse(&json!("host:port")).is_empty());
    }

    #[test]
    fn test_explicit_spec() {
        let spec = parse(&json!({"platform": "foo", "address": "bar"}));
        assert_eq!(
            spec.recipients,
            vec![Recipient::new(vec![PlatformEntry::new("foo", "bar")])]
        );
    }

    #[test]
    fn test_explicit_spec_copies_identity() {
        let spec = parse(&json!({
            "platform": "foo",
            "address": "bar",
            "name": "Bob",
            "email": "bob@example.com",
            "weight": 7
        }));
        let r = &spec.recipients[0];
        assert_eq!(r.weight, 1.0);
        assert_eq!(r.name.as_deref(), Some("Bob"));
        assert_eq!(r.email.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn test_explicit_spec_not_resolved() {
        // explicit platforms are taken verbatim
        let spec = parse(&json!({"platform": "Venmo", "address": "paypal.me/x"}));
        assert_eq!(spec.recipients[0].platforms[0].platform, "Venmo");
    }

    #[test]
    fn test_multi_platform_spec() {
        let spec = parse(&json!({
            "name": "Alice",
            "platforms": [
                {"platform": "foo2", "address": "bar2", "extra": true},
                {"platform": "foo3"},
                "paypal.me/alice"
            ]
        }));
        assert_eq!(spec.recipients.len(), 1);
        let r = &spec.recipients[0];
        assert_eq!(r.weight, 1.0);
        assert_eq!(r.name.as_deref(), Some("Alice"));
        assert_eq!(r.platforms, vec![PlatformEntry::new("foo2", "bar2")]);
    }

    #[test]
    fn test_multi_platform_spec_all_invalid() {
        let spec = parse(&json!({"platforms": [null, 1, {"address": "x"}]}));
        assert_eq!(spec.recipients.len(), 1);
        assert!(spec.recipients[0].platforms.is_empty());
    }

    #[test]
    fn test_platforms_win_over_recipients() {
        let spec = parse(&json!({
            "platforms": [{"platform": "foo3", "address": "bar3"}],
            "recipients": [{"platform": "foo4", "address": "bar4"}]
        }));
        assert_eq!(spec.recipients.len(), 1);
        assert_eq!(spec.recipients[0].platforms, vec![PlatformEntry::new("foo3", "bar3")]);
    }

    // ── Malformed input ────────────────────────────────

    #[test]
    fn test_non_object_specs() {
        for value in [json!(25), json!(null), json!(false), json!([]), json!({})] {
            let spec = parse(&value);
            assert!(spec.is_empty(), "{} should yield no recipients", value);
            assert_eq!(spec.reward, None);
        }
    }

    #[test]
    fn test_reward_passthrough() {
        let reward = json!({"tierCurrency": "USD", "tiers": [{"threshold": 5}]});
        let spec = parse(&json!({"platform": "foo", "address": "bar", "reward": reward}));
        assert_eq!(spec.reward, Some(reward));

        // present even when the spec is malformed
        let spec = parse(&json!({"reward": null}));
        assert!(spec.is_empty());
        assert_eq!(spec.reward, Some(Value::Null));
    }

    // ── Multi-recipient ────────────────────────────────

    #[test]
    fn test_multi_recipient_spec() {
        let spec = parse(&json!({
            "recipients": [
                {"platform": "foo5", "address": "bar5"},
                {
                    "email": "e@x.com",
                    "platforms": [
                        {"platform": "foo6", "address": "bar6"},
                        {"platform": "foo7", "address": "bar7"}
                    ]
                }
            ]
        }));
        assert_eq!(spec.recipients.len(), 2);
        assert_eq!(spec.recipients[0].platforms.len(), 1);
        assert_eq!(spec.recipients[1].platforms.len(), 2);
        assert_eq!(spec.recipients[1].email.as_deref(), Some("e@x.com"));
        assert_eq!(spec.recipients[0].weight, 0.5);
        assert_normalized(&spec);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let spec = parse(&json!({
            "recipients": [
                {"weight": 3.14, "name": "pi", "platform": "fooPi", "address": "barPi"},
                {"weight": 2.72, "name": "e", "platform": "fooE", "address": "barE"}
            ]
        }));
        assert_eq!(spec.recipients.len(), 2);
        assert_normalized(&spec);
        assert_eq!(spec.recipients[0].name.as_deref(), Some("pi"));
    }

    #[test]
    fn test_invalid_weights_dropped() {
        let spec = parse(&json!({
            "recipients": [
                {"weight": "NaN", "platform": "a", "address": "a"},
                {"weight": "Infinity", "platform": "b", "address": "b"},
                {"weight": "bold", "platform": "c", "address": "c"},
                {"weight": -50, "platform": "d", "address": "d"},
                {"weight": 50, "platform": "e", "address": "e"}
            ]
        }));
        assert_eq!(spec.recipients.len(), 1);
        assert_eq!(spec.recipients[0].weight, 1.0);
        assert_eq!(spec.recipients[0].platforms, vec![PlatformEntry::new("e", "e")]);
    }

    #[test]
    fn test_string_weights() {
        let spec = parse(&json!({
            "recipients": [
                {"weight": "3", "platform": "a", "address": "a"},
                {"weight": "1 share", "platforms": [{"platform": "b", "address": "b"}]}
            ]
        }));
        assert_eq!(spec.recipients[0].weight, 0.75);
        assert_eq!(spec.recipients[1].weight, 0.25);
    }

    #[test]
    fn test_unrecognized_members_dropped() {
        let spec = parse(&json!({
            "recipients": [
                null,
                42,
                {"weight": 2},
                {"recipients": [{"platform": "x", "address": "y"}]},
                "",
                {"platform": "ok", "address": "ok"}
            ]
        }));
        assert_eq!(spec.recipients.len(), 1);
        assert_eq!(spec.recipients[0].weight, 1.0);
    }

    #[test]
    fn test_empty_recipient_list() {
        let spec = parse(&json!({"recipients": [], "reward": "sticker"}));
        assert!(spec.is_empty());
        assert_eq!(spec.reward, Some(json!("sticker")));
    }

    #[test]
    fn test_bare_member_echoes_spec_by_default() {
        let input = json!({"recipients": ["paypal.me/carol", {"platform": "foo", "address": "bar"}]});
        let spec = parse(&input);
        assert_eq!(spec.recipients.len(), 2);
        let entry = &spec.recipients[0].platforms[0];
        assert_eq!(entry.platform, "PayPal");
        assert_eq!(entry.address, Address::Spec(Arc::new(input.clone())));
        assert_normalized(&spec);
    }

    #[test]
    fn test_bare_members_share_echoed_spec() {
        let members: Vec<Value> = (0..50).map(|i| json!(format!("paypal.me/u{}", i))).collect();
        let spec = parse(&json!({ "recipients": members }));
        assert_eq!(spec.recipients.len(), 50);

        let echoed: Vec<&Arc<Value>> = spec
            .recipients
            .iter()
            .map(|r| match &r.platforms[0].address {
                Address::Spec(shared) => shared,
                other => panic!("expected echoed spec, got {:?}", other),
            })
            .collect();
        assert!(echoed.iter().all(|shared| Arc::ptr_eq(shared, echoed[0])));
    }

    #[test]
    fn test_bare_member_corrected() {
        let input = json!({"recipients": ["paypal.me/carol", "example.org/dave"]});
        let spec = parse_with(&input, &ParseOptions::corrected());
        assert_eq!(
            spec.recipients
                .iter()
                .map(|r| r.platforms[0].clone())
                .collect::<Vec<_>>(),
            vec![
                PlatformEntry::new("PayPal", "paypal.me/carol"),
                PlatformEntry::new("Unknown", "example.org/dave"),
            ]
        );
    }

    #[test]
    fn test_multi_member_with_no_valid_platforms_kept() {
        let spec = parse(&json!({
            "recipients": [
                {"name": "empty", "platforms": [{"platform": 1, "address": 2}]},
                {"platform": "foo", "address": "bar", "weight": 3}
            ]
        }));
        assert_eq!(spec.recipients.len(), 2);
        assert!(spec.recipients[0].platforms.is_empty());
        assert_eq!(spec.recipients[0].weight, 0.25);
    }

    // ── Text input ─────────────────────────────────────

    #[test]
    fn test_parse_str() {
        let spec = parse_str(r#"{"platform": "foo", "address": "bar"}"#).unwrap();
        assert_eq!(spec.recipients.len(), 1);

        let spec = parse_str("25").unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_parse_str_invalid_json() {
        assert!(matches!(parse_str("{\"platform\":"), Err(crate::Error::Json(_))));
    }
}
