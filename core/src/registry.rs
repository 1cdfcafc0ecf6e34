//! Event type registry and discriminator extraction.
//!
//! # Design
//! The registry is a fixed table from `type` tag to a decoder for that
//! variant, built once on first use. Adding a supported event type means
//! adding a variant to `Event` and a row to `ENTRIES`; nothing is registered
//! at runtime.
//!
//! The tag is found with a regex scan over the raw record text before the
//! record is parsed, then confirmed against the record's top-level `type`
//! field. The scan alone could hit a `"type": "..."` pair nested inside
//! some other value.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::ApiError;
use crate::events::*;

type DecodeFn = fn(&str) -> Result<Event, serde_json::Error>;

/// A supported event type: its tag, a zero-value constructor and a decoder.
pub struct RegistryEntry {
    kind: &'static str,
    empty: fn() -> Event,
    decode: DecodeFn,
}

impl RegistryEntry {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// A fresh event of this type with every field at its default.
    ///
    /// Decoding never goes through this. It is for callers that need a
    /// value of a given kind without a record, such as building fixtures
    /// or a placeholder to fill in field by field.
    pub fn empty(&self) -> Event {
        (self.empty)()
    }

    /// Decode one full record into this entry's variant.
    pub fn decode(&self, raw: &str) -> Result<Event, serde_json::Error> {
        (self.decode)(raw)
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry").field("kind", &self.kind).finish()
    }
}

static ENTRIES: &[RegistryEntry] = &[
    RegistryEntry {
        kind: "bounce",
        empty: || Event::Bounce(Bounce::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::Bounce),
    },
    RegistryEntry {
        kind: "click",
        empty: || Event::Click(Click::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::Click),
    },
    RegistryEntry {
        kind: "delay",
        empty: || Event::Delay(Delay::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::Delay),
    },
    RegistryEntry {
        kind: "delivery",
        empty: || Event::Delivery(Delivery::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::Delivery),
    },
    RegistryEntry {
        kind: "generation_failure",
        empty: || Event::GenerationFailure(GenerationFailure::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::GenerationFailure),
    },
    RegistryEntry {
        kind: "generation_rejection",
        empty: || Event::GenerationRejection(GenerationRejection::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::GenerationRejection),
    },
    RegistryEntry {
        kind: "injection",
        empty: || Event::Injection(Injection::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::Injection),
    },
    RegistryEntry {
        kind: "link_unsubscribe",
        empty: || Event::LinkUnsubscribe(LinkUnsubscribe::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::LinkUnsubscribe),
    },
    RegistryEntry {
        kind: "list_unsubscribe",
        empty: || Event::ListUnsubscribe(ListUnsubscribe::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::ListUnsubscribe),
    },
    RegistryEntry {
        kind: "open",
        empty: || Event::Open(Open::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::Open),
    },
    RegistryEntry {
        kind: "out_of_band",
        empty: || Event::OutOfBand(OutOfBand::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::OutOfBand),
    },
    RegistryEntry {
        kind: "policy_rejection",
        empty: || Event::PolicyRejection(PolicyRejection::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::PolicyRejection),
    },
    RegistryEntry {
        kind: "relay_delivery",
        empty: || Event::RelayDelivery(RelayDelivery::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::RelayDelivery),
    },
    RegistryEntry {
        kind: "relay_injection",
        empty: || Event::RelayInjection(RelayInjection::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::RelayInjection),
    },
    RegistryEntry {
        kind: "relay_permfail",
        empty: || Event::RelayPermfail(RelayPermfail::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::RelayPermfail),
    },
    RegistryEntry {
        kind: "relay_rejection",
        empty: || Event::RelayRejection(RelayRejection::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::RelayRejection),
    },
    RegistryEntry {
        kind: "relay_tempfail",
        empty: || Event::RelayTempfail(RelayTempfail::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::RelayTempfail),
    },
    RegistryEntry {
        kind: "spam_complaint",
        empty: || Event::SpamComplaint(SpamComplaint::default()),
        decode: |raw| serde_json::from_str(raw).map(Event::SpamComplaint),
    },
];

fn registry() -> &'static HashMap<&'static str, &'static RegistryEntry> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static RegistryEntry>> = OnceLock::new();
    REGISTRY.get_or_init(|| ENTRIES.iter().map(|e| (e.kind, e)).collect())
}

/// Find the entry for an exact, case-sensitive `type` tag.
pub fn lookup(kind: &str) -> Option<&'static RegistryEntry> {
    registry().get(kind).copied()
}

pub fn is_registered(kind: &str) -> bool {
    registry().contains_key(kind)
}

/// Every supported tag, sorted.
pub fn kinds() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|e| e.kind)
}

fn type_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""type"\s*:\s*"([A-Za-z0-9_]+)""#).unwrap())
}

#[derive(Deserialize)]
struct TopLevelType {
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn is_tag(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Extract the `type` tag of the record at `index`.
///
/// Fails when the raw text has no `"type": "<word>"` pair, or when the
/// record's own top-level `type` is missing, not a string or not a word.
/// When the two disagree the top-level value wins.
pub fn extract_kind(index: usize, raw: &RawValue) -> Result<String, ApiError> {
    let text = raw.get();
    let fault = || ApiError::Discriminator {
        index,
        record: text.to_string(),
    };

    let scanned = type_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(fault)?;

    let top_level = serde_json::from_str::<TopLevelType>(text)
        .ok()
        .and_then(|t| t.kind)
        .filter(|k| is_tag(k))
        .ok_or_else(fault)?;

    if top_level != scanned {
        tracing::debug!(index, scanned, top_level = %top_level, "type pre-scan disagrees with record");
    }
    Ok(top_level)
}
