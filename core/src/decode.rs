//! Batch decoding of Message Events records.
//!
//! # Design
//! The envelope is parsed with each record left as a borrowed `RawValue`,
//! so a record is only fully parsed once its type is known. Per record:
//!
//! 1. extract the `type` tag; failure aborts the batch,
//! 2. look the tag up in the registry; an unknown tag skips the record,
//! 3. decode into the registered variant; failure aborts the batch.
//!
//! Errors never come with a partial result.

use std::borrow::Borrow;
use std::collections::HashMap;

use serde_json::value::RawValue;

use crate::error::ApiError;
use crate::events::Event;
use crate::registry;

/// A record dropped because its type is not supported by this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the record in the `results` array.
    pub index: usize,
    pub kind: String,
}

/// The decoded events, in the order the API returned them, plus the records
/// that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBatch {
    pub events: Vec<Event>,
    pub skipped: Vec<SkippedRecord>,
}

/// Unwrap `{"results": [...]}` and decode every record in it.
///
/// The body must be a JSON object. A missing or `null` `results` is
/// [`ApiError::MissingResults`].
pub fn decode_envelope(body: &str) -> Result<EventBatch, ApiError> {
    // A map only deserializes from an object; a derived struct would also
    // take a positional array.
    let envelope: HashMap<String, &RawValue> =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let results = match envelope.get("results") {
        Some(raw) if raw.get() != "null" => *raw,
        _ => return Err(ApiError::MissingResults),
    };
    let records: Vec<&RawValue> = serde_json::from_str(results.get())
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    decode_events(&records)
}

/// Decode an ordered list of raw records.
pub fn decode_events<R: Borrow<RawValue>>(records: &[R]) -> Result<EventBatch, ApiError> {
    let mut batch = EventBatch {
        events: Vec::with_capacity(records.len()),
        skipped: Vec::new(),
    };

    for (index, record) in records.iter().enumerate() {
        let raw: &RawValue = record.borrow();
        let kind = registry::extract_kind(index, raw)?;

        let Some(entry) = registry::lookup(&kind) else {
            tracing::warn!(index, kind = %kind, "unhandled event type");
            batch.skipped.push(SkippedRecord { index, kind });
            continue;
        };

        let event = entry
            .decode(raw.get())
            .map_err(|source| ApiError::Decode { kind, source })?;
        batch.events.push(event);
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Delivery, Message};

    fn records(items: &[&str]) -> Vec<Box<RawValue>> {
        items
            .iter()
            .map(|s| RawValue::from_string(s.to_string()).unwrap())
            .collect()
    }

    const DELIVERY: &str = r#"{"type":"delivery","event_id":"1","timestamp":"1454442600"}"#;
    const BOUNCE: &str = r#"{"type":"bounce","event_id":"2","timestamp":"1454442601","bounce_class":"10"}"#;
    const OPEN: &str = r#"{"type":"open","event_id":"3","timestamp":"1454442602"}"#;
    const AMP_OPEN: &str = r#"{"type":"amp_open","event_id":"4","timestamp":"1454442603"}"#;
    const SMS_STATUS: &str = r#"{"type":"sms_status","event_id":"5","timestamp":"1454442604"}"#;

    fn event_ids(batch: &EventBatch) -> Vec<String> {
        batch
            .events
            .iter()
            .map(|e| serde_json::to_value(e).unwrap()["event_id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn empty_batch_decodes_to_nothing() {
        let batch = decode_events::<Box<RawValue>>(&[]).unwrap();
        assert!(batch.events.is_empty());
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn known_records_decode_in_order() {
        let batch = decode_events(&records(&[OPEN, DELIVERY, BOUNCE])).unwrap();
        let kinds: Vec<_> = batch.events.iter().map(Event::kind).collect();
        assert_eq!(kinds, vec!["open", "delivery", "bounce"]);
        assert_eq!(event_ids(&batch), vec!["3", "1", "2"]);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn unknown_records_are_skipped_and_order_is_kept() {
        let batch =
            decode_events(&records(&[AMP_OPEN, DELIVERY, SMS_STATUS, BOUNCE, OPEN])).unwrap();
        assert_eq!(event_ids(&batch), vec!["1", "2", "3"]);
        assert_eq!(
            batch.skipped,
            vec![
                SkippedRecord { index: 0, kind: "amp_open".to_string() },
                SkippedRecord { index: 2, kind: "sms_status".to_string() },
            ]
        );
    }

    #[tracing_test::traced_test]
    #[test]
    fn unknown_records_are_logged() {
        decode_events(&records(&[AMP_OPEN])).unwrap();
        assert!(logs_contain("unhandled event type"));
        assert!(logs_contain("amp_open"));
    }

    #[test]
    fn record_without_type_fails_the_whole_batch() {
        let err = decode_events(&records(&[DELIVERY, r#"{"event_id":"9"}"#, BOUNCE])).unwrap_err();
        assert!(matches!(err, ApiError::Discriminator { index: 1, .. }));
    }

    #[test]
    fn bad_payload_for_known_type_names_the_type() {
        let bad = r#"{"type":"bounce","event_id":"2","timestamp":"1","rcpt_to":42}"#;
        let err = decode_events(&records(&[DELIVERY, bad])).unwrap_err();
        match &err {
            ApiError::Decode { kind, .. } => assert_eq!(kind, "bounce"),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("error parsing [bounce]"));
    }

    #[test]
    fn bad_payload_for_unknown_type_is_still_skipped() {
        let bad = r#"{"type":"amp_click","event_id":42}"#;
        let batch = decode_events(&records(&[bad, DELIVERY])).unwrap();
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.skipped.len(), 1);
    }

    #[test]
    fn envelope_without_results_is_an_error() {
        let err = decode_envelope(r#"{"errors":[]}"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingResults));

        let err = decode_envelope(r#"{"results":null}"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingResults));
    }

    #[test]
    fn envelope_must_be_json() {
        let err = decode_envelope("<html></html>").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn envelope_must_be_an_object() {
        let err = decode_envelope(&format!("[[{DELIVERY}]]")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));

        let err = decode_envelope("[null]").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn envelope_results_must_be_an_array() {
        let err = decode_envelope(&format!(r#"{{"results":{DELIVERY}}}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn envelope_with_escaped_keys_still_decodes() {
        let body = format!(r#"{{"li\"nks":{{}},"results":[{DELIVERY}]}}"#);
        let batch = decode_envelope(&body).unwrap();
        assert_eq!(batch.events.len(), 1);
    }

    #[test]
    fn envelope_with_empty_results_is_empty() {
        let batch = decode_envelope(r#"{"results":[]}"#).unwrap();
        assert_eq!(batch, EventBatch::default());
    }

    #[test]
    fn envelope_extra_fields_are_ignored() {
        let body = format!(r#"{{"results":[{DELIVERY}],"total_count":1,"links":{{}}}}"#);
        let batch = decode_envelope(&body).unwrap();
        assert_eq!(batch.events.len(), 1);
    }

    #[test]
    fn encoded_event_decodes_to_an_equal_value() {
        let event = Event::Delivery(Delivery {
            message: Message {
                event_id: "92356927693813856".to_string(),
                timestamp: "1454442600".to_string(),
                rcpt_to: Some("recipient@example.com".to_string()),
                rcpt_tags: vec!["vip".to_string()],
                ..Message::default()
            },
            queue_time: Some("12".to_string()),
            ..Delivery::default()
        });
        let body = format!(r#"{{"results":[{}]}}"#, serde_json::to_string(&event).unwrap());
        let batch = decode_envelope(&body).unwrap();
        assert_eq!(batch.events, vec![event]);
    }
}
