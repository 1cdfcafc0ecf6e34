//! Typed Message Events records.
//!
//! # Design
//! `Event` is a closed sum type with one variant per supported `type` tag.
//! Each variant wraps its own struct. Fields shared by every message-level
//! event live in [`Message`], fields shared by inbound relay events live in
//! [`Relay`]; both are flattened into the variant structs so the JSON stays
//! a single flat object.
//!
//! The API sends many numeric values as strings (`num_retries`,
//! `msg_size`, `bounce_class`, ...). They are kept as `String` here.
//!
//! Only serialization is derived on `Event` itself. Decoding goes through
//! the registry, which picks the variant from the record's `type` field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields common to events about a message SparkPost sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub event_id: String,
    pub timestamp: String,
    pub message_id: Option<String>,
    pub transmission_id: Option<String>,
    pub campaign_id: Option<String>,
    pub customer_id: Option<String>,
    pub subaccount_id: Option<String>,
    pub template_id: Option<String>,
    pub template_version: Option<String>,
    pub friendly_from: Option<String>,
    pub msg_from: Option<String>,
    pub rcpt_to: Option<String>,
    pub raw_rcpt_to: Option<String>,
    pub rcpt_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rcpt_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub rcpt_meta: Map<String, Value>,
    pub subject: Option<String>,
    pub ip_pool: Option<String>,
    pub sending_ip: Option<String>,
    pub routing_domain: Option<String>,
    pub injection_time: Option<String>,
    pub msg_size: Option<String>,
}

/// Fields common to inbound relay webhook events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relay {
    pub event_id: String,
    pub timestamp: String,
    pub relay_id: Option<String>,
    pub webhook_id: Option<String>,
    pub customer_id: Option<String>,
    pub friendly_from: Option<String>,
    pub msg_from: Option<String>,
    pub rcpt_to: Option<String>,
    pub origination: Option<String>,
}

/// Geolocation attached to engagement events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoIp {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounce {
    #[serde(flatten)]
    pub message: Message,
    pub bounce_class: Option<String>,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
    pub num_retries: Option<String>,
    pub device_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Click {
    #[serde(flatten)]
    pub message: Message,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub geo_ip: Option<GeoIp>,
    pub target_link_name: Option<String>,
    pub target_link_url: Option<String>,
}

/// A temporary failure; the message will be retried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    #[serde(flatten)]
    pub message: Message,
    pub bounce_class: Option<String>,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
    pub num_retries: Option<String>,
    pub queue_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(flatten)]
    pub message: Message,
    pub num_retries: Option<String>,
    pub queue_time: Option<String>,
    pub outbound_tls: Option<String>,
    pub device_token: Option<String>,
}

/// A message could not be generated from its template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationFailure {
    #[serde(flatten)]
    pub message: Message,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRejection {
    #[serde(flatten)]
    pub message: Message,
    pub bounce_class: Option<String>,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Injection {
    #[serde(flatten)]
    pub message: Message,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkUnsubscribe {
    #[serde(flatten)]
    pub message: Message,
    pub mailfrom: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub target_link_name: Option<String>,
    pub target_link_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListUnsubscribe {
    #[serde(flatten)]
    pub message: Message,
    pub mailfrom: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Open {
    #[serde(flatten)]
    pub message: Message,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub geo_ip: Option<GeoIp>,
}

/// An asynchronous bounce received after the message was accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutOfBand {
    #[serde(flatten)]
    pub message: Message,
    pub bounce_class: Option<String>,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRejection {
    #[serde(flatten)]
    pub message: Message,
    pub bounce_class: Option<String>,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
    pub remote_addr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayDelivery {
    #[serde(flatten)]
    pub relay: Relay,
    pub num_retries: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayInjection {
    #[serde(flatten)]
    pub relay: Relay,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayPermfail {
    #[serde(flatten)]
    pub relay: Relay,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
    pub num_retries: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayRejection {
    #[serde(flatten)]
    pub relay: Relay,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
    pub remote_addr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayTempfail {
    #[serde(flatten)]
    pub relay: Relay,
    pub error_code: Option<String>,
    pub reason: Option<String>,
    pub raw_reason: Option<String>,
    pub num_retries: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpamComplaint {
    #[serde(flatten)]
    pub message: Message,
    pub fbtype: Option<String>,
    pub report_by: Option<String>,
    pub report_to: Option<String>,
    pub user_str: Option<String>,
}

/// One decoded Message Events record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Bounce(Bounce),
    Click(Click),
    Delay(Delay),
    Delivery(Delivery),
    GenerationFailure(GenerationFailure),
    GenerationRejection(GenerationRejection),
    Injection(Injection),
    LinkUnsubscribe(LinkUnsubscribe),
    ListUnsubscribe(ListUnsubscribe),
    Open(Open),
    OutOfBand(OutOfBand),
    PolicyRejection(PolicyRejection),
    RelayDelivery(RelayDelivery),
    RelayInjection(RelayInjection),
    RelayPermfail(RelayPermfail),
    RelayRejection(RelayRejection),
    RelayTempfail(RelayTempfail),
    SpamComplaint(SpamComplaint),
}

impl Event {
    /// The `type` tag this event carries on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Bounce(_) => "bounce",
            Event::Click(_) => "click",
            Event::Delay(_) => "delay",
            Event::Delivery(_) => "delivery",
            Event::GenerationFailure(_) => "generation_failure",
            Event::GenerationRejection(_) => "generation_rejection",
            Event::Injection(_) => "injection",
            Event::LinkUnsubscribe(_) => "link_unsubscribe",
            Event::ListUnsubscribe(_) => "list_unsubscribe",
            Event::Open(_) => "open",
            Event::OutOfBand(_) => "out_of_band",
            Event::PolicyRejection(_) => "policy_rejection",
            Event::RelayDelivery(_) => "relay_delivery",
            Event::RelayInjection(_) => "relay_injection",
            Event::RelayPermfail(_) => "relay_permfail",
            Event::RelayRejection(_) => "relay_rejection",
            Event::RelayTempfail(_) => "relay_tempfail",
            Event::SpamComplaint(_) => "spam_complaint",
        }
    }
}
