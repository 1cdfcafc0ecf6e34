//! The Message Events API handle.
//!
//! Each call is a one-shot pipeline: build the request, run it through a
//! transport, check the content type and status, unwrap the envelope and
//! decode the batch. The handle keeps nothing from one call to the next.

use url::Url;

use crate::client::{check_response, ApiClient};
use crate::config::Config;
use crate::decode::{decode_envelope, EventBatch};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::registry;

#[derive(Debug, Clone)]
pub struct MessageEvents {
    api: ApiClient,
}

impl MessageEvents {
    pub fn new(config: Config) -> Self {
        let path = format!("/api/v{}/message-events", config.api_version);
        Self {
            api: ApiClient::new(config, &path),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Build the request for example events.
    ///
    /// `kinds` restricts the samples to those event types. `None` and an
    /// empty slice both mean every type. Each kind must be registered; the
    /// first one that is not fails the build with `InvalidEventType`.
    pub fn build_samples(&self, kinds: Option<&[&str]>) -> Result<HttpRequest, ApiError> {
        let kinds = kinds.filter(|k| !k.is_empty());
        if let Some(kinds) = kinds {
            if let Some(bad) = kinds.iter().find(|k| !registry::is_registered(k)) {
                return Err(ApiError::InvalidEventType(bad.to_string()));
            }
        }

        let mut url = Url::parse(&self.api.url_for("/events/samples"))?;
        if let Some(kinds) = kinds {
            url.query_pairs_mut().append_pair("events", &kinds.join(","));
        }
        Ok(self.api.build_get(url.as_str()))
    }

    pub fn parse_samples(&self, response: HttpResponse) -> Result<EventBatch, ApiError> {
        check_response("event samples", "retrieve", &response)?;
        decode_envelope(&response.body)
    }

    /// Fetch and decode example events through `transport`.
    pub fn samples<T: Transport>(
        &self,
        transport: &T,
        kinds: Option<&[&str]>,
    ) -> Result<EventBatch, ApiError> {
        let request = self.build_samples(kinds)?;
        tracing::debug!(url = %request.url, "requesting event samples");
        let response = transport.execute(request)?;
        let batch = self.parse_samples(response)?;
        tracing::debug!(
            events = batch.events.len(),
            skipped = batch.skipped.len(),
            "decoded event samples"
        );
        Ok(batch)
    }
}
