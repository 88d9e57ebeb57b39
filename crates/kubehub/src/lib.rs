//! kwarn kubehub – warning event source and kube wiring

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use http::Method;
use k8s_openapi::api::core::v1::Event;
use kwarn_core::{ClusterContext, FetchError, ObjectRef, RawEvent, Settings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

mod transport;

pub use transport::{KubeTransport, KubeconfigAuth};

pub type FetchResult<T> = Result<T, FetchError>;

/// Credential handed from the auth provider to the transport. Opaque to the source.
#[derive(Clone)]
pub enum Credential {
    /// No credential; transports that need one fail with an auth error.
    Anonymous,
    Kube(kube::Client),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Anonymous => f.write_str("Anonymous"),
            Credential::Kube(_) => f.write_str("Kube(..)"),
        }
    }
}

/// Generic authenticated request transport.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: &str,
        settings: &Settings,
        credential: &Credential,
    ) -> FetchResult<Vec<u8>>;
}

/// Produces a fresh credential for a cluster context; called once per fetch.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn credential(&self, context: &ClusterContext) -> FetchResult<Credential>;
}

/// Source of warning events for one poll.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_warnings(
        &self,
        limit: u32,
        settings: &Settings,
        context: &ClusterContext,
    ) -> FetchResult<Vec<RawEvent>>;
}

/// Events API path for warning events bounded by `limit`.
pub fn warning_events_path(limit: u32) -> String {
    format!("/api/v1/events?limit={}&fieldSelector=type=Warning", limit)
}

#[derive(Deserialize)]
struct WireEventList {
    #[serde(default)]
    items: Vec<Event>,
}

pub fn raw_event(ev: Event) -> RawEvent {
    let obj = ev.involved_object;
    RawEvent {
        involved_object: ObjectRef { kind: obj.kind, namespace: obj.namespace, name: obj.name },
        name: ev.metadata.name,
        namespace: ev.metadata.namespace,
        reason: ev.reason,
        message: ev.message,
        first_seen: ev.first_timestamp.map(|t| t.0),
        last_seen: ev.last_timestamp.map(|t| t.0),
    }
}

/// Decode an events list response body.
pub fn decode_events(body: &[u8]) -> FetchResult<Vec<RawEvent>> {
    let list: WireEventList = serde_json::from_slice(body)
        .map_err(|e| FetchError::malformed(format!("decoding event list: {}", e)))?;
    Ok(list.items.into_iter().map(raw_event).collect())
}

/// Event source built from an auth provider and a transport.
pub struct WarningSource {
    auth: Arc<dyn AuthProvider>,
    transport: Arc<dyn Transport>,
}

impl WarningSource {
    pub fn new(auth: Arc<dyn AuthProvider>, transport: Arc<dyn Transport>) -> Self {
        Self { auth, transport }
    }

    /// Kubeconfig auth + kube client transport.
    pub fn kube() -> Self {
        Self::new(Arc::new(KubeconfigAuth::new()), Arc::new(KubeTransport))
    }
}

#[async_trait::async_trait]
impl EventSource for WarningSource {
    async fn fetch_warnings(
        &self,
        limit: u32,
        settings: &Settings,
        context: &ClusterContext,
    ) -> FetchResult<Vec<RawEvent>> {
        let t0 = Instant::now();
        let credential = self.auth.credential(context).await?;
        let path = warning_events_path(limit);
        debug!(ctx = %context, path = %path, "source: request");
        let body = self.transport.request(Method::GET, &path, "", settings, &credential).await?;
        let events = decode_events(&body)?;
        info!(ctx = %context, events = events.len(), bytes = body.len(), took_ms = %t0.elapsed().as_millis(), "source: warnings fetched");
        Ok(events)
    }
}

/// Context names found in the kubeconfig.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KubeContexts {
    pub names: Vec<String>,
    pub current: Option<String>,
}

/// Read the kubeconfig (honoring `KUBECONFIG`) and list its contexts.
pub fn kubeconfig_contexts() -> Result<KubeContexts> {
    let kc = kube::config::Kubeconfig::read().context("reading kubeconfig")?;
    let mut names: Vec<String> = kc.contexts.iter().map(|c| c.name.clone()).collect();
    names.sort();
    names.dedup();
    Ok(KubeContexts { names, current: kc.current_context })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_shape_is_stable() {
        assert_eq!(warning_events_path(250), "/api/v1/events?limit=250&fieldSelector=type=Warning");
        assert_eq!(warning_events_path(1), "/api/v1/events?limit=1&fieldSelector=type=Warning");
    }

    #[test]
    fn decode_maps_event_fields() {
        let body = serde_json::json!({
            "apiVersion": "v1",
            "kind": "EventList",
            "metadata": {},
            "items": [{
                "metadata": { "name": "web-0.17b2c", "namespace": "prod" },
                "involvedObject": { "kind": "Pod", "namespace": "prod", "name": "web-0" },
                "reason": "BackOff",
                "message": "Back-off restarting failed container",
                "type": "Warning",
                "firstTimestamp": "2024-02-01T10:00:00Z",
                "lastTimestamp": "2024-02-01T10:05:00Z"
            }, {
                "metadata": {},
                "involvedObject": {}
            }]
        });
        let events = decode_events(&serde_json::to_vec(&body).unwrap()).unwrap();
        assert_eq!(events.len(), 2);
        let e = &events[0];
        assert_eq!(e.name.as_deref(), Some("web-0.17b2c"));
        assert_eq!(e.namespace.as_deref(), Some("prod"));
        assert_eq!(e.involved_object.kind.as_deref(), Some("Pod"));
        assert_eq!(e.reason.as_deref(), Some("BackOff"));
        assert_eq!(e.first_seen.map(|t| t.to_rfc3339()), Some("2024-02-01T10:00:00+00:00".to_string()));
        assert_eq!(events[1], RawEvent::default());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_events(b"<html>502</html>").unwrap_err();
        assert_eq!(err.kind, kwarn_core::FetchErrorKind::Malformed);
        assert!(decode_events(b"{}").unwrap().is_empty());
    }
}
