#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::future::Future;

use http::Method;
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use kwarn_core::{ClusterContext, FetchError, FetchErrorKind, RetryPolicy, Settings};
use metrics::counter;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{AuthProvider, Credential, FetchResult, Transport};

fn classify(e: kube::Error) -> FetchError {
    match e {
        kube::Error::Api(resp) if resp.code == 401 || resp.code == 403 => {
            FetchError::auth(format!("{} ({})", resp.message, resp.code))
        }
        kube::Error::Auth(e) => FetchError::auth(e.to_string()),
        kube::Error::SerdeError(e) => FetchError::malformed(e.to_string()),
        kube::Error::FromUtf8(e) => FetchError::malformed(e.to_string()),
        other => FetchError::transport(other.to_string()),
    }
}

/// Run `op` until it succeeds, fails with an auth error, or `policy.attempts` is used up
/// (at least one attempt). Sleeps `policy.backoff()` between attempts.
pub(crate) async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(err) => {
                if err.kind == FetchErrorKind::Auth || attempt >= attempts {
                    return Err(err);
                }
                warn!(attempt, attempts, error = %err, "transport: request failed; retrying");
                counter!("warnings_fetch_retries_total", 1);
                tokio::time::sleep(policy.backoff()).await;
                attempt += 1;
            }
        }
    }
}

/// Sends requests through the kube client carried by the credential, retrying according
/// to `settings.retry`. Auth failures are not retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct KubeTransport;

#[async_trait::async_trait]
impl Transport for KubeTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: &str,
        settings: &Settings,
        credential: &Credential,
    ) -> FetchResult<Vec<u8>> {
        let Credential::Kube(client) = credential else {
            return Err(FetchError::auth("no cluster client for request"));
        };
        with_retry(&settings.retry, || {
            let req = http::Request::builder()
                .method(method.clone())
                .uri(path)
                .body(body.as_bytes().to_vec())
                .map_err(|e| FetchError::transport(format!("building request: {}", e)));
            let client = client.clone();
            async move {
                let text = client.request_text(req?).await.map_err(classify)?;
                Ok(text.into_bytes())
            }
        })
        .await
    }
}

/// Per-context cache. The lock covers lookups and inserts only, never a build, so a slow
/// login for one context does not hold up the others.
pub(crate) struct ClientCache<C> {
    inner: Mutex<HashMap<Option<String>, C>>,
}

impl<C> Default for ClientCache<C> {
    fn default() -> Self { Self { inner: Mutex::new(HashMap::new()) } }
}

impl<C: Clone> ClientCache<C> {
    pub(crate) async fn get_or_build<F, Fut>(&self, key: &Option<String>, build: F) -> FetchResult<C>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<C>>,
    {
        let cached = self.inner.lock().await.get(key).cloned();
        if let Some(c) = cached {
            return Ok(c);
        }
        let built = build().await?;
        // A concurrent build for the same key may have landed first; keep that one
        let mut map = self.inner.lock().await;
        Ok(map.entry(key.clone()).or_insert(built).clone())
    }
}

/// Builds kube clients from kubeconfig, one per context, and reuses them. Token refresh
/// (exec plugins, OIDC) is handled inside the client.
#[derive(Default)]
pub struct KubeconfigAuth {
    clients: ClientCache<Client>,
}

impl KubeconfigAuth {
    pub fn new() -> Self { Self::default() }
}

async fn build_client(context: &ClusterContext) -> FetchResult<Client> {
    let config = match &context.name {
        // Current context, falling back to in-cluster config
        None => Config::infer().await.map_err(|e| FetchError::auth(e.to_string()))?,
        Some(name) => {
            let options = KubeConfigOptions { context: Some(name.clone()), cluster: None, user: None };
            Config::from_kubeconfig(&options).await.map_err(|e| FetchError::auth(e.to_string()))?
        }
    };
    let client = Client::try_from(config).map_err(|e| FetchError::auth(e.to_string()))?;
    info!(ctx = %context, "auth: client ready");
    Ok(client)
}

#[async_trait::async_trait]
impl AuthProvider for KubeconfigAuth {
    async fn credential(&self, context: &ClusterContext) -> FetchResult<Credential> {
        let client = self.clients.get_or_build(&context.name, || build_client(context)).await?;
        Ok(Credential::Kube(client))
    }
}
