#![forbid(unsafe_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kwarn_core::layout::EnvSignals;
use kwarn_core::links::RouteLinks;
use kwarn_core::normalize::Normalizer;
use kwarn_core::time::UtcTime;
use kwarn_core::view::render;
use kwarn_core::{ClusterContext, FetchError, RawEvent, ResultState, Settings};
use kwarn_kubehub::EventSource;
use kwarn_poll::{spawn_scheduler, PanelHandle, PanelSnapshot};
use tokio::sync::Notify;

type Reply = Result<Vec<RawEvent>, FetchError>;

/// Scripted source: replies are queued per context name; the last reply repeats. A context
/// may be gated so its fetch blocks until released.
#[derive(Default)]
struct ScriptedSource {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: AtomicUsize,
    limits: Mutex<Vec<u32>>,
}

impl ScriptedSource {
    fn reply(self, ctx: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().entry(ctx.to_string()).or_default().push_back(reply);
        self
    }

    fn gate(self, ctx: &str) -> (Self, Arc<Notify>) {
        let n = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(ctx.to_string(), n.clone());
        (self, n)
    }
}

#[async_trait::async_trait]
impl EventSource for ScriptedSource {
    async fn fetch_warnings(&self, limit: u32, _settings: &Settings, context: &ClusterContext) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.limits.lock().unwrap().push(limit);
        let key = context.name.clone().unwrap_or_default();
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(g) = gate {
            g.notified().await;
        }
        let mut replies = self.replies.lock().unwrap();
        let q = replies.entry(key).or_default();
        if q.len() > 1 {
            q.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        } else {
            q.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

fn named(name: &str) -> RawEvent {
    RawEvent { name: Some(name.to_string()), reason: Some("Failed".into()), ..Default::default() }
}

fn settings(interval_ms: u64) -> Settings {
    Settings { poll_interval_ms: interval_ms, ..Settings::default() }
}

fn normalizer() -> Arc<Normalizer> { Arc::new(Normalizer::new(Arc::new(RouteLinks), Arc::new(UtcTime))) }

fn keys(s: &PanelSnapshot) -> Option<Vec<String>> {
    s.state.events().map(|evs| evs.iter().map(|e| e.identity_key.clone()).collect())
}

async fn wait_for<F>(handle: &PanelHandle, pred: F) -> Arc<PanelSnapshot>
where
    F: Fn(&PanelSnapshot) -> bool,
{
    let mut rx = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            let snap = handle.snapshot();
            if pred(&snap) {
                return snap;
            }
            rx.changed().await.expect("scheduler alive");
        }
    })
    .await
    .expect("condition reached in time")
}

#[tokio::test]
async fn first_poll_runs_immediately_and_dedups() {
    let source = ScriptedSource::default().reply("a", Ok(vec![named("OOMKilled.a1"), named("OOMKilled.b2"), named("Evicted.c3")]));
    let handle = spawn_scheduler(Arc::new(source), normalizer(), settings(60_000), ClusterContext::named("a"));
    assert_eq!(handle.snapshot().state, ResultState::Loading);

    let snap = wait_for(&handle, |s| matches!(s.state, ResultState::Ready(_))).await;
    assert_eq!(keys(&snap), Some(vec!["OOMKilled".to_string(), "Evicted".to_string()]));
    assert_eq!(snap.context, ClusterContext::named("a"));
}

#[tokio::test]
async fn fetch_error_hides_the_panel() {
    let source = ScriptedSource::default()
        .reply("a", Ok(vec![named("x.1")]))
        .reply("a", Err(FetchError::transport("connection reset")));
    let handle = spawn_scheduler(Arc::new(source), normalizer(), settings(250), ClusterContext::named("a"));

    wait_for(&handle, |s| matches!(s.state, ResultState::Ready(_))).await;
    let snap = wait_for(&handle, |s| s.state == ResultState::Errored).await;

    let wide = EnvSignals { compact_platform: false, viewport_width: 1400.0 };
    assert!(render(&snap.state, &wide).is_none());
}

#[tokio::test]
async fn late_response_for_previous_context_is_ignored() {
    let (source, gate_a) = ScriptedSource::default()
        .reply("a", Ok(vec![named("from-a.1")]))
        .reply("b", Ok(vec![named("from-b.1")]))
        .gate("a");
    let handle = spawn_scheduler(Arc::new(source), normalizer(), settings(60_000), ClusterContext::named("a"));

    // Let the first poll for "a" start and block on its gate
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.switch_context(ClusterContext::named("b"));

    let snap = wait_for(&handle, |s| s.context == ClusterContext::named("b") && matches!(s.state, ResultState::Ready(_))).await;
    assert_eq!(keys(&snap), Some(vec!["from-b".to_string()]));

    gate_a.notify_waiters();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after = handle.snapshot();
    assert_eq!(after.context, ClusterContext::named("b"));
    assert_eq!(keys(&after), Some(vec!["from-b".to_string()]));
    assert_eq!(after.epoch, snap.epoch);
}

#[tokio::test]
async fn context_switch_resets_to_loading() {
    let (source, _gate_b) = ScriptedSource::default().reply("a", Ok(vec![named("x.1")])).gate("b");
    let handle = spawn_scheduler(Arc::new(source), normalizer(), settings(60_000), ClusterContext::named("a"));
    wait_for(&handle, |s| matches!(s.state, ResultState::Ready(_))).await;

    handle.switch_context(ClusterContext::named("b"));
    let snap = wait_for(&handle, |s| s.context == ClusterContext::named("b")).await;
    assert_eq!(snap.state, ResultState::Loading);
    assert!(snap.generation > 0);
}

#[tokio::test]
async fn manual_refresh_polls_again() {
    let source = Arc::new(
        ScriptedSource::default()
            .reply("a", Ok(vec![named("first.1")]))
            .reply("a", Ok(vec![named("second.1")])),
    );
    let handle = spawn_scheduler(source.clone(), normalizer(), settings(60_000), ClusterContext::named("a"));
    wait_for(&handle, |s| keys(s) == Some(vec!["first".to_string()])).await;

    handle.refresh();
    let snap = wait_for(&handle, |s| keys(s) == Some(vec!["second".to_string()])).await;
    assert_eq!(snap.generation, 1);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn polls_repeat_on_the_interval() {
    let source = Arc::new(ScriptedSource::default().reply("a", Ok(vec![named("x.1")])));
    let handle = spawn_scheduler(source.clone(), normalizer(), settings(250), ClusterContext::named("a"));
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(source.calls.load(Ordering::SeqCst) >= 3);

    handle.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let settled = source.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn zero_interval_and_limit_are_bounded() {
    let source = Arc::new(ScriptedSource::default().reply("a", Ok(vec![named("x.1")])));
    let zeroed = Settings { query_limit: 0, poll_interval_ms: 0, ..Settings::default() };
    let handle = spawn_scheduler(source.clone(), normalizer(), zeroed, ClusterContext::named("a"));

    let snap = wait_for(&handle, |s| matches!(s.state, ResultState::Ready(_))).await;
    assert_eq!(keys(&snap), Some(vec!["x".to_string()]));

    // Interval raised to the 250ms floor: a handful of polls, not a busy loop
    tokio::time::sleep(Duration::from_millis(600)).await;
    let calls = source.calls.load(Ordering::SeqCst);
    assert!((2..=5).contains(&calls), "calls = {}", calls);
    let limits = source.limits.lock().unwrap().clone();
    assert!(limits.iter().all(|l| *l == kwarn_core::config::DEFAULT_QUERY_LIMIT));
}
