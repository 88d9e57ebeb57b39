//! kwarn poll scheduler
//!
//! Runs fetch → normalize → dedup for the active cluster context on a fixed interval and on
//! demand. The driver task is the only writer of the published [`PanelSnapshot`]; readers
//! load it lock-free and may subscribe to epoch bumps.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use kwarn_core::normalize::Normalizer;
use kwarn_core::{ClusterContext, ResultState, Settings};
use kwarn_kubehub::EventSource;
use metrics::{counter, histogram};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

mod machine;

pub use machine::{PollOutcome, PollTicket, SchedulerCore};

/// What readers see: the latest state and the context it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub epoch: u64,
    pub generation: u64,
    pub context: ClusterContext,
    pub state: ResultState,
}

impl PanelSnapshot {
    fn of(core: &SchedulerCore, epoch: u64) -> Self {
        Self {
            epoch,
            generation: core.generation(),
            context: core.context().clone(),
            state: core.state().clone(),
        }
    }
}

#[derive(Debug)]
enum Command {
    SwitchContext(ClusterContext),
    Refresh,
}

/// Handle owned by the mounted panel. Dropping it tears the scheduler down.
pub struct PanelHandle {
    cell: Arc<ArcSwap<PanelSnapshot>>,
    epoch_rx: watch::Receiver<u64>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl PanelHandle {
    pub fn snapshot(&self) -> Arc<PanelSnapshot> { self.cell.load_full() }

    pub fn subscribe(&self) -> watch::Receiver<u64> { self.epoch_rx.clone() }

    /// Switch cluster; state resets to `Loading` and results for the old context are ignored.
    pub fn switch_context(&self, context: ClusterContext) {
        let _ = self.cmd_tx.send(Command::SwitchContext(context));
    }

    /// Re-poll now; state resets to `Loading`.
    pub fn refresh(&self) {
        let _ = self.cmd_tx.send(Command::Refresh);
    }

    pub fn shutdown(mut self) {
        if let Some(t) = self.task.take() {
            t.abort();
        }
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        if let Some(t) = self.task.take() {
            t.abort();
        }
    }
}

struct Publisher {
    cell: Arc<ArcSwap<PanelSnapshot>>,
    epoch_tx: watch::Sender<u64>,
    epoch: u64,
}

impl Publisher {
    fn publish(&mut self, core: &SchedulerCore) {
        self.epoch += 1;
        self.cell.store(Arc::new(PanelSnapshot::of(core, self.epoch)));
        let _ = self.epoch_tx.send(self.epoch);
    }
}

#[derive(Clone)]
struct Pipeline {
    source: Arc<dyn EventSource>,
    normalizer: Arc<Normalizer>,
    settings: Arc<Settings>,
    done_tx: mpsc::UnboundedSender<(PollTicket, PollOutcome)>,
}

impl Pipeline {
    /// Run one poll on its own task; the outcome comes back tagged with its ticket.
    fn launch(&self, ticket: PollTicket) {
        let this = self.clone();
        tokio::spawn(async move {
            let t0 = Instant::now();
            let outcome = this
                .source
                .fetch_warnings(this.settings.query_limit, &this.settings, &ticket.context)
                .await
                .map(|raw| this.normalizer.run(&raw));
            let ms = t0.elapsed().as_secs_f64() * 1000.0;
            counter!("warnings_polls_total", 1);
            histogram!("warnings_poll_ms", ms);
            match &outcome {
                Ok(events) => debug!(generation = ticket.generation, ctx = %ticket.context, events = events.len(), took_ms = %t0.elapsed().as_millis(), "poll: done"),
                Err(e) => {
                    counter!("warnings_poll_errors_total", 1, "kind" => e.kind.as_str());
                    warn!(generation = ticket.generation, ctx = %ticket.context, error = %e, "poll: failed");
                }
            }
            let _ = this.done_tx.send((ticket, outcome));
        });
    }
}

/// Mount the panel: start polling `context` immediately and then every
/// `settings.poll_interval()`. Out-of-range settings are bounded first (see
/// [`Settings::sanitized`]).
pub fn spawn_scheduler(
    source: Arc<dyn EventSource>,
    normalizer: Arc<Normalizer>,
    settings: Settings,
    context: ClusterContext,
) -> PanelHandle {
    let settings = settings.sanitized();
    let core = SchedulerCore::new(context);
    let cell = Arc::new(ArcSwap::from_pointee(PanelSnapshot::of(&core, 0)));
    let (epoch_tx, epoch_rx) = watch::channel(0u64);
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
    let publisher = Publisher { cell: Arc::clone(&cell), epoch_tx, epoch: 0 };
    let task = tokio::spawn(drive(core, source, normalizer, Arc::new(settings), publisher, cmd_rx));
    PanelHandle { cell, epoch_rx, cmd_tx, task: Some(task) }
}

async fn drive(
    mut core: SchedulerCore,
    source: Arc<dyn EventSource>,
    normalizer: Arc<Normalizer>,
    settings: Arc<Settings>,
    mut publisher: Publisher,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(PollTicket, PollOutcome)>();
    let pipeline = Pipeline { source, normalizer, settings: Arc::clone(&settings), done_tx };
    // First tick completes immediately
    let mut ticker = tokio::time::interval(settings.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(ctx = %core.context(), interval_ms = settings.poll_interval_ms, limit = settings.query_limit, "scheduler started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match core.tick() {
                    Some(ticket) => pipeline.launch(ticket),
                    None => debug!(generation = core.generation(), "tick skipped; poll in flight"),
                }
            }
            cmd = cmd_rx.recv() => {
                let ticket = match cmd {
                    Some(Command::SwitchContext(ctx)) => {
                        info!(from = %core.context(), to = %ctx, "scheduler: context switch");
                        core.switch_context(ctx)
                    }
                    Some(Command::Refresh) => {
                        info!(ctx = %core.context(), "scheduler: manual refresh");
                        core.refresh()
                    }
                    None => break,
                };
                publisher.publish(&core);
                ticker.reset();
                pipeline.launch(ticket);
            }
            Some((ticket, outcome)) = done_rx.recv() => {
                if core.apply(&ticket, outcome) {
                    publisher.publish(&core);
                } else {
                    counter!("warnings_stale_discarded_total", 1);
                    debug!(stale = ticket.generation, current = core.generation(), ctx = %ticket.context, "poll: stale result discarded");
                }
            }
        }
    }
    info!("scheduler stopped");
}
