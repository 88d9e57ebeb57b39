#![forbid(unsafe_code)]

use kwarn_core::{ClusterContext, DisplayEvent, FetchError, ResultState};

pub type PollOutcome = Result<Vec<DisplayEvent>, FetchError>;

/// Identifies one issued poll. Results are only applied while `generation` is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    pub generation: u64,
    pub context: ClusterContext,
}

/// Scheduler state machine without I/O. The generation bumps on every context switch and
/// manual refresh; anything issued under an older generation is stale.
#[derive(Debug)]
pub struct SchedulerCore {
    generation: u64,
    context: ClusterContext,
    state: ResultState,
    in_flight: Option<u64>,
}

impl SchedulerCore {
    pub fn new(context: ClusterContext) -> Self {
        Self { generation: 0, context, state: ResultState::Loading, in_flight: None }
    }

    pub fn generation(&self) -> u64 { self.generation }
    pub fn context(&self) -> &ClusterContext { &self.context }
    pub fn state(&self) -> &ResultState { &self.state }
    pub fn in_flight(&self) -> bool { self.in_flight == Some(self.generation) }

    fn ticket(&self) -> PollTicket {
        PollTicket { generation: self.generation, context: self.context.clone() }
    }

    /// Timer tick. Returns `None` while a poll for the current generation is outstanding.
    pub fn tick(&mut self) -> Option<PollTicket> {
        if self.in_flight() {
            return None;
        }
        self.in_flight = Some(self.generation);
        Some(self.ticket())
    }

    pub fn switch_context(&mut self, context: ClusterContext) -> PollTicket {
        self.context = context;
        self.restart()
    }

    pub fn refresh(&mut self) -> PollTicket { self.restart() }

    fn restart(&mut self) -> PollTicket {
        self.generation += 1;
        self.state = ResultState::Loading;
        self.in_flight = Some(self.generation);
        self.ticket()
    }

    /// Apply a finished poll. Returns false when the ticket is stale and was discarded.
    pub fn apply(&mut self, ticket: &PollTicket, outcome: PollOutcome) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.in_flight = None;
        self.state = match outcome {
            Ok(events) => ResultState::Ready(events),
            Err(_) => ResultState::Errored,
        };
        true
    }
}
