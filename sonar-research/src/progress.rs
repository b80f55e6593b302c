//! Job progress state and the throttled progress bus.
//!
//! `JobState` is the single mutable record of a running job: current stage,
//! phase statuses, agents, the bounded insight stream, and source counters.
//! `ProgressBus` coalesces snapshot emissions through a trailing-edge
//! throttle; stage boundaries and agent state changes bypass it with
//! `force`, and `flush` drains whatever is pending.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use sonar_core::constants::INSIGHT_STREAM_CAP;
use sonar_core::models::research::{
    AgentStatus, CommandCenterProgress, PhaseStatus, ResearchAgent, Stage, StagePhase,
    SynthesisProgress,
};
use tracing::debug;

/// Callback receiving every emitted snapshot.
pub type ProgressSink = Box<dyn Fn(CommandCenterProgress) + Send + Sync>;

/// Mutable state of one deep-research job.
#[derive(Debug)]
pub struct JobState {
    stage: Stage,
    phases: Vec<StagePhase>,
    completed_stages: Vec<Stage>,
    pub agents: Vec<ResearchAgent>,
    insight_stream: VecDeque<String>,
    pub tags: Vec<String>,
    pub total_sources: u32,
    pub total_sources_raw: u32,
    pub synthesis: Option<SynthesisProgress>,
    started: Instant,
    last_elapsed_ms: u64,
}

impl JobState {
    pub fn new() -> Self {
        let stage = Stage::Plan;
        Self {
            stage,
            phases: phases_of(stage),
            completed_stages: Vec::new(),
            agents: Vec::new(),
            insight_stream: VecDeque::new(),
            tags: Vec::new(),
            total_sources: 0,
            total_sources_raw: 0,
            synthesis: None,
            started: Instant::now(),
            last_elapsed_ms: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to a later stage. Still-active phases of the outgoing stage are
    /// force-completed; back-transitions are ignored.
    pub fn advance_to(&mut self, next: Stage) {
        if next.index() <= self.stage.index() {
            return;
        }
        for phase in &mut self.phases {
            phase.status = PhaseStatus::Complete;
        }
        if !self.completed_stages.contains(&self.stage) {
            self.completed_stages.push(self.stage);
        }
        debug!(from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
        self.phases = phases_of(next);
    }

    pub fn phase_active(&mut self, id: &str) {
        self.set_phase(id, PhaseStatus::Active);
    }

    pub fn phase_complete(&mut self, id: &str) {
        self.set_phase(id, PhaseStatus::Complete);
    }

    fn set_phase(&mut self, id: &str, status: PhaseStatus) {
        if let Some(phase) = self.phases.iter_mut().find(|p| p.id == id) {
            phase.status = status;
        }
    }

    /// Append to the bounded insight stream, evicting the oldest entry.
    pub fn push_insight(&mut self, insight: impl Into<String>) {
        if self.insight_stream.len() == INSIGHT_STREAM_CAP {
            self.insight_stream.pop_front();
        }
        self.insight_stream.push_back(insight.into());
    }

    pub fn agent_mut(&mut self, id: &str) -> Option<&mut ResearchAgent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn set_agent_status(&mut self, id: &str, status: AgentStatus) {
        if let Some(agent) = self.agent_mut(id) {
            agent.status = status;
        }
    }

    /// Immutable snapshot for emission. `elapsed_ms` never regresses.
    pub fn snapshot(&mut self) -> CommandCenterProgress {
        let elapsed = self.started.elapsed().as_millis() as u64;
        self.last_elapsed_ms = self.last_elapsed_ms.max(elapsed);
        CommandCenterProgress {
            stage: self.stage,
            phases: self.phases.clone(),
            completed_stages: self.completed_stages.clone(),
            agents: self.agents.clone(),
            insight_stream: self.insight_stream.iter().cloned().collect(),
            tags: self.tags.clone(),
            total_sources: self.total_sources,
            total_sources_raw: self.total_sources_raw,
            elapsed_ms: self.last_elapsed_ms,
            synthesis: self.synthesis.clone(),
        }
    }
}

impl Default for JobState {
    fn default() -> Self {
        Self::new()
    }
}

fn phases_of(stage: Stage) -> Vec<StagePhase> {
    stage
        .phase_ids()
        .iter()
        .map(|id| StagePhase {
            id: (*id).to_string(),
            status: PhaseStatus::Pending,
        })
        .collect()
}

struct BusInner {
    last_emit: Option<Instant>,
    pending: Option<CommandCenterProgress>,
}

/// Trailing-edge throttled emitter. Snapshots arriving inside the window
/// replace the pending one; the pending snapshot goes out with the next
/// emission opportunity or an explicit `flush`.
pub struct ProgressBus {
    sink: Option<ProgressSink>,
    throttle_ms: u64,
    inner: Mutex<BusInner>,
}

impl ProgressBus {
    pub fn new(sink: Option<ProgressSink>, throttle_ms: u64) -> Self {
        Self {
            sink,
            throttle_ms,
            inner: Mutex::new(BusInner {
                last_emit: None,
                pending: None,
            }),
        }
    }

    /// Throttled emit: sends immediately when the window has elapsed,
    /// otherwise coalesces into the pending slot.
    pub fn emit(&self, snapshot: CommandCenterProgress) {
        let Some(sink) = &self.sink else { return };
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let window_open = inner
            .last_emit
            .map(|at| at.elapsed().as_millis() as u64 >= self.throttle_ms)
            .unwrap_or(true);
        if window_open {
            inner.last_emit = Some(Instant::now());
            inner.pending = None;
            sink(snapshot);
        } else {
            inner.pending = Some(snapshot);
        }
    }

    /// Unthrottled emit for stage boundaries and agent state changes.
    pub fn force(&self, snapshot: CommandCenterProgress) {
        let Some(sink) = &self.sink else { return };
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.last_emit = Some(Instant::now());
        inner.pending = None;
        sink(snapshot);
    }

    /// Send any pending coalesced snapshot now.
    pub fn flush(&self) {
        let Some(sink) = &self.sink else { return };
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(snapshot) = inner.pending.take() {
            inner.last_emit = Some(Instant::now());
            sink(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn stage_transition_completes_phases_and_records_outgoing() {
        let mut state = JobState::new();
        state.phase_active("decomposition");
        state.advance_to(Stage::Research);
        assert_eq!(state.stage(), Stage::Research);
        let snap = state.snapshot();
        assert_eq!(snap.completed_stages, vec![Stage::Plan]);
        assert!(snap.phases.iter().all(|p| p.status == PhaseStatus::Pending));
    }

    #[test]
    fn back_transitions_are_ignored() {
        let mut state = JobState::new();
        state.advance_to(Stage::Synthesis);
        state.advance_to(Stage::Plan);
        assert_eq!(state.stage(), Stage::Synthesis);
    }

    #[test]
    fn insight_stream_is_bounded() {
        let mut state = JobState::new();
        for i in 0..(INSIGHT_STREAM_CAP + 10) {
            state.push_insight(format!("insight {i}"));
        }
        let snap = state.snapshot();
        assert_eq!(snap.insight_stream.len(), INSIGHT_STREAM_CAP);
        assert_eq!(snap.insight_stream[0], "insight 10");
    }

    #[test]
    fn elapsed_never_regresses() {
        let mut state = JobState::new();
        let a = state.snapshot().elapsed_ms;
        let b = state.snapshot().elapsed_ms;
        assert!(b >= a);
    }

    #[test]
    fn throttle_coalesces_and_flush_drains() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let bus = ProgressBus::new(
            Some(Box::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })),
            10_000,
        );
        let mut state = JobState::new();
        bus.emit(state.snapshot()); // window open: delivered
        bus.emit(state.snapshot()); // inside window: pending
        bus.emit(state.snapshot()); // replaces pending
        assert_eq!(count.load(Ordering::SeqCst), 1);
        bus.flush();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        bus.flush(); // nothing pending
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn force_bypasses_the_window() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let bus = ProgressBus::new(
            Some(Box::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })),
            10_000,
        );
        let mut state = JobState::new();
        bus.emit(state.snapshot());
        bus.force(state.snapshot());
        bus.force(state.snapshot());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
