//! In-memory milestone buffer for one chat turn.

use std::time::Instant;

use sonar_core::models::response::{Milestone, MilestoneEvent};
use uuid::Uuid;

/// Callback invoked for every milestone as it is recorded.
pub type MilestoneCallback<'a> = &'a (dyn Fn(&Milestone) + Send + Sync);

/// Collects timestamped milestones; timestamps are milliseconds since the
/// request started.
pub struct MilestoneBuffer<'a> {
    started: Instant,
    milestones: Vec<Milestone>,
    callback: Option<MilestoneCallback<'a>>,
}

impl<'a> MilestoneBuffer<'a> {
    pub fn new(callback: Option<MilestoneCallback<'a>>) -> Self {
        Self {
            started: Instant::now(),
            milestones: Vec::new(),
            callback,
        }
    }

    pub fn record(&mut self, event: MilestoneEvent, label: impl Into<String>) {
        self.record_with_value(event, label, None);
    }

    pub fn record_with_value(
        &mut self,
        event: MilestoneEvent,
        label: impl Into<String>,
        value: Option<String>,
    ) {
        let milestone = Milestone {
            id: Uuid::new_v4().to_string(),
            event,
            label: label.into(),
            value,
            timestamp_ms: self.started.elapsed().as_millis() as u64,
        };
        if let Some(callback) = self.callback {
            callback(&milestone);
        }
        self.milestones.push(milestone);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn into_milestones(self) -> Vec<Milestone> {
        self.milestones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_are_ordered_and_timestamped() {
        let mut buffer = MilestoneBuffer::new(None);
        buffer.record(MilestoneEvent::IntentClassified, "portfolio_overview");
        buffer.record(MilestoneEvent::ProviderSelected, "local");
        buffer.record(MilestoneEvent::ResponseReady, "done");
        let milestones = buffer.into_milestones();
        assert_eq!(milestones.len(), 3);
        assert!(milestones.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
        assert_eq!(milestones[0].event, MilestoneEvent::IntentClassified);
    }

    #[test]
    fn callback_sees_every_milestone() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let count = AtomicUsize::new(0);
        let cb = |_: &Milestone| {
            count.fetch_add(1, Ordering::SeqCst);
        };
        let mut buffer = MilestoneBuffer::new(Some(&cb));
        buffer.record(MilestoneEvent::DataRetrieved, "catalog");
        buffer.record(MilestoneEvent::WidgetSelected, "risk_distribution");
        drop(buffer);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
