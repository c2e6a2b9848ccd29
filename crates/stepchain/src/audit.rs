use std::time::Instant;

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Step is running or completed successfully.
    Executed,
    /// Step failed and stopped the chain.
    Failed,
    /// Step was rolled back by its compensation.
    Compensated,
    /// Step's compensation failed or panicked.
    CompensationFailed,
}

/// Record of one step in one execution.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Name of the step.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// Number of calls made to the step's function.
    pub attempts: u32,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step last completed (execution or compensation).
    pub completed_at: Option<Instant>,
}

/// Audit log of a single chain execution, indexed by step position.
#[derive(Debug, Default)]
pub struct ChainAuditLog {
    records: Vec<StepRecord>,
}

impl ChainAuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, name: &str) {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Executed,
            attempts: 0,
            started_at: Instant::now(),
            completed_at: None,
        });
    }

    pub(crate) fn record_success(&mut self, attempts: u32) {
        self.complete_last(StepStatus::Executed, attempts);
    }

    pub(crate) fn record_failure(&mut self, attempts: u32) {
        self.complete_last(StepStatus::Failed, attempts);
    }

    fn complete_last(&mut self, status: StepStatus, attempts: u32) {
        if let Some(record) = self.records.last_mut() {
            record.status = status;
            record.attempts = attempts;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_compensated(&mut self, position: usize) {
        self.set_status(position, StepStatus::Compensated);
    }

    pub(crate) fn record_compensation_failed(&mut self, position: usize) {
        self.set_status(position, StepStatus::CompensationFailed);
    }

    fn set_status(&mut self, position: usize, status: StepStatus) {
        if let Some(record) = self.records.get_mut(position) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Records of every step that was started, in chain order.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// One line per started step, prefixed with a status marker.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Executed => "✓",
                StepStatus::Failed => "✗",
                StepStatus::Compensated => "↩",
                StepStatus::CompensationFailed => "⚠",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}
