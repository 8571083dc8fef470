use serde::{Deserialize, Serialize};

/// One unit of input work: a subject and the topic to map within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub subject: String,
    pub topic: String,
}

impl WorkItem {
    pub fn new(subject: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            topic: topic.into(),
        }
    }
}

/// Final status of one item within a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Succeeded,
    Failed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Succeeded => write!(f, "Succeeded"),
            Status::Failed => write!(f, "Failed"),
        }
    }
}

/// Result row for one [`WorkItem`], correlated by topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub topic: String,
    pub status: Status,
}

impl Outcome {
    pub fn succeeded(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            status: Status::Succeeded,
        }
    }

    pub fn failed(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            status: Status::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Succeeded
    }
}

/// Counts derived from a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}
