use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Stage list used when the configuration does not name one.
/// The last entry is the terminal stage.
pub const DEFAULT_STAGES: &[&str] = &[
    "awaiting-diagnosis",
    "diagnosis-in-progress",
    "awaiting-approval",
    "awaiting-execution",
    "executing",
    "awaiting-customer-part",
    "awaiting-internal-part",
    "completed",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("workflow needs at least two stages, got {count}")]
    TooFewStages { count: usize },
    #[error("workflow stage names cannot be blank")]
    BlankStage,
    #[error("workflow stage '{0}' is listed more than once")]
    DuplicateStage(String),
}

/// Ordered workflow stages with O(1) rank lookup.
///
/// The policy only answers "is this a stage" and "where does it sort";
/// any stage may follow any other, backwards included.
#[derive(Debug, Clone)]
pub struct WorkflowPolicy {
    stages: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl WorkflowPolicy {
    pub fn new<I, S>(stages: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stages: Vec<String> = stages.into_iter().map(Into::into).collect();

        if stages.len() < 2 {
            return Err(PolicyError::TooFewStages { count: stages.len() });
        }

        let mut seen = HashSet::new();
        for stage in &stages {
            if stage.trim().is_empty() {
                return Err(PolicyError::BlankStage);
            }
            if !seen.insert(stage.as_str()) {
                return Err(PolicyError::DuplicateStage(stage.clone()));
            }
        }

        let ranks = stages
            .iter()
            .enumerate()
            .map(|(rank, stage)| (stage.clone(), rank))
            .collect();

        Ok(Self { stages, ranks })
    }

    /// All stages in workflow order
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    /// Stage assigned to newly registered orders
    pub fn first(&self) -> &str {
        &self.stages[0]
    }

    /// Final stage; orders here are no longer active
    pub fn terminal(&self) -> &str {
        &self.stages[self.stages.len() - 1]
    }

    pub fn is_terminal(&self, stage: &str) -> bool {
        stage == self.terminal()
    }

    /// Every stage except the terminal one, in order
    pub fn active_stages(&self) -> &[String] {
        &self.stages[..self.stages.len() - 1]
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.ranks.contains_key(stage)
    }

    /// Position of `stage` in the workflow; `None` for unknown stages,
    /// which sort after every known one.
    pub fn rank(&self, stage: &str) -> Option<usize> {
        self.ranks.get(stage).copied()
    }

    /// Sort key where unknown stages rank last
    pub fn sort_rank(&self, stage: &str) -> usize {
        self.rank(stage).unwrap_or(usize::MAX)
    }

    /// Transitions are unrestricted; both ends only need to be known stages.
    pub fn allows_transition(&self, from: &str, to: &str) -> bool {
        self.contains(from) && self.contains(to)
    }
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            ranks: DEFAULT_STAGES
                .iter()
                .enumerate()
                .map(|(rank, stage)| (stage.to_string(), rank))
                .collect(),
        }
    }
}
