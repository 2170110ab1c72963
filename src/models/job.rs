//! Frozen results of a cost calculation and their print status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::{CostBreakdown, UsageParameters};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Calculated,
    Printing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculated => "calculated",
            Self::Printing => "printing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "calculated" => Some(Self::Calculated),
            "printing" => Some(Self::Printing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a job may move from `self` to `next`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Calculated, Self::Printing)
                | (Self::Calculated, Self::Completed)
                | (Self::Calculated, Self::Failed)
                | (Self::Printing, Self::Completed)
                | (Self::Printing, Self::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calculation, frozen.
///
/// The breakdown can only be read after creation; status, completion time
/// and tags change through methods that return a new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintJob {
    id: String,
    name: String,
    breakdown: CostBreakdown,
    status: JobStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    tags: Vec<String>,
}

impl PrintJob {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        breakdown: CostBreakdown,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            breakdown,
            status: JobStatus::Calculated,
            created_at,
            completed_at: None,
            tags: Vec::new(),
        }
    }

    /// Rebuild a job exactly as it was stored.
    pub fn restore(
        id: String,
        name: String,
        breakdown: CostBreakdown,
        status: JobStatus,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id,
            name,
            breakdown,
            status,
            created_at,
            completed_at,
            tags,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn breakdown(&self) -> &CostBreakdown {
        &self.breakdown
    }

    /// Inputs the breakdown was computed from, including entity ids.
    pub fn parameters(&self) -> &UsageParameters {
        &self.breakdown.parameters
    }

    pub fn total(&self) -> f64 {
        self.breakdown.total
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Move to `next` at `at`. Terminal states stamp the completion time.
    pub fn transition(&self, next: JobStatus, at: DateTime<Utc>) -> Result<Self> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        let mut job = self.clone();
        job.status = next;
        if next.is_terminal() {
            job.completed_at = Some(at);
        }
        Ok(job)
    }

    #[must_use]
    pub fn with_tag(&self, tag: &str) -> Self {
        let mut job = self.clone();
        if !job.tags.iter().any(|t| t == tag) {
            job.tags.push(tag.to_string());
        }
        job
    }

    #[must_use]
    pub fn without_tag(&self, tag: &str) -> Self {
        let mut job = self.clone();
        job.tags.retain(|t| t != tag);
        job
    }
}
