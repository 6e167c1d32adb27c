//! Job status enum mapping to the `job_statuses` lookup table.
//!
//! Discriminants match the seed data order (1-based) in the migration.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Job lifecycle status.
///
/// `Queued → Running → {Succeeded, Failed}`, with a bounded
/// `Running → Retrying → Running` hop. Rejected duplicate submissions
/// never become rows, so there is no status for them.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued = 1,
    Running = 2,
    Retrying = 3,
    Succeeded = 4,
    Failed = 5,
}

/// Terminal statuses: no further transitions occur.
pub const TERMINAL_STATUSES: [JobStatus; 2] = [JobStatus::Succeeded, JobStatus::Failed];

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(JobStatus::Queued),
            2 => Some(JobStatus::Running),
            3 => Some(JobStatus::Retrying),
            4 => Some(JobStatus::Succeeded),
            5 => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// The name seeded in `job_statuses`.
    pub fn name(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Retrying => "retrying",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        TERMINAL_STATUSES.contains(&self)
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(JobStatus::Queued.id(), 1);
        assert_eq!(JobStatus::Running.id(), 2);
        assert_eq!(JobStatus::Retrying.id(), 3);
        assert_eq!(JobStatus::Succeeded.id(), 4);
        assert_eq!(JobStatus::Failed.id(), 5);
    }

    #[test]
    fn round_trip_through_ids() {
        for status in [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Retrying,
            JobStatus::Succeeded,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(JobStatus::from_id(0), None);
        assert_eq!(JobStatus::from_id(6), None);
    }

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Retrying.is_terminal());
    }
}
