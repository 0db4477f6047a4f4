//! Job control for cancellation: shared cancellation tokens per job.
//!
//! Every live job is registered with a token when it is accepted. Cancelling
//! a job (HTTP `POST /cancel/{id}`, Ctrl+C in `smd get`, or the idle
//! watchdog) fires its token; fetchers check it between steps and stop.
//! A second token fires once the job's runner task has exited, so callers
//! can wait for a cancelled fetcher to clean up.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

use crate::job::JobId;

struct JobTokens {
    cancel: CancellationToken,
    settled: CancellationToken,
}

/// Shared registry of job id -> cancellation token.
#[derive(Default)]
pub struct JobControl {
    jobs: RwLock<HashMap<JobId, JobTokens>>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job; returns the token to hand to its runner and fetcher.
    pub fn register(&self, job_id: JobId) -> CancellationToken {
        let cancel = CancellationToken::new();
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                job_id,
                JobTokens {
                    cancel: cancel.clone(),
                    settled: CancellationToken::new(),
                },
            );
        cancel
    }

    /// Unregister a job (call when the job is dropped from the tracker).
    pub fn unregister(&self, job_id: JobId) {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&job_id);
    }

    /// Fire the job's token. The entry stays registered until `unregister`.
    /// Returns false when the job is not registered.
    pub fn request_abort(&self, job_id: JobId) -> bool {
        match self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&job_id)
        {
            Some(tokens) => {
                tokens.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Record that the job's runner has exited.
    pub fn mark_settled(&self, job_id: JobId) {
        if let Some(tokens) = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&job_id)
        {
            tokens.settled.cancel();
        }
    }

    /// Token that fires once the job's runner has exited. None for unknown jobs.
    pub fn settled(&self, job_id: JobId) -> Option<CancellationToken> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&job_id)
            .map(|tokens| tokens.settled.clone())
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn abort_fires_registered_token() {
        let control = JobControl::new();
        let id = Uuid::new_v4();
        let token = control.register(id);
        assert!(!token.is_cancelled());
        assert!(control.request_abort(id));
        assert!(token.is_cancelled());
        // still registered until the tracker drops the job
        assert_eq!(control.len(), 1);
    }

    #[test]
    fn abort_unknown_job_is_noop() {
        let control = JobControl::new();
        assert!(!control.request_abort(Uuid::new_v4()));
    }

    #[test]
    fn unregister_drops_token() {
        let control = JobControl::new();
        let id = Uuid::new_v4();
        let token = control.register(id);
        assert_eq!(control.len(), 1);
        control.unregister(id);
        assert!(control.is_empty());
        assert!(!control.request_abort(id));
        assert!(!token.is_cancelled());
        assert!(control.settled(id).is_none());
    }

    #[test]
    fn settled_is_independent_of_abort() {
        let control = JobControl::new();
        let id = Uuid::new_v4();
        control.register(id);
        let settled = control.settled(id).unwrap();
        control.request_abort(id);
        assert!(!settled.is_cancelled());
        control.mark_settled(id);
        assert!(settled.is_cancelled());
    }
}
