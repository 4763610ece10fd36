//! Background onboarding jobs
//!
//! A job is one pipeline run on a spawned task. Its progress lives on a
//! watch channel; the registry keeps the receiving end keyed by job id.

use chrono::{DateTime, Duration, Utc};
use shared::{OnboardingInput, ProgressSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use super::onboarding::{OnboardingService, ProgressTracker};

/// Finished jobs are forgotten after this long
const FINISHED_JOB_TTL_MINUTES: i64 = 60;

struct JobEntry {
    owner: Uuid,
    progress: watch::Receiver<ProgressSnapshot>,
    finished_at: Option<DateTime<Utc>>,
}

/// Registry of background onboarding runs
#[derive(Clone, Default)]
pub struct OnboardingJobs {
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl OnboardingJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a pipeline run for `user_id` and return its job id
    pub async fn start(
        &self,
        service: OnboardingService,
        input: OnboardingInput,
        user_id: Uuid,
    ) -> Uuid {
        self.prune_finished().await;

        let job_id = Uuid::new_v4();
        let (tracker, progress) = ProgressTracker::new();

        self.jobs.write().await.insert(
            job_id,
            JobEntry {
                owner: user_id,
                progress,
                finished_at: None,
            },
        );

        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            // Failures are published through the tracker
            let _ = service.run(&input, user_id, &tracker).await;
            if let Some(entry) = jobs.write().await.get_mut(&job_id) {
                entry.finished_at = Some(Utc::now());
            }
        });

        tracing::debug!(%job_id, %user_id, "Started onboarding job");
        job_id
    }

    /// Latest progress of a job, visible only to the user who started it
    pub async fn get(&self, job_id: Uuid, user_id: Uuid) -> Option<ProgressSnapshot> {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id)
            .filter(|entry| entry.owner == user_id)
            .map(|entry| entry.progress.borrow().clone())
    }

    /// Drop jobs that finished more than the retention window ago
    pub async fn prune_finished(&self) {
        self.prune_finished_before(Utc::now() - Duration::minutes(FINISHED_JOB_TTL_MINUTES))
            .await;
    }

    /// Drop jobs that finished before `cutoff`; running jobs are always kept
    pub async fn prune_finished_before(&self, cutoff: DateTime<Utc>) {
        self.jobs
            .write()
            .await
            .retain(|_, entry| !matches!(entry.finished_at, Some(at) if at <= cutoff));
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
