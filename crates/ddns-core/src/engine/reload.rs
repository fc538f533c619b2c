//! Zone reload after record changes
//!
//! The provider applies record edits to its live nameservers through an
//! asynchronous job. The coordinator submits the job and polls it on a
//! fixed interval, up to a bounded number of polls.

use crate::config::ReloadConfig;
use crate::error::{Error, Result};
use crate::traits::{ReloadJob, ZoneProvider};
use std::time::Duration;
use tracing::{info, warn};

/// How a finished reload job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The job finished without error
    Succeeded { job_id: String, polls: u32 },
    /// The job finished with its error flag set
    JobFailed { job_id: String, polls: u32 },
}

/// Submits zone reloads and waits for them to finish
#[derive(Debug, Clone)]
pub struct ReloadCoordinator {
    poll_interval: Duration,
    max_polls: u32,
}

impl ReloadCoordinator {
    pub fn new(config: &ReloadConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_polls: config.max_polls,
        }
    }

    /// Trigger a reload and block until the job finishes
    ///
    /// The job handle returned by the trigger call is checked first; status
    /// polls follow only while it is unfinished, each preceded by one poll
    /// interval. A failed status call counts as a poll and polling continues.
    ///
    /// # Errors
    ///
    /// - The trigger call's error, if the reload could not be submitted
    /// - [`Error::ReloadTimeout`] once `max_polls` polls have not seen the job finish
    pub async fn reload(&self, provider: &dyn ZoneProvider) -> Result<ReloadOutcome> {
        info!("Record(s) changed, DNS reload submitted");
        let mut job: ReloadJob = provider.trigger_reload().await?;
        let mut polls = 0;

        while !job.finished {
            if polls >= self.max_polls {
                return Err(Error::ReloadTimeout {
                    job_id: job.id,
                    attempts: polls,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            match provider.job_status(&job.id).await {
                Ok(status) => {
                    job = status;
                    if !job.finished {
                        info!(job_id = %job.id, "DNS reload in progress");
                    }
                }
                Err(e) => warn!(job_id = %job.id, poll = polls, "Unable to poll reload status: {}", e),
            }
        }

        Ok(if job.error {
            ReloadOutcome::JobFailed { job_id: job.id, polls }
        } else {
            ReloadOutcome::Succeeded { job_id: job.id, polls }
        })
    }
}
