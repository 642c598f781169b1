// Pending verification report
//
// Background task that periodically counts achievements still awaiting
// verification and logs the figure. Stops on the shared shutdown token.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::achievements::{AchievementStatus, AchievementStore};
use crate::store::StoreError;

pub struct PendingReportJob {
    achievements: Arc<dyn AchievementStore>,
    interval: Duration,
}

impl PendingReportJob {
    pub fn new(achievements: Arc<dyn AchievementStore>, interval: Duration) -> Self {
        Self {
            achievements,
            interval,
        }
    }

    /// Run the report loop until `shutdown` is cancelled
    ///
    /// The first report is produced immediately.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Pending report job starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Pending report job shutting down");
                return;
            }

            if let Err(e) = self.report_once().await {
                warn!(error = %e, "Pending report job: count failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Pending report job shutting down");
                    return;
                }
            }
        }
    }

    /// Count pending achievements and log the result
    pub async fn report_once(&self) -> Result<i64, StoreError> {
        let pending = self
            .achievements
            .count_by_status(AchievementStatus::Pending)
            .await?;
        info!(pending, "Achievements awaiting verification");
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::{AchievementCategory, InMemoryAchievementStore, NewAchievement};
    use uuid::Uuid;

    async fn store_with_pending(count: usize) -> Arc<InMemoryAchievementStore> {
        let store = Arc::new(InMemoryAchievementStore::new());
        for i in 0..count {
            store
                .insert(NewAchievement {
                    student_id: Uuid::new_v4(),
                    title: format!("Achievement {i}"),
                    category: AchievementCategory::Club,
                    description: None,
                    date: None,
                    issuing_authority: None,
                    proof_url: None,
                    tags: Vec::new(),
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_report_once_counts_pending() {
        let store = store_with_pending(3).await;
        let job = PendingReportJob::new(store, Duration::from_secs(60));
        assert_eq!(job.report_once().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let store = store_with_pending(0).await;
        let job = PendingReportJob::new(store, Duration::from_secs(3600));
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(job.run(shutdown.clone()));
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("job did not stop after cancellation")
            .unwrap();
    }
}
