use tracing::{error, info, warn};

use super::DeleteByRuleService;

/// How one alarm's delete attempt sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DeleteAttemptOutcome {
    /// The alarm is gone.
    Deleted,
    /// Every attempt in the budget failed.
    Exhausted { attempts: u32 },
}

impl DeleteByRuleService {
    /// Deletes one alarm, retrying immediately until the attempt budget runs out.
    pub(super) async fn delete_with_retry(
        &self,
        operation_id: &str,
        alarm_id: &str,
    ) -> DeleteAttemptOutcome {
        let max_attempts = self.config.max_delete_attempts;
        let mut attempt = 1_u32;

        loop {
            match self.alarm_repository.delete_alarm(alarm_id).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(
                            operation_id,
                            alarm_id,
                            attempts = attempt,
                            "alarm deleted after retry"
                        );
                    }
                    return DeleteAttemptOutcome::Deleted;
                }
                Err(delete_error) if attempt < max_attempts => {
                    warn!(
                        operation_id,
                        alarm_id,
                        attempt,
                        max_attempts,
                        error = %delete_error,
                        "alarm delete failed, retrying"
                    );
                    attempt += 1;
                }
                Err(delete_error) => {
                    error!(
                        operation_id,
                        alarm_id,
                        attempt,
                        max_attempts,
                        error = %delete_error,
                        "alarm delete failed, retry budget exhausted"
                    );
                    return DeleteAttemptOutcome::Exhausted { attempts: attempt };
                }
            }
        }
    }
}
