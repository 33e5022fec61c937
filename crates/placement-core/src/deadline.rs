//! Deadlines for data-store reads.
//!
//! The in-memory stores answer immediately, but a deployment may back them
//! with a remote database. Every read issued by a scan goes through
//! [`with_deadline`] so a slow store surfaces as [`ErrorKind::Timeout`]
//! instead of hanging the run.
//!
//! [`ErrorKind::Timeout`]: crate::error::ErrorKind::Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::result::AppResult;

/// Await `fut`, failing with a timeout error once `deadline` elapses.
pub async fn with_deadline<T, F>(deadline: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, deadline_ms = deadline.as_millis() as u64, "Data store call timed out");
            Err(AppError::timeout(format!(
                "{operation} exceeded {}ms deadline",
                deadline.as_millis()
            )))
        }
    }
}
