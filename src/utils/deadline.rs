//! Bounded waits for store and cache calls.

use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheResult};

/// Runs a store call with a deadline.
///
/// A call that does not finish in `limit` is abandoned and reported as
/// [`AppError::Internal`], tagged with the operation name.
pub async fn store_call<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(AppError::internal(
                "Store operation timed out",
                json!({ "operation": operation }),
            ))
        }
    }
}

/// Runs a cache call with a deadline; an elapsed deadline becomes
/// [`CacheError::Timeout`].
pub async fn cache_call<T, F>(limit: Duration, fut: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(CacheError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_store_call_times_out() {
        let result: Result<(), AppError> = store_call(Duration::from_millis(10), "ping", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(err.to_error_info().details["operation"], "ping");
    }

    #[tokio::test]
    async fn test_store_call_passes_result_through() {
        let value = store_call(Duration::from_secs(1), "next_sequence", async { Ok(7u64) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = store_call::<(), _>(Duration::from_secs(1), "create", async {
            Err(AppError::CodeTaken {
                code: "abcd".to_string(),
            })
        })
        .await
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_call_times_out() {
        let result: CacheResult<Option<String>> = cache_call(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(None)
        })
        .await;

        assert!(matches!(result, Err(CacheError::Timeout(_))));
    }
}
