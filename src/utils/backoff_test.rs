use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::utils::backoff::retry_with_backoff;
use crate::BackoffPolicy;
use crate::ConflictError;
use crate::Error;

fn policy(max_retries: usize) -> BackoffPolicy {
    BackoffPolicy {
        base_delay_ms: 10,
        max_delay_ms: 100,
        timeout_ms: 1000,
        max_retries,
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_with_backoff_success() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let task = move || {
        let counter = counter_clone.clone();
        async move {
            let current = counter.fetch_add(1, Ordering::SeqCst);
            if current == 0 {
                Err(Error::Exhausted { capacity: 1 })
            } else {
                Ok(current)
            }
        }
    };

    let result = retry_with_backoff(task, policy(3)).await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 2); // 1 failure + 1 success
}

#[tokio::test(start_paused = true)]
async fn test_retry_with_backoff_max_retries() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let task = move || {
        let counter = counter_clone.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(Error::Conflict(ConflictError::ReaderWriter))
        }
    };

    let result = retry_with_backoff(task, policy(3)).await;

    assert!(matches!(result, Err(Error::Conflict(_))));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_with_backoff_permanent_error_not_retried() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let task = move || {
        let counter = counter_clone.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(Error::Closed("pool"))
        }
    };

    let result = retry_with_backoff(task, policy(5)).await;

    assert!(matches!(result, Err(Error::Closed(_))));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_with_backoff_attempt_timeout() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let task = move || {
        let counter = counter_clone.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            // Simulate a long-running task that will timeout
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<u32, _>(42)
        }
    };

    let policy = BackoffPolicy {
        base_delay_ms: 10,
        max_delay_ms: 100,
        timeout_ms: 100, // Short timeout
        max_retries: 2,
    };

    let result = retry_with_backoff(task, policy).await;

    assert!(matches!(result, Err(Error::Timeout { .. })));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}
