use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::timeout;

use crate::Error;
use crate::ReadyTarget;

#[tokio::test]
async fn test_subscribe_below_current_completes_immediately() {
    let rt = ReadyTarget::<u64>::new();
    rt.signal(10);

    let sub = rt.subscribe(5);
    assert!(sub.is_ready());
    assert_eq!(rt.len(), 0);
    sub.await.unwrap();

    // Equal target is also already satisfied
    let sub = rt.subscribe(10);
    assert!(sub.is_ready());
    sub.await.unwrap();
}

#[tokio::test]
async fn test_zero_target_on_fresh_instance_is_ready() {
    let rt = ReadyTarget::<u64>::new();
    let sub = rt.subscribe(0);
    assert!(sub.is_ready());
    assert!(rt.is_empty());
}

#[tokio::test]
async fn test_subscribe_pending_until_signal_reaches_target() {
    let rt = ReadyTarget::<u64>::new();
    let mut sub = rt.subscribe(5);
    assert!(!sub.is_ready());
    assert_eq!(rt.len(), 1);

    rt.signal(3);
    assert!((&mut sub).now_or_never().is_none());
    assert_eq!(rt.len(), 1);

    rt.signal(5);
    assert_eq!(rt.len(), 0);
    sub.await.unwrap();
}

#[tokio::test]
async fn test_signal_overshoot_releases_all_reached() {
    let rt = ReadyTarget::<u64>::new();
    let a = rt.subscribe(2);
    let b = rt.subscribe(4);
    let c = rt.subscribe(9);

    rt.signal(5);
    assert_eq!(rt.len(), 1);
    a.await.unwrap();
    b.await.unwrap();

    let mut c = c;
    assert!((&mut c).now_or_never().is_none());
    rt.signal(9);
    c.await.unwrap();
}

#[tokio::test]
async fn test_signal_never_moves_backwards() {
    let rt = ReadyTarget::<u64>::new();
    rt.signal(10);
    rt.signal(4);
    rt.signal(10);
    assert_eq!(rt.current(), 10);

    let sub = rt.subscribe(7);
    assert!(sub.is_ready());
}

#[tokio::test]
async fn test_unsubscribe_removes_without_firing() {
    let rt = ReadyTarget::<u64>::new();
    let sub = rt.subscribe(5);
    let keep = rt.subscribe(5);
    rt.unsubscribe(sub.id());
    assert_eq!(rt.len(), 1);

    let r = sub.await;
    assert!(matches!(r, Err(Error::Cancelled(_))));

    rt.signal(5);
    keep.await.unwrap();
}

#[tokio::test]
async fn test_reset_cancels_pending_and_clears_target() {
    let rt = ReadyTarget::<u64>::new();
    rt.signal(3);
    let sub = rt.subscribe(8);

    rt.reset();
    assert_eq!(rt.len(), 0);
    assert_eq!(rt.current(), 0);
    assert!(matches!(sub.await, Err(Error::Cancelled(_))));

    // After reset, low targets must wait again
    let sub = rt.subscribe(2);
    assert!(!sub.is_ready());
    rt.signal(2);
    sub.await.unwrap();
}

#[tokio::test]
async fn test_signal_from_another_task_wakes_waiter() {
    let rt = Arc::new(ReadyTarget::<u64>::new());
    let sub = rt.subscribe(100);

    let producer = rt.clone();
    tokio::spawn(async move {
        for i in 1..=100u64 {
            producer.signal(i);
            tokio::task::yield_now().await;
        }
    });

    timeout(Duration::from_secs(5), sub).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_string_targets_use_ordering() {
    let rt = ReadyTarget::<String>::new();
    let sub = rt.subscribe("m".to_string());
    rt.signal("c".to_string());
    assert_eq!(rt.len(), 1);
    rt.signal("z".to_string());
    sub.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_dropped_subscription_not_counted() {
    let rt = ReadyTarget::<u64>::new();
    let keep = rt.subscribe(10);

    // Abandoned by a timed-out wait, never unsubscribed
    let abandoned = timeout(Duration::from_millis(10), rt.subscribe(20)).await;
    assert!(abandoned.is_err());
    drop(rt.subscribe(30));

    assert_eq!(rt.len(), 1);

    rt.signal(10);
    keep.await.unwrap();
    assert!(rt.is_empty());
}
