//! Integration tests for the fire-once delay timer.
//!
//! Uses paused Tokio time so deadlines resolve deterministically.

use std::time::Duration;

use pairforge_timer::{DelayTimer, TimerStats};

#[derive(Debug, PartialEq)]
enum Task {
    Hide(u64, u64),
    Announce,
}

// =========================================================================
// Idle timer
// =========================================================================

#[test]
fn test_new_timer_is_idle() {
    let t = DelayTimer::<Task>::new();
    assert!(!t.is_armed());
    assert!(t.pending().is_none());
    assert_eq!(t.remaining(), None);
    assert_eq!(t.stats(), TimerStats::default());
}

#[tokio::test(start_paused = true)]
async fn test_idle_timer_never_fires() {
    let mut t = DelayTimer::<Task>::new();
    let result = tokio::time::timeout(Duration::from_secs(60), t.wait_for_due()).await;
    assert!(result.is_err(), "idle timer should pend forever");
}

// =========================================================================
// Arming and firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_armed_task_fires_after_delay() {
    let mut t = DelayTimer::new();
    t.arm(Task::Hide(1, 2), Duration::from_secs(1)).unwrap();

    let start = tokio::time::Instant::now();
    let task = t.wait_for_due().await;

    assert_eq!(task, Task::Hide(1, 2));
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(!t.is_armed());
    assert_eq!(t.stats().fired, 1);
}

#[tokio::test(start_paused = true)]
async fn test_task_does_not_fire_early() {
    let mut t = DelayTimer::new();
    t.arm(Task::Announce, Duration::from_secs(1)).unwrap();

    let early = tokio::time::timeout(Duration::from_millis(500), t.wait_for_due()).await;
    assert!(early.is_err(), "should not fire before the deadline");
    assert!(t.is_armed(), "dropped wait must leave the task armed");

    let task = t.wait_for_due().await;
    assert_eq!(task, Task::Announce);
}

#[test]
fn test_second_arm_is_rejected_and_returned() {
    let mut t = DelayTimer::new();
    t.arm(Task::Hide(1, 2), Duration::from_secs(1)).unwrap();

    let rejected = t.arm(Task::Announce, Duration::from_secs(1));

    assert_eq!(rejected, Err(Task::Announce));
    assert_eq!(t.pending(), Some(&Task::Hide(1, 2)));
    assert_eq!(t.stats().armed, 1);
    assert_eq!(t.stats().rejected, 1);
}

#[tokio::test(start_paused = true)]
async fn test_can_rearm_after_firing() {
    let mut t = DelayTimer::new();
    t.arm(Task::Hide(1, 2), Duration::from_millis(100)).unwrap();
    t.wait_for_due().await;

    t.arm(Task::Announce, Duration::from_millis(100)).unwrap();
    assert_eq!(t.wait_for_due().await, Task::Announce);
    assert_eq!(t.stats().armed, 2);
    assert_eq!(t.stats().fired, 2);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down() {
    let mut t = DelayTimer::new();
    t.arm(Task::Announce, Duration::from_secs(2)).unwrap();

    tokio::time::advance(Duration::from_millis(500)).await;

    let left = t.remaining().unwrap();
    assert_eq!(left, Duration::from_millis(1500));
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_returns_task_and_goes_idle() {
    let mut t = DelayTimer::new();
    t.arm(Task::Hide(3, 4), Duration::from_secs(1)).unwrap();

    assert_eq!(t.cancel(), Some(Task::Hide(3, 4)));
    assert!(!t.is_armed());
    assert_eq!(t.stats().cancelled, 1);

    let result = tokio::time::timeout(Duration::from_secs(5), t.wait_for_due()).await;
    assert!(result.is_err(), "cancelled task must not fire");
}

#[test]
fn test_cancel_when_idle_is_noop() {
    let mut t = DelayTimer::<Task>::new();
    assert_eq!(t.cancel(), None);
    assert_eq!(t.stats().cancelled, 0);
}

// =========================================================================
// select! loop pattern (mirrors the session actor)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_serves_commands_while_armed() {
    let mut t = DelayTimer::new();
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);

    t.arm(Task::Announce, Duration::from_secs(1)).unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send("flip").await.ok();
    });

    let mut order = Vec::new();
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => order.push(cmd.to_string()),
            task = t.wait_for_due() => {
                assert_eq!(task, Task::Announce);
                order.push("fired".to_string());
                break;
            }
        }
    }

    assert_eq!(order, vec!["flip".to_string(), "fired".to_string()]);
}
