mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{now_millis, wait_until};
use embed_messaging::idle::{IdleOptions, IdleStatus, IdleTracker};
use embed_messaging::{EmbedOrigin, MessageChannel, MessageEvent};
use serde_json::json;

const TRUSTED: &str = "https://embed.example.com";

fn post(channel: &MessageChannel, data: serde_json::Value) {
    channel.post(MessageEvent {
        origin: TRUSTED.to_owned(),
        data,
    });
}

fn post_user_idle(channel: &MessageChannel, last_active_time: serde_json::Value) {
    post(
        channel,
        json!({ "type": "USER_IDLE", "messageTime": now_millis(), "lastActiveTime": last_active_time }),
    );
}

fn post_user_event(channel: &MessageChannel, user_event_time: serde_json::Value) {
    post(
        channel,
        json!({ "type": "USER_EVENT", "messageTime": now_millis(), "userEventTime": user_event_time }),
    );
}

fn tracker_with_counters(
    channel: &MessageChannel,
    timeout: Duration,
) -> (IdleTracker, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let idles = Arc::new(AtomicUsize::new(0));
    let actions = Arc::new(AtomicUsize::new(0));
    let idle_count = idles.clone();
    let action_count = actions.clone();
    let tracker = IdleTracker::spawn(
        channel,
        EmbedOrigin::new("embed.example.com"),
        IdleOptions {
            timeout: Some(timeout),
            on_idle: Some(Arc::new(move || {
                idle_count.fetch_add(1, Ordering::SeqCst);
            })),
            on_action: Some(Arc::new(move || {
                action_count.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        },
    );
    (tracker, idles, actions)
}

#[tokio::test]
async fn stale_activity_flags_idle_then_a_user_event_clears_it() {
    let channel = MessageChannel::new();
    let (tracker, idles, actions) = tracker_with_counters(&channel, Duration::from_millis(1000));

    let stale = now_millis() - 2000;
    post_user_idle(&channel, json!(stale));
    wait_until(|| tracker.is_idle()).await;
    assert_eq!(idles.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.last_active_time(), Some(stale));

    let fresh = now_millis();
    post_user_event(&channel, json!(fresh));
    wait_until(|| !tracker.is_idle()).await;
    assert_eq!(actions.load(Ordering::SeqCst), 1);
    assert_eq!(idles.load(Ordering::SeqCst), 1, "onIdle must not re-fire");
    assert_eq!(tracker.last_active_time(), Some(fresh));
}

#[tokio::test]
async fn fresh_activity_does_not_flag_idle() {
    let channel = MessageChannel::new();
    let (tracker, idles, _actions) = tracker_with_counters(&channel, Duration::from_millis(1000));

    let recent = now_millis() - 100;
    post_user_idle(&channel, json!(recent));
    wait_until(|| tracker.last_active_time().is_some()).await;
    assert!(!tracker.is_idle());
    assert_eq!(idles.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn user_idle_without_a_time_is_ignored() {
    let channel = MessageChannel::new();
    let (tracker, idles, _actions) = tracker_with_counters(&channel, Duration::from_millis(1000));

    post_user_idle(&channel, json!(null));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(tracker.status(), IdleStatus::default());
    assert_eq!(idles.load(Ordering::SeqCst), 0);

    // A stale report afterwards still lands.
    post_user_idle(&channel, json!(now_millis() - 5000));
    wait_until(|| tracker.is_idle()).await;
}

#[tokio::test]
async fn user_event_with_null_time_still_clears_idle() {
    let channel = MessageChannel::new();
    let (tracker, _idles, actions) = tracker_with_counters(&channel, Duration::from_millis(1000));

    let stale = now_millis() - 2000;
    post_user_idle(&channel, json!(stale));
    wait_until(|| tracker.is_idle()).await;

    post_user_event(&channel, json!(null));
    wait_until(|| !tracker.is_idle()).await;
    assert_eq!(actions.load(Ordering::SeqCst), 1);
    assert_eq!(
        tracker.last_active_time(),
        Some(stale),
        "a null event time leaves the stored activity time alone",
    );
}

#[tokio::test]
async fn unrelated_message_kinds_leave_idle_state_untouched() {
    let channel = MessageChannel::new();
    let (tracker, idles, actions) = tracker_with_counters(&channel, Duration::from_millis(1000));

    post(&channel, json!({ "type": "INITIALISING", "messageTime": now_millis() }));
    post(&channel, json!({ "type": "RENDERING_DONE", "messageTime": now_millis() }));
    post(&channel, json!({ "type": "ERROR", "messageTime": now_millis() }));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(tracker.status(), IdleStatus::default());
    assert_eq!(idles.load(Ordering::SeqCst), 0);
    assert_eq!(actions.load(Ordering::SeqCst), 0);
}
