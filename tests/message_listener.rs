mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::wait_until;
use embed_messaging::{EmbedOrigin, MessageChannel, MessageEvent, MessagingCallbacks};
use serde_json::json;

const TRUSTED: &str = "https://embed.example.com";

fn event(origin: &str, data: serde_json::Value) -> MessageEvent {
    MessageEvent {
        origin: origin.to_owned(),
        data,
    }
}

fn user_event_payload() -> serde_json::Value {
    json!({ "type": "USER_EVENT", "messageTime": 1, "userEventTime": 2 })
}

fn logging_callbacks(log: &Arc<Mutex<Vec<String>>>) -> MessagingCallbacks {
    let generic = log.clone();
    let specific = log.clone();
    MessagingCallbacks::new()
        .on_message(move |_| generic.lock().unwrap().push("message".into()))
        .on_user_event(move |_| specific.lock().unwrap().push("user_event".into()))
}

#[tokio::test]
async fn trusted_origin_messages_fan_out_generic_then_specific() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();
    let _listener = channel.listen(EmbedOrigin::new("embed.example.com"), logging_callbacks(&log));

    channel.post(event(TRUSTED, user_event_payload()));

    wait_until(|| log.lock().unwrap().len() == 2).await;
    assert_eq!(*log.lock().unwrap(), ["message", "user_event"]);
}

#[tokio::test]
async fn cross_origin_messages_are_silently_dropped() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();
    let _listener = channel.listen(EmbedOrigin::new("embed.example.com"), logging_callbacks(&log));

    channel.post(event("https://evil.example.com", user_event_payload()));
    // Scheme counts too: http is not the configured https origin.
    channel.post(event("http://embed.example.com", user_event_payload()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(log.lock().unwrap().is_empty());

    // The listener itself is still alive.
    channel.post(event(TRUSTED, user_event_payload()));
    wait_until(|| log.lock().unwrap().len() == 2).await;
}

#[tokio::test]
async fn invalid_payloads_fire_no_callbacks() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();
    let _listener = channel.listen(EmbedOrigin::new("embed.example.com"), logging_callbacks(&log));

    channel.post(event(TRUSTED, json!({ "type": "RESIZING", "messageTime": 1 })));
    channel.post(event(TRUSTED, json!({ "messageTime": 1 })));
    channel.post(event(TRUSTED, json!("hello")));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn messages_dispatch_in_arrival_order() {
    let times: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();

    let log = times.clone();
    let _listener = channel.listen(
        EmbedOrigin::new("embed.example.com"),
        MessagingCallbacks::new()
            .on_message(move |message| log.lock().unwrap().push(message.message_time())),
    );

    for message_time in 1..=5 {
        channel.post(event(
            TRUSTED,
            json!({ "type": "RENDERING", "messageTime": message_time }),
        ));
    }

    wait_until(|| times.lock().unwrap().len() == 5).await;
    assert_eq!(*times.lock().unwrap(), [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn dropping_the_listener_detaches_it() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();
    let listener = channel.listen(EmbedOrigin::new("embed.example.com"), logging_callbacks(&log));

    channel.post(event(TRUSTED, user_event_payload()));
    wait_until(|| log.lock().unwrap().len() == 2).await;

    drop(listener);
    channel.post(event(TRUSTED, user_event_payload()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn swapping_a_subscription_replaces_the_old_listener() {
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();

    let first_log = log.clone();
    let first = channel.listen(
        EmbedOrigin::new("embed.example.com"),
        MessagingCallbacks::new()
            .on_message(move |_| first_log.lock().unwrap().push("first".into())),
    );
    drop(first);

    let second_log = log.clone();
    let _second = channel.listen(
        EmbedOrigin::new("embed.example.com"),
        MessagingCallbacks::new()
            .on_message(move |_| second_log.lock().unwrap().push("second".into())),
    );

    channel.post(event(TRUSTED, user_event_payload()));
    wait_until(|| !log.lock().unwrap().is_empty()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*log.lock().unwrap(), ["second"]);
}

#[tokio::test]
async fn merged_callback_sets_invoke_both_sides_in_order() {
    let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let channel = MessageChannel::new();

    let first_log = log.clone();
    let first = MessagingCallbacks::new()
        .on_message(move |_| first_log.lock().unwrap().push("first:message".into()));

    let second_generic = log.clone();
    let second_rendering = log.clone();
    let second = MessagingCallbacks::new()
        .on_message(move |_| second_generic.lock().unwrap().push("second:message".into()))
        .on_rendering(move |_| second_rendering.lock().unwrap().push("second:rendering".into()));

    let _listener = channel.listen(
        EmbedOrigin::new("embed.example.com"),
        first.merged_with(second),
    );

    channel.post(event(TRUSTED, json!({ "type": "RENDERING", "messageTime": 5 })));

    wait_until(|| log.lock().unwrap().len() == 3).await;
    assert_eq!(
        *log.lock().unwrap(),
        ["first:message", "second:message", "second:rendering"]
    );
}
