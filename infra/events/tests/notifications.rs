use razed_domain::{CharacterId, EventSink, Notification, Severity};
use razed_events::NotificationHub;
use std::time::Duration;

fn note(message: &'static str) -> Notification {
    Notification::new(message, Severity::Success)
}

#[tokio::test]
async fn notification_flow() {
    let hub = NotificationHub::new();
    let mut rx = hub.subscribe();

    hub.notify(note("Learned: Ember Strike!"));

    let received = rx.recv().await.unwrap();
    assert_eq!(received.message, "Learned: Ember Strike!");
    assert_eq!(received.severity, Severity::Success);
}

#[tokio::test]
async fn lagged_receiver_recovers() {
    let hub = NotificationHub::with_capacity(2).unwrap();
    let mut rx = hub.subscribe();

    for i in 0..100u32 {
        hub.notify(Notification::new(i.to_string(), Severity::Info));
    }

    let first = rx.recv().await.expect("should recover from lag");
    let first: u32 = first.message.parse().unwrap();
    assert!(first >= 98, "expected the retained tail, got {first}");
    assert_eq!(rx.skipped(), u64::from(first));

    let second = rx.recv().await.expect("should continue receiving");
    assert_eq!(second.message.parse::<u32>().unwrap(), first + 1);
}

#[tokio::test]
async fn character_receivers_filter_by_character() {
    let hub = NotificationHub::new();
    let alice = CharacterId::new("alice");
    let mut all = hub.subscribe();
    let mut only_alice = hub.subscribe_character(alice.clone());

    hub.notify(note("for bob").for_character(CharacterId::new("bob")));
    hub.notify(note("for alice").for_character(alice));

    assert_eq!(all.recv().await.unwrap().message, "for bob");
    assert_eq!(only_alice.recv().await.unwrap().message, "for alice");
    assert!(only_alice.try_recv().is_none());
}

#[tokio::test]
async fn receiver_closes_with_last_hub() {
    let hub = NotificationHub::new();
    let mut rx = hub.subscribe();
    drop(hub);

    let closed = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
    assert!(closed.is_none());
}

#[test]
fn try_recv_drains_without_runtime() {
    let hub = NotificationHub::new();
    let mut rx = hub.subscribe();
    hub.notify(note("a"));
    hub.notify(note("b"));

    assert_eq!(rx.try_recv().unwrap().message, "a");
    assert_eq!(rx.try_recv().unwrap().message, "b");
    assert!(rx.try_recv().is_none());
}
