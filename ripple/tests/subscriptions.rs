//! Subscribing, unsubscribing and path lookup.

use ripple::{
    Dispatcher, EventKey, HandlerRef, SubscribeError, SubscriberConfig,
    testing::{CallLog, CountingHandler},
};
use std::sync::Arc;

mod common;
use common::{append, prefix, record_lifecycle};

#[tokio::test]
async fn test_resubscribing_same_pattern_pair_keeps_order() {
    let dispatcher = Dispatcher::<String>::new();
    let log = CallLog::new();
    let a = log.forwarding("a");
    dispatcher
        .subscribe(EventKey::pattern("^x").unwrap(), a.clone())
        .unwrap();
    dispatcher
        .subscribe(EventKey::pattern("x$").unwrap(), log.forwarding("b"))
        .unwrap();

    dispatcher.dispatch("x", String::new()).unwrap().await.unwrap();
    let before = log.entries();
    log.clear();

    dispatcher
        .subscribe(EventKey::pattern("^x").unwrap(), a)
        .unwrap();
    dispatcher.dispatch("x", String::new()).unwrap().await.unwrap();

    assert_eq!(before, ["b", "a"]);
    assert_eq!(log.entries(), before);
    assert_eq!(dispatcher.subscriber_count(), 2);
}

#[tokio::test]
async fn test_unsubscribe_single_handler() {
    let dispatcher = Dispatcher::<String>::new();
    let log = CallLog::new();
    let keep = log.forwarding("keep");
    let drop = log.forwarding("drop");
    dispatcher.subscribe("tick", keep).unwrap();
    dispatcher.subscribe("tick", drop.clone()).unwrap();

    assert_eq!(dispatcher.unsubscribe("tick", Some(&drop)), 1);
    dispatcher.dispatch("tick", String::new()).unwrap().await.unwrap();
    assert_eq!(log.entries(), ["keep"]);
}

#[tokio::test]
async fn test_unsubscribe_whole_event() {
    let dispatcher = Dispatcher::<String>::new();
    let counter = CountingHandler::new();
    dispatcher
        .subscribe("tick", HandlerRef::new(counter.clone()))
        .unwrap();
    dispatcher
        .subscribe("tick", HandlerRef::new(counter.clone()))
        .unwrap();

    assert_eq!(dispatcher.unsubscribe("tick", None), 2);
    let result = dispatcher.dispatch("tick", "untouched".into()).unwrap().await;
    assert_eq!(result.unwrap(), "untouched");
    assert_eq!(counter.count(), 0);
    assert_eq!(dispatcher.subscriber_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_pattern() {
    let dispatcher = Dispatcher::<String>::new();
    let counter = CountingHandler::new();
    let handler = HandlerRef::new(counter.clone());
    dispatcher
        .subscribe(EventKey::pattern("^job\\.").unwrap(), handler.clone())
        .unwrap();

    dispatcher.dispatch("job.run", String::new()).unwrap().await.unwrap();
    assert_eq!(counter.count(), 1);

    dispatcher.unsubscribe(EventKey::pattern("^job\\.").unwrap(), Some(&handler));
    dispatcher.dispatch("job.run", String::new()).unwrap().await.unwrap();
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_unsubscribe_leaves_other_events_intact() {
    let dispatcher = Dispatcher::<String>::new();
    let shared = prefix("shared ");
    dispatcher.subscribe("a", shared.clone()).unwrap();
    dispatcher.subscribe("b", shared.clone()).unwrap();

    dispatcher.unsubscribe("a", Some(&shared));

    let a = dispatcher.dispatch("a", "x".into()).unwrap().await.unwrap();
    let b = dispatcher.dispatch("b", "x".into()).unwrap().await.unwrap();
    assert_eq!(a, "x");
    assert_eq!(b, "shared x");
}

#[tokio::test]
async fn test_unknown_unsubscribe_still_notifies() {
    let dispatcher = Dispatcher::<String>::new();
    let recorder = record_lifecycle(&dispatcher);

    assert_eq!(dispatcher.unsubscribe("ghost", None), 0);
    assert_eq!(dispatcher.unsubscribe("ghost", Some(&prefix("x"))), 0);
    assert_eq!(recorder.labels(), ["unsubscribed:ghost", "unsubscribed:ghost"]);
}

#[test]
fn test_reserved_events_are_forbidden() {
    let dispatcher = Dispatcher::<String>::new();
    let recorder = record_lifecycle(&dispatcher);
    for name in ["error", "subscribe", "unsubscribe"] {
        let err = dispatcher.subscribe(name, prefix("x")).unwrap_err();
        assert!(matches!(err, SubscribeError::ForbiddenEvent(ref event) if event == name));
    }
    assert_eq!(recorder.count(), 0);
    assert_eq!(dispatcher.subscriber_count(), 0);
}

#[test]
fn test_empty_event_keys_are_unsupported() {
    let dispatcher = Dispatcher::<String>::new();
    assert!(matches!(
        dispatcher.subscribe("", prefix("x")),
        Err(SubscribeError::UnsupportedEventType(_))
    ));
    assert!(matches!(
        dispatcher.subscribe(Vec::<String>::new(), prefix("x")),
        Err(SubscribeError::UnsupportedEventType(_))
    ));
    assert!(matches!(
        EventKey::pattern("(unclosed"),
        Err(SubscribeError::InvalidPattern(_))
    ));
}

#[tokio::test]
async fn test_resubscribing_same_pair_is_a_no_op() {
    let dispatcher = Dispatcher::<String>::new();
    let recorder = record_lifecycle(&dispatcher);
    let counter = CountingHandler::new();
    let handler = HandlerRef::new(counter.clone());

    dispatcher.subscribe("tick", handler.clone()).unwrap();
    dispatcher.subscribe("tick", handler.clone()).unwrap();
    dispatcher.dispatch("tick", String::new()).unwrap().await.unwrap();

    assert_eq!(counter.count(), 1);
    assert_eq!(dispatcher.subscriber_count(), 1);
    assert_eq!(recorder.labels(), ["subscribed:tick", "subscribed:tick"]);
}

#[tokio::test]
async fn test_same_handler_with_new_config_subscribes_again() {
    let dispatcher = Dispatcher::<String>::new();
    let counter = CountingHandler::new();
    let handler = HandlerRef::new(counter.clone());
    let config = Arc::new(SubscriberConfig::new());

    dispatcher.subscribe("tick", handler.clone()).unwrap();
    dispatcher
        .subscribe_with("tick", handler.clone(), config.clone())
        .unwrap();
    dispatcher
        .subscribe_with("tick", handler.clone(), config)
        .unwrap();
    dispatcher.dispatch("tick", String::new()).unwrap().await.unwrap();

    assert_eq!(counter.count(), 2);
    assert_eq!(dispatcher.subscriber_count(), 2);
}

#[tokio::test]
async fn test_subscribe_map_returns_own_unsubscribers() {
    let dispatcher = Dispatcher::<String>::new();
    let handles = dispatcher
        .subscribe_map(
            "math",
            [("double", append("x2")), ("square", append("^2"))],
        )
        .unwrap();
    assert_eq!(handles.keys().collect::<Vec<_>>(), ["double", "square"]);
    assert_eq!(handles["double"].event().to_string(), "math.double");

    assert_eq!(handles["double"].unsubscribe(), 1);

    let double = dispatcher.dispatch("math.double", "n".into()).unwrap().await;
    let square = dispatcher.dispatch("math.square", "n".into()).unwrap().await;
    assert_eq!(double.unwrap(), "n");
    assert_eq!(square.unwrap(), "n^2");
}

#[tokio::test]
async fn test_subscribe_map_stops_at_forbidden_entry() {
    let dispatcher = Dispatcher::<String>::new();
    let err = dispatcher
        .subscribe_map("", [("fine", prefix("ok ")), ("error", prefix("no "))])
        .unwrap_err();
    assert!(matches!(err, SubscribeError::ForbiddenEvent(_)));

    let fine = dispatcher.dispatch("fine", "x".into()).unwrap().await;
    assert_eq!(fine.unwrap(), "ok x");
}

#[tokio::test]
async fn test_lookup_exposes_children_as_methods() {
    let dispatcher = Dispatcher::<String>::new();
    dispatcher.subscribe("a.b.c", prefix("c:")).unwrap();
    dispatcher.subscribe("a.b.d.e", prefix("e:")).unwrap();
    dispatcher.subscribe("a.x", prefix("x:")).unwrap();

    let methods = dispatcher.lookup("a.b");
    assert_eq!(methods.keys().collect::<Vec<_>>(), ["c", "d"]);
    assert_eq!(methods["c"].event(), "a.b.c");

    let result = methods["c"].call("go".into()).unwrap().await;
    assert_eq!(result.unwrap(), "c:go");

    // `a.b.d` has no subscriber of its own: the cascade is empty.
    let result = methods["d"].call("go".into()).unwrap().await;
    assert_eq!(result.unwrap(), "go");

    assert!(dispatcher.lookup("nope").is_empty());
    assert!(dispatcher.lookup("a.b.c").is_empty());
}

#[tokio::test]
async fn test_lookup_root_lists_top_level_names() {
    let dispatcher = Dispatcher::<String>::new();
    dispatcher.subscribe("ping", prefix("pong ")).unwrap();
    dispatcher.subscribe("user.created", prefix("u ")).unwrap();

    let methods = dispatcher.lookup("");
    assert_eq!(methods.keys().collect::<Vec<_>>(), ["ping", "user"]);
    let result = methods["ping"].call("x".into()).unwrap().await;
    assert_eq!(result.unwrap(), "pong x");
}

#[test]
fn test_lookup_forgets_removed_events() {
    let dispatcher = Dispatcher::<String>::new();
    dispatcher.subscribe("a.b.c", prefix("c:")).unwrap();
    dispatcher.subscribe(EventKey::pattern("^a\\.").unwrap(), prefix("p:")).unwrap();
    assert_eq!(dispatcher.lookup("a").len(), 1);

    dispatcher.unsubscribe("a.b.c", None);
    assert!(dispatcher.lookup("a").is_empty());
    assert!(dispatcher.lookup("").is_empty());
}

#[test]
fn test_lifecycle_notices_carry_normalized_keys() {
    let dispatcher = Dispatcher::<String>::builder().delimiter(":").build();
    let recorder = record_lifecycle(&dispatcher);
    let handler = prefix("x");

    dispatcher.subscribe(["a", "b"], handler.clone()).unwrap();
    dispatcher.subscribe(EventKey::pattern("^a").unwrap(), handler.clone()).unwrap();
    dispatcher.unsubscribe(["a", "b"], Some(&handler));

    assert_eq!(
        recorder.labels(),
        ["subscribed:a:b", "subscribed:/^a/", "unsubscribed:a:b"]
    );
}
