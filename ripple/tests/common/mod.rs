#![allow(dead_code)]

use ripple::{
    BoxError, Dispatcher, ERROR, HandlerRef, Invocation, Reply, SUBSCRIBED, UNSUBSCRIBED,
    testing::RecordingListener,
};

// ============================================================================
// Test Handlers
// ============================================================================

/// Forwards `params + suffix` to the rest of the cascade.
pub fn append(suffix: &'static str) -> HandlerRef<String> {
    HandlerRef::from_fn(move |cx: Invocation<String>, _done| {
        let params = format!("{}{suffix}", cx.params);
        Ok(Reply::Defer(cx.next(params)))
    })
}

/// Settles with `prefix + params`, skipping the rest of the cascade.
pub fn prefix(prefix: &'static str) -> HandlerRef<String> {
    HandlerRef::from_fn(move |cx: Invocation<String>, _done| {
        Ok(Reply::Value(format!("{prefix}{}", cx.params)))
    })
}

/// Fails synchronously with `message`.
pub fn failing(message: &'static str) -> HandlerRef<String> {
    HandlerRef::from_fn(move |_cx: Invocation<String>, _done| {
        Err(BoxError::from(message))
    })
}

// ============================================================================
// Lifecycle Recording
// ============================================================================

/// Records `subscribed`, `unsubscribed` and `error` notices of `dispatcher`.
pub fn record_lifecycle(dispatcher: &Dispatcher<String>) -> RecordingListener {
    let recorder = RecordingListener::new();
    for name in [SUBSCRIBED, UNSUBSCRIBED, ERROR] {
        let listener = recorder.listener::<String>();
        dispatcher.on(name, move |notice, scope| listener(notice, scope));
    }
    recorder
}
