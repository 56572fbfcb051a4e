//! End-to-end session lifecycle tests.
//!
//! These tests drive the public API the way the admin dashboard does:
//! store a credential, start the monitor with a logout handler, and check
//! that malformed, expired, and externally removed credentials all end the
//! session exactly once.
#![allow(clippy::expect_used, clippy::panic)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use foundation_common_authn::{
    AuthError, CredentialStore, InvalidationEvent, InvalidationHandler, InvalidationReason,
    LogoutNotifier, MemoryCredentialStore, MonitorConfig, TokenMonitor,
    jwt::{is_token_valid_at, remaining_time_at},
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a raw token string from a payload JSON value (with a fake signature).
fn craft_raw_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"EdDSA","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).expect("payload json"));
    format!("{header}.{payload}.c2ln")
}

fn token_with_exp(exp: i64) -> String {
    craft_raw_token(&json!({"sub": "admin:1", "exp": exp}))
}

#[derive(Default)]
struct CountingHandler {
    calls: AtomicUsize,
    last: parking_lot::Mutex<Option<InvalidationEvent>>,
}

#[async_trait]
impl InvalidationHandler for CountingHandler {
    async fn on_invalid(&self, event: InvalidationEvent) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(event);
    }
}

impl CountingHandler {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_reason(&self) -> Option<InvalidationReason> {
        self.last.lock().as_ref().map(|e| e.reason)
    }
}

fn setup(token: Option<String>) -> (TokenMonitor, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    if let Some(token) = token {
        store.set(token);
    }
    let monitor = TokenMonitor::new(
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        MonitorConfig::default(),
    )
    .expect("monitor");
    (monitor, store)
}

// ===========================================================================
// Token format validation
// ===========================================================================

#[test]
fn test_wrong_segment_counts_are_invalid() {
    let now = Utc::now();
    let valid_payload = URL_SAFE_NO_PAD.encode(br#"{"exp": 99999999999}"#);

    for token in [
        String::new(),
        valid_payload.clone(),
        format!("h.{valid_payload}"),
        format!("h.{valid_payload}.s.extra"),
        format!("h.{valid_payload}."),
        format!(".{valid_payload}.s"),
        "h..s".to_string(),
    ] {
        assert!(!is_token_valid_at(&token, now), "token {token:?} must be invalid");
        assert!(remaining_time_at(&token, now).is_zero());
    }

    // Same payload in a well-formed token is valid
    assert!(is_token_valid_at(&format!("h.{valid_payload}.s"), now));
}

// ===========================================================================
// Expiry boundary
// ===========================================================================

#[test]
fn test_expiry_boundary() {
    let now = Utc::now();
    let past = token_with_exp(now.timestamp() - 1);
    let future = token_with_exp(now.timestamp() + 3600);

    assert!(!is_token_valid_at(&past, now));
    assert!(is_token_valid_at(&future, now));
}

// ===========================================================================
// Monitoring lifecycle
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn test_double_start_leaves_one_timer_pair() {
    let (monitor, _store) = setup(Some(token_with_exp(Utc::now().timestamp() + 3600)));
    let handler = Arc::new(CountingHandler::default());

    monitor.start(handler.clone()).await;
    monitor.start(handler.clone()).await;

    assert_eq!(monitor.active_timers(), 2);

    // Long past the deadline: only one pair ever fired.
    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert_eq!(handler.calls(), 1);
    assert_eq!(handler.last_reason(), Some(InvalidationReason::DeadlineElapsed));
    assert_eq!(monitor.active_timers(), 0);
}

#[test]
fn test_monitor_rejects_zero_poll_interval() {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    let config = MonitorConfig::builder().poll_interval(Duration::ZERO).build();

    let result = TokenMonitor::new(store, config);
    assert!(matches!(result, Err(AuthError::Config(_))), "got {result:?}");
}

#[tokio::test(start_paused = true)]
async fn test_expired_token_invalidates_synchronously() {
    let (monitor, store) = setup(Some(token_with_exp(Utc::now().timestamp() - 1)));
    let handler = Arc::new(CountingHandler::default());

    monitor.start(handler.clone()).await;

    assert_eq!(handler.calls(), 1);
    assert_eq!(handler.last_reason(), Some(InvalidationReason::InvalidAtStart));
    assert!(store.get().is_none());
    assert!(!monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_another_tab_logging_out_is_detected_by_poll() {
    let (monitor, store) = setup(Some(token_with_exp(Utc::now().timestamp() + 3600)));
    let handler = Arc::new(CountingHandler::default());

    monitor.start(handler.clone()).await;
    store.clear();

    tokio::time::sleep(monitor.config().poll_interval + Duration::from_millis(10)).await;

    assert_eq!(handler.calls(), 1);
    assert_eq!(handler.last_reason(), Some(InvalidationReason::FailedPoll));
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_invalidation() {
    let (monitor, store) = setup(Some(token_with_exp(Utc::now().timestamp() - 10)));
    let handler = Arc::new(CountingHandler::default());

    monitor.start(handler.clone()).await;
    assert_eq!(handler.calls(), 1);

    // User logs in again
    store.set(token_with_exp(Utc::now().timestamp() + 60));
    monitor.start(handler.clone()).await;
    assert!(monitor.is_running());

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(handler.calls(), 2);
}

// ===========================================================================
// Logout notification failure
// ===========================================================================

#[tokio::test]
async fn test_logout_failure_still_clears_credential() {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    store.set(token_with_exp(Utc::now().timestamp() - 1));

    let config = MonitorConfig::builder()
        .logout_url("http://127.0.0.1:9/api/logout")
        .request_timeout(Duration::from_secs(2))
        .build();
    let notifier = Arc::new(LogoutNotifier::new(&config, Arc::clone(&store)).expect("notifier"));
    let monitor = TokenMonitor::new(Arc::clone(&store), config).expect("monitor");

    monitor.start(notifier).await;

    assert!(store.get().is_none());
}

// ===========================================================================
// Structured logging
// ===========================================================================

#[derive(Clone, Default)]
struct MessageCollector {
    messages: Arc<std::sync::Mutex<Vec<String>>>,
}

struct MessageVisitor<'a>(&'a mut Option<String>);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageCollector {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut message = None;
        event.record(&mut MessageVisitor(&mut message));
        if let Some(message) = message {
            self.messages.lock().expect("lock poisoned").push(message);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_invalidation_emits_structured_event() {
    use tracing_subscriber::layer::SubscriberExt;

    let collector = MessageCollector::default();
    let messages = Arc::clone(&collector.messages);
    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let (monitor, _store) = setup(Some("garbage".to_string()));
    monitor.start(Arc::new(CountingHandler::default())).await;

    let recorded = messages.lock().expect("lock poisoned");
    assert!(
        recorded.iter().any(|m| m == "session invalidated"),
        "expected an invalidation event, got: {recorded:?}"
    );
}
