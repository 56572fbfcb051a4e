//! Token validity monitor.
//!
//! [`TokenMonitor`] keeps a client session honest without a server round
//! trip per check. While running it drives two timers:
//!
//! ```text
//! start ─┬─ poll task:     every poll_interval → is_token_valid()? ── no ──┐
//!        └─ deadline task: sleep(remaining_time) ──────────────────────────┤
//!                                                                          ▼
//!                              claim generation → cancel both → clear store → handler
//! ```
//!
//! The deadline task invalidates at the exact expiry instant; the poll task
//! catches malformed credentials and external removal (another tab logging
//! out) that a single deadline cannot see. Whichever fires first claims the
//! current generation under the state lock, so the handler runs at most once
//! per `start`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use foundation_common_authn::{
//!     MemoryCredentialStore, MonitorConfig, TokenMonitor, monitor::handler_fn,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryCredentialStore::new());
//! let monitor = TokenMonitor::new(store, MonitorConfig::default())?;
//!
//! monitor
//!     .start(handler_fn(|event| {
//!         println!("session ended: {}", event.reason);
//!     }))
//!     .await;
//!
//! // ... later, on explicit logout
//! monitor.stop();
//! # Ok(())
//! # }
//! ```

use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{config::MonitorConfig, error::Result, jwt, store::CredentialStore};

/// Why a session was invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The credential was already unusable when monitoring started.
    InvalidAtStart,
    /// A poll found the credential malformed, expired, or missing.
    FailedPoll,
    /// The expiry deadline elapsed.
    DeadlineElapsed,
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidAtStart => "invalid_at_start",
            Self::FailedPoll => "failed_poll",
            Self::DeadlineElapsed => "deadline_elapsed",
        };
        f.write_str(s)
    }
}

/// Context passed to an [`InvalidationHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationEvent {
    /// What triggered the invalidation.
    pub reason: InvalidationReason,
    /// The credential removed from the store, if one was still present.
    pub token: Option<String>,
}

/// Callback run once the local credential has been removed.
///
/// Handlers may perform network I/O (see
/// [`LogoutNotifier`](crate::LogoutNotifier)); the credential is already
/// gone from the store by the time they run, whatever they do.
#[async_trait]
pub trait InvalidationHandler: Send + Sync {
    /// Called exactly once per invalidated monitoring session.
    async fn on_invalid(&self, event: InvalidationEvent);
}

/// Adapter running a plain closure as an [`InvalidationHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F> InvalidationHandler for FnHandler<F>
where
    F: Fn(InvalidationEvent) + Send + Sync,
{
    async fn on_invalid(&self, event: InvalidationEvent) {
        (self.0)(event);
    }
}

/// Wraps a closure into a shareable [`InvalidationHandler`].
pub fn handler_fn<F>(f: F) -> Arc<dyn InvalidationHandler>
where
    F: Fn(InvalidationEvent) + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Timers belonging to one `start` call.
struct ActiveTimers {
    generation: u64,
    cancel: CancellationToken,
    poll: JoinHandle<()>,
    deadline: JoinHandle<()>,
}

impl ActiveTimers {
    fn live(&self) -> usize {
        [&self.poll, &self.deadline].into_iter().filter(|handle| !handle.is_finished()).count()
    }
}

#[derive(Default)]
struct MonitorState {
    generation: u64,
    active: Option<ActiveTimers>,
}

struct MonitorInner {
    store: Arc<dyn CredentialStore>,
    config: MonitorConfig,
    state: Mutex<MonitorState>,
}

impl MonitorInner {
    fn is_token_valid(&self) -> bool {
        self.store.get().is_some_and(|token| jwt::is_token_valid(&token))
    }

    /// Takes ownership of the active generation if it is still current.
    ///
    /// Returns `false` when `stop`, a restart, or the sibling timer got
    /// there first.
    fn claim(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        match state.active.take() {
            Some(active) if active.generation == generation => {
                active.cancel.cancel();
                true
            },
            other => {
                state.active = other;
                false
            },
        }
    }

    /// Clears the store and runs the handler. Callers must own the generation.
    async fn invalidate(&self, reason: InvalidationReason, handler: &dyn InvalidationHandler) {
        let token = self.store.get();
        self.store.clear();
        tracing::info!(reason = %reason, had_token = token.is_some(), "session invalidated");
        handler.on_invalid(InvalidationEvent { reason, token }).await;
    }
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        if let Some(active) = self.state.get_mut().active.take() {
            active.cancel.cancel();
        }
    }
}

/// Watches the stored credential and invalidates the session when it
/// expires or becomes unusable.
///
/// The monitor is an explicit instance owned by the application's
/// composition root. Cloning yields another handle to the same monitor.
/// Dropping the last handle cancels any running timers.
#[derive(Clone)]
pub struct TokenMonitor {
    inner: Arc<MonitorInner>,
}

impl fmt::Debug for TokenMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenMonitor")
            .field("config", &self.inner.config)
            .field("running", &self.is_running())
            .finish()
    }
}

impl TokenMonitor {
    /// Creates a stopped monitor over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`](crate::AuthError::Config) if the
    /// configuration is invalid.
    pub fn new(store: Arc<dyn CredentialStore>, config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(MonitorInner {
                store,
                config,
                state: Mutex::new(MonitorState::default()),
            }),
        })
    }

    /// Returns the monitor configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Returns the underlying credential store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Starts monitoring the stored credential.
    ///
    /// Any previous timers are cancelled first, so calling this repeatedly
    /// leaves exactly one poll timer and one deadline timer. Nothing is
    /// scheduled when no credential is stored. A credential that is already
    /// unusable is invalidated before this returns: the store is cleared
    /// and `handler` has completed.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime context.
    #[tracing::instrument(skip(self, handler))]
    pub async fn start(&self, handler: Arc<dyn InvalidationHandler>) {
        self.stop();

        let Some(token) = self.inner.store.get() else {
            tracing::debug!("no credential stored, monitor not started");
            return;
        };

        let remaining = jwt::remaining_time(&token);
        if remaining.is_zero() {
            self.inner.invalidate(InvalidationReason::InvalidAtStart, handler.as_ref()).await;
            return;
        }

        let mut state = self.inner.state.lock();
        // A concurrent start may have slipped in after our stop().
        if let Some(previous) = state.active.take() {
            previous.cancel.cancel();
        }
        state.generation += 1;
        let generation = state.generation;
        let cancel = CancellationToken::new();

        let poll = tokio::spawn(poll_task(
            Arc::downgrade(&self.inner),
            generation,
            self.inner.config.poll_interval,
            cancel.clone(),
            Arc::clone(&handler),
        ));
        let deadline = tokio::spawn(deadline_task(
            Arc::downgrade(&self.inner),
            generation,
            remaining,
            cancel.clone(),
            handler,
        ));

        state.active = Some(ActiveTimers { generation, cancel, poll, deadline });
        tracing::debug!(
            generation,
            remaining_ms = remaining.as_millis() as u64,
            poll_interval_ms = self.inner.config.poll_interval.as_millis() as u64,
            "token monitor started"
        );
    }

    /// Cancels both timers. Safe to call when not running.
    ///
    /// Once this returns no invalidation from the cancelled timers can begin.
    pub fn stop(&self) {
        let active = self.inner.state.lock().active.take();
        if let Some(active) = active {
            active.cancel.cancel();
            tracing::debug!(generation = active.generation, "token monitor stopped");
        }
    }

    /// Returns whether timers are currently scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().active.is_some()
    }

    /// Number of timer tasks of the current session that are still alive.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.inner.state.lock().active.as_ref().map_or(0, ActiveTimers::live)
    }

    /// Validates the stored credential. Fail-closed and side-effect free.
    #[must_use]
    pub fn is_token_valid(&self) -> bool {
        self.inner.is_token_valid()
    }

    /// Remaining lifetime of the stored credential, zero when absent or
    /// unusable.
    #[must_use]
    pub fn remaining_time(&self) -> Duration {
        self.inner.store.get().map_or(Duration::ZERO, |token| jwt::remaining_time(&token))
    }
}

async fn poll_task(
    inner: Weak<MonitorInner>,
    generation: u64,
    interval: Duration,
    cancel: CancellationToken,
    handler: Arc<dyn InvalidationHandler>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; consume it so we start
    // with a full interval wait.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(monitor) = inner.upgrade() else { break };
                if monitor.is_token_valid() {
                    continue;
                }
                if monitor.claim(generation) {
                    monitor.invalidate(InvalidationReason::FailedPoll, handler.as_ref()).await;
                }
                break;
            }
        }
    }
}

async fn deadline_task(
    inner: Weak<MonitorInner>,
    generation: u64,
    remaining: Duration,
    cancel: CancellationToken,
    handler: Arc<dyn InvalidationHandler>,
) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {},
        _ = tokio::time::sleep(remaining) => {
            if let Some(monitor) = inner.upgrade()
                && monitor.claim(generation)
            {
                monitor.invalidate(InvalidationReason::DeadlineElapsed, handler.as_ref()).await;
            }
        }
    }
}
