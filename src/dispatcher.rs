//! Ordered, rate-limited submission of documents.
//!
//! [`Dispatcher::submit`] appends to a FIFO queue and then drains it while
//! the sliding window has room. There is no background task: anything left in
//! the queue waits for the next `submit` (or an explicit [`Dispatcher::flush`]).
//!
//! A submission is taken off the queue before it is encoded and sent. If the
//! encoder or the transport fails, or the send is cancelled, that submission
//! is gone: it is not put back and no later call will send it. Submissions
//! still queued behind it are untouched.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Url;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::encoding::{Encoder, JsonEncoder};
use crate::error::DispatchError;
use crate::metrics::{DROPPED_TOTAL, QUEUE_DEPTH, SEND_FAILURES, SEND_LATENCY, SENDS_TOTAL, SUBMISSIONS_TOTAL};
use crate::rate_limit::{SlidingWindow, WindowConfig};
use crate::transport::Transport;

// A submission waiting for a free slot
#[derive(Debug)]
struct Pending<P> {
    payload: P,
    // carried along but never applied to the request
    #[allow(dead_code)]
    signature: String,
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Submissions handed to the transport during this call.
    pub sent: usize,
    /// Submissions still queued when the call returned.
    pub pending: usize,
}

/// Interrupts whatever send the dispatcher is blocked on.
///
/// Has no effect when no send is in progress.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.notify.notify_waiters();
    }
}

struct DispatchState<P, C: Clock> {
    queue: VecDeque<Pending<P>>,
    window: SlidingWindow<C>,
}

pub struct Dispatcher<P, T, E = JsonEncoder, C: Clock = SystemClock> {
    // Held for a whole submit/flush call, so the window itself needs no lock.
    state: Mutex<DispatchState<P, C>>,
    transport: T,
    encoder: E,
    cancel: Arc<Notify>,
}

impl<P, T> Dispatcher<P, T, JsonEncoder, SystemClock>
where
    P: serde::Serialize + Send,
    T: Transport,
{
    pub fn new(config: WindowConfig, transport: T) -> Self {
        Self::with_parts(SlidingWindow::with_clock(config, SystemClock), transport, JsonEncoder)
    }
}

impl<P, T, E, C> Dispatcher<P, T, E, C>
where
    P: Send,
    T: Transport,
    E: Encoder<P>,
    C: Clock,
{
    pub fn with_parts(window: SlidingWindow<C>, transport: T, encoder: E) -> Self {
        let config = window.config();
        info!(
            unit = ?config.unit(),
            limit = config.limit(),
            "dispatcher ready"
        );
        Self {
            state: Mutex::new(DispatchState { queue: VecDeque::new(), window }),
            transport,
            encoder,
            cancel: Arc::new(Notify::new()),
        }
    }

    /// Queues `payload` and sends as many queued submissions as the window
    /// allows, oldest first, all to `destination`.
    ///
    /// Calls are serialized: a second caller waits until the first has
    /// finished draining. Dropping the returned future mid-send behaves like
    /// [`CancelHandle::cancel`].
    pub async fn submit(
        &self,
        destination: &Url,
        payload: P,
        signature: impl Into<String>,
    ) -> Result<DrainReport, DispatchError> {
        let signature = signature.into();
        let mut state = self.state.lock().await;

        state.queue.push_back(Pending { payload, signature });
        SUBMISSIONS_TOTAL.inc();
        QUEUE_DEPTH.set(state.queue.len() as f64);
        debug!(pending = state.queue.len(), "submission queued");

        self.drain(&mut state, destination).await
    }

    /// Drains the queue without adding anything to it.
    pub async fn flush(&self, destination: &Url) -> Result<DrainReport, DispatchError> {
        let mut state = self.state.lock().await;
        self.drain(&mut state, destination).await
    }

    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Admissions in the window as of the last capacity check.
    pub async fn ledger_len(&self) -> usize {
        self.state.lock().await.window.len()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle { notify: Arc::clone(&self.cancel) }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn drain(
        &self,
        state: &mut DispatchState<P, C>,
        destination: &Url,
    ) -> Result<DrainReport, DispatchError> {
        let mut sent = 0;

        while !state.window.is_at_capacity() {
            let Some(next) = state.queue.pop_front() else {
                break;
            };
            QUEUE_DEPTH.set(state.queue.len() as f64);

            let body = match self.encoder.encode(&next.payload) {
                Ok(body) => body,
                Err(e) => {
                    DROPPED_TOTAL.inc();
                    warn!(error = %e, pending = state.queue.len(), "submission dropped: encoding failed");
                    return Err(e.into());
                }
            };
            drop(next);

            let bytes = body.len();
            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = self.cancel.notified() => Err(DispatchError::Cancelled),
                res = self.transport.send(destination, body) => res.map_err(DispatchError::from),
            };
            SEND_LATENCY.observe(started.elapsed().as_secs_f64());

            let delivery = match result {
                Ok(delivery) => delivery,
                Err(e) => {
                    SEND_FAILURES.inc();
                    DROPPED_TOTAL.inc();
                    warn!(%destination, error = %e, pending = state.queue.len(), "submission dropped: send failed");
                    return Err(e);
                }
            };
            SENDS_TOTAL.inc();

            if delivery.status.is_success() {
                info!(%destination, bytes, status = %delivery.status, "submission sent");
            } else {
                warn!(%destination, bytes, status = %delivery.status, "submission sent but not accepted");
            }

            if state.window.try_reserve() {
                debug!(in_window = state.window.len(), "slot reserved");
            } else {
                // capacity was checked under this same lock, so this stays unreachable
                warn!("sent without a free slot in the window");
            }
            sent += 1;
        }

        let pending = state.queue.len();
        if pending > 0 {
            info!(sent, pending, "window full, submissions left queued");
        } else {
            debug!(sent, "queue drained");
        }
        Ok(DrainReport { sent, pending })
    }
}
