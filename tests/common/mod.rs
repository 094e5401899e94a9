#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use crpt_client::{Delivery, ManualClock, SlidingWindow, TimeUnit, Transport, TransportError, WindowConfig};
use reqwest::{StatusCode, Url};
use tokio::sync::Notify;

pub const MINUTE: u64 = 60_000_000_000;

pub fn registry_url() -> Url {
    Url::parse("http://registry.test/api/v3/lk/documents/create").unwrap()
}

pub fn minute_window(limit: i64, clock: &ManualClock) -> SlidingWindow<ManualClock> {
    let config = WindowConfig::new(Some(TimeUnit::Minutes), limit).unwrap();
    SlidingWindow::with_clock(config, clock.clone())
}

/// Transport whose behaviour is chosen per payload.
///
/// Payloads are JSON strings (`"A"`, `"B"`, ...) and are recorded decoded.
#[derive(Default)]
pub struct ScriptedTransport {
    attempts: Mutex<Vec<String>>,
    delivered: Mutex<Vec<String>>,
    fail_on: Mutex<HashSet<String>>,
    block_on: Mutex<HashSet<String>>,
    pub started: Notify,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Default::default() }
    }

    pub fn fail_on(&self, payload: &str) {
        self.fail_on.lock().unwrap().insert(payload.to_string());
    }

    pub fn block_on(&self, payload: &str) {
        self.block_on.lock().unwrap().insert(payload.to_string());
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _destination: &Url, body: Vec<u8>) -> Result<Delivery, TransportError> {
        let payload: String = serde_json::from_slice(&body).unwrap();
        self.attempts.lock().unwrap().push(payload.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let blocked = self.block_on.lock().unwrap().contains(&payload);
        if blocked {
            self.started.notify_one();
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on.lock().unwrap().contains(&payload) {
            return Err(TransportError::Unavailable(format!("refused {payload}")));
        }
        self.delivered.lock().unwrap().push(payload);
        Ok(Delivery { status: StatusCode::OK, body: "{}".into() })
    }
}
