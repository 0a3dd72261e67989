//! In-memory scripted backend for sink and pool tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use trailpipe_protocol::WireMessage;

use super::backend::{Connector, QueueConnection};
use super::error::BackendError;

/// One RPUSH that reached the backend
#[derive(Debug, Clone)]
pub struct Push {
    pub key: String,
    pub messages: Vec<String>,
}

#[derive(Default)]
struct Script {
    connect_failures: VecDeque<BackendError>,
    outcomes: VecDeque<BackendError>,
    always_fail: Option<BackendError>,
    connects: usize,
    attempts: Vec<Instant>,
    pushes: Vec<Push>,
    list_len: u64,
}

/// Connector whose connections follow a script of failures
///
/// Clones share the same script, so a test can keep one clone for
/// inspection after handing another to the sink.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every append with `error`
    pub fn always_failing(error: BackendError) -> Self {
        let connector = Self::new();
        connector.script.lock().always_fail = Some(error);
        connector
    }

    /// Fail the next appends with `errors`, in order, then succeed
    pub fn failing_then_ok(errors: impl IntoIterator<Item = BackendError>) -> Self {
        let connector = Self::new();
        connector.script.lock().outcomes.extend(errors);
        connector
    }

    /// Fail the next connection attempts with `errors`, in order
    pub fn with_connect_failures(self, errors: impl IntoIterator<Item = BackendError>) -> Self {
        self.script.lock().connect_failures.extend(errors);
        self
    }

    /// Connections successfully opened
    pub fn connects(&self) -> usize {
        self.script.lock().connects
    }

    /// Times of every append attempt (virtual clock)
    pub fn attempts(&self) -> Vec<Instant> {
        self.script.lock().attempts.clone()
    }

    /// Pushes that succeeded
    pub fn pushes(&self) -> Vec<Push> {
        self.script.lock().pushes.clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn connect(&self) -> Result<ScriptedConnection, BackendError> {
        let mut script = self.script.lock();
        if let Some(error) = script.connect_failures.pop_front() {
            // a failed connect is a whole attempt
            script.attempts.push(Instant::now());
            return Err(error);
        }
        script.connects += 1;
        let id = script.connects;
        drop(script);

        Ok(ScriptedConnection {
            id,
            script: Arc::clone(&self.script),
        })
    }
}

/// Connection produced by [`ScriptedConnector`]
pub struct ScriptedConnection {
    pub id: usize,
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl QueueConnection for ScriptedConnection {
    async fn append(&mut self, key: &str, messages: &[WireMessage]) -> Result<u64, BackendError> {
        let mut script = self.script.lock();
        script.attempts.push(Instant::now());

        if let Some(error) = script.always_fail.clone() {
            return Err(error);
        }
        if let Some(error) = script.outcomes.pop_front() {
            return Err(error);
        }

        script.list_len += messages.len() as u64;
        script.pushes.push(Push {
            key: key.to_string(),
            messages: messages.iter().map(|m| m.as_str().to_string()).collect(),
        });
        Ok(script.list_len)
    }
}
