//! Fire-and-forget persistence of request log records.
//!
//! Handlers never wait on the log table: the middleware hands a record to
//! [`RequestLogSink::record`], which only enqueues it on a bounded channel. A
//! single background worker drains the channel into the store.
//!
//! Delivery is at most once. A full queue, a stopped worker or a failed insert
//! drops the record with a warning; nothing is retried.

use notes_store::{NewRequestLog, Store};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Sending half of the request log queue.
#[derive(Debug, Clone)]
pub struct RequestLogSink {
    tx: mpsc::Sender<NewRequestLog>,
}

impl RequestLogSink {
    /// Create a sink and the receiver its worker should drain.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NewRequestLog>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Create a sink with a worker writing into `store`.
    ///
    /// The worker exits once every clone of the sink has been dropped and the
    /// queue is empty.
    pub fn start(store: Store, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sink, rx) = Self::new(capacity);
        let worker = tokio::spawn(run_worker(store, rx));
        (sink, worker)
    }

    /// Enqueue a record without waiting.
    pub fn record(&self, entry: NewRequestLog) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                tracing::warn!(
                    method = %entry.method,
                    endpoint = %entry.endpoint,
                    "Request log queue full, dropping record"
                );
            }
            Err(TrySendError::Closed(entry)) => {
                tracing::warn!(
                    method = %entry.method,
                    endpoint = %entry.endpoint,
                    "Request log worker stopped, dropping record"
                );
            }
        }
    }
}

/// Drain the queue into the `logs` table.
pub async fn run_worker(store: Store, mut rx: mpsc::Receiver<NewRequestLog>) {
    tracing::debug!("Request log worker started");

    while let Some(entry) = rx.recv().await {
        if let Err(e) = store.insert_request_log(&entry).await {
            tracing::warn!(
                method = %entry.method,
                endpoint = %entry.endpoint,
                error = %e,
                "Failed to persist request log"
            );
        }
    }

    tracing::debug!("Request log worker stopped");
}
