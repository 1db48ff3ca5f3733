//! Background transaction service: a tokio runtime applying transactions off
//! the caller's thread, reporting over an mpsc bus.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::engine::coordinator::{TransactionCoordinator, TransactionStatus};
use crate::services::ports::{NotificationSink, PositionEncoding, WorkspaceTransaction};

use super::buffer::OpenBuffers;
use super::disk::LocalDisk;
use super::fs::LocalResourceStore;

#[derive(Debug)]
pub enum TransactionMessage {
    Progress {
        message: String,
    },
    Finished {
        status: TransactionStatus,
        error: Option<String>,
        resource_failures: Vec<String>,
    },
    Aborted {
        error: String,
    },
}

/// Notification sink that forwards status lines onto the bus.
pub struct ChannelSink {
    tx: Sender<TransactionMessage>,
}

impl ChannelSink {
    pub fn new(tx: Sender<TransactionMessage>) -> Self {
        Self { tx }
    }

    fn send(&self, message: &str) {
        let _ = self.tx.send(TransactionMessage::Progress {
            message: message.to_string(),
        });
    }
}

impl NotificationSink for ChannelSink {
    fn progress(&mut self, message: &str) {
        self.send(message);
    }

    fn succeeded(&mut self) {
        // The terminal Finished message carries the outcome.
    }

    fn failed(&mut self, message: &str) {
        self.send(message);
    }

    fn restore_failed(&mut self, message: &str) {
        self.send(message);
    }
}

/// Applies whole transactions on a background runtime. Service mode is
/// headless: no documents are open, so every plan takes the on-disk path.
pub struct TransactionService {
    runtime: tokio::runtime::Runtime,
    tx: Sender<TransactionMessage>,
    encoding: PositionEncoding,
}

impl TransactionService {
    pub fn new(encoding: PositionEncoding) -> io::Result<(Self, Receiver<TransactionMessage>)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        let (tx, rx) = mpsc::channel();
        Ok((
            Self {
                runtime,
                tx,
                encoding,
            },
            rx,
        ))
    }

    pub fn submit(&self, transaction: WorkspaceTransaction) {
        let tx = self.tx.clone();
        let encoding = self.encoding;
        self.runtime.spawn(async move {
            let result_tx = tx.clone();
            let outcome =
                tokio::task::spawn_blocking(move || run_headless(transaction, encoding, tx)).await;
            match outcome {
                Ok(message) => {
                    let _ = result_tx.send(message);
                }
                Err(e) => {
                    let _ = result_tx.send(TransactionMessage::Aborted {
                        error: e.to_string(),
                    });
                }
            }
        });
    }
}

fn run_headless(
    transaction: WorkspaceTransaction,
    encoding: PositionEncoding,
    tx: Sender<TransactionMessage>,
) -> TransactionMessage {
    let mut editor = OpenBuffers::new(encoding);
    let mut gateway = LocalDisk::new(encoding);
    let mut store = LocalResourceStore;
    let mut sink = ChannelSink::new(tx);

    let coordinator =
        TransactionCoordinator::new(&mut editor, &mut gateway, &mut store, &mut sink);
    match coordinator.apply(&transaction) {
        Ok(report) => TransactionMessage::Finished {
            status: report.status,
            error: None,
            resource_failures: report
                .resource_failures
                .iter()
                .map(|f| f.to_string())
                .collect(),
        },
        Err(error) => TransactionMessage::Finished {
            status: error.status(),
            error: Some(error.to_string()),
            resource_failures: Vec::new(),
        },
    }
}
