//! Background reading generation.
//!
//! The reading service may be slow or unreachable, so it never runs on the
//! animation thread. Jobs go to a worker thread tagged with the session
//! generation; results come back over a channel and are drained once per
//! frame without blocking.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, info, warn};

use tarot_reading::{
    reading_or_fallback, ChatReadingClient, OfflineReadingService, Reading, ReadingConfig,
    ReadingRequest, ReadingService,
};

// ════════════════════════════════════════════════════════════════════════════
// ReadingCommand / ReadingResult
// ════════════════════════════════════════════════════════════════════════════

pub enum ReadingCommand {
    /// Generate passages for a full spread.
    Generate { generation: u64, request: ReadingRequest },
    /// Terminate the thread.
    Quit,
}

/// A finished reading, always with one passage per card (the static
/// narrative stands in when the service fails).
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingResult {
    pub generation: u64,
    pub reading:    Reading,
}

// ════════════════════════════════════════════════════════════════════════════
// ReadingWorker
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the reading thread.
pub struct ReadingWorker {
    cmd_tx:    Sender<ReadingCommand>,
    result_rx: Receiver<ReadingResult>,
}

impl ReadingWorker {
    pub fn spawn(service: Box<dyn ReadingService>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ReadingCommand>();
        let (result_tx, result_rx) = mpsc::channel::<ReadingResult>();

        thread::spawn(move || worker_thread(service, cmd_rx, result_tx));

        ReadingWorker { cmd_tx, result_rx }
    }

    pub fn request(&self, generation: u64, request: ReadingRequest) {
        let _ = self.cmd_tx.send(ReadingCommand::Generate { generation, request });
    }

    pub fn quit(&self) { let _ = self.cmd_tx.send(ReadingCommand::Quit); }

    /// Drain any finished readings (non-blocking).
    pub fn drain_results(&self) -> Vec<ReadingResult> {
        let mut out = Vec::new();
        while let Ok(r) = self.result_rx.try_recv() { out.push(r); }
        out
    }
}

impl Drop for ReadingWorker {
    fn drop(&mut self) { self.quit(); }
}

fn worker_thread(
    service:   Box<dyn ReadingService>,
    cmd_rx:    Receiver<ReadingCommand>,
    result_tx: Sender<ReadingResult>,
) {
    for cmd in cmd_rx {
        match cmd {
            ReadingCommand::Generate { generation, request } => {
                debug!(generation, cards = request.cards.len(), service = service.name(), "generating reading");
                let reading = reading_or_fallback(service.as_ref(), &request);
                if result_tx.send(ReadingResult { generation, reading }).is_err() {
                    return;
                }
            }
            ReadingCommand::Quit => return,
        }
    }
}

/// Pick the reading service: the chat client when a key is configured and
/// `offline` is not set, the static narrative otherwise.
pub fn select_service(offline: bool) -> Box<dyn ReadingService> {
    if offline {
        info!("offline mode, using static narrative");
        return Box::new(OfflineReadingService);
    }
    match ChatReadingClient::new(ReadingConfig::from_env()) {
        Ok(client) => {
            info!(service = client.name(), "reading service configured");
            Box::new(client)
        }
        Err(e) => {
            warn!(error = %e, "reading service unavailable, using static narrative");
            Box::new(OfflineReadingService)
        }
    }
}
