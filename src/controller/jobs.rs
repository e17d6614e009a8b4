use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::gemini::CollaboratorError;
use crate::soundboard::SoundboardItem;

type TryRecvError = std::sync::mpsc::TryRecvError;

/// Results handed back to the controller thread.
#[derive(Debug)]
pub(crate) enum JobMessage {
    Synthesized(SynthesisResult),
    DeckGenerated(DeckResult),
}

/// Why a synthesis job was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SynthesisPurpose {
    /// The user (or roulette) asked to hear the item.
    Play,
    /// Warming the cache for a freshly generated deck.
    Prefetch,
}

#[derive(Debug)]
pub(crate) struct SynthesisResult {
    pub(crate) item: SoundboardItem,
    pub(crate) purpose: SynthesisPurpose,
    /// Deck generation the request was made for.
    pub(crate) epoch: u64,
    pub(crate) result: Result<Option<String>, CollaboratorError>,
}

#[derive(Debug)]
pub(crate) struct DeckResult {
    pub(crate) result: Result<Vec<SoundboardItem>, CollaboratorError>,
}

/// How collaborator calls are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobExecution {
    /// Each call runs on its own short-lived worker thread.
    #[default]
    Background,
    /// Calls wait in a queue until [`run_queued_jobs`](super::SoundboardController::run_queued_jobs).
    Queued,
}

type Job = Box<dyn FnOnce() -> JobMessage + Send + 'static>;

pub(crate) struct ControllerJobs {
    execution: JobExecution,
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    queued: VecDeque<Job>,
}

impl ControllerJobs {
    pub(super) fn new(execution: JobExecution) -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel::<JobMessage>();
        Self {
            execution,
            message_tx,
            message_rx,
            queued: VecDeque::new(),
        }
    }

    pub(super) fn try_recv_message(&self) -> Result<JobMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    /// Start `job`; its message arrives through [`try_recv_message`](Self::try_recv_message).
    pub(super) fn spawn<F>(&mut self, name: &str, job: F) -> std::io::Result<()>
    where
        F: FnOnce() -> JobMessage + Send + 'static,
    {
        match self.execution {
            JobExecution::Queued => {
                self.queued.push_back(Box::new(job));
                Ok(())
            }
            JobExecution::Background => {
                let tx = self.message_tx.clone();
                thread::Builder::new()
                    .name(name.to_string())
                    .spawn(move || {
                        let _ = tx.send(job());
                    })
                    .map(|_| ())
            }
        }
    }

    /// Run every job queued so far, in order. Jobs queued while running wait
    /// for the next call.
    pub(super) fn run_queued(&mut self) -> usize {
        let batch: Vec<Job> = self.queued.drain(..).collect();
        let count = batch.len();
        for job in batch {
            let _ = self.message_tx.send(job());
        }
        count
    }

    pub(super) fn queued_len(&self) -> usize {
        self.queued.len()
    }
}
