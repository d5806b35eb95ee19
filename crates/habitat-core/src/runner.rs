//! Background generation.
//!
//! [`spawn_generation`] runs one request on a worker thread and reports
//! stage transitions and the final result over a channel, so an interactive
//! caller can poll without blocking.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use tracing::warn;

use crate::error::{GenerationError, Result};
use crate::generator::{GenerationOutcome, GenerationRequest, ReportGenerator};
use crate::stage::{PipelineStage, ProgressObserver};

/// Update sent by a background generation.
#[derive(Debug)]
pub enum GenerationEvent {
    Stage(PipelineStage),
    /// Last event of a run.
    Finished(Result<GenerationOutcome>),
}

struct ChannelObserver {
    sender: Sender<GenerationEvent>,
}

impl ProgressObserver for ChannelObserver {
    fn on_stage(&self, stage: PipelineStage) {
        // the handle may already be gone
        let _ = self.sender.send(GenerationEvent::Stage(stage));
    }
}

/// Handle on a running background generation.
pub struct GenerationHandle {
    receiver: Receiver<GenerationEvent>,
    thread: Option<JoinHandle<()>>,
    last_stage: PipelineStage,
}

impl GenerationHandle {
    /// Last stage seen through [`Self::try_event`] or [`Self::wait`].
    pub fn last_stage(&self) -> PipelineStage {
        self.last_stage
    }

    /// Next pending event, if any, without blocking. A caller polling with
    /// this method receives the [`GenerationEvent::Finished`] result itself
    /// and should not call [`Self::wait`] afterwards.
    pub fn try_event(&mut self) -> Option<GenerationEvent> {
        match self.receiver.try_recv() {
            Ok(event) => {
                self.track(&event);
                Some(event)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until the run finishes, passing every stage to `on_stage`.
    pub fn wait_with(
        mut self,
        mut on_stage: impl FnMut(PipelineStage),
    ) -> Result<GenerationOutcome> {
        let result = loop {
            match self.receiver.recv() {
                Ok(GenerationEvent::Stage(stage)) => {
                    self.last_stage = stage;
                    on_stage(stage);
                }
                Ok(GenerationEvent::Finished(result)) => break result,
                Err(_) => {
                    break Err(GenerationError::WorkerLost {
                        stage: self.last_stage,
                    });
                }
            }
        };
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("generation worker panicked");
        }
        result
    }

    /// Blocks until the run finishes.
    pub fn wait(self) -> Result<GenerationOutcome> {
        self.wait_with(|_| {})
    }

    fn track(&mut self, event: &GenerationEvent) {
        if let GenerationEvent::Stage(stage) = event {
            self.last_stage = *stage;
        }
    }
}

/// Runs `request` on a new thread with a clone of `generator`.
pub fn spawn_generation(
    generator: &ReportGenerator,
    request: GenerationRequest,
) -> GenerationHandle {
    let (sender, receiver) = unbounded();
    let generator = generator.clone().with_observer(Arc::new(ChannelObserver {
        sender: sender.clone(),
    }));
    let thread = thread::spawn(move || {
        let result = generator.generate(&request);
        let _ = sender.send(GenerationEvent::Finished(result));
    });
    GenerationHandle {
        receiver,
        thread: Some(thread),
        last_stage: PipelineStage::Idle,
    }
}
