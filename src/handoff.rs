//! Cross-thread plumbing for hosts whose input callbacks and renderer do
//! not run on the frame thread.
//!
//! Input callbacks send [`InputEvent`]s through an [`InputSender`]; the frame
//! thread drains them with [`crate::CharacterController::drain_events`] before
//! calling `update`, so controller state only ever has one writer. The
//! latest [`FrameOutput`] is published through a [`SharedFrame`].

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryIter, unbounded};
use parking_lot::RwLock;

use crate::controller::FrameOutput;
use crate::player::input::InputEvent;

/// Unbounded so that key-up events are never dropped.
pub fn input_channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = unbounded();
    (InputSender { tx }, InputReceiver { rx })
}

#[derive(Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Returns false once the frame thread has dropped its receiver.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn key_down(&self, code: impl Into<String>) -> bool {
        self.send(InputEvent::KeyDown(code.into()))
    }

    pub fn key_up(&self, code: impl Into<String>) -> bool {
        self.send(InputEvent::KeyUp(code.into()))
    }
}

pub struct InputReceiver {
    rx: Receiver<InputEvent>,
}

impl InputReceiver {
    pub fn try_iter(&self) -> TryIter<'_, InputEvent> {
        self.rx.try_iter()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Latest frame output, written by the frame thread and read by a renderer.
#[derive(Clone, Default)]
pub struct SharedFrame {
    inner: Arc<RwLock<Option<FrameOutput>>>,
}

impl SharedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: FrameOutput) {
        *self.inner.write() = Some(frame);
    }

    pub fn latest(&self) -> Option<FrameOutput> {
        *self.inner.read()
    }
}
