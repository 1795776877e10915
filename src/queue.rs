//! The single event queue that funnels trigger sources into the sync loop.

use std::sync::mpsc::{self, Receiver, Sender};

/// What the sync loop should do in response to a trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Sync,
    Stop,
}

/// An event pushed by a trigger source, tagged with a free-form reason for logs.
#[derive(Debug, Clone, Copy)]
pub struct TriggerEvent {
    pub op: Op,
    pub reason: &'static str,
}

impl TriggerEvent {
    pub fn sync(reason: &'static str) -> Self {
        Self { op: Op::Sync, reason }
    }

    pub fn stop(reason: &'static str) -> Self {
        Self { op: Op::Stop, reason }
    }
}

pub type QueueSender = Sender<TriggerEvent>;
pub type QueueReceiver = Receiver<TriggerEvent>;

/// Unbounded, multi-producer single-consumer channel shared by every trigger source.
pub fn channel() -> (QueueSender, QueueReceiver) {
    mpsc::channel()
}
