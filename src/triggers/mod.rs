//! Trigger sources: independent producers of [`TriggerEvent`](crate::queue::TriggerEvent)s,
//! each modeled as a scoped resource whose construction spawns a background
//! thread/connection and whose `Drop` joins or disconnects it.

pub mod mqtt;
pub mod signal;
pub mod timer;
