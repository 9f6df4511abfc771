//! Embassy tasks
//!
//! One task per core:
//! - `controller_task` on core 0 owns the sensor bus and abort button
//! - `worker_task` on core 1 owns the six candidate lines

pub mod controller;
pub mod worker;

pub use controller::controller_task;
pub use worker::worker_task;
