//! Background Tasks Module
//!
//! # Tasks
//! - Expiry Sweep: removes expired cache entries at a fixed interval, within a
//!   per-pass time budget

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
