//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the caches.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries from one cache at a fixed interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepHandle};
