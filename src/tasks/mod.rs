//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes expired entries from every cache at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
