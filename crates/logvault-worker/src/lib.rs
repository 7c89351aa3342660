//! Recurring jobs for LogVault.
//!
//! This crate provides:
//! - A cron scheduler wrapper with a single next-fire-time accessor
//! - A job handler trait with a per-job overlap guard
//! - The scan and retention cleanup jobs
//! - The schedule controller that owns both jobs and hot-reloads their config

pub mod controller;
pub mod cron;
pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use controller::{ControllerState, JobKind, RegisteredJob, ScheduleController};
pub use scheduler::CronScheduler;
