//! Asynchronous render/encode job pipeline.
//!
//! Callers build an [`ImageJob`] or [`GridJob`] against a private
//! [`map_common::MapView`] snapshot and submit it to a [`JobScheduler`];
//! the scheduler runs the job on a worker thread and delivers exactly one
//! outcome (payload or error) through the returned [`JobHandle`].

pub mod config;
pub mod job;
pub mod scheduler;

pub use config::{SchedulerConfig, DEFAULT_POINT_RADIUS};
pub use job::{render_image_sync, GridJob, ImageJob};
pub use scheduler::{JobHandle, JobScheduler};
