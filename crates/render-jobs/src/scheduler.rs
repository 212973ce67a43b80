//! Async job scheduler: offloads render jobs to worker threads and delivers
//! exactly one outcome per job.
//!
//! The scheduler is an explicit, constructible, shutdown-able object; there
//! is no ambient global state. Resource pinning is RAII throughout: the
//! worker closure owns `Arc` clones of every collaborator it touches plus
//! its concurrency permit, so pins are released on every exit path,
//! including panics, without any manual decrement.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, warn};
use uuid::Uuid;

use hit_grid::GridPayload;
use map_common::{ImageEncoder, MapRenderer, ProjectionTransform, RenderError, RenderResult};

use crate::config::SchedulerConfig;
use crate::job::{GridJob, ImageJob};

/// Lifecycle of a single job, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Submitted,
    Pinned,
    Executing,
    Completing,
    Delivered,
    Failed,
}

/// Awaitable completion handle for one submitted job.
///
/// Exactly one outcome ever arrives. Dropping the handle does not cancel
/// the job; it runs to completion and its outcome is discarded.
pub struct JobHandle<T> {
    id: Uuid,
    rx: oneshot::Receiver<RenderResult<T>>,
}

// Manual impl so the handle is debuggable regardless of the payload type.
impl<T> fmt::Debug for JobHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the job's single completion event.
    pub async fn wait(self) -> RenderResult<T> {
        match self.rx.await {
            Ok(outcome) => outcome,
            // The sender is dropped without sending only if the scheduler
            // task itself was torn down mid-flight.
            Err(_) => Err(RenderError::Internal(
                "job ended without delivering an outcome".to_string(),
            )),
        }
    }
}

/// Executes render jobs off the caller's execution context.
///
/// Submission spawns onto the ambient Tokio runtime, so a scheduler must be
/// used from within one.
#[derive(Clone)]
pub struct JobScheduler {
    renderer: Arc<dyn MapRenderer>,
    encoder: Arc<dyn ImageEncoder>,
    projector: Arc<dyn ProjectionTransform>,
    permits: Arc<Semaphore>,
    shutting_down: Arc<AtomicBool>,
    max_concurrent_jobs: usize,
    default_point_radius: u32,
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("max_concurrent_jobs", &self.max_concurrent_jobs)
            .field("default_point_radius", &self.default_point_radius)
            .finish_non_exhaustive()
    }
}

impl JobScheduler {
    pub fn new(
        config: SchedulerConfig,
        renderer: Arc<dyn MapRenderer>,
        encoder: Arc<dyn ImageEncoder>,
        projector: Arc<dyn ProjectionTransform>,
    ) -> RenderResult<Self> {
        // Zero permits would park every job on the semaphore forever.
        if config.max_concurrent_jobs == 0 {
            return Err(RenderError::Configuration(
                "max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            renderer,
            encoder,
            projector,
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
            shutting_down: Arc::new(AtomicBool::new(false)),
            max_concurrent_jobs: config.max_concurrent_jobs,
            default_point_radius: config.default_point_radius,
        })
    }

    /// Submit an image render job. Fails fast, with no worker dispatched,
    /// on invalid arguments or during shutdown.
    pub fn submit_image(&self, job: ImageJob) -> RenderResult<JobHandle<Vec<u8>>> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(RenderError::ShuttingDown);
        }
        job.validate()?;

        let renderer = Arc::clone(&self.renderer);
        let encoder = Arc::clone(&self.encoder);
        self.dispatch("image", move || {
            job.execute(renderer.as_ref(), encoder.as_ref())
        })
    }

    /// Submit a grid render job. Square/power-of-two/step preconditions are
    /// checked here, before any worker is dispatched.
    pub fn submit_grid(&self, mut job: GridJob) -> RenderResult<JobHandle<GridPayload>> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(RenderError::ShuttingDown);
        }
        job.validate()?;
        if job.point_radius.is_none() {
            job.point_radius = Some(self.default_point_radius);
        }

        let projector = Arc::clone(&self.projector);
        self.dispatch("grid", move || job.execute(projector.as_ref()))
    }

    /// Stop accepting submissions and wait for in-flight jobs to finish.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        debug!("scheduler shutting down, draining in-flight jobs");
        // Holding every permit means no worker is still running.
        match self
            .permits
            .acquire_many(self.max_concurrent_jobs as u32)
            .await
        {
            Ok(_all) => {}
            Err(_) => warn!("scheduler semaphore closed unexpectedly"),
        }
        debug!("scheduler drained");
    }

    /// Pin, execute on a worker thread, and deliver exactly one outcome.
    fn dispatch<T, F>(&self, kind: &'static str, work: F) -> RenderResult<JobHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> RenderResult<T> + Send + 'static,
    {
        let id = Uuid::new_v4();
        debug!(job_id = %id, kind, state = ?JobState::Submitted, "job submitted");

        let (tx, rx) = oneshot::channel();
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            // The permit plus the Arcs captured in `work` are this job's
            // pins; both are released by drop on every path out of this
            // task.
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = tx.send(Err(RenderError::ShuttingDown));
                    return;
                }
            };
            debug!(job_id = %id, kind, state = ?JobState::Pinned, "resources pinned");

            debug!(job_id = %id, kind, state = ?JobState::Executing, "executing on worker");
            let outcome = match tokio::task::spawn_blocking(work).await {
                Ok(result) => result,
                Err(join_error) => Err(RenderError::Internal(format!(
                    "render worker panicked: {}",
                    join_error
                ))),
            };

            debug!(job_id = %id, kind, state = ?JobState::Completing, "capturing outcome");
            let state = if outcome.is_ok() {
                JobState::Delivered
            } else {
                JobState::Failed
            };
            if tx.send(outcome).is_err() {
                // Caller dropped the handle; the outcome is discarded but
                // delivery still counts as the job's single completion.
                debug!(job_id = %id, kind, "completion handle dropped before delivery");
            }
            debug!(job_id = %id, kind, state = ?state, "job finished");
            drop(permit);
        });

        Ok(JobHandle { id, rx })
    }
}
