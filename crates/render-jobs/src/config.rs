//! Scheduler configuration.

use serde::Deserialize;

/// Default circular footprint radius for point features, in pixels.
///
/// Only a fallback; jobs can set their own radius per submission.
pub const DEFAULT_POINT_RADIUS: u32 = 10;

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_point_radius() -> u32 {
    DEFAULT_POINT_RADIUS
}

/// Tunables for a [`crate::JobScheduler`].
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on jobs executing concurrently. Submissions beyond the
    /// bound queue until a worker slot frees up.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Point-footprint radius applied to grid jobs that do not set one.
    #[serde(default = "default_point_radius")]
    pub default_point_radius: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            default_point_radius: default_point_radius(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.default_point_radius, DEFAULT_POINT_RADIUS);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"max_concurrent_jobs": 16}"#).unwrap();
        assert_eq!(config.max_concurrent_jobs, 16);
        assert_eq!(config.default_point_radius, DEFAULT_POINT_RADIUS);
    }
}
