//! Configuration errors
//!
//! Every variant describes a data inconsistency in the tuning tables. These
//! are surfaced when a session is constructed (or when a caller asks for an
//! obstacle type by name) and are never produced mid-simulation.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::ObstacleKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("obstacle catalog is empty")]
    NoObstacleTypes,
    #[error("no obstacle type can spawn at speed 0 (one needs min_spawn_speed == 0)")]
    NoBaselineObstacle,
    #[error("no configuration for obstacle type {0}")]
    MissingObstacleType(ObstacleKind),
    #[error("unknown obstacle type `{0}`")]
    UnknownObstacleType(String),
    #[error("obstacle type {0} is configured more than once")]
    DuplicateObstacleType(ObstacleKind),
    #[error("invalid tuning value `{field}`: {reason}")]
    InvalidTuning {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidTuning { field, reason }
    }
}
