use crate::core::session::SessionState;
use std::path::PathBuf;
use thiserror::Error;

/// PrerequisiteError is returned if the race cannot be requested yet because the map setup is
/// incomplete. It is meant to be shown to the user as a blocking message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrerequisiteError {
    #[error("Setup incomplete: a track polygon is required")]
    MissingBoundary,
    #[error("Setup incomplete: exactly 2 markers are required, found {0}")]
    MarkerCount(usize),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Server error (status {0})")]
    Status(u16),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to read recorded race {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed race result: {0}")]
    Decode(#[from] serde_json::Error),
}

/// PrepareError covers everything that can go wrong between the user pressing "race" and the
/// countdown starting.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Prerequisites(#[from] PrerequisiteError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OverlayError {
    #[error("Path analysis is only available after the race (session is {0})")]
    Unavailable(SessionState),
    #[error("No finisher with index {index} ({finishers} finished)")]
    UnknownFinisher { index: usize, finishers: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Speed factor must be positive and finite, got {0}")]
    SpeedFactor(f64),
    #[error("Default travel time must be positive and finite, got {0}")]
    DefaultTravelTime(f64),
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}
