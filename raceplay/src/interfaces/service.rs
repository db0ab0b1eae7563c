use crate::error::ServiceError;
use crate::pre::race_data::{parse_race_result, RaceResult};
use crate::pre::race_request::RacePayload;
use std::path::{Path, PathBuf};
use tracing::debug;

/// ComputationService turns a track and two markers into precomputed competitor paths.
pub trait ComputationService {
    fn compute(&self, payload: &RacePayload) -> Result<RaceResult, ServiceError>;
}

/// RecordedService answers every request with a previously saved service response.
#[derive(Debug, Clone)]
pub struct RecordedService {
    path: PathBuf,
}

impl RecordedService {
    pub fn new(path: &Path) -> RecordedService {
        RecordedService {
            path: path.to_path_buf(),
        }
    }
}

impl ComputationService for RecordedService {
    fn compute(&self, payload: &RacePayload) -> Result<RaceResult, ServiceError> {
        debug!(
            path = %self.path.display(),
            start = ?payload.start_location,
            end = ?payload.end_location,
            "Replaying recorded race result"
        );
        let json = std::fs::read_to_string(&self.path).map_err(|source| ServiceError::Io {
            path: self.path.to_owned(),
            source,
        })?;
        Ok(parse_race_result(&json)?)
    }
}
