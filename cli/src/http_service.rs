use raceplay::error::ServiceError;
use raceplay::interfaces::service::ComputationService;
use raceplay::pre::race_data::{parse_race_result, RaceResult};
use raceplay::pre::race_request::RacePayload;
use std::time::Duration;
use tracing::{debug, info};

const RACE_START_ROUTE: &str = "/api/v1/race/start";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// HttpService posts race requests to the path computation backend.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpService {
    pub fn new(base_url: &str) -> Result<HttpService, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(HttpService {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), RACE_START_ROUTE),
        })
    }
}

impl ComputationService for HttpService {
    fn compute(&self, payload: &RacePayload) -> Result<RaceResult, ServiceError> {
        info!("Requesting race paths from {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        debug!(bytes = body.len(), "Race paths received");
        Ok(parse_race_result(&body)?)
    }
}
