use serde::Serialize;
use voltwise_common::{
    AnalysisReport, ErrorResponse, LogEntry, Result, SimulationPayload, VoltwiseError, MAX_BINS,
    MAX_MESSAGE_LEN,
};

/// Voltwise client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address as `host:port`.
    pub base_addr: String,
}

/// Voltwise Client
pub struct Client {
    pub config: ClientConfig,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    message: &'a str,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self { config, http_client: reqwest::Client::new() }
    }

    /// Build the URL for an endpoint path such as `/pulse`.
    pub fn build_url(&self, path: &str) -> String {
        format!("http://{}{}", self.config.base_addr, path)
    }

    /// Analyze a simulation payload with the server's default bin count.
    pub async fn analyze(&self, payload: &SimulationPayload) -> Result<AnalysisReport> {
        self.analyze_impl(payload, None).await
    }

    /// Analyze a simulation payload with `bins` histogram bins.
    pub async fn analyze_with_bins(&self, payload: &SimulationPayload, bins: usize) -> Result<AnalysisReport> {
        if !(1..=MAX_BINS).contains(&bins) {
            return Err(VoltwiseError::InvalidBins(MAX_BINS));
        }
        self.analyze_impl(payload, Some(bins)).await
    }

    async fn analyze_impl(&self, payload: &SimulationPayload, bins: Option<usize>) -> Result<AnalysisReport> {
        let mut url = self.build_url("/analyze");
        if let Some(bins) = bins {
            url = format!("{}?bins={}", url, bins);
        }

        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| VoltwiseError::NetworkError(e.to_string()))?;

        decode(response).await
    }

    /// Fetch the retained pulse entries, oldest first.
    pub async fn pulse(&self) -> Result<Vec<LogEntry>> {
        let response = self
            .http_client
            .get(self.build_url("/pulse"))
            .send()
            .await
            .map_err(|e| VoltwiseError::NetworkError(e.to_string()))?;

        decode(response).await
    }

    /// Append a STATUS entry to the pulse; returns the entry as recorded.
    pub async fn post_status(&self, message: &str) -> Result<LogEntry> {
        let message = message.trim();
        if message.is_empty() {
            return Err(VoltwiseError::EmptyMessage);
        }
        if message.len() > MAX_MESSAGE_LEN {
            return Err(VoltwiseError::MessageTooLarge(MAX_MESSAGE_LEN));
        }

        let response = self
            .http_client
            .post(self.build_url("/pulse"))
            .json(&StatusRequest { message })
            .send()
            .await
            .map_err(|e| VoltwiseError::NetworkError(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(parse_error_response(status, response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| VoltwiseError::Decode(e.to_string()))
}

async fn parse_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> VoltwiseError {
    let error_msg = response
        .json::<ErrorResponse>()
        .await
        .map(|r| r.error)
        .unwrap_or_else(|_| format!("Server returned status: {}", status));

    VoltwiseError::HttpError(status.as_u16(), error_msg)
}
