use crate::{Response, Transport, TransportError};
use reqwest::blocking::Client;
use std::time::Duration;

/// [`Transport`] over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("kuuki/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_error)?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .map_err(map_error)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(map_error)?;

        Ok(Response { status, body })
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
