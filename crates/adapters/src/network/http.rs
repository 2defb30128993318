// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP network service backed by a blocking ureq agent

use super::{HttpMethod, NetworkError, NetworkRequest, NetworkResponse, NetworkService};
use async_trait::async_trait;
use std::io::Read;
use std::time::Duration;
use ureq::ErrorKind;

/// Network service running ureq on the blocking thread pool
#[derive(Clone)]
pub struct UreqNetworkService {
    agent: ureq::Agent,
}

impl UreqNetworkService {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect_timeout)
                .timeout_read(read_timeout)
                .timeout_write(read_timeout)
                .build(),
        }
    }
}

impl Default for UreqNetworkService {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10))
    }
}

#[async_trait]
impl NetworkService for UreqNetworkService {
    async fn connect(&self, request: NetworkRequest) -> Result<NetworkResponse, NetworkError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || send_blocking(&agent, &request))
            .await
            .map_err(|e| NetworkError::Io(format!("request task failed: {e}")))?
    }
}

fn send_blocking(
    agent: &ureq::Agent,
    request: &NetworkRequest,
) -> Result<NetworkResponse, NetworkError> {
    let mut call = agent.request(&request.method.to_string(), &request.url);
    for (name, value) in &request.headers {
        call = call.set(name, value);
    }
    if let Some(timeout) = request.timeout {
        call = call.timeout(timeout);
    }

    let result = match request.method {
        HttpMethod::Get => call.call(),
        HttpMethod::Post => call.send_bytes(&request.body),
    };

    match result {
        Ok(response) => read_response(response),
        // error statuses are still responses for the caller to judge
        Err(ureq::Error::Status(_, response)) => read_response(response),
        Err(ureq::Error::Transport(transport)) => Err(transport_error(&transport)),
    }
}

fn read_response(response: ureq::Response) -> Result<NetworkResponse, NetworkError> {
    let status = response.status();
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| NetworkError::Io(e.to_string()))?;

    Ok(NetworkResponse {
        status,
        headers,
        body,
    })
}

fn transport_error(transport: &ureq::Transport) -> NetworkError {
    let message = transport.to_string();
    match transport.kind() {
        ErrorKind::InvalidUrl | ErrorKind::UnknownScheme => NetworkError::InvalidUrl(message),
        ErrorKind::Io => NetworkError::Io(message),
        _ => NetworkError::Connection(message),
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
