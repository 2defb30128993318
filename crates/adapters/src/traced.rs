// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::network::{NetworkError, NetworkRequest, NetworkResponse, NetworkService};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any NetworkService
#[derive(Clone)]
pub struct TracedNetworkService<N> {
    inner: N,
}

impl<N> TracedNetworkService<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N: NetworkService> NetworkService for TracedNetworkService<N> {
    async fn connect(&self, request: NetworkRequest) -> Result<NetworkResponse, NetworkError> {
        let span = tracing::info_span!("network.connect", method = %request.method, url = %request.url);

        async move {
            // Precondition: only http(s) is ever sent
            if !(request.url.starts_with("http://") || request.url.starts_with("https://")) {
                tracing::error!("refusing non-http url");
                return Err(NetworkError::InvalidUrl(request.url));
            }

            tracing::debug!(body_len = request.body.len(), headers = request.headers.len(), "sending");
            let start = std::time::Instant::now();
            let result = self.inner.connect(request).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(response) => tracing::info!(
                    status = response.status,
                    body_len = response.body.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "response"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "request failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
