// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op network service for offline deployments.

use super::{NetworkError, NetworkRequest, NetworkResponse, NetworkService};
use async_trait::async_trait;

/// Network service that refuses every request.
///
/// Hits stay queued and downloads fall back to their caches.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNetworkService;

impl NoOpNetworkService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NetworkService for NoOpNetworkService {
    async fn connect(&self, _request: NetworkRequest) -> Result<NetworkResponse, NetworkError> {
        Err(NetworkError::Disabled)
    }
}
