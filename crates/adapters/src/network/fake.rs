// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake network service for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NetworkError, NetworkRequest, NetworkResponse, NetworkService};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Reply = Result<NetworkResponse, NetworkError>;

#[derive(Default)]
struct FakeState {
    scripted: HashMap<String, VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: Vec<NetworkRequest>,
}

/// Fake network service for testing
///
/// Replies are scripted per URL and consumed in order. The last scripted
/// reply for a URL keeps answering once the queue is down to one. URLs with
/// nothing scripted get the fallback, or a connection error.
#[derive(Clone, Default)]
pub struct FakeNetworkService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeNetworkService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `url`
    pub fn respond(&self, url: &str, response: NetworkResponse) {
        self.push(url, Ok(response));
    }

    /// Queue a failure for `url`
    pub fn fail(&self, url: &str, error: NetworkError) {
        self.push(url, Err(error));
    }

    /// Reply used for any URL without a script
    pub fn set_fallback(&self, reply: Result<NetworkResponse, NetworkError>) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fallback = Some(reply);
    }

    fn push(&self, url: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .scripted
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Get all recorded requests
    pub fn calls(&self) -> Vec<NetworkRequest> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Recorded requests for one URL
    pub fn calls_to(&self, url: &str) -> Vec<NetworkRequest> {
        self.calls().into_iter().filter(|c| c.url == url).collect()
    }
}

#[async_trait]
impl NetworkService for FakeNetworkService {
    async fn connect(&self, request: NetworkRequest) -> Result<NetworkResponse, NetworkError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(request.clone());

        if let Some(queue) = state.scripted.get_mut(&request.url) {
            let reply = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(reply) = reply {
                return reply;
            }
        }
        state
            .fallback
            .clone()
            .unwrap_or_else(|| Err(NetworkError::Connection(format!("no reply for {}", request.url))))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
