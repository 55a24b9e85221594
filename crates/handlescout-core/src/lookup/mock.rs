//! Mock profile lookup for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{LookupError, ProfileLookup, ProfileSignals};
use crate::text::normalize_identifier;

/// A configurable mock response for [`MockLookup`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a resolved account.
    Found(ProfileSignals),
    /// Simulate an account that does not exist.
    Missing,
    /// Simulate a collaborator failure.
    Error(LookupError),
}

/// A hand-rolled mock implementing [`ProfileLookup`] for tests.
///
/// Identifiers without a configured response resolve to
/// [`MockResponse::Missing`]. Every call is recorded in order.
pub struct MockLookup {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl Default for MockLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLookup {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Register a response for `identifier`.
    pub fn with(mut self, identifier: &str, response: MockResponse) -> Self {
        self.responses
            .insert(normalize_identifier(identifier), response);
        self
    }

    /// Shorthand for an existing account with the given popularity and text.
    pub fn with_profile(self, identifier: &str, popularity: u64, text: Option<&str>) -> Self {
        self.with(
            identifier,
            MockResponse::Found(ProfileSignals {
                exists: true,
                popularity,
                verified: false,
                text: text.map(str::to_string),
            }),
        )
    }

    /// How many times `lookup()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Identifiers looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ProfileLookup for MockLookup {
    fn name(&self) -> &str {
        "mock"
    }

    fn lookup(&self, identifier: &str) -> Result<ProfileSignals, LookupError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(identifier.to_string());
        }

        match self.responses.get(&normalize_identifier(identifier)) {
            Some(MockResponse::Found(signals)) => Ok(signals.clone()),
            Some(MockResponse::Error(err)) => Err(err.clone()),
            Some(MockResponse::Missing) | None => Ok(ProfileSignals::missing()),
        }
    }
}
