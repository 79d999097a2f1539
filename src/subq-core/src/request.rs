//! Supersession of in-flight enumeration requests
//!
//! The values an enumeration consumes arrive asynchronously from an external
//! service. When the user picks another column before a response lands, the
//! older response must not reach the registry. A [`RequestTracker`] hands
//! out numbered tokens; only the newest token's successful result is
//! accepted. Cancellation is advisory: nothing is aborted, stale results are
//! simply dropped.

use std::fmt::Display;

/// Handle identifying one issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    generation: u64,
    subject: String,
}

impl RequestToken {
    /// What the request was issued for, e.g. a column name
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Sequence number of the request
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Issues request tokens and filters out superseded responses
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    /// Create a tracker with no request issued
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier one
    pub fn begin(&mut self, subject: impl Into<String>) -> RequestToken {
        self.latest += 1;
        let token = RequestToken {
            generation: self.latest,
            subject: subject.into(),
        };
        log::debug!(
            "request {} issued for '{}'",
            token.generation,
            token.subject
        );
        token
    }

    /// Whether `token` belongs to the newest request
    pub fn is_current(&self, token: &RequestToken) -> bool {
        token.generation == self.latest
    }

    /// Keep a response only if it is current and successful
    ///
    /// A failed request counts as having produced nothing.
    pub fn accept<T, E: Display>(
        &self,
        token: &RequestToken,
        response: Result<T, E>,
    ) -> Option<T> {
        if !self.is_current(token) {
            log::warn!(
                "discarding stale response {} for '{}' (latest is {})",
                token.generation,
                token.subject,
                self.latest
            );
            return None;
        }
        match response {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("request for '{}' failed: {}", token.subject, e);
                None
            }
        }
    }
}
