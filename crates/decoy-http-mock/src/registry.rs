//! Ordered rule storage and the call log.

use crate::error::TransportError;
use crate::request::Request;
use crate::response::Response;
use crate::rule::Rule;

/// What came back from one intercepted call.
#[derive(Debug, Clone)]
pub enum Outcome {
    Response(Response),
    Error(TransportError),
}

impl Outcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Response(response) => Some(response),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Outcome::Response(_) => None,
            Outcome::Error(err) => Some(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

/// Immutable record of one intercepted request and its outcome. Every
/// intercepted call appends exactly one of these, matched or not.
#[derive(Debug, Clone)]
pub struct Call {
    pub request: Request,
    pub outcome: Outcome,
}

/// Insertion order is matching priority; append-only until reset.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    rules: Vec<Rule>,
    calls: Vec<Call>,
}

impl Registry {
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn record(&mut self, request: Request, outcome: Outcome) {
        self.calls.push(Call { request, outcome });
    }

    /// Clears rules and call log together.
    pub fn reset(&mut self) {
        self.rules.clear();
        self.calls.clear();
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }
}
