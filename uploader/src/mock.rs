use crate::{Response, Transport, TransportError};
use std::{cell::RefCell, collections::VecDeque, time::Duration};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport answering from a script instead of the network.
///
/// Once the script runs out every request gets `200 "1"`.
#[derive(Default)]
pub struct MockTransport {
    script: RefCell<VecDeque<Result<Response, TransportError>>>,
    requests: RefCell<Vec<Request>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<Response, TransportError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        self.requests.borrow_mut().push(Request {
            url: url.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            timeout,
        });

        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::new(200, "1")))
    }
}
