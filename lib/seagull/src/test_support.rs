//! Transport double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use crate::{HttpClient, Request, Response, Result};

/// Records every request and answers each with the same canned response.
pub struct Recording {
    requests: Mutex<Vec<Request>>,
    status: u16,
    body: &'static str,
}

impl Recording {
    pub fn answering(status: u16, body: &'static str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            status,
            body,
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for Recording {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.requests.lock().expect("requests lock").push(request);
        Ok(Response::new(
            self.status,
            HashMap::new(),
            Bytes::from_static(self.body.as_bytes()),
        ))
    }
}
