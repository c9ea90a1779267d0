use std::{
    collections::VecDeque,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use restframe::{
    error::{TransportError, TransportErrorKind},
    request::EndpointRequest,
    response::EndpointResponse,
    transport::Transport,
};

type Scripted = Result<EndpointResponse, TransportError>;

#[derive(Default)]
struct StubState {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<EndpointResponse>>,
    requests: Mutex<Vec<EndpointRequest>>,
    dispatches: AtomicUsize,
}

/// Transport replaying scripted outcomes in order.
///
/// Clones share the script and the request log, so a test can hand one
/// clone to the executor and inspect another. Once the script runs out the
/// fallback response is returned; without one the call fails.
#[derive(Clone, Default)]
pub struct StubTransport {
    state: Arc<StubState>,
}

impl StubTransport {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Queue `response` as the next outcome.
    ///
    /// # Panics
    ///
    /// Panics if the script lock is poisoned.
    #[must_use]
    pub fn respond(self, response: EndpointResponse) -> Self {
        self.state.script.lock().expect("script lock").push_back(Ok(response));
        self
    }

    /// Queue `error` as the next outcome.
    ///
    /// # Panics
    ///
    /// Panics if the script lock is poisoned.
    #[must_use]
    pub fn fail(self, error: TransportError) -> Self {
        self.state.script.lock().expect("script lock").push_back(Err(error));
        self
    }

    /// Answer with `response` once the script is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if the fallback lock is poisoned.
    #[must_use]
    pub fn fallback(self, response: EndpointResponse) -> Self {
        *self.state.fallback.lock().expect("fallback lock") = Some(response);
        self
    }

    /// Number of requests handed to this transport.
    #[must_use]
    pub fn dispatches(&self) -> usize { self.state.dispatches.load(Ordering::SeqCst) }

    /// Every request seen so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<EndpointRequest> { self.state.requests.lock().expect("request log").clone() }

    /// # Panics
    ///
    /// Panics if the request log lock is poisoned.
    #[must_use]
    pub fn last_request(&self) -> Option<EndpointRequest> {
        self.state.requests.lock().expect("request log").last().cloned()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &EndpointRequest) -> Result<EndpointResponse, TransportError> {
        self.state.dispatches.fetch_add(1, Ordering::SeqCst);
        self.state
            .requests
            .lock()
            .expect("request log")
            .push(request.clone());
        let scripted = self.state.script.lock().expect("script lock").pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => self
                .state
                .fallback
                .lock()
                .expect("fallback lock")
                .clone()
                .ok_or_else(|| TransportError::new(TransportErrorKind::Other, "stub transport script exhausted")),
        }
    }
}

/// Transport failing every request with the same error.
#[derive(Clone)]
pub struct FailingTransport {
    error: TransportError,
    attempts: Arc<AtomicUsize>,
}

impl FailingTransport {
    #[must_use]
    pub fn new(error: TransportError) -> Self {
        Self {
            error,
            attempts: Arc::default(),
        }
    }

    /// Transport whose every request times out.
    #[must_use]
    pub fn timeout() -> Self { Self::new(TransportError::timeout("stub timeout")) }

    #[must_use]
    pub fn attempts(&self) -> usize { self.attempts.load(Ordering::SeqCst) }
}

impl Transport for FailingTransport {
    fn send(&self, _request: &EndpointRequest) -> Result<EndpointResponse, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}
