//! The boundary to the component that actually talks HTTP.
//!
//! Connection handling, TLS, pooling, peer discovery, retries and timeouts
//! all live behind [`Transport`]. The engine hands over a finished
//! [`EndpointRequest`] and expects an [`EndpointResponse`] or a
//! [`TransportError`] back.

use crate::{error::TransportError, request::EndpointRequest, response::EndpointResponse};

/// Sends finished requests.
///
/// Implementations must not retain the request after `send` returns. A
/// non-success status may be reported either as a response or as
/// [`TransportError::status`]; the executor's status policy handles the
/// former.
///
/// Any `Fn(&EndpointRequest) -> Result<EndpointResponse, TransportError>`
/// closure is a transport.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use restframe::{
///     error::TransportError,
///     request::EndpointRequest,
///     response::EndpointResponse,
///     transport::Transport,
/// };
///
/// fn always_ok(_: &EndpointRequest) -> Result<EndpointResponse, TransportError> {
///     Ok(EndpointResponse::new(StatusCode::NO_CONTENT))
/// }
///
/// fn assert_transport<T: Transport>(_: &T) {}
/// assert_transport(&always_ok);
/// ```
pub trait Transport: Send + Sync {
    /// Send `request` and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request could not be completed.
    fn send(&self, request: &EndpointRequest) -> Result<EndpointResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&EndpointRequest) -> Result<EndpointResponse, TransportError> + Send + Sync,
{
    fn send(&self, request: &EndpointRequest) -> Result<EndpointResponse, TransportError> { self(request) }
}
