use alloy::transports::TransportError;

pub trait RpcErrorExt {
    /// Returns whether the node understood the request and rejected it with
    /// a JSON-RPC error response (nonce too low, underpriced, reverted, ...).
    /// Everything else means no usable answer came back from the node.
    fn is_node_rejection(&self) -> bool;

    /// The message the node attached to its error response, if any.
    fn node_message(&self) -> Option<&str>;
}

impl RpcErrorExt for TransportError {
    fn is_node_rejection(&self) -> bool {
        self.as_error_resp().is_some()
    }

    fn node_message(&self) -> Option<&str> {
        self.as_error_resp().map(|payload| payload.message.as_ref())
    }
}

/// Create an arbitrary alloy error that will be classified as a node
/// rejection. Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_node_rejection(message: &'static str) -> TransportError {
    TransportError::ErrorResp(alloy::rpc::json_rpc::ErrorPayload {
        code: -32000,
        message: message.into(),
        data: None,
    })
}

/// Create an arbitrary alloy error that will be classified as a connection
/// error. Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_connection_error() -> TransportError {
    alloy::transports::TransportErrorKind::backend_gone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_connection_errors() {
        assert!(!testing_connection_error().is_node_rejection());
        assert_eq!(testing_connection_error().node_message(), None);
    }

    #[test]
    fn classifies_node_rejections() {
        let err = testing_node_rejection("nonce too low");
        assert!(err.is_node_rejection());
        assert_eq!(err.node_message(), Some("nonce too low"));
    }
}
