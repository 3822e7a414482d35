//! Photo Exporter - Request Validation
//!
//! Pulls the PNG payload out of an incoming call.

use crate::channel::{MethodCall, MethodValue};
use crate::config::Messages;
use crate::error::ExportError;

/// Argument key carrying the image bytes
pub const BYTES_ARGUMENT: &str = "bytes";

/// Why a call was not accepted
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Unknown method: protocol mismatch, answered with the bridge sentinel
    NotImplemented,
    /// Known method with a malformed payload
    Invalid(ExportError),
}

/// Validate a call and return its byte payload.
///
/// No side effects besides building the rejection.
pub fn validate(mut call: MethodCall, method_name: &str, messages: &Messages) -> Result<Vec<u8>, Rejection> {
    if call.method != method_name {
        return Err(Rejection::NotImplemented);
    }

    match call.take_argument(BYTES_ARGUMENT) {
        Some(MethodValue::Bytes(bytes)) => Ok(bytes),
        _ => Err(Rejection::Invalid(ExportError::InvalidArguments {
            message: messages.invalid_arguments.clone(),
        })),
    }
}
