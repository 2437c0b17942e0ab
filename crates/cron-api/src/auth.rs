//! Trigger authentication.
//!
//! The external scheduler presents the shared secret as a bearer token.
//! Comparison is constant-time so response timing leaks nothing about the
//! secret's prefix.

use axum::http::HeaderMap;

use crate::error::ApiError;

/// Check the `Authorization: Bearer <secret>` header against the
/// configured secret. Returns `Unauthorized` on any mismatch.
pub fn authorize(headers: &HeaderMap, secret: &str) -> Result<(), ApiError> {
    let presented = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    if constant_time_eq(presented.as_bytes(), secret.as_bytes()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
