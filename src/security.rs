use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing API keys and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Why a request failed bearer authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("invalid Authorization header")]
    Malformed,
    #[error("invalid token")]
    InvalidToken,
}

/// Check an `Authorization` header value against the expected API key.
///
/// `header` is `None` when the request carried no header, `Some(Err(..))` when
/// it was not valid text.
pub fn verify_bearer<E>(header: Option<Result<&str, E>>, expected: &str) -> Result<(), AuthError> {
    let value = header.ok_or(AuthError::Missing)?.map_err(|_| AuthError::Malformed)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_compare(token, expected) => Ok(()),
        _ => Err(AuthError::InvalidToken),
    }
}
