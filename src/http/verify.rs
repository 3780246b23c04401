use crate::domain::{Assertions, Response};
use crate::error::VerificationError;

/// Checks a response against an assertion set.
///
/// Order is status, body fragment, then headers; the first failing check is
/// reported. Each expected header value must appear somewhere among the
/// response's values for that key.
///
/// # Errors
///
/// Returns the first failed check.
pub fn verify(response: &Response, assertions: &Assertions) -> Result<(), VerificationError> {
    if assertions.status != 0 && response.status != assertions.status {
        return Err(VerificationError::StatusMismatch {
            expected: assertions.status,
            actual: response.status,
        });
    }

    if !assertions.body_contains.is_empty()
        && !contains_bytes(&response.body, assertions.body_contains.as_bytes())
    {
        return Err(VerificationError::BodyMissing {
            fragment: assertions.body_contains.clone(),
        });
    }

    for (key, expected) in &assertions.headers {
        let Some(actual) = response.headers.get(key) else {
            return Err(VerificationError::HeaderMissing { key: key.clone() });
        };
        if actual.is_empty() {
            return Err(VerificationError::HeaderEmpty { key: key.clone() });
        }
        if let Some(missing) = expected.iter().find(|value| !actual.contains(value)) {
            return Err(VerificationError::HeaderValueMissing {
                key: key.clone(),
                value: missing.clone(),
            });
        }
    }

    Ok(())
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
