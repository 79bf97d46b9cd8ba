/// Compare two keys without short-circuiting on the first differing byte
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check a request's `api_key` against the configured admin key.
///
/// With no admin key configured every request is accepted.
pub fn authorize(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (expected, provided) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(expected), Some(provided)) => keys_match(provided, expected),
    }
}
