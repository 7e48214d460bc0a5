/// Split a granted-scope string. GitHub separates scopes with commas, RFC 6749 with
/// spaces; both are accepted.
pub fn split_scopes(granted: &str) -> Vec<&str> {
    granted
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Requested scopes that the provider did not grant.
pub fn missing_scopes<'a>(requested: &'a [String], granted: &str) -> Vec<&'a str> {
    let granted_scopes = split_scopes(granted);

    requested
        .iter()
        .map(String::as_str)
        .filter(|s| !granted_scopes.contains(s))
        .collect()
}
