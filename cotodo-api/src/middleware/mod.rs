/// HTTP middleware
///
/// - `security`: Adds security-related response headers

pub mod security;
