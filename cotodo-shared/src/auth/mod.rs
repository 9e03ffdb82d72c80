/// Authentication primitives
///
/// - `jwt`: Session-token creation and validation
/// - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;
