/// Security primitives for social-api
///
/// - **password**: Argon2id password hashing
/// - Token issuance and verification live in `crypto-core` (HS256)
pub mod password;

pub use password::{hash_password, verify_password};
