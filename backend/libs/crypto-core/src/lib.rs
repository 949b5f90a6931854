/// Shared cryptographic helpers for the social-api backend
///
/// - `jwt`: HS256 access-token issuance and verification
/// - `secret`: strength classification for symmetric signing secrets
pub mod jwt;
pub mod secret;

pub use jwt::{Claims, JwtError, JwtKeys};
pub use secret::{secret_strength, SecretStrength};
