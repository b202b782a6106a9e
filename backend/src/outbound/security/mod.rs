//! Credential adapters: password hashing and signed tokens.

mod argon2_hasher;
mod jwt_codec;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_codec::{
    EMAIL_VERIFICATION_TTL_DAYS, JwtCodec, JwtConfigError, JwtSettings, parse_hmac_algorithm,
};
