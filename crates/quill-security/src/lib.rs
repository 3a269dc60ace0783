//! # Quill Security
//! 
//! Security primitives: signed access tokens and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{IssuedToken, JwtError, TokenClaims, TokenCodec};
pub use password::{PasswordError, PasswordService};
