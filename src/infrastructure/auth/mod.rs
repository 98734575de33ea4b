mod jwt_token_verifier;

pub use jwt_token_verifier::{JwtTokenVerifier, SessionClaims};
