use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::types::Claims;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiration: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            expiration,
        }
    }

    /// Issue a session token for the user; role codes keep their given order.
    pub fn generate_token(
        &self,
        user_id: i32,
        username: &str,
        role_codes: &[String],
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + self.expiration;

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            roles: role_codes.to_vec(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub fn validate(&self, token: &str) -> bool {
        self.verify_token(token).is_ok()
    }

    pub fn user_id(&self, token: &str) -> Result<i32, TokenError> {
        self.verify_token(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|code| code.to_string()).collect()
    }

    #[test]
    fn fresh_token_round_trips_user_id_and_roles() {
        let jwt = JwtService::new("secret", Duration::hours(1));
        let token = jwt.generate_token(42, "alice", &roles(&["editor", "admin"])).unwrap();

        assert!(jwt.validate(&token));
        assert_eq!(jwt.user_id(&token).unwrap(), 42);

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, vec!["editor", "admin"]);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new("secret", Duration::minutes(-5));
        let token = jwt.generate_token(7, "bob", &[]).unwrap();

        assert!(!jwt.validate(&token));
        assert!(matches!(jwt.user_id(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let ours = JwtService::new("secret", Duration::hours(1));
        let theirs = JwtService::new("not-our-secret", Duration::hours(1));
        let forged = theirs.generate_token(1, "root", &roles(&["admin"])).unwrap();

        assert!(!ours.validate(&forged));
        assert!(ours.user_id(&forged).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let jwt = JwtService::new("secret", Duration::hours(1));
        let genuine = jwt.generate_token(5, "carol", &[]).unwrap();
        let other = jwt.generate_token(6, "mallory", &roles(&["admin"])).unwrap();

        // Splice mallory's payload onto carol's signature.
        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", genuine_parts[0], other_parts[1], genuine_parts[2]);

        assert!(!jwt.validate(&spliced));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = JwtService::new("secret", Duration::hours(1));
        assert!(!jwt.validate(""));
        assert!(!jwt.validate("not-a-token"));
        assert!(jwt.user_id("a.b.c").is_err());
    }
}
