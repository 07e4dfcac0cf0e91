use crate::config::Config;
use crate::error::AppResult;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims emitidos por el servicio de identidad externo con el mismo
/// JWT_SECRET. Este backend solo los verifica, nunca los emite.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
}

pub struct AuthService {
    config: Config,
}

impl AuthService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn test_config(secret: &str) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: secret.to_string(),
            db_max_connections: 1,
        }
    }

    fn make_token(secret: &str, is_staff: bool, ttl_seconds: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: "42".to_string(),
            email: "ana@example.com".to_string(),
            is_staff,
            is_superuser: false,
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_token_roundtrip() {
        let service = AuthService::new(test_config("secreto"));
        let token = make_token("secreto", true, 3600);

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.is_staff);
        assert!(!claims.is_superuser);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let service = AuthService::new(test_config("secreto"));
        let token = make_token("otro-secreto", false, 3600);

        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_verify_token_expired() {
        let service = AuthService::new(test_config("secreto"));
        let token = make_token("secreto", false, -3600);

        assert!(service.verify_token(&token).is_err());
    }
}
