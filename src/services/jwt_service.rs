use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::models::user::{AuthenticatedUser, JwtClaims, UserRole};

/// Configuración JWT
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_duration: Duration,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::hours(expiration_hours),
        }
    }
}

/// Servicio JWT
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        let config = JwtConfig::new(secret, expiration_hours);
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn access_token_duration(&self) -> Duration {
        self.config.access_token_duration
    }

    /// Genera un token de acceso
    pub fn generate_access_token(&self, user: &AuthenticatedUser) -> Result<String, String> {
        let now = Utc::now();
        let exp = now + self.config.access_token_duration;

        let claims = JwtClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| format!("Error generating access token: {}", e))
    }

    /// Valida y decodifica un token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, String> {
        let validation = Validation::new(self.config.algorithm);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid token: {}", e))
    }

    /// Reconstruye la identidad autenticada desde los claims
    pub fn get_user(&self, token: &str) -> Result<AuthenticatedUser, String> {
        let claims = self.validate_token(token)?;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| "Invalid user id in token".to_string())?;
        let role = UserRole::from_str(&claims.role)
            .ok_or_else(|| "Invalid role in token".to_string())?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("test-secret".to_string(), 24)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt_service = test_service();

        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "ana@vancontrol.app".to_string(),
            role: UserRole::Passenger,
        };

        let token = jwt_service.generate_access_token(&user).unwrap();
        assert!(!token.is_empty());

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ana@vancontrol.app");
        assert_eq!(claims.role, "passenger");

        let decoded = jwt_service.get_user(&token).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let jwt_service = test_service();
        assert!(jwt_service.validate_token("not-a-token").is_err());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "ana@vancontrol.app".to_string(),
            role: UserRole::Driver,
        };
        let token = JwtService::new("other-secret".to_string(), 24)
            .generate_access_token(&user)
            .unwrap();

        assert!(test_service().validate_token(&token).is_err());
    }
}
