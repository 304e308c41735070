use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ACCESS_TOKEN_TYPE: &str = "access";

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

pub struct JwtUtils;

impl JwtUtils {
    // 生成 Access Token
    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = &AppConfig::get().jwt;
        Self::generate_token_with_secret(
            user_id,
            role,
            chrono::Duration::minutes(config.access_token_expiry),
            &config.secret,
        )
    }

    pub fn generate_token_with_secret(
        user_id: i64,
        role: &str,
        expiry_duration: chrono::Duration,
        secret: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_with_secret(token, &AppConfig::get().jwt.secret)
    }

    pub fn verify_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let claims = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)?;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }

    /// 访问令牌有效期（秒）
    pub fn access_token_ttl_secs() -> i64 {
        AppConfig::get().jwt.access_token_expiry * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-for-lesson-hub";

    #[test]
    fn test_round_trip_claims() {
        let token =
            JwtUtils::generate_token_with_secret(7, "teacher", chrono::Duration::minutes(5), SECRET)
                .unwrap();
        let claims = JwtUtils::verify_with_secret(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token =
            JwtUtils::generate_token_with_secret(1, "admin", chrono::Duration::minutes(5), SECRET)
                .unwrap();
        assert!(JwtUtils::verify_with_secret(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token =
            JwtUtils::generate_token_with_secret(1, "admin", chrono::Duration::hours(-2), SECRET)
                .unwrap();
        assert!(JwtUtils::verify_with_secret(&token, SECRET).is_err());
    }
}
