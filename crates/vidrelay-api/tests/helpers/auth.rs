use super::JWT_SECRET;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;
use vidrelay_api::auth::JwtClaims;

/// A user with a freshly minted bearer token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            token: mint_token(id, 3600),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Sign an HS256 token for `sub` that expires `ttl_seconds` from now (negative for expired).
pub fn mint_token(sub: Uuid, ttl_seconds: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub,
        iat: now,
        exp: now + ttl_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}
