use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{model::user::User, models::Claims};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

pub fn generate_access_token(user: &User, secret: &str, ttl: usize) -> Result<String, Error> {
    let claims = Claims {
        user_id: user.id,
        sub: user.username.clone(),
        name: user.name.clone(),
        role: user.role.id(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn teacher() -> User {
        User {
            id: 7,
            name: "Siti Rahma".into(),
            email: None,
            username: "siti".into(),
            password_hash: String::new(),
            role: Role::Teacher,
            subject: Some("IPA".into()),
            active: true,
        }
    }

    #[test]
    fn token_carries_identity() {
        let token = generate_access_token(&teacher(), "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "siti");
        assert_eq!(claims.name, "Siti Rahma");
        assert_eq!(Role::from_id(claims.role), Some(Role::Teacher));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(&teacher(), "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }
}
