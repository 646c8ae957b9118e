//! Administrator authentication: Argon2id password hashes, HS256 bearer
//! tokens, and the axum extractors that guard the admin routes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::{NewUser, User};
use crate::db::store::Store;
use crate::errors::{AppError, AppResult};
use crate::utils::config::{AdminSeed, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder.
    pub sub: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Other(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

pub fn create_access_token(username: &str, secret: &str, expire_minutes: i64) -> AppResult<String> {
    let exp = (Utc::now() + Duration::minutes(expire_minutes)).timestamp().max(0) as usize;
    let claims = Claims {
        sub: username.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Other(format!("Failed to sign token: {}", e)))
}

/// Returns the username carried by a valid, unexpired token.
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<String> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        AppError::Unauthorized("Could not validate credentials".to_string())
    })?;

    Ok(token_data.claims.sub)
}

/// Creates the seeded administrator unless the username is already taken.
pub async fn ensure_admin(store: &dyn Store, seed: &AdminSeed) -> AppResult<()> {
    if store.get_user_by_username(&seed.username).await?.is_some() {
        tracing::info!("Admin user '{}' already exists", seed.username);
        return Ok(());
    }

    store
        .create_user(NewUser {
            username: seed.username.clone(),
            email: seed.email.clone(),
            hashed_password: hash_password(&seed.password)?,
            is_admin: true,
        })
        .await?;

    tracing::info!("✅ Admin user '{}' created", seed.username);
    Ok(())
}

/// Any active user holding a valid bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// An active administrator holding a valid bearer token.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Not authenticated".to_string()))?;

        let username = decode_access_token(bearer.token(), &state.config.secret_key)?;

        let user = state
            .store
            .get_user_by_username(&username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

        if !user.is_active {
            return Err(AppError::Forbidden("Inactive user".to_string()));
        }

        Ok(CurrentUser(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            tracing::warn!("User '{}' attempted an admin operation", user.username);
            return Err(AppError::Forbidden("Administrator privileges required".to_string()));
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("comman2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("comman2024", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("comman2024", "not-a-hash"));
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let first = hash_password("comman2024").unwrap();
        let second = hash_password("comman2024").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("comman2024", &second));
    }

    #[test]
    fn token_carries_username() {
        let token = create_access_token("admin", "secret", 30).unwrap();
        assert_eq!(decode_access_token(&token, "secret").unwrap(), "admin");
        assert!(matches!(
            decode_access_token(&token, "other-secret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_access_token("admin", "secret", -10).unwrap();
        assert!(decode_access_token(&token, "secret").is_err());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let store = MemoryStore::new();
        let seed = AdminSeed {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "pw".into(),
        };

        ensure_admin(&store, &seed).await.unwrap();
        ensure_admin(&store, &seed).await.unwrap();

        let admin = store.get_user_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_admin);
        assert!(store.get_user_by_email("admin@example.com").await.unwrap().is_some());
    }
}
