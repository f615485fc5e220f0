//! Identity and session service.
//!
//! Access tokens are short-lived HS256 JWTs. Refresh tokens are longer-lived
//! JWTs signed with a separate secret; the one most recently issued is stored
//! on the user, so refreshing rotates it and logging out revokes it.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};
use wavytv_common::{AppError, AppResult, IdGenerator, config::AuthConfig};
use wavytv_db::{
    entities::user::{self, Preferences},
    repositories::UserRepository,
};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID.
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Unique per issue so every rotation yields a new token.
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A logged-in user with fresh tokens.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: user::Model,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Input for creating an account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(
        length(min = 3, max = 32),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
}

/// Input for logging in with a username or email.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[serde(alias = "username", alias = "email")]
    #[validate(length(min = 1, max = 256))]
    pub identifier: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("may contain letters, digits, '_' and '.' only".into()))
    }
}

/// Trim and lowercase a username or email.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    config: AuthConfig,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(user_repo: UserRepository, config: &AuthConfig) -> Self {
        Self {
            user_repo,
            config: config.clone(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        input.validate()?;

        let username = normalize(&input.username);
        let email = normalize(&input.email);

        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username),
            email: Set(email),
            password: Set(password),
            full_name: Set(input.full_name.trim().to_string()),
            avatar_url: Set(None),
            cover_image_url: Set(None),
            refresh_token: Set(None),
            about: Set(None),
            tags: Set(serde_json::json!([])),
            preferences: Set(Preferences::default()),
            is_creator: Set(false),
            search_history: Set(serde_json::json!([])),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, username = %user.username, "User signed up");
        Ok(user)
    }

    /// Verify credentials and start a session.
    pub async fn login(&self, input: LoginInput) -> AppResult<Session> {
        input.validate()?;

        let identifier = normalize(&input.identifier);
        let user = self
            .user_repo
            .find_by_login(&identifier)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        self.start_session(user).await
    }

    /// Exchange a valid refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<Session> {
        let claims = self.decode_refresh(refresh_token)?;
        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(AppError::Unauthorized);
        }

        self.start_session(user).await
    }

    /// Revoke the user's refresh token.
    pub async fn logout(&self, user: user::Model) -> AppResult<()> {
        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();
        active.refresh_token = Set(None);
        self.user_repo.update(active).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Resolve the user behind an access token.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<user::Model> {
        let claims = self.decode_access(access_token)?;
        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Issue a fresh token pair for `user`.
    pub fn issue_tokens(&self, user: &user::Model) -> AppResult<TokenPair> {
        let now = Utc::now().timestamp();

        let access = AccessClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.config.access_token_ttl_secs,
        };
        let refresh = RefreshClaims {
            sub: user.id.clone(),
            jti: self.id_gen.generate(),
            iat: now,
            exp: now + self.config.refresh_token_ttl_secs,
        };

        Ok(TokenPair {
            access_token: encode(
                &Header::default(),
                &access,
                &EncodingKey::from_secret(self.config.access_token_secret.as_bytes()),
            )
            .map_err(|e| AppError::Internal(format!("Failed to sign access token: {e}")))?,
            refresh_token: encode(
                &Header::default(),
                &refresh,
                &EncodingKey::from_secret(self.config.refresh_token_secret.as_bytes()),
            )
            .map_err(|e| AppError::Internal(format!("Failed to sign refresh token: {e}")))?,
        })
    }

    /// Verify an access token. Expiry maps to `TokenExpired`.
    pub fn decode_access(&self, token: &str) -> AppResult<AccessClaims> {
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.access_token_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    fn decode_refresh(&self, token: &str) -> AppResult<RefreshClaims> {
        let data = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.config.refresh_token_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    async fn start_session(&self, user: user::Model) -> AppResult<Session> {
        let tokens = self.issue_tokens(&user)?;

        let mut active: user::ActiveModel = user.into();
        active.refresh_token = Set(Some(tokens.refresh_token.clone()));
        let user = self.user_repo.update(active).await?;

        info!(user_id = %user.id, "Session started");
        Ok(Session { user, tokens })
    }
}

/// Hash a password with Argon2.
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{create_test_user, db_with, test_config};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> AuthService {
        AuthService::new(UserRepository::new(db_with(db)), &test_config().auth)
    }

    fn signup_input(username: &str) -> SignupInput {
        SignupInput {
            username: username.to_string(),
            email: "Alice@Example.com".to_string(),
            password: "correct horse".to_string(),
            full_name: "Alice".to_string(),
        }
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_access_token_round_trip() {
        let auth = service(MockDatabase::new(DatabaseBackend::Postgres));
        let user = create_test_user("u1", "alice");

        let tokens = auth.issue_tokens(&user).unwrap();
        let claims = auth.decode_access(&tokens.access_token).unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.username, "alice");
        assert_ne!(tokens.access_token, tokens.refresh_token);
    }

    #[test]
    fn test_expired_access_token_reported_distinctly() {
        let mut config = test_config().auth;
        config.access_token_ttl_secs = -600;
        let auth = AuthService::new(
            UserRepository::new(db_with(MockDatabase::new(DatabaseBackend::Postgres))),
            &config,
        );

        let tokens = auth.issue_tokens(&create_test_user("u1", "alice")).unwrap();
        let err = auth.decode_access(&tokens.access_token).unwrap_err();

        assert!(matches!(err, AppError::TokenExpired));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let auth = service(MockDatabase::new(DatabaseBackend::Postgres));
        let tokens = auth.issue_tokens(&create_test_user("u1", "alice")).unwrap();

        let err = auth.decode_access(&tokens.refresh_token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_username() {
        let auth = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]]),
        );

        let err = auth.signup(signup_input("Alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_signup_rejects_bad_username() {
        let auth = service(MockDatabase::new(DatabaseBackend::Postgres));

        let err = auth.signup(signup_input("bad name!")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_signup_normalizes_identity() {
        let auth = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[create_test_user("u1", "alice")]]),
        );

        let user = auth.signup(signup_input("  Alice ")).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let mut user = create_test_user("u1", "alice");
        user.password = hash_password("right-password").unwrap();

        let auth = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]));

        let err = auth
            .login(LoginInput {
                identifier: "alice".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_login_stores_refresh_token() {
        let mut user = create_test_user("u1", "alice");
        user.password = hash_password("right-password").unwrap();
        let mut updated = user.clone();
        updated.refresh_token = Some("stored".to_string());

        let auth = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[updated]]),
        );

        let session = auth
            .login(LoginInput {
                identifier: "ALICE@example.com".to_string(),
                password: "right-password".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.user.refresh_token.as_deref(), Some("stored"));
        assert!(!session.tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejects_rotated_token() {
        let auth = service(MockDatabase::new(DatabaseBackend::Postgres));
        let user = create_test_user("u1", "alice");
        let stale = auth.issue_tokens(&user).unwrap().refresh_token;

        let mut stored = user;
        stored.refresh_token = Some("a-newer-token".to_string());
        let auth = service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[stored]]));

        let err = auth.refresh(&stale).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
