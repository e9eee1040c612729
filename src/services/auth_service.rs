//! Authentication service - registration, login, rotation and logout.
//!
//! SOLID (SRP): Session lifecycle concerns only.
//! DDD: Orchestrates domain objects via the Unit of Work; each
//! operation is one transactional use case.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_MINUTE, TOKEN_TYPE_ACCESS, TOKEN_TYPE_BEARER, TOKEN_TYPE_REFRESH};
use crate::domain::{Email, NewUser, RefreshToken, User, UserId, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::services::{Claims, IssuedTokens, PasswordHasher, TokenService};

/// Token pair returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Refresh token, exchanged for a new pair at /auth/refresh
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token expiration time in seconds
    #[schema(example = 900)]
    pub expires_in: i64,
}

impl TokenResponse {
    fn from_issued(issued: IssuedTokens, expires_in: i64) -> Self {
        Self {
            access_token: issued.access_token.into_string(),
            refresh_token: issued.refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
        }
    }
}

/// Registration result: the public user plus its initial session
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and open its first session
    async fn register(&self, input: NewUser) -> AppResult<AuthResponse>;

    /// Login and return a fresh token pair
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Rotate a refresh token: revoke it and issue a new pair
    async fn refresh(&self, raw_token: String) -> AppResult<TokenResponse>;

    /// Revoke a refresh token (idempotent, silent for unknown tokens)
    async fn logout(&self, raw_token: String) -> AppResult<()>;

    /// Verify an access token and extract its claims
    fn verify_access_token(&self, raw: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance
    pub fn new(
        uow: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        config: Config,
    ) -> Self {
        Self {
            uow,
            hasher,
            tokens,
            config,
        }
    }

    fn access_token_lifetime_seconds(&self) -> i64 {
        self.config.access_token_ttl_minutes * SECONDS_PER_MINUTE
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: NewUser) -> AppResult<AuthResponse> {
        // Value objects validate before any database work
        let email = Email::new(&input.email)?;
        let role = UserRole::parse(&input.role)?;

        let hasher = self.hasher.clone();
        let tokens = self.tokens.clone();
        let expires_in = self.access_token_lifetime_seconds();

        // The user row and its initial session are created atomically:
        // either both exist afterwards, or neither does.
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    if ctx.users().exists_by_email(&email).await? {
                        return Err(AppError::UserAlreadyExists);
                    }

                    let password_hash = hasher.hash(&input.password)?;
                    let user = User::new(
                        UserId::generate(),
                        email,
                        password_hash,
                        input.first_name,
                        input.last_name,
                        role,
                    );
                    let user = ctx.users().save(&user).await?;

                    let issued = tokens.issue(&user)?;
                    let record = RefreshToken::issue(
                        issued.refresh_token_id,
                        issued.refresh_token.clone(),
                        user.id,
                    );
                    ctx.refresh_tokens().save(&record).await?;

                    Ok(AuthResponse {
                        user: UserResponse::from(user),
                        tokens: TokenResponse::from_issued(issued, expires_in),
                    })
                })
            })
            .await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = Email::new(&email)?;

        let hasher = self.hasher.clone();
        let tokens = self.tokens.clone();
        let expires_in = self.access_token_lifetime_seconds();

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().find_by_email(&email).await?;

                    // SECURITY: the hash comparison runs even when no user
                    // matched (the hasher substitutes a dummy hash), so
                    // "unknown email" and "wrong password" consume
                    // indistinguishable time.
                    let password_valid =
                        hasher.verify(&password, user.as_ref().map(|u| &u.password_hash));

                    // A single undifferentiated error for both causes.
                    match user {
                        Some(user) if password_valid => {
                            let issued = tokens.issue(&user)?;
                            let record = RefreshToken::issue(
                                issued.refresh_token_id,
                                issued.refresh_token.clone(),
                                user.id,
                            );
                            ctx.refresh_tokens().save(&record).await?;

                            Ok(TokenResponse::from_issued(issued, expires_in))
                        }
                        _ => Err(AppError::InvalidEmailOrPassword),
                    }
                })
            })
            .await
    }

    async fn refresh(&self, raw_token: String) -> AppResult<TokenResponse> {
        // Cryptographic verification happens before any database work.
        let claims = self.tokens.verify_refresh(&raw_token)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(AppError::InvalidRefreshToken);
        }

        let tokens = self.tokens.clone();
        let expires_in = self.access_token_lifetime_seconds();

        // Serializable isolation plus a row lock on the token record:
        // of two concurrent rotations of the same token, at most one
        // observes it unrevoked.
        self.uow
            .transaction_serializable(move |ctx| {
                Box::pin(async move {
                    let record = ctx
                        .refresh_tokens()
                        .find_by_token_for_update(&raw_token)
                        .await?;

                    // An unknown token and an already-rotated one are
                    // indistinguishable on purpose: replay of a stolen
                    // token after legitimate rotation lands here.
                    let Some(mut record) = record else {
                        return Err(AppError::RefreshTokenRevoked);
                    };
                    if record.is_revoked() {
                        return Err(AppError::RefreshTokenRevoked);
                    }

                    record.revoke();
                    ctx.refresh_tokens().update(&record).await?;

                    let user = ctx
                        .users()
                        .find_by_id(&record.user_id)
                        .await?
                        .ok_or(AppError::InvalidRefreshToken)?;

                    let issued = tokens.issue(&user)?;
                    let replacement = RefreshToken::issue(
                        issued.refresh_token_id,
                        issued.refresh_token.clone(),
                        user.id,
                    );
                    ctx.refresh_tokens().save(&replacement).await?;

                    Ok(TokenResponse::from_issued(issued, expires_in))
                })
            })
            .await
    }

    async fn logout(&self, raw_token: String) -> AppResult<()> {
        // Single best-effort write, no transaction needed. Revoking an
        // unknown or already-revoked token succeeds silently.
        self.uow.refresh_tokens().revoke_by_token(&raw_token).await
    }

    fn verify_access_token(&self, raw: &str) -> AppResult<Claims> {
        let claims = self.tokens.verify_access(raw)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}
