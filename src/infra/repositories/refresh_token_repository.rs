//! Refresh token repository implementation.
//!
//! Rows act as an audit / anti-replay log and are never deleted;
//! revocation is the only mutation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect,
};

use super::entities::refresh_token::{self, ActiveModel, Entity as RefreshTokenEntity};
use crate::domain::RefreshToken;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Refresh token persistence contract consumed by the use cases.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a newly issued token record
    async fn save(&self, token: &RefreshToken) -> AppResult<RefreshToken>;

    /// Find a record by its raw token value
    async fn find_by_token(&self, raw: &str) -> AppResult<Option<RefreshToken>>;

    /// Find a record by its raw token value, locking the row
    /// (`SELECT ... FOR UPDATE`) for the rest of the transaction.
    /// Rotation relies on this for mutual exclusion; outside a
    /// transaction the lock has no effect.
    async fn find_by_token_for_update(&self, raw: &str) -> AppResult<Option<RefreshToken>>;

    /// Persist the current state of an existing record
    async fn update(&self, token: &RefreshToken) -> AppResult<()>;

    /// Best-effort revocation by raw token value.
    /// Unknown and already-revoked tokens are silently left alone.
    async fn revoke_by_token(&self, raw: &str) -> AppResult<()>;
}

pub(crate) async fn save<C: ConnectionTrait>(
    conn: &C,
    token: &RefreshToken,
) -> AppResult<RefreshToken> {
    let model = ActiveModel::from(token)
        .insert(conn)
        .await
        .map_err(AppError::from)?;
    RefreshToken::try_from(model)
}

pub(crate) async fn find_by_token<C: ConnectionTrait>(
    conn: &C,
    raw: &str,
    lock: bool,
) -> AppResult<Option<RefreshToken>> {
    let mut query = RefreshTokenEntity::find().filter(refresh_token::Column::Token.eq(raw));
    if lock {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await
        .map_err(AppError::from)?
        .map(RefreshToken::try_from)
        .transpose()
}

pub(crate) async fn update<C: ConnectionTrait>(conn: &C, token: &RefreshToken) -> AppResult<()> {
    ActiveModel::from(token)
        .update(conn)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

pub(crate) async fn revoke_by_token<C: ConnectionTrait>(conn: &C, raw: &str) -> AppResult<()> {
    RefreshTokenEntity::update_many()
        .col_expr(refresh_token::Column::RevokedAt, Expr::value(Utc::now()))
        .filter(refresh_token::Column::Token.eq(raw))
        .filter(refresh_token::Column::RevokedAt.is_null())
        .exec(conn)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

/// Concrete implementation of RefreshTokenRepository over a pooled connection
pub struct RefreshTokenStore {
    db: DatabaseConnection,
}

impl RefreshTokenStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for RefreshTokenStore {
    async fn save(&self, token: &RefreshToken) -> AppResult<RefreshToken> {
        save(&self.db, token).await
    }

    async fn find_by_token(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        find_by_token(&self.db, raw, false).await
    }

    async fn find_by_token_for_update(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        find_by_token(&self.db, raw, true).await
    }

    async fn update(&self, token: &RefreshToken) -> AppResult<()> {
        update(&self.db, token).await
    }

    async fn revoke_by_token(&self, raw: &str) -> AppResult<()> {
        revoke_by_token(&self.db, raw).await
    }
}
