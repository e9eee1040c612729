//! User repository implementation.
//!
//! Queries are written once, generic over the connection, so the
//! plain store and the transaction-bound store behave identically.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{Email, User, UserId};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User persistence contract consumed by the use cases.
///
/// The authentication core creates and reads users; it never updates
/// or deletes them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    async fn save(&self, user: &User) -> AppResult<User>;

    /// Check whether a user with this email exists
    async fn exists_by_email(&self, email: &Email) -> AppResult<bool>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;
}

pub(crate) async fn save<C: ConnectionTrait>(conn: &C, user: &User) -> AppResult<User> {
    let model = ActiveModel::from(user)
        .insert(conn)
        .await
        .map_err(AppError::from)?;
    User::try_from(model)
}

pub(crate) async fn exists_by_email<C: ConnectionTrait>(conn: &C, email: &Email) -> AppResult<bool> {
    let found = UserEntity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(conn)
        .await
        .map_err(AppError::from)?;
    Ok(found.is_some())
}

pub(crate) async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &Email,
) -> AppResult<Option<User>> {
    UserEntity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(conn)
        .await
        .map_err(AppError::from)?
        .map(User::try_from)
        .transpose()
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(conn: &C, id: &UserId) -> AppResult<Option<User>> {
    UserEntity::find_by_id(id.as_uuid())
        .one(conn)
        .await
        .map_err(AppError::from)?
        .map(User::try_from)
        .transpose()
}

/// Concrete implementation of UserRepository over a pooled connection
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn save(&self, user: &User) -> AppResult<User> {
        save(&self.db, user).await
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        exists_by_email(&self.db, email).await
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        find_by_email(&self.db, email).await
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        find_by_id(&self.db, id).await
    }
}
