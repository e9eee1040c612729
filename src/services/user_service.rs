//! User service - current-user lookup for authenticated requests.
//!
//! The authentication core never mutates users after registration, so
//! this service is read-only by design.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{User, UserId};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user by ID
    async fn get_user(&self, id: UserId) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: UserId) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(&id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
