//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and transaction lifecycle (begin,
//! commit, rollback) so multi-step use cases stay atomic: a failure at
//! any step rolls back every write made through the context.
//!
//! Transactions are joined by explicit context passing: repositories
//! obtained from the [`TransactionContext`] are bound to the live
//! transaction. There is no ambient "current transaction" global.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::{
    refresh_token_repository as refresh_token_queries, user_repository as user_queries,
    RefreshTokenRepository, RefreshTokenStore, UserRepository, UserStore,
};
use crate::domain::{Email, RefreshToken, User, UserId};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Note: the generic `transaction` methods make this trait not
/// object-safe; services stay generic over their Unit of Work instead
/// of holding a trait object.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository (outside any transaction)
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get refresh token repository (outside any transaction)
    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled
    /// back on error. Uses ReadCommitted isolation for balanced
    /// consistency/performance.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Execute a closure within a transaction with serializable
    /// isolation. Use for operations requiring the strongest
    /// consistency guarantees (refresh token rotation).
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same unit of work; the context borrows its repositories to
/// tie them to the transaction lifetime.
pub struct TransactionContext<'a> {
    users: &'a dyn UserRepository,
    refresh_tokens: &'a dyn RefreshTokenRepository,
}

impl<'a> TransactionContext<'a> {
    /// Create a context over transaction-bound repositories
    pub fn new(
        users: &'a dyn UserRepository,
        refresh_tokens: &'a dyn RefreshTokenRepository,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
        }
    }

    /// User repository joined to this transaction
    pub fn users(&self) -> &dyn UserRepository {
        self.users
    }

    /// Refresh token repository joined to this transaction
    pub fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        self.refresh_tokens
    }
}

/// Concrete implementation of UnitOfWork over SeaORM
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    refresh_tokens: Arc<RefreshTokenStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let users = Arc::new(UserStore::new(db.clone()));
        let refresh_tokens = Arc::new(RefreshTokenStore::new(db.clone()));
        Self {
            db,
            users,
            refresh_tokens,
        }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let users = TxUserRepository::new(&txn);
        let refresh_tokens = TxRefreshTokenRepository::new(&txn);
        let ctx = TransactionContext::new(&users, &refresh_tokens);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
        self.refresh_tokens.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f)
            .await
    }
}

/// Transaction-bound user repository
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for TxUserRepository<'_> {
    async fn save(&self, user: &User) -> AppResult<User> {
        user_queries::save(self.txn, user).await
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        user_queries::exists_by_email(self.txn, email).await
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        user_queries::find_by_email(self.txn, email).await
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        user_queries::find_by_id(self.txn, id).await
    }
}

/// Transaction-bound refresh token repository
pub struct TxRefreshTokenRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxRefreshTokenRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl RefreshTokenRepository for TxRefreshTokenRepository<'_> {
    async fn save(&self, token: &RefreshToken) -> AppResult<RefreshToken> {
        refresh_token_queries::save(self.txn, token).await
    }

    async fn find_by_token(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        refresh_token_queries::find_by_token(self.txn, raw, false).await
    }

    async fn find_by_token_for_update(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        refresh_token_queries::find_by_token(self.txn, raw, true).await
    }

    async fn update(&self, token: &RefreshToken) -> AppResult<()> {
        refresh_token_queries::update(self.txn, token).await
    }

    async fn revoke_by_token(&self, raw: &str) -> AppResult<()> {
        refresh_token_queries::revoke_by_token(self.txn, raw).await
    }
}
