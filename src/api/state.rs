//! Application state - Dependency injection container.
//!
//! The HTTP layer constructs the use cases with concrete repository
//! and service implementations; handlers only ever see the traits.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, Persistence};
use crate::services::{
    Argon2Hasher, AuthService, Authenticator, JwtTokens, PasswordHasher, TokenService, UserManager,
    UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// Wires the Unit of Work, hasher and token signer into the
    /// services; this is the composition root of the application.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokens::new(&config));

        let auth_service = Arc::new(Authenticator::new(uow.clone(), hasher, tokens, config));
        let user_service = Arc::new(UserManager::new(uow));

        Self {
            auth_service,
            user_service,
            database,
        }
    }

    /// Create new application state with manually injected services
    /// (used by tests with mock services).
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            database,
        }
    }
}
