//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and on the Unit of Work for transactional
//! repository access.

mod auth_service;
mod password_hasher;
mod token_service;
mod user_service;

pub use auth_service::{AuthResponse, AuthService, Authenticator, TokenResponse};
pub use password_hasher::{Argon2Hasher, PasswordHasher};
pub use token_service::{Claims, IssuedTokens, JwtTokens, TokenService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use password_hasher::MockPasswordHasher;
#[cfg(any(test, feature = "test-utils"))]
pub use token_service::MockTokenService;
