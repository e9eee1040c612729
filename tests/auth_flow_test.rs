//! Authentication use-case tests.
//!
//! These tests drive the real `Authenticator` against an in-memory
//! Unit of Work with transactional rollback semantics, so the full
//! register / login / rotate / logout lifecycle runs without a
//! database.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mentorhub::config::Config;
use mentorhub::domain::{Email, HashedPassword, NewUser, RefreshToken, User, UserId};
use mentorhub::errors::{AppError, AppResult};
use mentorhub::infra::{
    RefreshTokenRepository, TransactionContext, UnitOfWork, UserRepository,
};
use mentorhub::services::{
    Argon2Hasher, AuthService, Authenticator, JwtTokens, PasswordHasher, TokenService,
};

// =============================================================================
// In-memory persistence with snapshot/rollback transactions
// =============================================================================

#[derive(Default, Clone)]
struct MemState {
    users: Vec<User>,
    tokens: Vec<RefreshToken>,
}

#[derive(Clone)]
struct InMemoryUsers {
    state: Arc<Mutex<MemState>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn save(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.lock().unwrap();
        state.users.push(user.clone());
        Ok(user.clone())
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().any(|u| &u.email == email))
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| &u.id == id).cloned())
    }
}

#[derive(Clone)]
struct InMemoryRefreshTokens {
    state: Arc<Mutex<MemState>>,
    fail_next_save: Arc<AtomicBool>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn save(&self, token: &RefreshToken) -> AppResult<RefreshToken> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("simulated persistence failure"));
        }
        let mut state = self.state.lock().unwrap();
        state.tokens.push(token.clone());
        Ok(token.clone())
    }

    async fn find_by_token(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        let state = self.state.lock().unwrap();
        Ok(state.tokens.iter().find(|t| t.token == raw).cloned())
    }

    async fn find_by_token_for_update(&self, raw: &str) -> AppResult<Option<RefreshToken>> {
        self.find_by_token(raw).await
    }

    async fn update(&self, token: &RefreshToken) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.tokens.iter_mut().find(|t| t.id == token.id) {
            Some(stored) => {
                *stored = token.clone();
                Ok(())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn revoke_by_token(&self, raw: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(stored) = state
            .tokens
            .iter_mut()
            .find(|t| t.token == raw && !t.is_revoked())
        {
            stored.revoke();
        }
        Ok(())
    }
}

/// Unit of Work whose transactions snapshot the whole store and
/// restore it on error, mirroring database rollback.
struct InMemoryUnitOfWork {
    state: Arc<Mutex<MemState>>,
    users: InMemoryUsers,
    refresh_tokens: InMemoryRefreshTokens,
}

impl InMemoryUnitOfWork {
    fn new() -> (Self, Arc<AtomicBool>) {
        let state = Arc::new(Mutex::new(MemState::default()));
        let fail_next_save = Arc::new(AtomicBool::new(false));
        let uow = Self {
            users: InMemoryUsers {
                state: state.clone(),
            },
            refresh_tokens: InMemoryRefreshTokens {
                state: state.clone(),
                fail_next_save: fail_next_save.clone(),
            },
            state,
        };
        (uow, fail_next_save)
    }

    async fn run_transactional<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let snapshot = self.state.lock().unwrap().clone();
        let ctx = TransactionContext::new(&self.users, &self.refresh_tokens);
        match f(ctx).await {
            Ok(value) => Ok(value),
            Err(e) => {
                *self.state.lock().unwrap() = snapshot;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(self.users.clone())
    }

    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
        Arc::new(self.refresh_tokens.clone())
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
        self.run_transactional(f).await
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
        self.run_transactional(f).await
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config() -> Config {
    Config::with_secrets(
        "test-access-secret-of-sufficient-len",
        "test-refresh-secret-of-sufficient-le",
    )
}

struct Harness {
    auth: Authenticator<InMemoryUnitOfWork>,
    uow: Arc<InMemoryUnitOfWork>,
    fail_next_token_save: Arc<AtomicBool>,
}

fn harness() -> Harness {
    let (uow, fail_next_token_save) = InMemoryUnitOfWork::new();
    let uow = Arc::new(uow);
    let config = test_config();
    let auth = Authenticator::new(
        uow.clone(),
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtTokens::new(&config)),
        config,
    );
    Harness {
        auth,
        uow,
        fail_next_token_save,
    }
}

fn mentee_registration(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: "secret123".to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        role: "MENTEE".to_string(),
    }
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let h = harness();

    let response = h.auth.register(mentee_registration("a@x.com")).await.unwrap();

    assert_eq!(response.user.email, "a@x.com");
    assert!(!response.tokens.access_token.is_empty());
    assert!(!response.tokens.refresh_token.is_empty());

    // The user and its initial session both exist
    let state = h.uow.state.lock().unwrap();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.tokens.len(), 1);
    assert!(!state.tokens[0].is_revoked());
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let h = harness();

    h.auth.register(mentee_registration("a@x.com")).await.unwrap();
    let result = h.auth.register(mentee_registration("a@x.com")).await;

    assert!(matches!(result, Err(AppError::UserAlreadyExists)));
    assert_eq!(result.unwrap_err().code(), "APP_USER_EXISTS");

    // No second user row was created
    let state = h.uow.state.lock().unwrap();
    assert_eq!(state.users.len(), 1);
    assert_eq!(state.tokens.len(), 1);
}

#[tokio::test]
async fn test_register_invalid_email_rejected() {
    let h = harness();

    let result = h.auth.register(mentee_registration("not-an-email")).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_register_unknown_role_rejected() {
    let h = harness();

    let mut input = mentee_registration("a@x.com");
    input.role = "WIZARD".to_string();

    assert!(matches!(
        h.auth.register(input).await,
        Err(AppError::Validation(_))
    ));
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_fresh_pair() {
    let h = harness();

    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();
    let logged_in = h
        .auth
        .login("a@x.com".to_string(), "secret123".to_string())
        .await
        .unwrap();

    // Both values differ from the tokens issued at registration
    assert_ne!(logged_in.access_token, registered.tokens.access_token);
    assert_ne!(logged_in.refresh_token, registered.tokens.refresh_token);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    h.auth.register(mentee_registration("a@x.com")).await.unwrap();

    let wrong_password = h
        .auth
        .login("a@x.com".to_string(), "wrong".to_string())
        .await
        .unwrap_err();
    let unknown_email = h
        .auth
        .login("ghost@x.com".to_string(), "secret123".to_string())
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AppError::InvalidEmailOrPassword));
    assert!(matches!(unknown_email, AppError::InvalidEmailOrPassword));
    assert_eq!(wrong_password.code(), unknown_email.code());
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

/// Counting hasher used to prove login never short-circuits the hash
/// comparison.
struct CountingHasher {
    calls: Arc<AtomicUsize>,
    saw_missing_hash: Arc<AtomicBool>,
}

impl PasswordHasher for CountingHasher {
    fn hash(&self, _plain: &str) -> AppResult<HashedPassword> {
        HashedPassword::from_hash("h".repeat(64))
    }

    fn verify(&self, _plain: &str, hash: Option<&HashedPassword>) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if hash.is_none() {
            self.saw_missing_hash.store(true, Ordering::SeqCst);
        }
        false
    }
}

#[tokio::test]
async fn test_login_verifies_even_when_user_is_absent() {
    let (uow, _) = InMemoryUnitOfWork::new();
    let config = test_config();
    let calls = Arc::new(AtomicUsize::new(0));
    let saw_missing_hash = Arc::new(AtomicBool::new(false));
    let auth = Authenticator::new(
        Arc::new(uow),
        Arc::new(CountingHasher {
            calls: calls.clone(),
            saw_missing_hash: saw_missing_hash.clone(),
        }),
        Arc::new(JwtTokens::new(&config)),
        config,
    );

    let result = auth
        .login("ghost@x.com".to_string(), "whatever1".to_string())
        .await;

    assert!(matches!(result, Err(AppError::InvalidEmailOrPassword)));
    // The comparison ran exactly once, against the missing-hash path
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(saw_missing_hash.load(Ordering::SeqCst));
}

// =============================================================================
// Rotation
// =============================================================================

#[tokio::test]
async fn test_rotation_is_single_use() {
    let h = harness();
    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();
    let original = registered.tokens.refresh_token;

    // First use succeeds and returns a different token
    let rotated = h.auth.refresh(original.clone()).await.unwrap();
    assert_ne!(rotated.refresh_token, original);

    // Replaying the pre-rotation token fails as revoked
    let replay = h.auth.refresh(original).await;
    assert!(matches!(replay, Err(AppError::RefreshTokenRevoked)));

    // The replacement token still works
    assert!(h.auth.refresh(rotated.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_rotation_rejects_forged_token() {
    let h = harness();
    h.auth.register(mentee_registration("a@x.com")).await.unwrap();

    let result = h.auth.refresh("definitely.not.signed".to_string()).await;

    assert!(matches!(result, Err(AppError::InvalidRefreshToken)));
}

#[tokio::test]
async fn test_rotation_rejects_access_token() {
    let h = harness();
    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();

    // An access token is signed with a different secret and must not
    // rotate a session
    let result = h.auth.refresh(registered.tokens.access_token).await;

    assert!(matches!(result, Err(AppError::InvalidRefreshToken)));
}

#[tokio::test]
async fn test_rotation_rejects_valid_signature_without_record() {
    let h = harness();
    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();

    // Well-signed token whose server-side record is missing: issued by
    // the same signer but never persisted
    let config = test_config();
    let signer = JwtTokens::new(&config);
    let state = h.uow.state.lock().unwrap();
    let user = state.users[0].clone();
    drop(state);
    let unpersisted = signer.issue(&user).unwrap();
    // Sanity: this is not the token issued at registration
    assert_ne!(unpersisted.refresh_token, registered.tokens.refresh_token);

    let result = h.auth.refresh(unpersisted.refresh_token).await;
    assert!(matches!(result, Err(AppError::RefreshTokenRevoked)));
}

#[tokio::test]
async fn test_failed_rotation_rolls_back_revocation() {
    let h = harness();
    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();
    let original = registered.tokens.refresh_token;

    // Persisting the replacement token fails mid-rotation
    h.fail_next_token_save.store(true, Ordering::SeqCst);
    let result = h.auth.refresh(original.clone()).await;
    assert!(matches!(result, Err(AppError::Internal(_))));

    // The whole transaction rolled back: the original token is still
    // active and usable
    {
        let state = h.uow.state.lock().unwrap();
        let record = state
            .tokens
            .iter()
            .find(|t| t.token == original)
            .expect("original token record");
        assert!(!record.is_revoked());
    }
    assert!(h.auth.refresh(original).await.is_ok());
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_revokes_session() {
    let h = harness();
    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();
    let token = registered.tokens.refresh_token;

    h.auth.logout(token.clone()).await.unwrap();

    let result = h.auth.refresh(token).await;
    assert!(matches!(result, Err(AppError::RefreshTokenRevoked)));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = harness();
    let registered = h.auth.register(mentee_registration("a@x.com")).await.unwrap();
    let token = registered.tokens.refresh_token;

    // Revoking twice, or revoking garbage, is not an error
    h.auth.logout(token.clone()).await.unwrap();
    h.auth.logout(token.clone()).await.unwrap();
    h.auth.logout("unknown-token".to_string()).await.unwrap();

    // The original revocation timestamp is untouched
    let state = h.uow.state.lock().unwrap();
    let record = state.tokens.iter().find(|t| t.token == token).unwrap();
    assert!(record.is_revoked());
}
