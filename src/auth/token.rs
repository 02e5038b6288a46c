//! Opaque bearer tokens with expiry.
//!
//! Tokens are 32 random bytes, base64url-encoded. The store is keyed by their SHA-256 digest and
//! never holds a token itself.

use super::{AuthError, Principal};
use crate::clients::UserClient;
use crate::model::{Role, User, UserId};
use actor_framework::ActorClient;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone)]
struct TokenRecord {
    user: UserId,
    kind: TokenKind,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

type TokenStore = Arc<Mutex<HashMap<String, TokenRecord>>>;

/// Issues, verifies and revokes tokens. Roles are read from the User actor on every
/// verification, so a role change or a deactivation takes effect immediately.
#[derive(Clone)]
pub struct TokenService {
    users: UserClient,
    tokens: TokenStore,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn fingerprint(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

impl TokenService {
    pub fn new(users: UserClient, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            users,
            tokens: Arc::new(Mutex::new(HashMap::new())),
            access_ttl,
            refresh_ttl,
        }
    }

    fn store(&self) -> MutexGuard<'_, HashMap<String, TokenRecord>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mint(&self, user: UserId, kind: TokenKind) -> String {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let token = new_token();
        let record = TokenRecord {
            user,
            kind,
            expires_at: Utc::now() + ttl,
        };
        let mut store = self.store();
        let now = Utc::now();
        store.retain(|_, record| record.expires_at > now);
        store.insert(fingerprint(&token), record);
        token
    }

    /// Looks a token up, dropping it if it has expired.
    fn lookup(&self, token: &str, kind: TokenKind) -> Result<UserId, AuthError> {
        let key = fingerprint(token);
        let mut store = self.store();
        let record = store
            .get(&key)
            .filter(|record| record.kind == kind)
            .cloned()
            .ok_or(AuthError::InvalidToken)?;
        if record.expires_at <= Utc::now() {
            store.remove(&key);
            return Err(AuthError::InvalidToken);
        }
        Ok(record.user)
    }

    pub fn issue(&self, user: &User) -> TokenPair {
        debug!(user_id = %user.id, "Issuing tokens");
        TokenPair {
            access_token: self.mint(user.id, TokenKind::Access),
            refresh_token: self.mint(user.id, TokenKind::Refresh),
        }
    }

    /// Trades a live refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user = self.lookup(refresh_token, TokenKind::Refresh)?;
        self.current_role(user).await?;
        Ok(self.mint(user, TokenKind::Access))
    }

    pub async fn verify(&self, access_token: &str) -> Result<Principal, AuthError> {
        let user = self.lookup(access_token, TokenKind::Access)?;
        let role = self.current_role(user).await?;
        Ok(Principal { user, role })
    }

    /// The role currently stored for `user`; fails for deleted or disabled accounts.
    pub async fn current_role(&self, user: UserId) -> Result<Role, AuthError> {
        let user = self
            .users
            .get(user)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;
        if !user.active {
            return Err(AuthError::Inactive);
        }
        Ok(user.role)
    }

    /// Logout. Returns whether the token was live.
    pub fn revoke(&self, refresh_token: &str) -> bool {
        let removed = self.store().remove(&fingerprint(refresh_token)).is_some();
        if removed {
            info!("Refresh token revoked");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountType, CompanyNumbers, UserCreate, UserUpdate};
    use crate::user_actor;

    async fn setup(role: Role) -> (TokenService, User) {
        let (actor, users) = user_actor::new(8);
        tokio::spawn(actor.run(()));
        let user = users
            .create_user(UserCreate {
                email: "vola@shop.mg".into(),
                full_name: "Vola".into(),
                role,
                account_type: AccountType::Individual,
                phone: String::new(),
                address: String::new(),
                company: CompanyNumbers::default(),
                password_hash: String::new(),
            })
            .await
            .unwrap();
        let service = TokenService::new(users, Duration::minutes(60), Duration::days(7));
        (service, user)
    }

    #[tokio::test]
    async fn test_issue_verify_refresh_revoke() {
        let (service, user) = setup(Role::Vendeur).await;
        let pair = service.issue(&user);

        let principal = service.verify(&pair.access_token).await.unwrap();
        assert_eq!(principal, Principal { user: user.id, role: Role::Vendeur });

        // A refresh token is not an access token, and the other way round.
        assert_eq!(
            service.verify(&pair.refresh_token).await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            service.refresh(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        );

        let access = service.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(access, pair.access_token);
        assert!(service.verify(&access).await.is_ok());

        assert!(service.revoke(&pair.refresh_token));
        assert!(!service.revoke(&pair.refresh_token));
        assert_eq!(
            service.refresh(&pair.refresh_token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let (service, user) = setup(Role::Client).await;
        let service = TokenService::new(service.users.clone(), Duration::zero(), Duration::zero());

        let pair = service.issue(&user);
        assert_eq!(
            service.verify(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_role_is_read_at_verification() {
        let (service, user) = setup(Role::Vendeur).await;
        let pair = service.issue(&user);

        service
            .users
            .update_user(
                user.id,
                UserUpdate {
                    role: Some(Role::Client),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(service.verify(&pair.access_token).await.unwrap().role, Role::Client);

        service
            .users
            .update_user(
                user.id,
                UserUpdate {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            service.verify(&pair.access_token).await,
            Err(AuthError::Inactive)
        );
    }
}
