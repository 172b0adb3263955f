//! Account identity with reactive token refresh.
//!
//! The client never refreshes proactively: userinfo is tried with the stored
//! access token, and a 401 triggers exactly one refresh-and-retry. An
//! irrecoverable auth failure clears the stored tokens and hands back the
//! hosted login URL.

use std::sync::Arc;

use leadline_core::auth::{AuthGateway, TokenRepository, UserInfo};
use leadline_core::error::Result;
use leadline_core::session::gateway::RemoteError;

/// Deep-link target appended to the hosted login URL so the provider can
/// send the user back.
const RETURN_TO: &str = "leadline://auth/callback";

/// The signed-in/signed-out outcome of an identity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    SignedIn(UserInfo),
    /// No usable credentials; `login_url` includes the return deep link.
    SignedOut { login_url: String },
}

/// Identity checks against the provider, with token storage.
pub struct AccountService {
    auth: Arc<dyn AuthGateway>,
    tokens: Arc<dyn TokenRepository>,
    login_url: String,
}

impl AccountService {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        tokens: Arc<dyn TokenRepository>,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            tokens,
            login_url: login_url.into(),
        }
    }

    /// Resolves the current user.
    ///
    /// Transient failures (offline, 5xx) propagate as errors without
    /// touching the stored tokens; only definitive auth failures clear them.
    pub async fn current_user(&self) -> Result<AccountStatus> {
        let stored = match self.tokens.load().await? {
            Some(tokens) if !tokens.is_empty() => tokens,
            _ => return Ok(self.signed_out()),
        };

        match self.auth.userinfo(&stored.access_token).await {
            Ok(user) => Ok(AccountStatus::SignedIn(user)),
            Err(RemoteError::Unauthorized) => self.refresh_and_retry(&stored.refresh_token).await,
            Err(e) => Err(leadline_core::error::LeadlineError::api(e.to_string())),
        }
    }

    async fn refresh_and_retry(&self, refresh_token: &str) -> Result<AccountStatus> {
        tracing::debug!("[Account] Access token rejected; refreshing");
        let fresh = match self.auth.refresh(refresh_token).await {
            Ok(tokens) => tokens,
            Err(RemoteError::Unauthorized) | Err(RemoteError::Client { .. }) => {
                // Refresh token is dead too; force a new login
                tracing::info!("[Account] Refresh rejected; clearing stored tokens");
                self.tokens.clear().await?;
                return Ok(self.signed_out());
            }
            Err(e) => {
                return Err(leadline_core::error::LeadlineError::api(e.to_string()));
            }
        };

        self.tokens.save(&fresh).await?;
        match self.auth.userinfo(&fresh.access_token).await {
            Ok(user) => Ok(AccountStatus::SignedIn(user)),
            Err(RemoteError::Unauthorized) => {
                // Fresh token still rejected; no second refresh
                self.tokens.clear().await?;
                Ok(self.signed_out())
            }
            Err(e) => Err(leadline_core::error::LeadlineError::api(e.to_string())),
        }
    }

    fn signed_out(&self) -> AccountStatus {
        AccountStatus::SignedOut {
            login_url: format!("{}?return_to={}", self.login_url, RETURN_TO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockAuthGateway, MockTokenRepo};
    use leadline_core::auth::AuthTokenSet;

    const LOGIN_URL: &str = "https://auth.leadline.dev/login";

    fn tokens() -> AuthTokenSet {
        AuthTokenSet {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            id_token: String::new(),
        }
    }

    fn user() -> UserInfo {
        UserInfo {
            sub: "u-1".to_string(),
            email: Some("jane@x.com".to_string()),
            name: Some("Jane Doe".to_string()),
        }
    }

    #[tokio::test]
    async fn test_no_stored_tokens_means_signed_out_with_return_link() {
        let svc = AccountService::new(
            Arc::new(MockAuthGateway::default()),
            Arc::new(MockTokenRepo::default()),
            LOGIN_URL,
        );
        match svc.current_user().await.unwrap() {
            AccountStatus::SignedOut { login_url } => {
                assert!(login_url.starts_with(LOGIN_URL));
                assert!(login_url.contains("return_to=leadline://auth/callback"));
            }
            other => panic!("expected SignedOut, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_valid_token_signs_in_without_refresh() {
        let auth = Arc::new(MockAuthGateway::default());
        auth.push_userinfo(Ok(user()));
        let svc = AccountService::new(
            auth.clone(),
            Arc::new(MockTokenRepo::with_tokens(tokens())),
            LOGIN_URL,
        );

        assert_eq!(
            svc.current_user().await.unwrap(),
            AccountStatus::SignedIn(user())
        );
        assert_eq!(auth.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_once_and_retries() {
        let auth = Arc::new(MockAuthGateway::default());
        auth.push_userinfo(Err(RemoteError::Unauthorized));
        auth.push_userinfo(Ok(user()));
        let fresh = AuthTokenSet {
            access_token: "access-2".to_string(),
            refresh_token: "refresh-2".to_string(),
            id_token: String::new(),
        };
        auth.set_refresh(Ok(fresh.clone()));
        let repo = Arc::new(MockTokenRepo::with_tokens(tokens()));
        let svc = AccountService::new(auth.clone(), repo.clone(), LOGIN_URL);

        assert_eq!(
            svc.current_user().await.unwrap(),
            AccountStatus::SignedIn(user())
        );
        assert_eq!(auth.refresh_calls(), 1);
        // The fresh triple was persisted
        assert_eq!(repo.stored(), Some(fresh));
    }

    #[tokio::test]
    async fn test_dead_refresh_token_clears_storage() {
        let auth = Arc::new(MockAuthGateway::default());
        auth.push_userinfo(Err(RemoteError::Unauthorized));
        auth.set_refresh(Err(RemoteError::Unauthorized));
        let repo = Arc::new(MockTokenRepo::with_tokens(tokens()));
        let svc = AccountService::new(auth, repo.clone(), LOGIN_URL);

        assert!(matches!(
            svc.current_user().await.unwrap(),
            AccountStatus::SignedOut { .. }
        ));
        assert_eq!(repo.stored(), None);
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_tokens() {
        let auth = Arc::new(MockAuthGateway::default());
        auth.push_userinfo(Err(RemoteError::Offline {
            message: "no route".to_string(),
        }));
        let repo = Arc::new(MockTokenRepo::with_tokens(tokens()));
        let svc = AccountService::new(auth, repo.clone(), LOGIN_URL);

        assert!(svc.current_user().await.is_err());
        assert_eq!(repo.stored(), Some(tokens()));
    }
}
