use std::{future::Future, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::AuthnResult;

/// Identity capability a session layer needs from whatever record backs a
/// logged-in user.
pub trait UserPrincipal: Send + Sync {
    /// Stable identifier stored in the session. `None` for anonymous users.
    fn id(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        true
    }

    fn is_anonymous(&self) -> bool {
        false
    }
}

/// Principal used when no session is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnonymousPrincipal;

impl UserPrincipal for AnonymousPrincipal {
    fn id(&self) -> Option<String> {
        None
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_active(&self) -> bool {
        false
    }

    fn is_anonymous(&self) -> bool {
        true
    }
}

/// Rebuilds a principal from the identifier kept in a session.
#[async_trait]
pub trait UserLoader: Send + Sync {
    type Principal: UserPrincipal;

    /// `Ok(None)` means the session refers to no known user.
    async fn load_user(&self, user_id: &str) -> AuthnResult<Option<Self::Principal>>;
}

/// Adapts an async closure into a [`UserLoader`].
pub struct FnLoader<F, P> {
    load: F,
    _principal: PhantomData<fn() -> P>,
}

impl<F, P> FnLoader<F, P> {
    pub fn new(load: F) -> Self {
        Self {
            load,
            _principal: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, P> UserLoader for FnLoader<F, P>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = AuthnResult<Option<P>>> + Send,
    P: UserPrincipal,
{
    type Principal = P;

    async fn load_user(&self, user_id: &str) -> AuthnResult<Option<P>> {
        (self.load)(user_id.to_owned()).await
    }
}

/// Session restoration entry point. The loader is handed in at startup;
/// there is no process-wide registration.
pub struct LoginManager<P> {
    loader: Arc<dyn UserLoader<Principal = P>>,
}

impl<P> Clone for LoginManager<P> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<P: UserPrincipal> LoginManager<P> {
    pub fn new(loader: Arc<dyn UserLoader<Principal = P>>) -> Self {
        Self { loader }
    }

    /// Resolve the identifier stored in a session, if any.
    pub async fn restore(&self, stored_id: Option<&str>) -> AuthnResult<Option<P>> {
        let Some(user_id) = stored_id.map(str::trim).filter(|id| !id.is_empty()) else {
            debug!("no user id in session");
            return Ok(None);
        };
        let principal = self.loader.load_user(user_id).await?;
        if principal.is_none() {
            debug!(user_id, "session refers to unknown user");
        }
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthnError;

    struct Named(String);

    impl UserPrincipal for Named {
        fn id(&self) -> Option<String> {
            Some(self.0.clone())
        }
    }

    fn manager() -> LoginManager<Named> {
        let loader = FnLoader::new(|id: String| async move {
            match id.as_str() {
                "7" => Ok(Some(Named(id))),
                "boom" => Err(AuthnError::Loader("store offline".into())),
                _ => Ok(None),
            }
        });
        LoginManager::new(Arc::new(loader))
    }

    #[tokio::test]
    async fn restores_known_user() {
        let user = manager().restore(Some(" 7 ")).await.unwrap().unwrap();
        assert_eq!(user.id().as_deref(), Some("7"));
        assert!(user.is_authenticated());
        assert!(!user.is_anonymous());
    }

    #[tokio::test]
    async fn missing_or_unknown_ids_are_none() {
        let manager = manager();
        assert!(manager.restore(None).await.unwrap().is_none());
        assert!(manager.restore(Some("   ")).await.unwrap().is_none());
        assert!(manager.restore(Some("8")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn loader_errors_propagate() {
        let err = manager().restore(Some("boom")).await.err().unwrap();
        assert_eq!(err, AuthnError::Loader("store offline".into()));
    }

    #[test]
    fn anonymous_is_not_authenticated() {
        let anon = AnonymousPrincipal;
        assert!(anon.id().is_none());
        assert!(!anon.is_authenticated());
        assert!(anon.is_anonymous());
    }
}
