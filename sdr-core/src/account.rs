use shared_types::ConnectionStatus;
use std::sync::Arc;

use crate::error::{EngagementError, Result};
use crate::gateway::{require_session, ServiceGateway, Session};

/// Linkage between the signed-in user and their mail/calendar provider
/// account. Linking itself happens in the backend; this only reads and
/// revokes it.
#[derive(Clone)]
pub struct AccountLink {
    gateway: Arc<dyn ServiceGateway>,
}

impl AccountLink {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self { gateway }
    }

    pub async fn status(&self, session: Option<&Session>) -> Result<ConnectionStatus> {
        let session = require_session(session)?;
        self.gateway.connection_status(session).await
    }

    /// OAuth URL the user should be redirected to.
    pub async fn connect_url(&self, session: Option<&Session>) -> Result<String> {
        let session = require_session(session)?;
        self.gateway.auth_url(session).await
    }

    pub async fn disconnect(&self, session: Option<&Session>) -> Result<()> {
        let session = require_session(session)?;
        self.gateway.disconnect(session).await?;
        tracing::info!("Provider account disconnected");
        Ok(())
    }

    /// Gate shared by mail and calendar operations.
    pub async fn require_connected(&self, session: &Session) -> Result<ConnectionStatus> {
        let status = self.gateway.connection_status(session).await?;
        if !status.connected {
            return Err(EngagementError::NotConnected);
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session, Call, FakeGateway};

    #[tokio::test]
    async fn test_status_requires_session() {
        let fake = Arc::new(FakeGateway::new());
        let account = AccountLink::new(fake.clone());

        let err = account.status(None).await.unwrap_err();
        assert!(matches!(err, EngagementError::AuthRequired));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_require_connected() {
        let fake = Arc::new(FakeGateway::new());
        let account = AccountLink::new(fake.clone());

        fake.set_connected(false);
        let err = account.require_connected(&session()).await.unwrap_err();
        assert!(matches!(err, EngagementError::NotConnected));

        fake.set_connected(true);
        let status = account.require_connected(&session()).await.unwrap();
        assert!(status.connected);
        assert_eq!(fake.calls(), vec![Call::ConnectionStatus, Call::ConnectionStatus]);
    }

    #[tokio::test]
    async fn test_disconnect_and_connect_url() {
        let fake = Arc::new(FakeGateway::new());
        let account = AccountLink::new(fake.clone());

        let url = account.connect_url(Some(&session())).await.unwrap();
        assert!(url.starts_with("https://"));
        account.disconnect(Some(&session())).await.unwrap();
        assert_eq!(fake.calls(), vec![Call::AuthUrl, Call::Disconnect]);
    }
}
