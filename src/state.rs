use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService, TokenService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenService,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.general, &config.security).await?;
        Ok(Self::with_store(config, store))
    }

    /// Wires services around an already-opened store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let tokens = TokenService::new(&config.auth.jwt_secret);
        let auth_service: Arc<dyn AuthService> = Arc::new(
            SeaOrmAuthService::new(store.clone(), tokens.clone())
                .with_restricted_signup_roles(config.auth.restrict_signup_roles),
        );

        Self {
            config: Arc::new(config),
            store,
            tokens,
            auth_service,
        }
    }
}
