use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::memory::MemoryStore;
use crate::profiles::repo::{PgProfileStore, ProfileStore};
use crate::users::repo::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        match config.backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let pool = db::connect(url).await?;
                db::migrate(&pool).await?;
                Ok(Self {
                    users: Arc::new(PgUserStore::new(pool.clone())),
                    profiles: Arc::new(PgProfileStore::new(pool)),
                    config,
                })
            }
            StoreBackend::Memory => {
                warn!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    /// Both stores backed by one shared `MemoryStore`.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            profiles: store,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            backend: StoreBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        });
        Self::in_memory(config)
    }
}
