use crate::config::EnvConfig;
use anyhow::{Context, Result};
use libnearby::{
    Database,
    tripcost::{TollGuruClient, TripCostProvider},
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, trace};

pub struct SharedState {
    pub db: Database,
    pub config: EnvConfig,
    pub trip_provider: Option<Arc<dyn TripCostProvider>>,
}

impl SharedState {
    pub async fn new(config: EnvConfig) -> Result<Self> {
        trace!("Creating shared app state");
        let db = Database::open(&config.database)
            .await
            .with_context(|| format!("Unable to open database {}", &config.database))?;
        let trip_provider = match config.trip_cost.provider {
            Some(ref provider) => {
                debug!(url = %provider.url, "Configuring trip cost provider");
                let client = TollGuruClient::new(
                    &provider.url,
                    provider.api_key.clone(),
                    provider.timeout.map(Duration::from_secs),
                )
                .with_context(|| "Unable to configure trip cost provider")?;
                Some(Arc::new(client) as Arc<dyn TripCostProvider>)
            }
            None => {
                info!("No trip cost provider configured, trip costs will be estimated locally");
                None
            }
        };
        Ok(Self {
            db,
            config,
            trip_provider,
        })
    }

    pub fn trip_provider(&self) -> Option<&dyn TripCostProvider> {
        self.trip_provider.as_deref()
    }

    #[cfg(test)]
    pub fn test(
        pool: sqlx::Pool<sqlx::Sqlite>,
        trip_provider: Option<Arc<dyn TripCostProvider>>,
    ) -> Self {
        debug!("Creating test shared app state");
        Self {
            db: pool.into(),
            config: EnvConfig {
                listen: crate::config::ListenConfig {
                    host: "127.0.0.1".to_string(),
                    port: 4000,
                },
                database: "test-database.sqlite".to_string(),
                trip_cost: Default::default(),
            },
            trip_provider,
        }
    }
}

pub type AppState = Arc<SharedState>;
