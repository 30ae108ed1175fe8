use std::sync::Arc;

use crate::clients::jikan::JikanClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    RecommendationService, SeaOrmRecommendationService, SeaOrmTrackingService, StatsService,
    TrackingService,
};

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Arc<Store>,

    pub jikan: Arc<JikanClient>,

    pub recommendations: Arc<dyn RecommendationService>,

    pub tracking: Arc<dyn TrackingService>,

    pub stats: Arc<StatsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );

        let jikan = Arc::new(JikanClient::new(&config.catalog)?);

        let recommendations = Arc::new(SeaOrmRecommendationService::new(
            store.clone(),
            config.recommendations.clone(),
        )) as Arc<dyn RecommendationService>;

        let tracking =
            Arc::new(SeaOrmTrackingService::new(store.clone())) as Arc<dyn TrackingService>;

        let stats = Arc::new(StatsService::new(store.clone()));

        Ok(Self {
            config,
            store,
            jikan,
            recommendations,
            tracking,
            stats,
        })
    }
}
