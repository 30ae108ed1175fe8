pub mod recommendation_service;
pub use recommendation_service::{Recommendation, RecommendationError, RecommendationService};

pub mod recommendation_service_impl;
pub use recommendation_service_impl::SeaOrmRecommendationService;

pub mod tracking_service;
pub use tracking_service::{
    FollowOverview, FollowToggle, TrackingError, TrackingService, UserProfile,
};

pub mod tracking_service_impl;
pub use tracking_service_impl::SeaOrmTrackingService;

pub mod stats;
pub use stats::StatsService;
