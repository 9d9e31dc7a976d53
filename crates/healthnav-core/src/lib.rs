pub mod app_config;
pub mod config;
pub mod geo;
pub mod search;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use geo::{haversine_km, Coordinate, CoordinateError, EARTH_RADIUS_KM};
pub use search::{
    validate_search, RawSearchParams, SearchRequest, ValidationError, DEFAULT_CATEGORY,
    DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS,
};
