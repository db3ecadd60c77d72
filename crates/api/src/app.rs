use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::dispatch::{DeliveryChannel, SosDispatcher};
use domain::services::secret::Sha256SecretVerifier;
use persistence::repositories::{
    CommandStateRepository, GeofenceRepository, LocationRepository, SafeAppRepository,
};

use crate::config::Config;
use crate::middleware::{
    command_rate_limit_middleware, metrics_handler, metrics_middleware, trace_id, RateLimiterState,
};
use crate::routes::{childlock, commands, geofences, health, locations, sos};
use crate::services::{
    ConsoleDeliveryChannel, DeviceControlService, GatewayDeliveryChannel, LoggingDeviceTransport,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub geofences: Arc<GeofenceRepository>,
    pub locations: Arc<LocationRepository>,
    pub safe_apps: Arc<SafeAppRepository>,
    pub device_control: Arc<DeviceControlService>,
    pub sos: Arc<SosDispatcher>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let per_contact_timeout = Duration::from_millis(config.sos.per_contact_timeout_ms);
        let channel: Arc<dyn DeliveryChannel> = match config.sos.provider.as_str() {
            "gateway" => Arc::new(GatewayDeliveryChannel::new(
                config.sos.sms_gateway_url.clone(),
                config.sos.email_gateway_url.clone(),
                per_contact_timeout,
            )),
            _ => Arc::new(ConsoleDeliveryChannel),
        };

        let device_control = DeviceControlService::new(
            Arc::new(CommandStateRepository::new()),
            Arc::new(Sha256SecretVerifier::from_secret(
                &config.anti_theft.wipe_secret,
            )),
            Arc::new(LoggingDeviceTransport),
            Duration::from_millis(config.anti_theft.play_sound_timeout_ms),
        );

        let rate_limiter = if config.security.command_rate_limit_per_minute > 0 {
            Some(Arc::new(RateLimiterState::new(
                config.security.command_rate_limit_per_minute,
            )))
        } else {
            None
        };

        Self {
            config,
            geofences: Arc::new(GeofenceRepository::new()),
            locations: Arc::new(LocationRepository::new()),
            safe_apps: Arc::new(SafeAppRepository::new()),
            device_control: Arc::new(device_control),
            sos: Arc::new(SosDispatcher::new(channel, per_contact_timeout)),
            rate_limiter,
        }
    }
}

pub fn create_app(config: Config) -> Router {
    let state = AppState::new(config);
    create_app_with_state(state)
}

pub fn create_app_with_state(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Anti-theft command routes carry the per-device rate limit.
    let command_routes = Router::new()
        .route("/api/v1/devices/:device_id/lock", post(commands::lock))
        .route("/api/v1/devices/:device_id/wipe", post(commands::wipe))
        .route(
            "/api/v1/devices/:device_id/remote-wipe",
            post(commands::remote_wipe),
        )
        .route(
            "/api/v1/devices/:device_id/wipe-request",
            post(commands::request_wipe),
        )
        .route(
            "/api/v1/devices/:device_id/play-sound",
            post(commands::play_sound),
        )
        .route(
            "/api/v1/devices/:device_id/state",
            get(commands::current_state),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            command_rate_limit_middleware,
        ));

    let geofence_routes = Router::new()
        .route("/api/v1/geofences", post(geofences::create_geofence))
        .route("/api/v1/geofences/:user_id", get(geofences::list_geofences))
        .route(
            "/api/v1/geofences/:user_id/:geofence_id",
            delete(geofences::delete_geofence),
        )
        .route(
            "/api/v1/geofences/evaluate",
            post(geofences::evaluate_geofences),
        );

    let location_routes = Router::new()
        .route(
            "/api/v1/devices/:device_id/location",
            post(locations::update_location).get(locations::current_location),
        );

    let sos_routes = Router::new().route("/api/v1/sos", post(sos::send_sos));

    let childlock_routes = Router::new()
        .route(
            "/api/v1/childlock/safeapps/:user_id/:device_id",
            get(childlock::get_safe_apps),
        )
        .route("/api/v1/childlock/safeapps", post(childlock::set_safe_apps))
        .route("/api/v1/childlock/lock", post(childlock::activate_lock));

    // Public routes (health and metrics)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(command_routes)
        .merge(geofence_routes)
        .merge(location_routes)
        .merge(sos_routes)
        .merge(childlock_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
