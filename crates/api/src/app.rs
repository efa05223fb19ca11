use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::error::GatewayError;
use domain::models::{SchoolScope, SchoolSelection};
use domain::services::{LocationTreeStore, SyncController};
use persistence::settings::SELECTED_SCHOOL_KEY;
use persistence::{Backends, KeyValueStore, Settings};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{Config, SessionKind};
use crate::middleware::{
    metrics_handler, metrics_middleware, require_admin_scope, require_school_scope, trace_id,
};
use crate::routes::{
    categories, dashboard, health, images, items, locations, reports, schools, session,
};

/// Everything one session needs, shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scope: Arc<SchoolScope>,
    pub sync: Arc<SyncController>,
    /// The school's location tree; `None` for an admin session.
    pub locations: Option<Arc<Mutex<LocationTreeStore>>>,
    /// Extra categories of the school beyond the defaults.
    pub categories: Arc<RwLock<Vec<String>>>,
    pub backends: Backends,
    pub store: Arc<dyn KeyValueStore>,
}

impl AppState {
    /// Selects the backends, resolves the session scope and loads the
    /// initial item lists.
    ///
    /// A school session is resolved through the registry; a school with its
    /// own script URL reads its inventory from there. Failing initial loads
    /// are logged and left for a later refresh.
    pub async fn connect(
        config: Config,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, GatewayError> {
        let options = config.gateway_options();
        let mut settings = Settings::load(store.as_ref(), config.default_settings());
        let mut backends = Backends::connect(&settings, &options, store.clone())?;

        let scope = match (config.session.kind, config.school_code()) {
            (SessionKind::School, Some(code)) => {
                let school = backends.registry.verify_code(code).await?;
                if !settings.is_demo()
                    && !school.script_url.trim().is_empty()
                    && school.script_url != settings.script_url
                {
                    settings.script_url = school.script_url.clone();
                    backends = Backends::connect(&settings, &options, store.clone())?;
                }
                SchoolScope::from_config(school)
            }
            (SessionKind::School, None) => {
                return Err(GatewayError::InvalidInput(
                    "a school session needs a school code".to_string(),
                ))
            }
            (SessionKind::Admin, _) => SchoolScope::Admin,
        };

        settings.save(store.as_ref());

        let selection = match scope.school_name() {
            Some(name) => SchoolSelection::School(name.to_string()),
            None => settings.selected_school.clone(),
        };
        let sync = Arc::new(SyncController::new(
            backends.inventory.clone(),
            selection.clone(),
            options.default_school.clone(),
        ));

        let (locations, categories) = match &scope {
            SchoolScope::School {
                code,
                categories,
                locations,
                ..
            } => (
                Some(Arc::new(Mutex::new(LocationTreeStore::load(
                    code.clone(),
                    locations.clone(),
                    backends.locations.clone(),
                )))),
                categories.clone(),
            ),
            SchoolScope::Admin => (None, Vec::new()),
        };

        info!(
            scope = scope.school_code().unwrap_or("admin"),
            school = %selection,
            demo = backends.inventory.is_demo(),
            "Session ready"
        );

        if let Err(e) = sync.refresh_items(None).await {
            warn!(error = %e, "Initial item load failed");
        }
        if scope.is_admin() && !selection.is_all() {
            if let Err(e) = sync.refresh_dashboard().await {
                warn!(error = %e, "Initial dashboard load failed");
            }
        }

        Ok(Self {
            config: Arc::new(config),
            scope: Arc::new(scope),
            sync,
            locations,
            categories: Arc::new(RwLock::new(categories)),
            backends,
            store,
        })
    }

    /// Remembers the admin's school choice across restarts.
    pub fn remember_selection(&self, selection: &SchoolSelection) {
        self.store
            .set(SELECTED_SCHOOL_KEY, selection.as_key().to_string());
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes available to every session
    let session_routes = Router::new()
        .route("/api/v1/session", get(session::get_session))
        .route("/api/v1/session/selection", put(session::select_school))
        .route("/api/v1/items", get(items::list_items).post(items::create_item))
        .route("/api/v1/items/all", get(items::list_all_items))
        .route("/api/v1/items/refresh", post(items::refresh_items))
        .route(
            "/api/v1/items/:item_id",
            put(items::update_item).delete(items::delete_item),
        )
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/dashboard/refresh", post(dashboard::refresh_dashboard))
        .route("/api/v1/reports/locations", get(reports::location_report))
        .route(
            "/api/v1/categories",
            get(categories::list_categories).put(categories::update_categories),
        )
        .route("/api/v1/images", post(images::upload_image))
        .route("/api/v1/admin/login", post(schools::admin_login));

    // School-only routes
    let school_routes = Router::new()
        .route("/api/v1/locations", get(locations::get_tree))
        .route("/api/v1/locations/options", get(locations::list_options))
        .route("/api/v1/locations/resolve", get(locations::resolve_location))
        .route("/api/v1/locations/rooms", post(locations::add_room))
        .route(
            "/api/v1/locations/rooms/:room_id",
            put(locations::rename_room).delete(locations::delete_room),
        )
        .route(
            "/api/v1/locations/rooms/:room_id/duplicate",
            post(locations::duplicate_room),
        )
        .route(
            "/api/v1/locations/rooms/:room_id/shelves",
            post(locations::add_shelf),
        )
        .route(
            "/api/v1/locations/rooms/:room_id/shelves/:shelf_id",
            put(locations::rename_shelf).delete(locations::delete_shelf),
        )
        .route(
            "/api/v1/locations/rooms/:room_id/shelves/:shelf_id/duplicate",
            post(locations::duplicate_shelf),
        )
        .route(
            "/api/v1/locations/rooms/:room_id/shelves/:shelf_id/slots",
            post(locations::add_slot),
        )
        .route(
            "/api/v1/locations/rooms/:room_id/shelves/:shelf_id/slots/:slot_id",
            put(locations::rename_slot).delete(locations::delete_slot),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_school_scope,
        ));

    // Admin-only routes
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/schools",
            get(schools::list_schools).post(schools::create_school),
        )
        .route(
            "/api/v1/admin/schools/generate-code",
            get(schools::generate_code),
        )
        .route(
            "/api/v1/admin/schools/:code",
            put(schools::update_school).delete(schools::delete_school),
        )
        .route("/api/v1/admin/password", put(schools::change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_scope,
        ));

    // Public routes
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(school_routes)
        .merge(admin_routes)
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
