// Smart Student Hub API
// Authentication plus owner-scoped achievements and the institute directory

pub mod achievements;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod institutes;
pub mod pending_report;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use achievements::{AchievementService, AchievementStore, InMemoryAchievementStore, PgAchievementRepository};
use auth::{AuthService, InMemoryUserStore, PgUserRepository, TokenService, UserStore};
use db::DbPool;
use institutes::{InMemoryInstituteStore, InstituteService, InstituteStore, PgInstituteRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
        auth::handlers::update_profile_handler,
        achievements::handlers::create_achievement_handler,
        achievements::handlers::list_achievements_handler,
        achievements::handlers::pending_achievements_handler,
        achievements::handlers::get_achievement_handler,
        achievements::handlers::update_achievement_handler,
        achievements::handlers::delete_achievement_handler,
        achievements::handlers::verify_achievement_handler,
        institutes::handlers::list_institutes_handler,
        institutes::handlers::get_institute_handler,
        institutes::handlers::create_institute_handler,
        institutes::handlers::update_institute_handler,
        institutes::handlers::delete_institute_handler,
    ),
    components(
        schemas(
            error::ErrorBody,
            auth::Role,
            auth::User,
            auth::UserSummary,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::UpdateProfileRequest,
            achievements::AchievementCategory,
            achievements::AchievementStatus,
            achievements::AchievementResponse,
            achievements::CreateAchievementRequest,
            achievements::UpdateAchievementRequest,
            achievements::VerifyAchievementRequest,
            achievements::PendingAchievement,
            achievements::MessageResponse,
            institutes::InstituteType,
            institutes::Institute,
            institutes::InstituteDetail,
            institutes::CreateInstituteRequest,
            institutes::UpdateInstituteRequest,
            institutes::InstituteEnvelope,
            institutes::InstituteListEnvelope,
            institutes::InstituteDetailEnvelope,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and current user"),
        (name = "users", description = "Profile management"),
        (name = "achievements", description = "Student achievements and verification"),
        (name = "institutes", description = "Institute directory")
    ),
    info(
        title = "Smart Student Hub API",
        version = "1.0.0",
        description = "Student achievement records with faculty verification and an institute directory"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
///
/// Stores are held behind their ports so the same router runs on PostgreSQL
/// or on the in-memory adapters.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub achievements: Arc<dyn AchievementStore>,
    pub institutes: Arc<dyn InstituteStore>,
    pub tokens: Arc<TokenService>,
    pub auth_service: AuthService,
    pub achievement_service: AchievementService,
    pub institute_service: InstituteService,
}

impl AppState {
    /// Wire services over the given stores
    pub fn new(
        users: Arc<dyn UserStore>,
        achievements: Arc<dyn AchievementStore>,
        institutes: Arc<dyn InstituteStore>,
        tokens: TokenService,
    ) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            auth_service: AuthService::new(users.clone(), tokens.clone()),
            achievement_service: AchievementService::new(achievements.clone(), users.clone()),
            institute_service: InstituteService::new(institutes.clone(), users.clone()),
            users,
            achievements,
            institutes,
            tokens,
        }
    }

    /// State backed by PostgreSQL repositories
    pub fn postgres(pool: DbPool, tokens: TokenService) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgAchievementRepository::new(pool.clone())),
            Arc::new(PgInstituteRepository::new(pool)),
            tokens,
        )
    }

    /// State backed by process-local stores; data is lost on restart
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryAchievementStore::new()),
            Arc::new(InMemoryInstituteStore::new()),
            tokens,
        )
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/users/me", put(auth::update_profile_handler))
        .route(
            "/achievements",
            post(achievements::create_achievement_handler)
                .get(achievements::list_achievements_handler),
        )
        .route(
            "/achievements/pending",
            get(achievements::pending_achievements_handler),
        )
        .route(
            "/achievements/:id",
            get(achievements::get_achievement_handler)
                .put(achievements::update_achievement_handler)
                .delete(achievements::delete_achievement_handler),
        )
        .route(
            "/achievements/:id/verify",
            patch(achievements::verify_achievement_handler),
        )
        .route(
            "/institutes",
            get(institutes::list_institutes_handler).post(institutes::create_institute_handler),
        )
        .route(
            "/institutes/:id",
            get(institutes::get_institute_handler)
                .put(institutes::update_institute_handler)
                .delete(institutes::delete_institute_handler),
        )
}

/// Creates and configures the application router
///
/// Every API route is reachable both at the root and under `/api`.
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .merge(api_routes())
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
