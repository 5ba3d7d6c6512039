//! API route configuration

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, logging_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health & identity
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::dashboard::stats))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        // Staff accounts (manager)
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/users/:id/reset-password", put(handlers::users::reset_password))
        .route("/users/:id/deactivate", put(handlers::users::deactivate_user))
        // Plans
        .route("/plans", post(handlers::plans::create_plan))
        .route("/plans/available", get(handlers::plans::list_available_plans))
        .route(
            "/plans/:id",
            get(handlers::plans::get_plan)
                .put(handlers::plans::update_plan)
                .delete(handlers::plans::delete_plan),
        )
        // Members
        .route(
            "/members",
            get(handlers::members::list_members).post(handlers::members::create_member),
        )
        .route(
            "/members/:id",
            get(handlers::members::get_member)
                .put(handlers::members::update_member)
                .delete(handlers::members::delete_member),
        )
        // Classes, enrollment, attendance
        .route(
            "/classes",
            get(handlers::classes::list_classes).post(handlers::classes::create_class),
        )
        .route(
            "/classes/:id",
            get(handlers::classes::get_class)
                .put(handlers::classes::update_class)
                .delete(handlers::classes::delete_class),
        )
        .route("/classes/:id/enroll", post(handlers::classes::enroll))
        .route(
            "/classes/:id/enrollments/:enrollment_id/cancel",
            put(handlers::classes::cancel_enrollment),
        )
        .route("/classes/:id/attendance", post(handlers::classes::record_attendance))
        // Payments
        .route(
            "/payments",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route(
            "/payments/:id",
            get(handlers::payments::get_payment)
                .put(handlers::payments::update_payment)
                .delete(handlers::payments::delete_payment),
        )
        .route("/payments/:id/settle", put(handlers::payments::settle_payment))
        // Workouts
        .route(
            "/workouts",
            get(handlers::workouts::list_workouts).post(handlers::workouts::create_workout),
        )
        .route(
            "/workouts/:id",
            get(handlers::workouts::get_workout)
                .put(handlers::workouts::update_workout)
                .delete(handlers::workouts::delete_workout),
        )
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::dashboard));

    // Build full router
    Router::new()
        .nest("/api", api)
        // Also expose health at root for load balancers
        .route("/health", get(handlers::health_check))
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), logging_middleware))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
