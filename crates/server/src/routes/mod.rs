//! HTTP route handlers for the Gatecheck server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Dashboard (requires auth)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Auth
//! GET  /signin                 - Sign-in page
//! POST /signin                 - Sign-in action
//! GET  /signup                 - Sign-up page
//! POST /signup                 - Sign-up action
//! GET  /forgot-password        - Request form, or reset form when ?token= is set
//! POST /forgot-password        - Request a reset link
//! POST /forgot-password/reset  - Set a new password with a token
//! POST /signout                - Sign-out action
//!
//! # Check-in (requires auth)
//! GET  /scan                   - Camera scan page
//! POST /scan                   - Resolve a scanned code
//! GET  /check                  - Manual code entry page
//! POST /check                  - Resolve a typed code
//!
//! # Guests (requires auth)
//! GET  /add                    - New guest form
//! POST /add                    - Register a guest
//! GET  /guests                 - Guest list, ?q= filters by name or code
//! GET  /guests/{code}/qr.svg   - QR symbol for a guest's code
//!
//! # Activity (requires auth)
//! GET  /activity               - Activity panel fragment
//! GET  /activity/events        - SSE stream of change signals
//! ```
//!
//! Unknown paths fall back to the dashboard for signed-in users and to the
//! sign-in page for everyone else.

pub mod activity;
pub mod auth;
pub mod checkin;
pub mod dashboard;
pub mod guests;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::{OptionalAuth, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// These carry the strict rate limit; everything else sits behind a session.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", get(auth::signin_page).post(auth::signin))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route("/forgot-password/reset", post(auth::reset_password))
        .route_layer(auth_rate_limiter())
        .route("/signout", post(auth::signout))
}

/// Create the check-in routes router.
pub fn checkin_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", get(checkin::scan_page).post(checkin::scan))
        .route("/check", get(checkin::check_page).post(checkin::check))
}

/// Create the guest registry routes router.
pub fn guest_routes() -> Router<AppState> {
    Router::new()
        .route("/add", get(guests::add_page).post(guests::add))
        .route("/guests", get(guests::list))
        .route("/guests/{code}/qr.svg", get(guests::qr_svg))
}

/// Create the activity feed routes router.
pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/activity", get(activity::panel))
        .route("/activity/events", get(activity::events))
}

/// Combine all route groups into one router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .merge(auth_routes())
        .merge(checkin_routes())
        .merge(guest_routes())
        .merge(activity_routes())
        .fallback(fallback)
}

/// Route unknown paths by auth state instead of serving a 404 page.
async fn fallback(OptionalAuth(user): OptionalAuth) -> Redirect {
    if user.is_some() {
        Redirect::to("/")
    } else {
        Redirect::to("/signin")
    }
}

/// Format a timestamp for display. Templates get pre-formatted strings.
pub(crate) fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use secrecy::SecretString;

    use crate::config::ServerConfig;
    use crate::feed::ActivityFeed;

    use super::*;

    #[test]
    fn test_format_timestamp() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(format_timestamp(at), "2026-03-14 09:26 UTC");
    }

    // Builds the full application router, so every handler has to satisfy
    // axum's `Handler` bound (including Send futures) for the tests to
    // compile at all.
    #[tokio::test]
    async fn test_routes_assemble_into_a_router() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://gatecheck@localhost/gatecheck"),
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 8080,
            base_url: "http://localhost:8080".to_owned(),
            session_secret: SecretString::from("correct horse battery staple overboard"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = sqlx::PgPool::connect_lazy("postgres://gatecheck@localhost/gatecheck")
            .unwrap();
        let state = AppState::new(config, pool, ActivityFeed::for_test());

        let _app: Router = routes().with_state(state);
    }
}
