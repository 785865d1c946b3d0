//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::guests::{GuestService, GuestStats};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user_name: String,
    pub total: usize,
    pub checked_in: usize,
    pub check_in_rate: u32,
    pub recent_checkins: usize,
}

/// Display the dashboard with aggregate stats and the activity panel.
///
/// Stats are recomputed from the guest list on every render; the activity
/// panel is included as a fragment and refreshed over SSE.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<DashboardTemplate> {
    let guests = GuestService::new(state.pool()).list_all().await?;
    let stats = GuestStats::compute(&guests, Utc::now());

    Ok(DashboardTemplate {
        user_name: user.full_name,
        total: stats.total,
        checked_in: stats.checked_in,
        check_in_rate: stats.check_in_rate,
        recent_checkins: stats.recent_checkins,
    })
}
