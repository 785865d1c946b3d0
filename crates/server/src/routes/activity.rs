//! Live activity panel handlers.
//!
//! `GET /activity` renders the panel fragment: the five most recently
//! registered guests and the five most recent check-ins. `GET
//! /activity/events` is an SSE stream that emits a bare `changed` event
//! whenever the guest table changes; the dashboard script refetches the
//! fragment on each event instead of parsing a payload.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::db::guests::GuestRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Guest;
use crate::state::AppState;

use super::format_timestamp;

/// Entries shown per panel column.
const PANEL_LIMIT: i64 = 5;

/// One line in the activity panel.
pub struct ActivityItem {
    pub guest_name: String,
    pub code: String,
    pub at: String,
}

/// Activity panel fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/activity.html")]
pub struct ActivityTemplate {
    pub recent_created: Vec<ActivityItem>,
    pub recent_checkins: Vec<ActivityItem>,
}

/// Render the activity panel fragment.
pub async fn panel(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<ActivityTemplate, AppError> {
    let repo = GuestRepository::new(state.pool());

    let recent_created = repo.recent_created(PANEL_LIMIT).await?;
    let recent_checkins = repo.recent_checkins(PANEL_LIMIT).await?;

    Ok(ActivityTemplate {
        recent_created: recent_created.iter().map(created_item).collect(),
        recent_checkins: recent_checkins.iter().map(checkin_item).collect(),
    })
}

fn created_item(guest: &Guest) -> ActivityItem {
    ActivityItem {
        guest_name: guest.full_name.clone(),
        code: guest.unique_code.to_string(),
        at: format_timestamp(guest.created_at),
    }
}

fn checkin_item(guest: &Guest) -> ActivityItem {
    ActivityItem {
        guest_name: guest.full_name.clone(),
        code: guest.unique_code.to_string(),
        at: guest.scanned_at.map(format_timestamp).unwrap_or_default(),
    }
}

/// Stream change signals over SSE.
///
/// Lagged receivers are fine: every signal means "refetch", so dropping
/// some while the client is slow loses nothing.
pub async fn events(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.feed().subscribe();

    let stream = BroadcastStream::new(receiver)
        .filter_map(|signal| signal.ok())
        .map(|()| Ok(Event::default().event("changed")));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_template_renders_empty_state() {
        let html = ActivityTemplate {
            recent_created: vec![],
            recent_checkins: vec![],
        }
        .render()
        .unwrap();

        assert!(html.contains("No guests yet."));
        assert!(html.contains("No check-ins yet."));
    }

    #[test]
    fn test_activity_template_renders_items() {
        let html = ActivityTemplate {
            recent_created: vec![ActivityItem {
                guest_name: "Sage Moreau".to_string(),
                code: "K7Q2".to_string(),
                at: "2026-08-30 10:00 UTC".to_string(),
            }],
            recent_checkins: vec![],
        }
        .render()
        .unwrap();

        assert!(html.contains("Sage Moreau"));
        assert!(html.contains("K7Q2"));
    }
}
