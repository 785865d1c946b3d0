//! Guest registry route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use gatecheck_core::CheckInCode;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Guest;
use crate::services::guests::{GuestService, GuestServiceError, filter_guests};
use crate::services::qr;
use crate::state::AppState;

use super::format_timestamp;

// =============================================================================
// Form and Query Types
// =============================================================================

/// New guest form data.
#[derive(Debug, Deserialize)]
pub struct AddGuestForm {
    pub full_name: String,
    pub email: String,
}

/// Guest list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Search term, matched against names and codes.
    pub q: Option<String>,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// View Models
// =============================================================================

/// One guest row as rendered in the list.
pub struct GuestRowView {
    pub full_name: String,
    pub code: String,
    pub email: String,
    pub scanned: bool,
    pub scanned_at: String,
    pub created_at: String,
}

impl From<&Guest> for GuestRowView {
    fn from(guest: &Guest) -> Self {
        Self {
            full_name: guest.full_name.clone(),
            code: guest.unique_code.to_string(),
            email: guest
                .email
                .as_ref()
                .map(|e| e.as_str().to_string())
                .unwrap_or_default(),
            scanned: guest.scanned,
            scanned_at: guest.scanned_at.map(format_timestamp).unwrap_or_default(),
            created_at: format_timestamp(guest.created_at),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// New guest form template.
#[derive(Template, WebTemplate)]
#[template(path = "guests/add.html")]
pub struct AddGuestTemplate {
    pub user_name: String,
    pub error: Option<String>,
}

/// Post-registration page template, with the guest's QR symbol inline.
#[derive(Template, WebTemplate)]
#[template(path = "guests/created.html")]
pub struct GuestCreatedTemplate {
    pub user_name: String,
    pub guest_name: String,
    pub code: String,
    pub qr_svg: String,
}

/// Guest list page template.
#[derive(Template, WebTemplate)]
#[template(path = "guests/list.html")]
pub struct GuestListTemplate {
    pub user_name: String,
    pub q: String,
    pub guests: Vec<GuestRowView>,
    pub total: usize,
    pub shown: usize,
}

// =============================================================================
// Error Code Mapping
// =============================================================================

fn add_message(code: &str) -> String {
    match code {
        "missing_name" => "Guest name is required".to_string(),
        "invalid_email" => "Invalid email address".to_string(),
        "failed" => "Could not register the guest, please try again".to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the new guest form.
pub async fn add_page(
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    AddGuestTemplate {
        user_name: user.full_name,
        error: query.error.as_deref().map(add_message),
    }
}

/// Register a guest and show their QR code.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddGuestForm>,
) -> Result<Response, AppError> {
    let email = match form.email.trim() {
        "" => None,
        raw => match gatecheck_core::Email::parse(raw) {
            Ok(email) => Some(email),
            Err(_) => return Ok(Redirect::to("/add?error=invalid_email").into_response()),
        },
    };

    let new_guest = crate::models::guest::NewGuest {
        full_name: form.full_name.trim().to_string(),
        email,
        created_by: Some(user.id),
    };

    let guest = match GuestService::new(state.pool()).register(new_guest).await {
        Ok(guest) => guest,
        Err(GuestServiceError::MissingName) => {
            return Ok(Redirect::to("/add?error=missing_name").into_response());
        }
        Err(GuestServiceError::InvalidEmail(_)) => {
            return Ok(Redirect::to("/add?error=invalid_email").into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let qr_svg = qr::render_svg(&guest.unique_code)
        .map_err(|e| AppError::Internal(format!("QR rendering failed: {e}")))?;

    Ok(GuestCreatedTemplate {
        user_name: user.full_name,
        guest_name: guest.full_name,
        code: guest.unique_code.to_string(),
        qr_svg,
    }
    .into_response())
}

/// Display the guest list, optionally filtered by `?q=`.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<GuestListTemplate, AppError> {
    let guests = GuestService::new(state.pool()).list_all().await?;
    let q = query.q.unwrap_or_default();

    let filtered = filter_guests(&guests, &q);
    let rows: Vec<GuestRowView> = filtered.iter().map(|g| GuestRowView::from(*g)).collect();

    Ok(GuestListTemplate {
        user_name: user.full_name,
        shown: rows.len(),
        total: guests.len(),
        q,
        guests: rows,
    })
}

/// Serve a guest's check-in code as an SVG QR symbol.
pub async fn qr_svg(
    RequireAuth(_user): RequireAuth,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    let code = CheckInCode::parse(&code)
        .map_err(|_| AppError::NotFound(format!("no QR for code {code}")))?;

    let svg = qr::render_svg(&code)
        .map_err(|e| AppError::Internal(format!("QR rendering failed: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_message_known_codes() {
        assert_eq!(add_message("missing_name"), "Guest name is required");
        assert_eq!(add_message("invalid_email"), "Invalid email address");
    }

    #[test]
    fn test_list_template_renders_rows() {
        let html = GuestListTemplate {
            user_name: "Door Staff".to_string(),
            q: String::new(),
            guests: vec![GuestRowView {
                full_name: "Riley Hale".to_string(),
                code: "9XKP".to_string(),
                email: "riley@example.com".to_string(),
                scanned: true,
                scanned_at: "2026-08-30 20:15 UTC".to_string(),
                created_at: "2026-08-29 12:00 UTC".to_string(),
            }],
            total: 1,
            shown: 1,
        }
        .render()
        .unwrap();

        assert!(html.contains("Riley Hale"));
        assert!(html.contains("9XKP"));
        assert!(html.contains("Checked in 2026-08-30 20:15 UTC"));
    }

    #[test]
    fn test_list_template_renders_empty_state() {
        let html = GuestListTemplate {
            user_name: "Door Staff".to_string(),
            q: "nobody".to_string(),
            guests: vec![],
            total: 3,
            shown: 0,
        }
        .render()
        .unwrap();

        assert!(html.contains("No guests match."));
        assert!(html.contains("Showing 0 of 3 guests"));
    }
}
