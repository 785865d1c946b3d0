//! Check-in route handlers.
//!
//! Two entry points resolve to the same workflow: the scan page posts codes decoded
//! from QR symbols by the device camera, the check page posts codes typed by
//! hand. Both render the shared result page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use gatecheck_core::CheckInCode;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::checkin::{CheckInOutcome, CheckInService};
use crate::state::AppState;

use super::format_timestamp;

// =============================================================================
// Form Types
// =============================================================================

/// Code submission, from the scan page or the manual entry page.
#[derive(Debug, Deserialize)]
pub struct CodeForm {
    pub code: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Camera scan page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkin/scan.html")]
pub struct ScanTemplate {
    pub user_name: String,
}

/// Manual code entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkin/check.html")]
pub struct CheckTemplate {
    pub user_name: String,
}

/// Shared result page for both entry points.
///
/// `status` is one of `checked_in`, `already`, or `invalid`; the template
/// branches on it for styling and copy.
#[derive(Template, WebTemplate)]
#[template(path = "checkin/result.html")]
pub struct ResultTemplate {
    pub user_name: String,
    pub status: &'static str,
    pub code: String,
    pub guest_name: Option<String>,
    pub scanned_at: Option<String>,
    /// Where the "try another" link goes back to.
    pub back: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the camera scan page.
pub async fn scan_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    ScanTemplate {
        user_name: user.full_name,
    }
}

/// Resolve a code decoded from a QR symbol.
pub async fn scan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CodeForm>,
) -> Result<Response, AppError> {
    resolve(&state, user.full_name, &form.code, "/scan").await
}

/// Display the manual code entry page.
pub async fn check_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    CheckTemplate {
        user_name: user.full_name,
    }
}

/// Resolve a hand-typed code.
pub async fn check(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CodeForm>,
) -> Result<Response, AppError> {
    resolve(&state, user.full_name, &form.code, "/check").await
}

/// Run the check-in workflow for a raw code string and render the result.
///
/// Malformed codes get the same "invalid" result page as unknown ones; the
/// person at the door does not care which kind of wrong it was.
async fn resolve(
    state: &AppState,
    user_name: String,
    raw_code: &str,
    back: &'static str,
) -> Result<Response, AppError> {
    let code = match CheckInCode::parse(raw_code) {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(%err, "rejected malformed check-in code");
            return Ok(ResultTemplate {
                user_name,
                status: "invalid",
                code: raw_code.trim().to_uppercase(),
                guest_name: None,
                scanned_at: None,
                back,
            }
            .into_response());
        }
    };

    let outcome = CheckInService::new(state.pool()).check_in(&code).await?;

    let template = match outcome {
        CheckInOutcome::CheckedIn(guest) => ResultTemplate {
            user_name,
            status: "checked_in",
            code: code.to_string(),
            guest_name: Some(guest.full_name),
            scanned_at: guest.scanned_at.map(format_timestamp),
            back,
        },
        CheckInOutcome::AlreadyCheckedIn(guest) => ResultTemplate {
            user_name,
            status: "already",
            code: code.to_string(),
            guest_name: Some(guest.full_name),
            scanned_at: guest.scanned_at.map(format_timestamp),
            back,
        },
        CheckInOutcome::InvalidCode => ResultTemplate {
            user_name,
            status: "invalid",
            code: code.to_string(),
            guest_name: None,
            scanned_at: None,
            back,
        },
    };

    Ok(template.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_template_offers_camera_and_image_upload() {
        let html = ScanTemplate {
            user_name: "Door Staff".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("scanner-video"));
        assert!(html.contains("upload an image containing the QR code"));
        assert!(html.contains(r#"type="file""#));
    }

    #[test]
    fn test_result_template_checked_in() {
        let html = ResultTemplate {
            user_name: "Door Staff".to_string(),
            status: "checked_in",
            code: "AB12".to_string(),
            guest_name: Some("Jamie Okafor".to_string()),
            scanned_at: Some("2026-08-30 19:04 UTC".to_string()),
            back: "/scan",
        }
        .render()
        .unwrap();

        assert!(html.contains("Checked in"));
        assert!(html.contains("Jamie Okafor"));
        assert!(html.contains("AB12"));
    }

    #[test]
    fn test_result_template_already_shows_original_time() {
        let html = ResultTemplate {
            user_name: "Door Staff".to_string(),
            status: "already",
            code: "AB12".to_string(),
            guest_name: Some("Jamie Okafor".to_string()),
            scanned_at: Some("2026-08-30 18:00 UTC".to_string()),
            back: "/check",
        }
        .render()
        .unwrap();

        assert!(html.contains("Already checked in"));
        assert!(html.contains("First checked in at 2026-08-30 18:00 UTC"));
    }

    #[test]
    fn test_result_template_invalid() {
        let html = ResultTemplate {
            user_name: "Door Staff".to_string(),
            status: "invalid",
            code: "ZZZZ".to_string(),
            guest_name: None,
            scanned_at: None,
            back: "/check",
        }
        .render()
        .unwrap();

        assert!(html.contains("Invalid code"));
        assert!(html.contains("ZZZZ"));
    }
}
