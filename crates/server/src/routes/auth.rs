//! Authentication route handlers.
//!
//! Sign-in, sign-up, sign-out, and password resets for staff accounts.
//! Failures redirect back with a short error code in the query string; the
//! page handler maps the code to a human message before rendering.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data. The token rides along as a hidden field.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters for the forgot-password page.
///
/// A `token` switches the page from the request form to the reset form.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordQuery {
    pub token: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signin.html")]
pub struct SigninTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

/// Forgot password page template.
///
/// Shows the reset form when `token` is set, the request form otherwise.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub token: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Error Code Mapping
// =============================================================================

fn signin_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password".to_string(),
        "session" => "Could not start a session, please try again".to_string(),
        other => other.to_string(),
    }
}

fn signup_message(code: &str) -> String {
    match code {
        "password_mismatch" => "Passwords do not match".to_string(),
        "password_too_short" => "Password must be at least 8 characters".to_string(),
        "email_taken" => "An account with this email already exists".to_string(),
        "invalid_email" => "Invalid email address".to_string(),
        "failed" => "Could not create the account, please try again".to_string(),
        other => other.to_string(),
    }
}

fn reset_message(code: &str) -> String {
    match code {
        "invalid_token" => "This reset link is invalid or has expired".to_string(),
        "password_mismatch" => "Passwords do not match".to_string(),
        "password_too_short" => "Password must be at least 8 characters".to_string(),
        other => other.to_string(),
    }
}

fn success_message(code: &str) -> String {
    match code {
        "signed_up" => "Account created, you are signed in".to_string(),
        "signed_out" => "Signed out".to_string(),
        "reset_sent" => "If that email has an account, a reset link is on its way".to_string(),
        "password_reset" => "Password updated, sign in with the new one".to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Sign-in Routes
// =============================================================================

/// Display the sign-in page.
///
/// Signed-in users are sent to the dashboard instead.
pub async fn signin_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    SigninTemplate {
        error: query.error.as_deref().map(signin_message),
        success: query.success.as_deref().map(success_message),
    }
    .into_response()
}

/// Handle sign-in form submission.
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            let current_user = CurrentUser {
                id: user.id,
                email: user.email,
                full_name: user.full_name,
            };

            if let Err(e) = set_current_user(&session, &current_user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/signin?error=session").into_response();
            }

            set_sentry_user(&current_user.id, Some(current_user.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Sign-in failed: {}", e);
            Redirect::to("/signin?error=credentials").into_response()
        }
    }
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
///
/// Signed-in users are sent to the dashboard instead.
pub async fn signup_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    SignupTemplate {
        error: query.error.as_deref().map(signup_message),
    }
    .into_response()
}

/// Handle sign-up form submission.
///
/// A successful sign-up signs the new staff member straight in.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/signup?error=password_mismatch").into_response();
    }

    let auth = AuthService::new(state.pool());

    match auth
        .register(&form.email, &form.full_name, &form.password)
        .await
    {
        Ok(user) => {
            let current_user = CurrentUser {
                id: user.id,
                email: user.email,
                full_name: user.full_name,
            };

            if let Err(e) = set_current_user(&session, &current_user).await {
                tracing::error!("Failed to set session after sign-up: {}", e);
                return Redirect::to("/signin?success=signed_up").into_response();
            }

            set_sentry_user(&current_user.id, Some(current_user.email.as_str()));
            Redirect::to("/").into_response()
        }
        Err(AuthError::UserAlreadyExists) => {
            Redirect::to("/signup?error=email_taken").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/signup?error=password_too_short").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/signup?error=invalid_email").into_response()
        }
        Err(e) => {
            tracing::error!("Sign-up failed: {}", e);
            Redirect::to("/signup?error=failed").into_response()
        }
    }
}

// =============================================================================
// Sign-out Route
// =============================================================================

/// Handle sign-out.
pub async fn signout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!("Failed to clear session on sign-out: {}", e);
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    clear_sentry_user();
    Redirect::to("/signin?success=signed_out").into_response()
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot-password page.
///
/// With a `token` query parameter this shows the new-password form instead
/// of the request form; the reset email links back here with the token.
pub async fn forgot_password_page(Query(query): Query<ForgotPasswordQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        token: query.token,
        error: query.error.as_deref().map(reset_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle a reset-link request.
///
/// Always reports success so the endpoint cannot be used to probe for
/// registered emails. The reset URL is logged for the operator; mail
/// delivery is outside this service.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth
        .request_password_reset(&form.email, &state.config().base_url)
        .await
    {
        Ok(Some(reset_url)) => {
            tracing::info!(%reset_url, "password reset link issued");
        }
        Ok(None) => {
            tracing::info!("password reset requested for unknown email");
        }
        Err(e) => {
            tracing::warn!("Password reset request failed: {}", e);
        }
    }

    Redirect::to("/forgot-password?success=reset_sent").into_response()
}

/// Handle the new-password form submission.
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        let url = format!(
            "/forgot-password?token={}&error=password_mismatch",
            urlencoding::encode(&form.token)
        );
        return Redirect::to(&url).into_response();
    }

    let auth = AuthService::new(state.pool());

    match auth.reset_password(&form.token, &form.password).await {
        Ok(()) => Redirect::to("/signin?success=password_reset").into_response(),
        Err(AuthError::WeakPassword(_)) => {
            let url = format!(
                "/forgot-password?token={}&error=password_too_short",
                urlencoding::encode(&form.token)
            );
            Redirect::to(&url).into_response()
        }
        Err(AuthError::InvalidResetToken) => {
            Redirect::to("/forgot-password?error=invalid_token").into_response()
        }
        Err(e) => {
            tracing::error!("Password reset failed: {}", e);
            Redirect::to("/forgot-password?error=invalid_token").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signin_message_known_codes() {
        assert_eq!(signin_message("credentials"), "Invalid email or password");
        assert!(signin_message("session").contains("session"));
    }

    #[test]
    fn test_signup_message_known_codes() {
        assert_eq!(signup_message("password_mismatch"), "Passwords do not match");
        assert!(signup_message("email_taken").contains("already exists"));
    }

    #[test]
    fn test_unknown_code_passes_through() {
        assert_eq!(signin_message("whatever"), "whatever");
        assert_eq!(success_message("whatever"), "whatever");
    }

    #[test]
    fn test_signin_template_renders_flash_messages() {
        let html = SigninTemplate {
            error: Some("Invalid email or password".to_string()),
            success: None,
        }
        .render()
        .unwrap();

        assert!(html.contains("Invalid email or password"));
        assert!(html.contains("action=\"/signin\""));
    }

    #[test]
    fn test_forgot_password_template_switches_on_token() {
        let request_form = ForgotPasswordTemplate {
            token: None,
            error: None,
            success: None,
        }
        .render()
        .unwrap();
        assert!(request_form.contains("Send reset link"));

        let reset_form = ForgotPasswordTemplate {
            token: Some("abc123".to_string()),
            error: None,
            success: None,
        }
        .render()
        .unwrap();
        assert!(reset_form.contains("Set new password"));
        assert!(reset_form.contains("abc123"));
    }
}
