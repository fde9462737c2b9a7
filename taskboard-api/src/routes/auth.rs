/// Authentication routes
///
/// Registration, login, and the two-step password-reset flow. These are
/// the only routes that mint session credentials; everything else
/// consumes them through the auth middleware.
///
/// # Security
///
/// - Login failures never distinguish "no such account" from "wrong
///   password"
/// - Forgot-password always answers with the same generic message so
///   responses cannot be used to probe for registered emails
/// - Reset tokens are single-use and expire after one hour

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::{
    jwt::{create_token, Claims},
    password::{hash_password, verify_password},
};
use taskboard_shared::models::user::{CreateUser, User};
use tracing::{info, warn};
use validator::Validate;

/// Request body for POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request body for POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for POST /api/auth/forgot-password
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address the reset link should be sent to
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Request body for POST /api/auth/reset-password
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Reset token from the emailed link
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    /// New plaintext password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed session credential
    pub token: String,

    /// The authenticated user (password hash never serialized)
    pub user: User,
}

/// Generic acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

/// POST /api/auth/register
///
/// Creates an account and returns a session credential immediately, so
/// registration doubles as the first login.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    body.validate()?;

    if User::email_taken(&state.db, &body.email).await? {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&body.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: body.name,
            email: body.email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, "User registered");

    let token = session_token(&state, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login
///
/// # Errors
///
/// Unknown email and wrong password both map to the same 401 message.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    body.validate()?;

    let user = User::find_by_email(&state.db, &body.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    info!(user_id = user.id, "User logged in");

    let token = session_token(&state, &user)?;
    Ok(Json(AuthResponse { token, user }))
}

/// POST /api/auth/forgot-password
///
/// Issues a single-use reset token and emails a reset link. Responds
/// with the same generic message whether or not the email is
/// registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    body.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &body.email).await? {
        let token = state.reset_tokens.issue(user.id);
        let reset_url = format!(
            "{}/reset-password?token={}",
            state.config.api.frontend_url.trim_end_matches('/'),
            token
        );

        // Delivery failures are logged only; the response stays generic.
        if let Err(err) = state
            .mailer
            .send_reset_email(&user.email, &user.name, &reset_url)
            .await
        {
            warn!(user_id = user.id, error = %err, "Reset email delivery failed");
        }
    }

    Ok(Json(MessageResponse {
        message: "If that email is registered, a reset link has been sent".to_string(),
    }))
}

/// POST /api/auth/reset-password
///
/// Consumes a reset token and replaces the account password. The token
/// is gone after this call regardless of which user retries.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    body.validate()?;

    let user_id = state.reset_tokens.consume(&body.token)?;

    let password_hash = hash_password(&body.new_password)?;
    let updated = User::update_password(&state.db, user_id, &password_hash).await?;

    if !updated {
        // Token outlived its account (deleted between issue and use).
        return Err(ApiError::BadRequest("Reset token is invalid".to_string()));
    }

    info!(user_id, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

/// Mints a session credential for a user with the configured TTL
fn session_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let ttl = Duration::days(state.config.jwt.session_ttl_days);
    let claims = Claims::with_ttl(user.id, user.email.clone(), ttl);
    Ok(create_token(&claims, state.jwt_secret())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Jordan".to_string(),
            email: "jordan@example.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid_request()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid_request()
        };
        assert!(short_password.validate().is_err());

        let empty_name = RegisterRequest {
            name: String::new(),
            ..valid_request()
        };
        assert!(empty_name.validate().is_err());
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            name: "Jordan".to_string(),
            email: "jordan@example.com".to_string(),
            password: "longenough".to_string(),
        }
    }

    #[test]
    fn test_reset_password_requires_minimum_length() {
        let request = ResetPasswordRequest {
            token: "a".repeat(64),
            new_password: "short".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_reset_password_body_field_names() {
        let request: ResetPasswordRequest =
            serde_json::from_str(r#"{"token": "abc", "new_password": "longenough"}"#).unwrap();
        assert_eq!(request.token, "abc");
        assert_eq!(request.new_password, "longenough");

        // The old field name must not be accepted silently.
        let missing = serde_json::from_str::<ResetPasswordRequest>(
            r#"{"token": "abc", "password": "longenough"}"#,
        );
        assert!(missing.is_err());
    }

    #[test]
    fn test_auth_response_omits_password_hash() {
        use chrono::Utc;

        let response = AuthResponse {
            token: "jwt".to_string(),
            user: User {
                id: 1,
                name: "Jordan".to_string(),
                email: "jordan@example.com".to_string(),
                password_hash: "$argon2id$secret".to_string(),
                profile_image: None,
                created_at: Utc::now(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["user"].get("password_hash").is_none());
        assert_eq!(json["token"], "jwt");
    }
}
