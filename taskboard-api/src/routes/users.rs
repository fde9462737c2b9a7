/// User routes
///
/// The user directory endpoints: the assignee picker listing and the
/// avatar upload. Both require an authenticated session.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use taskboard_shared::models::user::User;
use tracing::info;

/// GET /api/users
///
/// Lists every registered user ordered by display name, for the
/// assignee picker. Password hashes are never serialized.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users))
}

/// PATCH /api/users/me/profile-image
///
/// Accepts a multipart upload with one `image` part, forwards the bytes
/// to the media host, and stores the returned public URL on the
/// authenticated user. Replaces any previous avatar.
///
/// # Errors
///
/// - 400 if the part is missing or not an image
/// - 413 for bodies over the configured size limit (enforced by the
///   router's body limit layer)
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> ApiResult<Json<User>> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);

        if !is_image {
            return Err(ApiError::BadRequest(
                "Only image uploads are accepted".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        image = Some(bytes.to_vec());
        break;
    }

    let bytes = image.ok_or_else(|| {
        ApiError::BadRequest("Multipart field 'image' is required".to_string())
    })?;

    let url = state.media.upload_avatar(current_user.id, bytes).await?;
    User::update_profile_image(&state.db, current_user.id, &url).await?;

    let user = User::find_by_id(&state.db, current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = user.id, "Profile image updated");
    Ok(Json(user))
}
