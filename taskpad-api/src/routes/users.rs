/// Profile endpoints for the authenticated user
///
/// - `GET /v1/users/me`
/// - `PUT /v1/users/me`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use taskpad_shared::{
    auth::middleware::AuthContext,
    models::user::{UpdateProfile, UserProfile},
    store::{Store, StoreTx},
};
use tracing::info;
use validator::{Validate, ValidationError};

/// Profile changes; omitted fields are left alone, empty strings clear them
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 50, message = "Timezone must be at most 50 characters"))]
    pub timezone: Option<String>,

    #[validate(custom(function = "validate_theme"))]
    pub theme_preference: Option<String>,
}

fn validate_theme(theme: &str) -> Result<(), ValidationError> {
    match theme.trim() {
        "" | "dark" | "light" => Ok(()),
        _ => {
            let mut err = ValidationError::new("theme");
            err.message = Some("Theme must be 'dark' or 'light'".into());
            Err(err)
        }
    }
}

pub async fn get_profile<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let mut tx = state.store.begin().await?;
    let user = tx
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}

pub async fn update_profile<S: Store>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let mut tx = state.store.begin().await?;
    let mut user = tx
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    user.apply_profile(UpdateProfile {
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        location: req.location,
        timezone: req.timezone,
        theme_preference: req.theme_preference,
    });

    if !tx.update_user(&user).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    tx.commit().await?;

    info!(user_id = %user.id, "Profile updated");
    Ok(Json(UserProfile::from(&user)))
}
