/*
 * Responsibility
 * - GET /users/me: principal (email) を所有者キーに本人の users 行を返す
 * - GET /users/{user_id}: id / username で公開プロフィールを返す (公開カラムのみ)
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{
        dto::users::{PublicUserResponse, UserResponse},
        extractors::CurrentPrincipal,
    },
    error::AppError,
    repos::user_repo,
    state::AppState,
};

pub async fn get_me(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::find_by_email(&state.db, &principal.id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(row)))
}

// user_id は id / username のどちらでもよい
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicUserResponse>, AppError> {
    let row = user_repo::find_by_id_or_username(&state.db, &user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(PublicUserResponse::from(row)))
}
