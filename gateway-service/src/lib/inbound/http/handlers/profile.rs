use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn profile(
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> ApiSuccess<ProfileResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        ProfileResponseData {
            user: (&authenticated.user).into(),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub user: UserData,
}
