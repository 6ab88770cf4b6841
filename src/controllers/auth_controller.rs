use std::sync::Arc;

use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppError;

pub struct AuthController {
    auth: Arc<AuthService>,
}

impl AuthController {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let session = self
            .auth
            .authenticate(&request.email, &request.password)
            .await?;

        Ok(LoginResponse {
            success: true,
            token: session.token,
            user: session.user.into(),
            expires_at: session.expires_at,
        })
    }
}
