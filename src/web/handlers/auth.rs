//! Authentication handlers.

use axum::{extract::State, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::db::{Database, NewUser, UserRepository};
use crate::record::{FileService, FileStorage};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MeResponse, RegisterRequest, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};
use crate::{hash_password, validate_password, verify_password};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Blob storage for file contents.
    pub storage: FileStorage,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Maximum upload size per file in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Arc<Database>,
        storage: FileStorage,
        jwt_secret: &str,
        access_token_expiry: u64,
        max_upload_size: u64,
    ) -> Self {
        Self {
            db,
            storage,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry,
            max_upload_size,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// File service bound to this state's pool and storage.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(self.db.pool(), &self.storage, self.max_upload_size)
    }
}

/// POST /auth/register - Create an account and its root folder.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = LoginResponse),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    validate_password(&req.password)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to create account")
    })?;

    let users = UserRepository::new(state.db.pool());
    let mut new_user = NewUser::new(&req.username, &password_hash);
    if let Some(ref email) = req.email {
        new_user = new_user.with_email(email);
    }

    let user = users.create(&new_user).await.map_err(|e| {
        if matches!(e, crate::CabinetError::Conflict(_)) {
            ApiError::conflict("Username already taken")
        } else {
            tracing::error!("Failed to create user: {}", e);
            ApiError::internal("Failed to create account")
        }
    })?;

    // Every account starts with its own root folder.
    state.file_service().ensure_root(user.id).await?;

    let access_token = state.generate_access_token(user.id, &user.username)?;

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    })))
}

/// POST /auth/login - User login.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    let user = users
        .get_by_username(&req.username)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let access_token = state.generate_access_token(user.id, &user.username)?;

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        expires_in: state.access_token_expiry,
        user: UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    })))
}

/// GET /auth/me - Current user.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    let user = users
        .get_by_id(claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user: {}", e);
            ApiError::internal("Failed to load user")
        })?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(Json(ApiResponse::new(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: crate::datetime::to_rfc3339(&user.created_at),
    })))
}
