//! JWT authentication: token issuance, bcrypt credential checks and the
//! `AuthUser`/`AdminUser` extractors that gate protected routes.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    Form, Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::catalog::ProjectRole;
use crate::models::user::{User, UserSkill};
use crate::state::AppState;

/// JWT payload. `sub` is the user's sso_id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

pub fn create_access_token(
    secret: &str,
    expire_minutes: i64,
    sso_id: &str,
    role: &str,
) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::minutes(expire_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: sso_id.to_string(),
        role: role.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
}

/// Decodes and validates a bearer token (HS256, exp checked).
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// The authenticated user behind the request's bearer token.
pub struct AuthUser(pub User);

/// An authenticated user with the "Admin" role.
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        let claims = decode_token(token, &state.config.jwt_secret)?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE sso_id = $1")
            .bind(&claims.sub)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != "Admin" {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub sso_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub current_project_role: Option<ProjectRole>,
    pub user_skills: Vec<UserSkill>,
}

/// POST /token — OAuth2-style form login. `username` is the sso_id.
pub async fn handle_login(
    State(state): State<AppState>,
    Form(form): Form<LoginRequest>,
) -> Result<Json<Token>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE sso_id = $1")
        .bind(&form.username)
        .fetch_optional(&state.db)
        .await?;

    let user = match user {
        Some(user) if verify_password(&form.password, &user.hashed_password) => user,
        _ => {
            warn!("Failed login attempt for '{}'", form.username);
            return Err(AppError::Unauthorized);
        }
    };

    sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
        .bind(user.id)
        .execute(&state.db)
        .await?;

    let access_token = create_access_token(
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
        &user.sso_id,
        &user.role,
    )?;
    info!("Issued token for user {}", user.sso_id);
    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /register — self-service signup; new accounts are Developers.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE sso_id = $1")
        .bind(&req.sso_id)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation("SSO ID already registered".to_string()));
    }

    let hashed = hash_password(&req.password)?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (sso_id, email, first_name, last_name, hashed_password, role)
        VALUES ($1, $2, $3, $4, $5, 'Developer')
        RETURNING *
        "#,
    )
    .bind(&req.sso_id)
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(hashed)
    .fetch_one(&state.db)
    .await?;

    info!("Registered user {}", user.sso_id);
    Ok(Json(user))
}

/// POST /refresh — reissues a token for the current bearer.
pub async fn handle_refresh(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Token>, AppError> {
    let access_token = create_access_token(
        &state.config.jwt_secret,
        state.config.access_token_expire_minutes,
        &user.sso_id,
        &user.role,
    )?;
    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /users/me — the current user with role and skill associations.
pub async fn handle_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let current_project_role = match user.current_project_role_id {
        Some(role_id) => {
            sqlx::query_as::<_, ProjectRole>("SELECT * FROM project_roles WHERE id = $1")
                .bind(role_id)
                .fetch_optional(&state.db)
                .await?
        }
        None => None,
    };
    let user_skills =
        sqlx::query_as::<_, UserSkill>("SELECT * FROM user_skills WHERE user_id = $1 ORDER BY id")
            .bind(user.id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(MeResponse {
        user,
        current_project_role,
        user_skills,
    }))
}

/// GET /admin/me — identity check for admin dashboards.
pub async fn handle_admin_me(AdminUser(user): AdminUser) -> Json<User> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_access_token(SECRET, 30, "E123", "Developer").unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "E123");
        assert_eq!(claims.role, "Developer");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_access_token(SECRET, 30, "E123", "Developer").unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_access_token(SECRET, -5, "E123", "Developer").unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(decode_token("not.a.jwt", SECRET).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hashed = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_verify_password_tolerates_bad_hash() {
        assert!(!verify_password("password123", "not-a-bcrypt-hash"));
    }
}
