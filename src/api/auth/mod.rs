//! Account endpoints: registration, email verification, login, password
//! recovery and the current user's account

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{validate_password, User};
use crate::domain::verification::VerificationPurpose;
use crate::infrastructure::email::EmailTemplate;
use crate::infrastructure::user::{AuthOutcome, RegisterRequest};

const INVALID_CODE_MESSAGE: &str = "Invalid or expired verification code";

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify", post(verify_email))
        .route("/verify/resend", post(resend_verification))
        .route("/login", post(login))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset", post(reset_password))
        .route(
            "/me",
            get(get_current_user)
                .patch(update_current_user)
                .delete(delete_current_user),
        )
        .route("/me/password", put(change_password))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    /// False when the code could not be emailed; the client may resend
    pub verification_sent: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User representation returned by the API; never includes the hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            status: user.status().as_str().to_string(),
            email_verified: user.is_email_verified(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            last_login_at: user.last_login_at(),
        }
    }
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterRequest {
            email: body.email,
            name: body.name,
            password: body.password,
        })
        .await?;

    let verification_sent = match send_code(&state, &user, VerificationPurpose::EmailVerification).await {
        Ok(()) => true,
        Err(e) => {
            warn!(user_id = %user.id(), error = %e, "Verification email not sent");
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&user),
            verification_sent,
        }),
    ))
}

/// POST /auth/verify
///
/// Confirms the address and logs the user in.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::bad_request(INVALID_CODE_MESSAGE))?;

    if user.is_email_verified() {
        return Err(ApiError::bad_request("Email is already verified"));
    }

    state
        .verification_service
        .consume(user.id(), VerificationPurpose::EmailVerification, &body.code)
        .await?;

    let user = state.user_service.mark_verified(user.id()).await?;
    info!(user_id = %user.id(), "Email verified");

    if !user.is_active() {
        return Err(account_suspended());
    }

    issue_token(&state, &user).map(Json)
}

/// POST /auth/verify/resend
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user = state
        .user_service
        .get_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::not_found("No account with that email"))?;

    if user.is_email_verified() {
        return Err(ApiError::bad_request("Email is already verified"));
    }

    send_code(&state, &user, VerificationPurpose::EmailVerification).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Verification code sent")),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError> {
    match state
        .user_service
        .authenticate(&body.email, &body.password)
        .await?
    {
        AuthOutcome::Authenticated(user) => {
            info!(user_id = %user.id(), "User logged in");
            issue_token(&state, &user).map(Json)
        }
        AuthOutcome::InvalidCredentials => {
            Err(ApiError::unauthorized("Invalid email or password"))
        }
        AuthOutcome::Unverified => Err(ApiError::forbidden("Email address is not verified")
            .with_code("email_not_verified")),
        AuthOutcome::Suspended => Err(account_suspended()),
    }
}

/// POST /auth/password/forgot
///
/// Always 202 so the response does not reveal which emails are registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailBody>,
) -> (StatusCode, Json<MessageResponse>) {
    match state.user_service.get_by_email(&body.email).await {
        Ok(Some(user)) if user.is_active() => {
            if let Err(e) = send_code(&state, &user, VerificationPurpose::PasswordReset).await {
                warn!(user_id = %user.id(), error = %e, "Password reset email not sent");
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Password reset lookup failed"),
    }

    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "If the account exists, a reset code has been sent",
        )),
    )
}

/// POST /auth/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    // reject a bad password before the code is spent
    validate_password(&body.new_password).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = state
        .user_service
        .get_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::bad_request(INVALID_CODE_MESSAGE))?;

    state
        .verification_service
        .consume(user.id(), VerificationPurpose::PasswordReset, &body.code)
        .await?;

    let user = state
        .user_service
        .set_password(user.id(), &body.new_password)
        .await?;
    info!(user_id = %user.id(), "Password reset");

    notify_password_changed(&state, &user).await;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// PATCH /auth/me
pub async fn update_current_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .update_name(user.id().as_str(), &body.name)
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /auth/me/password
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state
        .user_service
        .change_password(user.id().as_str(), &body.current_password, &body.new_password)
        .await?;
    info!(user_id = %user.id(), "Password changed");

    notify_password_changed(&state, &user).await;

    Ok(Json(MessageResponse::new("Password updated")))
}

/// DELETE /auth/me
///
/// Removes the profiles first, then the user.
pub async fn delete_current_user(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode, ApiError> {
    let profiles = state.profile_service.delete_all_for_user(user.id()).await?;
    state.user_service.delete(user.id().as_str()).await?;

    info!(user_id = %user.id(), profiles, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn issue_token(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    let issued = state.jwt_service.generate(user)?;

    Ok(TokenResponse {
        token: issued.token,
        user: UserResponse::from(user),
        expires_at: issued.expires_at,
    })
}

async fn send_code(
    state: &AppState,
    user: &User,
    purpose: VerificationPurpose,
) -> Result<(), ApiError> {
    let code = state.verification_service.issue(user.id(), purpose).await?;
    let ttl_minutes = state.verification_service.ttl().num_minutes();
    let name = user.name().to_string();
    let code = code.code().as_str().to_string();

    let template = match purpose {
        VerificationPurpose::EmailVerification => EmailTemplate::Verification {
            name,
            code,
            ttl_minutes,
        },
        VerificationPurpose::PasswordReset => EmailTemplate::PasswordReset {
            name,
            code,
            ttl_minutes,
        },
    };

    state
        .mailer
        .send(user.email(), user.name(), template)
        .await?;

    Ok(())
}

fn account_suspended() -> ApiError {
    ApiError::forbidden("Account is suspended").with_code("account_suspended")
}

async fn notify_password_changed(state: &AppState, user: &User) {
    let template = EmailTemplate::PasswordChanged {
        name: user.name().to_string(),
    };

    if let Err(e) = state.mailer.send(user.email(), user.name(), template).await {
        warn!(user_id = %user.id(), error = %e, "Password change notice not sent");
    }
}
