use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, response::Response, Json};

use crate::{
    error::AppError,
    models::user::{AuthResponse, CreateUser, LoginPayload, Profile},
    response::ApiResponse,
    validation::{self, Credentials},
    AppState,
};

pub const MSG_REGISTER_SUCCESS: &str = "User registered successfully";
pub const MSG_LOGIN_SUCCESS: &str = "Login successful";

/// Registers a new identity and returns its public profile.
pub async fn register_user(state: &AppState, creds: Credentials) -> Result<Profile, AppError> {
    if state.users.exists(&creds.email).await? {
        return Err(AppError::Duplicate);
    }
    let user = state.users.create(&creds.email, &creds.password).await?;
    tracing::info!(user_id = %user.id, "new user registered: {}", user.email);
    Ok(Profile::from(&user))
}

/// Checks the credentials and issues a token. Unknown email and wrong password
/// produce the same `InvalidCredential`.
pub async fn login_user(state: &AppState, creds: Credentials) -> Result<AuthResponse, AppError> {
    let credential = state.users.find_by_email_with_credential(&creds.email).await?;
    let stored_hash = credential.as_ref().map(|c| c.password_hash.clone());

    let verified = state
        .users
        .hasher()
        .verify_async(creds.password, stored_hash)
        .await?;

    let user = match credential {
        Some(credential) if verified => credential.user,
        _ => return Err(AppError::InvalidCredential),
    };

    let token = state.tokens.issue(&user.id, &user.email)?;
    tracing::info!(user_id = %user.id, "user logged in: {}", user.email);

    Ok(AuthResponse {
        token,
        profile: Profile::from(&user),
    })
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let creds = validation::registration(&payload)?;
    let profile = register_user(&state, creds).await?;
    Ok(ApiResponse::ok(MSG_REGISTER_SUCCESS, profile).with_status(StatusCode::CREATED))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let creds = validation::login(&payload)?;
    let auth = login_user(&state, creds).await?;
    Ok(ApiResponse::ok(MSG_LOGIN_SUCCESS, auth).with_status(StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_a_verifiable_token() {
        let state = test_state().await;
        let profile = register_user(&state, creds("frank@example.com", "s3cretpw"))
            .await
            .unwrap();
        assert_eq!(profile.email, "frank@example.com");

        let auth = login_user(&state, creds("frank@example.com", "s3cretpw"))
            .await
            .unwrap();
        assert_eq!(auth.profile, profile);
        let claims = state.tokens.verify(&auth.token).unwrap();
        assert_eq!(claims.sub, profile.id);
        assert_eq!(claims.email, profile.email);
    }

    #[tokio::test]
    async fn profile_never_serializes_a_password() {
        let state = test_state().await;
        let profile = register_user(&state, creds("gina@example.com", "s3cretpw"))
            .await
            .unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("id").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(!json.to_string().contains("argon2"));
    }

    #[tokio::test]
    async fn duplicate_registration_is_reported() {
        let state = test_state().await;
        register_user(&state, creds("hank@example.com", "s3cretpw"))
            .await
            .unwrap();
        let second = register_user(&state, creds("hank@example.com", "another1")).await;
        assert!(matches!(second, Err(AppError::Duplicate)));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let state = test_state().await;
        register_user(&state, creds("ivy@example.com", "s3cretpw"))
            .await
            .unwrap();

        let wrong_password = login_user(&state, creds("ivy@example.com", "wrong-pw"))
            .await
            .unwrap_err();
        let unknown_email = login_user(&state, creds("nobody@example.com", "s3cretpw"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredential));
        assert!(matches!(unknown_email, AppError::InvalidCredential));
        assert_eq!(wrong_password.message(), unknown_email.message());
        assert_eq!(wrong_password.status(), unknown_email.status());
    }
}
