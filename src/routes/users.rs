use crate::{
    auth::{
        hash_password, issue_token, revoke_token, verify_password, AuthenticatedUser, LoginRequest,
        RegisterRequest, AUTH_HEADER,
    },
    error::AppError,
    models::{AccessTag, NewUser, UserResponse},
    state::AppState,
    store::StoreError,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Registers a new user.
///
/// Stores the bcrypt hash of the password, issues a session token and returns it in
/// the `x-auth` response header.
///
/// ## Responses:
/// - `200 OK`: body `{ "id", "email" }`, token in `x-auth`.
/// - `400 Bad Request`: invalid email, password shorter than 6, or email already registered.
/// - `500 Internal Server Error`: the store failed; the user is not kept.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let input = payload.into_inner().normalized();
    input.validate()?;

    let password_hash = hash_password(&input.password, state.bcrypt_cost)?;
    let mut user = state
        .users
        .create_user(NewUser {
            email: input.email,
            password_hash,
        })
        .await?;

    // A failed issue removes the user again so the email stays free.
    let token = match issue_token(&state.keys, state.users.as_ref(), &mut user, AccessTag::Auth)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            if let Err(cleanup) = state.users.delete_user(user.id).await {
                log::error!("failed to roll back user {}: {}", user.id, cleanup);
            }
            return Err(e.into());
        }
    };
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Ok()
        .insert_header((AUTH_HEADER, token))
        .json(UserResponse::from(&user)))
}

/// Logs a user in with email and password and issues a fresh token in `x-auth`.
///
/// Unknown email and wrong password are indistinguishable to the caller (`401`).
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let input = payload.into_inner().normalized();
    input.validate()?;

    let mut user = match state.users.find_user_by_email(&input.email).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            // Same bcrypt work as a real check; timing must not reveal registered emails.
            hash_password(&input.password, state.bcrypt_cost)?;
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = issue_token(&state.keys, state.users.as_ref(), &mut user, AccessTag::Auth).await?;

    Ok(HttpResponse::Ok()
        .insert_header((AUTH_HEADER, token))
        .json(UserResponse::from(&user)))
}

/// Returns the authenticated user.
#[get("")]
pub async fn me(auth: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(&auth.user)))
}

/// Logs out by revoking the token the request was authenticated with.
#[delete("/token")]
pub async fn logout(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    revoke_token(state.users.as_ref(), auth.user.id, &auth.token).await?;
    Ok(HttpResponse::Ok().finish())
}
