//! Login, logout and public signup form handlers.
//!
//! Every handler answers with a redirect. Failures land back on the form
//! with an `error` code in the query string.

use axum::extract::{Multipart, State};
use axum::response::Response;
use axum::Form;
use bytes::Bytes;
use him_client::pages::SignupPage;
use him_client::{Credentials, LoginError, Mount, Mutation};
use him_shared::constants::{COOKIE_LOGIN_DEV_OTP, COOKIE_LOGIN_PHONE};
use him_shared::protocol::{blank_to_none, HelperKycSignup, Upload};
use him_shared::{ErrorCode, LoginStep, Route};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::AppState;
use crate::error::ServerError;
use crate::session::RequestSession;

const OTP_STEP: Route = Route::Login {
    step: LoginStep::Otp,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhoneForm {
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpForm {
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub email: String,
    pub password: String,
}

pub async fn start_otp(
    State(state): State<AppState>,
    mut session: RequestSession,
    Form(form): Form<PhoneForm>,
) -> Response {
    let result = session.store().start_otp(&form.phone).await;
    let challenge = match result {
        Ok(challenge) => challenge,
        Err(e) => return session.redirect(&Route::LOGIN.with_error(&e.code())),
    };

    session.set_login_cookie(COOKIE_LOGIN_PHONE, &challenge.phone);
    match challenge.dev_otp.filter(|_| state.config.dev_show_otp) {
        Some(otp) => session.set_login_cookie(COOKIE_LOGIN_DEV_OTP, &otp),
        None => session.remove_login_cookie(COOKIE_LOGIN_DEV_OTP),
    }
    session.redirect(&OTP_STEP.location())
}

pub async fn verify_otp(mut session: RequestSession, Form(form): Form<OtpForm>) -> Response {
    let Some(phone) = session.cookie(COOKIE_LOGIN_PHONE).map(str::to_string) else {
        return session.redirect(&Route::LOGIN.with_error(&ErrorCode::MissingPhone));
    };

    let credentials = Credentials::Otp {
        phone,
        otp: form.otp,
    };
    let result = session.store_mut().login(credentials).await.map(drop);
    if let Err(e) = result {
        return session.redirect(&OTP_STEP.with_error(&login_code(&e)));
    }

    session.remove_login_cookie(COOKIE_LOGIN_PHONE);
    session.remove_login_cookie(COOKIE_LOGIN_DEV_OTP);
    session.redirect(&Route::Dashboard.location())
}

pub async fn password_login(
    mut session: RequestSession,
    Form(form): Form<PasswordForm>,
) -> Response {
    let credentials = Credentials::Password {
        email: form.email,
        password: form.password,
    };
    let result = session.store_mut().login(credentials).await.map(drop);
    match result {
        Ok(()) => session.redirect(&Route::Dashboard.location()),
        Err(e) => session.redirect(&Route::LOGIN.with_error(&login_code(&e))),
    }
}

pub async fn logout(mut session: RequestSession) -> Response {
    if let Err(e) = session.store_mut().logout() {
        warn!(error = %e, "failed to clear session cookies");
    }
    session.redirect(&Route::LOGIN.location())
}

fn login_code(error: &LoginError) -> ErrorCode {
    warn!(error = %error, "admin login failed");
    error.code()
}

// ─── Signup ───

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuyerSignupForm {
    pub email: String,
    pub password: String,
    pub phone: String,
    pub display_name: String,
}

pub async fn signup_buyer(session: RequestSession, Form(form): Form<BuyerSignupForm>) -> Response {
    let (mount, _handle) = Mount::new();
    let mut page = SignupPage::open();
    let outcome = page
        .signup_buyer(
            session.store(),
            &mount,
            &form.email,
            &form.password,
            &form.phone,
            &form.display_name,
        )
        .await;
    finish_signup(session, outcome, "buyer")
}

pub async fn signup_helper(
    session: RequestSession,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let signup = read_helper_signup(multipart).await?;
    let (mount, _handle) = Mount::new();
    let mut page = SignupPage::open();
    let outcome = page.signup_helper(session.store(), &mount, signup).await;
    Ok(finish_signup(session, outcome, "helper"))
}

fn finish_signup(session: RequestSession, outcome: Mutation, kind: &str) -> Response {
    match outcome {
        Mutation::Applied => session.redirect(&Route::Signup.with_query("success", kind)),
        Mutation::Failed(code) => session.redirect(&Route::Signup.with_error(&code)),
        _ => session.redirect(&Route::Signup.location()),
    }
}

/// Collect the helper signup form. Unknown parts are ignored and missing
/// files stay empty, which the signup page reports as incomplete.
async fn read_helper_signup(mut multipart: Multipart) -> Result<HelperKycSignup, ServerError> {
    let mut signup = HelperKycSignup {
        email: String::new(),
        password: String::new(),
        phone: None,
        display_name: None,
        full_name: String::new(),
        id_number: String::new(),
        id_front: Upload::new("", Bytes::new()),
        id_back: Upload::new("", Bytes::new()),
        selfie: Upload::new("", Bytes::new()),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "idFront" | "idBack" | "selfie" => {
                let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
                let upload = Upload {
                    file_name,
                    content_type,
                    bytes,
                };
                match name.as_str() {
                    "idFront" => signup.id_front = upload,
                    "idBack" => signup.id_back = upload,
                    _ => signup.selfie = upload,
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "email" => signup.email = value.trim().to_string(),
                    "password" => signup.password = value.trim().to_string(),
                    "phone" => signup.phone = blank_to_none(&value),
                    "displayName" => signup.display_name = blank_to_none(&value),
                    "fullName" => signup.full_name = value.trim().to_string(),
                    "idNumber" => signup.id_number = value.trim().to_string(),
                    other => info!(field = other, "ignoring unknown signup field"),
                }
            }
        }
    }

    Ok(signup)
}
