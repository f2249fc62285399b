use color_eyre::Result;

use crate::db::models::{Activation, AuthUser, UserConflict};
use crate::db::Db;
use crate::email::ResendEmailSender;
use crate::models::NewUser;
use crate::services::contact::AdminMessage;
use crate::services::submission::SubmissionKind;

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn username_exists(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn email_exists(&self, email: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_user(
        &self,
        user: &NewUser,
        is_admin: bool,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn create_unverified_user(
        &self,
        user: &NewUser,
    ) -> impl std::future::Future<Output = Result<(i64, String)>> + Send;

    fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn is_user_active(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<AuthUser>>> + Send;

    fn activate_user(
        &self,
        email: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Activation>> + Send;

    fn create_user_session(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn delete_user_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn record_login(&self, user_id: i64) -> impl std::future::Future<Output = Result<()>> + Send;

    fn update_user_names(
        &self,
        user_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn create_password_reset_token(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    fn validate_password_reset_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

impl AuthRepository for Db {
    async fn username_exists(&self, username: &str) -> Result<bool> {
        Db::username_exists(self, username).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Db::email_exists(self, email).await
    }

    async fn create_user(&self, user: &NewUser, is_admin: bool) -> Result<i64> {
        Db::create_user(self, user, is_admin).await
    }

    async fn create_unverified_user(&self, user: &NewUser) -> Result<(i64, String)> {
        Db::create_unverified_user(self, user).await
    }

    async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        Db::verify_user_password(self, username, password).await
    }

    async fn is_user_active(&self, username: &str) -> Result<bool> {
        Db::is_user_active(self, username).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>> {
        Db::find_user_by_username(self, username).await
    }

    async fn activate_user(&self, email: &str, key: &str) -> Result<Activation> {
        Db::activate_user(self, email, key).await
    }

    async fn create_user_session(&self, user_id: i64) -> Result<String> {
        Db::create_user_session(self, user_id).await
    }

    async fn delete_user_session(&self, session_id: &str) -> Result<()> {
        Db::delete_user_session(self, session_id).await
    }

    async fn record_login(&self, user_id: i64) -> Result<()> {
        Db::record_login(self, user_id).await
    }

    async fn update_user_names(&self, user_id: i64, first_name: &str, last_name: &str) -> Result<()> {
        Db::update_user_names(self, user_id, first_name, last_name).await
    }

    async fn create_password_reset_token(&self, email: &str) -> Result<Option<String>> {
        Db::create_password_reset_token(self, email).await
    }

    async fn validate_password_reset_token(&self, token: &str) -> Result<Option<String>> {
        Db::validate_password_reset_token(self, token).await
    }

    async fn reset_password_with_token(&self, token: &str, new_password: &str) -> Result<bool> {
        Db::reset_password_with_token(self, token, new_password).await
    }
}

// ---------------------------------------------------------------------------
// EmailSender trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait EmailSender: Send + Sync {
    /// Whether email sending is configured (false in dev mode).
    fn is_enabled(&self) -> bool;

    fn send_verification_email(
        &self,
        to_email: &str,
        username: &str,
        verification_url: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_url: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Tell the administrator mailbox that something awaits moderation.
    fn send_submission_notice(
        &self,
        kind: SubmissionKind,
        author: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Forward a user's letter to the administrator mailbox.
    fn send_admin_message(
        &self,
        from_username: &str,
        from_email: &str,
        message: &AdminMessage,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Username,
    FirstName,
    LastName,
}

pub enum RegisterOutcome {
    /// User created and session started (dev mode, no email verification).
    LoggedIn(String),
    /// Inactive user created, activation email sent (prod mode).
    VerificationSent(String),
    /// Inactive user created, but the activation email could not be sent.
    VerificationEmailFailed(String),
    /// Required fields were empty.
    EmptyFields,
    /// A name is too short or consists of digits only.
    InvalidName(NameField),
    UsernameTaken,
    EmailTaken,
    /// Password does not meet minimum requirements.
    WeakPassword,
    PasswordMismatch,
}

pub enum LoginOutcome {
    /// Login succeeded. Contains the session token.
    Success(String),
    /// Password was incorrect (or username not found).
    InvalidCredentials,
    /// Credentials correct but the account has not been activated.
    Inactive,
}

pub enum VerifyOutcome {
    /// Account activated and logged in. Contains the session token.
    LoggedIn(String),
    Expired,
    Invalid,
}

pub enum ResetPasswordOutcome {
    Success,
    EmptyPassword,
    WeakPassword,
    PasswordMismatch,
    InvalidToken,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ProfileEditOutcome {
    Saved,
    EmptyFields,
    InvalidName(NameField),
}

#[derive(Debug, PartialEq, Eq)]
pub enum CreateAdminOutcome {
    Created(i64),
    EmptyFields,
    WeakPassword,
    UsernameTaken,
    EmailTaken,
}

const MIN_PASSWORD_LENGTH: usize = 8;
const MIN_NAME_LENGTH: usize = 4;

/// Names must be longer than three characters and not just a number.
fn name_is_valid(name: &str) -> bool {
    name.chars().count() >= MIN_NAME_LENGTH && !name.chars().all(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

pub struct AuthService<R: AuthRepository = Db, E: EmailSender = ResendEmailSender> {
    repo: R,
    email: E,
    base_url: String,
}

impl<R: AuthRepository + Clone, E: EmailSender + Clone> Clone for AuthService<R, E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            email: self.email.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl<R: AuthRepository, E: EmailSender> AuthService<R, E> {
    pub fn new(repo: R, email: E, base_url: String) -> Self {
        Self {
            repo,
            email,
            base_url,
        }
    }

    /// Whether email verification is enabled (production mode).
    pub fn email_enabled(&self) -> bool {
        self.email.is_enabled()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let username = username.trim();
        let verified = self.repo.verify_user_password(username, password).await?;

        if !verified {
            tracing::warn!("failed login attempt for '{username}'");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        if !self.repo.is_user_active(username).await? {
            return Ok(LoginOutcome::Inactive);
        }

        let user = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| color_eyre::eyre::eyre!("user not found after password verification"))?;

        let session_token = self.repo.create_user_session(user.id).await?;
        self.repo.record_login(user.id).await?;

        Ok(LoginOutcome::Success(session_token))
    }

    pub async fn register(&self, user: &NewUser, password_confirm: &str) -> Result<RegisterOutcome> {
        let user = NewUser {
            username: user.username.trim().to_string(),
            email: user.email.trim().to_string(),
            first_name: user.first_name.trim().to_string(),
            last_name: user.last_name.trim().to_string(),
            password: user.password.clone(),
        };

        if user.username.is_empty()
            || user.email.is_empty()
            || user.first_name.is_empty()
            || user.last_name.is_empty()
            || user.password.is_empty()
        {
            return Ok(RegisterOutcome::EmptyFields);
        }

        for (field, value) in [
            (NameField::Username, &user.username),
            (NameField::FirstName, &user.first_name),
            (NameField::LastName, &user.last_name),
        ] {
            if !name_is_valid(value) {
                return Ok(RegisterOutcome::InvalidName(field));
            }
        }

        if user.password.len() < MIN_PASSWORD_LENGTH {
            return Ok(RegisterOutcome::WeakPassword);
        }

        if user.password != password_confirm {
            return Ok(RegisterOutcome::PasswordMismatch);
        }

        if self.repo.username_exists(&user.username).await? {
            return Ok(RegisterOutcome::UsernameTaken);
        }

        if self.repo.email_exists(&user.email).await? {
            return Ok(RegisterOutcome::EmailTaken);
        }

        if !self.email_enabled() {
            // Dev mode: create an active user and log in immediately
            let user_id = match self.repo.create_user(&user, false).await {
                Ok(id) => id,
                Err(e) => return taken_outcome(e),
            };
            let session_token = self.repo.create_user_session(user_id).await?;
            self.repo.record_login(user_id).await?;
            return Ok(RegisterOutcome::LoggedIn(session_token));
        }

        // Prod mode: create inactive user and send the activation link
        let key = match self.repo.create_unverified_user(&user).await {
            Ok((_user_id, key)) => key,
            Err(e) => return taken_outcome(e),
        };

        let verification_url = crate::names::verify_url(&self.base_url, &user.email, &key);

        if let Err(e) = self
            .email
            .send_verification_email(&user.email, &user.username, &verification_url)
            .await
        {
            tracing::error!("failed to send verification email to {}: {e}", user.email);
            return Ok(RegisterOutcome::VerificationEmailFailed(user.email));
        }

        Ok(RegisterOutcome::VerificationSent(user.email))
    }

    pub async fn verify(&self, email: &str, key: &str) -> Result<VerifyOutcome> {
        match self.repo.activate_user(email, key).await? {
            Activation::Activated(user_id) => {
                let session_token = self.repo.create_user_session(user_id).await?;
                self.repo.record_login(user_id).await?;
                Ok(VerifyOutcome::LoggedIn(session_token))
            }
            Activation::Expired => Ok(VerifyOutcome::Expired),
            Activation::Invalid => Ok(VerifyOutcome::Invalid),
        }
    }

    pub async fn logout(&self, session_id: &str) -> Result<()> {
        self.repo.delete_user_session(session_id).await
    }

    /// Mail a reset link if the address belongs to an active account.
    /// Returns false when email is not configured; otherwise true, whether
    /// or not the address is known.
    pub async fn forgot_password(&self, email: &str) -> Result<bool> {
        if !self.email_enabled() {
            return Ok(false);
        }

        let email = email.trim();
        let token = self.repo.create_password_reset_token(email).await?;

        if let Some(token) = token {
            let reset_url = crate::names::reset_password_url(&self.base_url, &token);
            if let Err(e) = self
                .email
                .send_password_reset_email(email, &reset_url)
                .await
            {
                tracing::error!("failed to send password reset email to {email}: {e}");
            }
        } else {
            tracing::warn!("password reset requested for unknown or inactive email {email}");
        }

        Ok(true)
    }

    pub async fn validate_reset_token(&self, token: &str) -> Result<bool> {
        let email = self.repo.validate_password_reset_token(token).await?;
        Ok(email.is_some())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        password_confirm: &str,
    ) -> Result<ResetPasswordOutcome> {
        if new_password.is_empty() {
            return Ok(ResetPasswordOutcome::EmptyPassword);
        }

        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Ok(ResetPasswordOutcome::WeakPassword);
        }

        if new_password != password_confirm {
            return Ok(ResetPasswordOutcome::PasswordMismatch);
        }

        let success = self
            .repo
            .reset_password_with_token(token, new_password)
            .await?;

        if success {
            Ok(ResetPasswordOutcome::Success)
        } else {
            Ok(ResetPasswordOutcome::InvalidToken)
        }
    }

    /// Change the first and last name shown on the profile.
    pub async fn edit_profile(
        &self,
        user_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<ProfileEditOutcome> {
        let (first_name, last_name) = (first_name.trim(), last_name.trim());

        if first_name.is_empty() || last_name.is_empty() {
            return Ok(ProfileEditOutcome::EmptyFields);
        }
        if !name_is_valid(first_name) {
            return Ok(ProfileEditOutcome::InvalidName(NameField::FirstName));
        }
        if !name_is_valid(last_name) {
            return Ok(ProfileEditOutcome::InvalidName(NameField::LastName));
        }

        self.repo
            .update_user_names(user_id, first_name, last_name)
            .await?;
        Ok(ProfileEditOutcome::Saved)
    }

    /// Create an active administrator (the `create-admin` command).
    pub async fn create_admin(&self, user: &NewUser) -> Result<CreateAdminOutcome> {
        let user = NewUser {
            username: user.username.trim().to_string(),
            email: user.email.trim().to_string(),
            first_name: user.first_name.trim().to_string(),
            last_name: user.last_name.trim().to_string(),
            password: user.password.clone(),
        };

        if user.username.is_empty() || user.email.is_empty() || user.password.is_empty() {
            return Ok(CreateAdminOutcome::EmptyFields);
        }
        if user.password.len() < MIN_PASSWORD_LENGTH {
            return Ok(CreateAdminOutcome::WeakPassword);
        }
        if self.repo.username_exists(&user.username).await? {
            return Ok(CreateAdminOutcome::UsernameTaken);
        }
        if self.repo.email_exists(&user.email).await? {
            return Ok(CreateAdminOutcome::EmailTaken);
        }

        match self.repo.create_user(&user, true).await {
            Ok(id) => Ok(CreateAdminOutcome::Created(id)),
            Err(e) => match e.downcast_ref::<UserConflict>() {
                Some(UserConflict::Username) => Ok(CreateAdminOutcome::UsernameTaken),
                Some(UserConflict::Email) => Ok(CreateAdminOutcome::EmailTaken),
                None => Err(e),
            },
        }
    }
}

/// A registration that lost the race for a username or email.
fn taken_outcome(err: color_eyre::Report) -> Result<RegisterOutcome> {
    match err.downcast_ref::<UserConflict>() {
        Some(UserConflict::Username) => Ok(RegisterOutcome::UsernameTaken),
        Some(UserConflict::Email) => Ok(RegisterOutcome::EmailTaken),
        None => Err(err),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
