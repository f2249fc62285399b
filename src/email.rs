use color_eyre::Result;
use maud::html;
use serde::Serialize;

use crate::services::auth::EmailSender;
use crate::services::contact::AdminMessage;
use crate::services::submission::SubmissionKind;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const FROM_ADDRESS: &str = "Interview Quiz <noreply@interview-quiz.local>";

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

/// Sends mail through the Resend HTTP API. Without an API key every send is
/// skipped and `is_enabled` reports false (development mode).
#[derive(Clone)]
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: Option<String>,
    admin_email: Option<String>,
}

impl ResendEmailSender {
    pub fn new(api_key: Option<String>, admin_email: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            admin_email: admin_email.filter(|e| !e.is_empty()),
        }
    }

    /// A sender that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    async fn send(&self, to: &str, subject: String, html: String) -> Result<()> {
        let Some(api_key) = &self.api_key else {
            tracing::debug!("email disabled, not sending '{subject}' to {to}");
            return Ok(());
        };

        let body = SendEmailRequest {
            from: FROM_ADDRESS.to_string(),
            to: vec![to.to_string()],
            subject,
            html,
        };

        let resp = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("Resend API error: {status} - {text}");
            color_eyre::eyre::bail!("Resend API returned {status}");
        }

        Ok(())
    }
}

impl EmailSender for ResendEmailSender {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_verification_email(
        &self,
        to_email: &str,
        username: &str,
        verification_url: &str,
    ) -> Result<()> {
        let html = html! {
            h2 { "Welcome to Interview Quiz, " (username) "!" }
            p { "Click the link below to activate your account:" }
            p { a href=(verification_url) { (verification_url) } }
            p { "This link expires in 48 hours." }
        }
        .into_string();

        self.send(to_email, "Confirm your Interview Quiz registration".to_string(), html)
            .await?;

        tracing::info!("verification email sent to {to_email}");
        Ok(())
    }

    async fn send_password_reset_email(&self, to_email: &str, reset_url: &str) -> Result<()> {
        let html = html! {
            h2 { "Password reset" }
            p { "Someone asked to reset the password of your Interview Quiz account." }
            p { "Click the link below to choose a new password:" }
            p { a href=(reset_url) { (reset_url) } }
            p { "This link expires in 1 hour. If you did not ask for it, ignore this email." }
        }
        .into_string();

        self.send(to_email, "Reset your Interview Quiz password".to_string(), html)
            .await?;

        tracing::info!("password reset email sent to {to_email}");
        Ok(())
    }

    async fn send_submission_notice(
        &self,
        kind: SubmissionKind,
        author: &str,
        title: &str,
    ) -> Result<()> {
        let Some(admin_email) = &self.admin_email else {
            tracing::debug!("no admin mailbox configured, skipping submission notice");
            return Ok(());
        };

        let what = match kind {
            SubmissionKind::Question => "question",
            SubmissionKind::Post => "post",
        };
        let html = html! {
            h2 { "A new " (what) " is waiting for moderation" }
            p { "User " strong { (author) } " proposed: " (title) }
            p { "Review it in the admin panel." }
        }
        .into_string();

        self.send(admin_email, format!("New {what} proposed"), html)
            .await?;

        tracing::info!("submission notice sent for {what} by {author}");
        Ok(())
    }

    async fn send_admin_message(
        &self,
        from_username: &str,
        from_email: &str,
        message: &AdminMessage,
    ) -> Result<()> {
        let Some(admin_email) = &self.admin_email else {
            color_eyre::eyre::bail!("no admin mailbox configured");
        };

        let html = html! {
            h2 { (message.title) }
            p { "From " strong { (from_username) } " <" (from_email) ">" }
            p { "Grade: " (message.grade) "/10" }
            p { (message.content) }
        }
        .into_string();

        self.send(admin_email, format!("Message from {from_username}: {}", message.title), html)
            .await?;

        tracing::info!("message from {from_username} forwarded to the admin mailbox");
        Ok(())
    }
}
