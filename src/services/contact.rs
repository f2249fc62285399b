use color_eyre::Result;

use crate::email::ResendEmailSender;
use crate::services::auth::EmailSender;

pub const MAX_MESSAGE_TITLE_LENGTH: usize = 255;

/// A letter from a signed-in user to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminMessage {
    pub title: String,
    pub content: String,
    /// How the user rates the site, 1 to 10.
    pub grade: u8,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    EmptyFields,
    TooLong,
    InvalidGrade,
    NotConfigured,
    SendFailed,
}

/// Who is writing.
pub struct Sender<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

pub struct ContactService<E: EmailSender = ResendEmailSender> {
    email: E,
}

impl<E: EmailSender + Clone> Clone for ContactService<E> {
    fn clone(&self) -> Self {
        Self {
            email: self.email.clone(),
        }
    }
}

impl<E: EmailSender> ContactService<E> {
    pub fn new(email: E) -> Self {
        Self { email }
    }

    pub fn enabled(&self) -> bool {
        self.email.is_enabled()
    }

    /// Validate and mail a letter to the administrator. `grade` is the raw
    /// form value.
    pub async fn write_to_admin(
        &self,
        sender: &Sender<'_>,
        title: &str,
        content: &str,
        grade: &str,
    ) -> Result<ContactOutcome> {
        let (title, content) = (title.trim(), content.trim());

        if title.is_empty() || content.is_empty() {
            return Ok(ContactOutcome::EmptyFields);
        }
        if title.chars().count() > MAX_MESSAGE_TITLE_LENGTH {
            return Ok(ContactOutcome::TooLong);
        }
        let Some(grade) = grade.trim().parse::<u8>().ok().filter(|g| (1..=10).contains(g))
        else {
            return Ok(ContactOutcome::InvalidGrade);
        };

        if !self.email.is_enabled() {
            return Ok(ContactOutcome::NotConfigured);
        }

        let message = AdminMessage {
            title: title.to_string(),
            content: content.to_string(),
            grade,
        };

        match self
            .email
            .send_admin_message(sender.username, sender.email, &message)
            .await
        {
            Ok(()) => Ok(ContactOutcome::Sent),
            Err(e) => {
                tracing::error!("failed to forward message from {}: {e}", sender.username);
                Ok(ContactOutcome::SendFailed)
            }
        }
    }
}
