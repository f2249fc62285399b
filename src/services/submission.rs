use color_eyre::Result;

use crate::db::models::Category;
use crate::db::Db;
use crate::email::ResendEmailSender;
use crate::models::{normalize_tag, NewPost, NewQuestion};
use crate::services::auth::EmailSender;

pub const MAX_QUESTION_LENGTH: usize = 250;
pub const MAX_ANSWER_LENGTH: usize = 150;
pub const MAX_TITLE_LENGTH: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Question,
    Post,
}

#[cfg_attr(test, mockall::automock)]
pub trait SubmissionRepository: Send + Sync {
    fn get_category(
        &self,
        category_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Category>>> + Send;

    fn create_question(
        &self,
        author_id: i64,
        question: &NewQuestion,
        available: bool,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn create_post(
        &self,
        author_id: i64,
        post: &NewPost,
        available: bool,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;
}

impl SubmissionRepository for Db {
    async fn get_category(&self, category_id: i64) -> Result<Option<Category>> {
        Db::get_category(self, category_id).await
    }

    async fn create_question(
        &self,
        author_id: i64,
        question: &NewQuestion,
        available: bool,
    ) -> Result<i64> {
        Db::create_question(self, author_id, question, available).await
    }

    async fn create_post(&self, author_id: i64, post: &NewPost, available: bool) -> Result<i64> {
        Db::create_post(self, author_id, post, available).await
    }
}

/// Who is proposing the submission.
pub struct Author<'a> {
    pub id: i64,
    pub username: &'a str,
    pub is_admin: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(i64),
    EmptyFields,
    UnknownCategory,
    /// None of the four options equals the right answer.
    RightAnswerNotAmongOptions,
    TooLong,
}

pub struct SubmissionService<R: SubmissionRepository = Db, E: EmailSender = ResendEmailSender> {
    repo: R,
    email: E,
}

impl<R: SubmissionRepository + Clone, E: EmailSender + Clone> Clone for SubmissionService<R, E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            email: self.email.clone(),
        }
    }
}

impl<R: SubmissionRepository, E: EmailSender> SubmissionService<R, E> {
    pub fn new(repo: R, email: E) -> Self {
        Self { repo, email }
    }

    /// Store a proposed question for moderation.
    pub async fn submit_question(
        &self,
        author: &Author<'_>,
        question: &NewQuestion,
    ) -> Result<SubmitOutcome> {
        let question = NewQuestion {
            question: question.question.trim().to_string(),
            category_id: question.category_id,
            difficulty: question.difficulty,
            right_answer: question.right_answer.trim().to_string(),
            answers: question.answers.clone().map(|a| a.trim().to_string()),
            tag: normalize_tag(&question.tag),
        };

        if question.question.is_empty()
            || question.right_answer.is_empty()
            || question.answers.iter().any(String::is_empty)
        {
            return Ok(SubmitOutcome::EmptyFields);
        }

        if question.question.chars().count() > MAX_QUESTION_LENGTH
            || std::iter::once(&question.right_answer)
                .chain(question.answers.iter())
                .any(|a| a.chars().count() > MAX_ANSWER_LENGTH)
        {
            return Ok(SubmitOutcome::TooLong);
        }

        if !question.answers.contains(&question.right_answer) {
            tracing::warn!("question proposed by {} lacks its right answer", author.username);
            return Ok(SubmitOutcome::RightAnswerNotAmongOptions);
        }

        if self.repo.get_category(question.category_id).await?.is_none() {
            return Ok(SubmitOutcome::UnknownCategory);
        }

        let id = self.repo.create_question(author.id, &question, false).await?;
        self.notify(author, SubmissionKind::Question, &question.question)
            .await;

        Ok(SubmitOutcome::Accepted(id))
    }

    /// Store a proposed post for moderation.
    pub async fn submit_post(&self, author: &Author<'_>, post: &NewPost) -> Result<SubmitOutcome> {
        let post = NewPost {
            title: post.title.trim().to_string(),
            category_id: post.category_id,
            body: post.body.trim().to_string(),
            tag: normalize_tag(&post.tag),
        };

        if post.title.is_empty() || post.body.is_empty() {
            return Ok(SubmitOutcome::EmptyFields);
        }

        if post.title.chars().count() > MAX_TITLE_LENGTH {
            return Ok(SubmitOutcome::TooLong);
        }

        if self.repo.get_category(post.category_id).await?.is_none() {
            return Ok(SubmitOutcome::UnknownCategory);
        }

        let id = self.repo.create_post(author.id, &post, false).await?;
        self.notify(author, SubmissionKind::Post, &post.title).await;

        Ok(SubmitOutcome::Accepted(id))
    }

    async fn notify(&self, author: &Author<'_>, kind: SubmissionKind, title: &str) {
        if author.is_admin || !self.email.is_enabled() {
            return;
        }

        if let Err(e) = self
            .email
            .send_submission_notice(kind, author.username, title)
            .await
        {
            tracing::error!("could not notify admin about {kind:?} by {}: {e}", author.username);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::auth::MockEmailSender;
    use crate::quiz::Difficulty;

    const USER: Author<'static> = Author {
        id: 5,
        username: "alice_dev",
        is_admin: false,
    };

    const ADMIN: Author<'static> = Author {
        id: 1,
        username: "root_admin",
        is_admin: true,
    };

    fn category() -> Category {
        Category {
            id: 2,
            name: "Rust".to_string(),
            description: String::new(),
            available: true,
        }
    }

    fn question() -> NewQuestion {
        NewQuestion {
            question: "Which keyword moves a closure's captures?".to_string(),
            category_id: 2,
            difficulty: Difficulty::Average,
            right_answer: "move".to_string(),
            answers: [
                "ref".to_string(),
                "move".to_string(),
                "static".to_string(),
                "box".to_string(),
            ],
            tag: " ".to_string(),
        }
    }

    fn post() -> NewPost {
        NewPost {
            title: "Ownership in five minutes".to_string(),
            category_id: 2,
            body: "Every value has a single owner.".to_string(),
            tag: "rust".to_string(),
        }
    }

    fn repo_with_category() -> MockSubmissionRepository {
        let mut repo = MockSubmissionRepository::new();
        repo.expect_get_category()
            .returning(|_| Box::pin(async { Ok(Some(category())) }));
        repo
    }

    fn email_expecting(times: usize) -> MockEmailSender {
        let mut email = MockEmailSender::new();
        email.expect_is_enabled().returning(|| true);
        email
            .expect_send_submission_notice()
            .times(times)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));
        email
    }

    #[tokio::test]
    async fn question_is_stored_unavailable_and_admin_notified() {
        let mut repo = repo_with_category();
        repo.expect_create_question()
            .withf(|author, q, available| {
                *author == 5 && !available && q.tag == "IT" && q.right_answer == "move"
            })
            .returning(|_, _, _| Box::pin(async { Ok(11) }));

        let svc = SubmissionService::new(repo, email_expecting(1));
        let outcome = svc.submit_question(&USER, &question()).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted(11));
    }

    #[tokio::test]
    async fn admin_submissions_send_no_notice() {
        let mut repo = repo_with_category();
        repo.expect_create_post()
            .returning(|_, _, _| Box::pin(async { Ok(3) }));

        let svc = SubmissionService::new(repo, email_expecting(0));
        let outcome = svc.submit_post(&ADMIN, &post()).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted(3));
    }

    #[tokio::test]
    async fn right_answer_must_be_one_of_the_options() {
        let mut q = question();
        q.right_answer = "yield".to_string();

        let svc = SubmissionService::new(MockSubmissionRepository::new(), email_expecting(0));
        let outcome = svc.submit_question(&USER, &q).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::RightAnswerNotAmongOptions);
    }

    #[tokio::test]
    async fn blank_option_is_rejected() {
        let mut q = question();
        q.answers[3] = "   ".to_string();

        let svc = SubmissionService::new(MockSubmissionRepository::new(), email_expecting(0));
        let outcome = svc.submit_question(&USER, &q).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::EmptyFields);
    }

    #[tokio::test]
    async fn overlong_question_is_rejected() {
        let mut q = question();
        q.question = "x".repeat(MAX_QUESTION_LENGTH + 1);

        let svc = SubmissionService::new(MockSubmissionRepository::new(), email_expecting(0));
        let outcome = svc.submit_question(&USER, &q).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::TooLong);
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let mut repo = MockSubmissionRepository::new();
        repo.expect_get_category()
            .returning(|_| Box::pin(async { Ok(None) }));
        repo.expect_create_post().never();

        let svc = SubmissionService::new(repo, email_expecting(0));
        let outcome = svc.submit_post(&USER, &post()).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::UnknownCategory);
    }

    #[tokio::test]
    async fn failed_notice_does_not_fail_submission() {
        let mut repo = repo_with_category();
        repo.expect_create_post()
            .returning(|_, _, _| Box::pin(async { Ok(8) }));

        let mut email = MockEmailSender::new();
        email.expect_is_enabled().returning(|| true);
        email
            .expect_send_submission_notice()
            .returning(|_, _, _| Box::pin(async { Err(color_eyre::eyre::eyre!("smtp down")) }));

        let svc = SubmissionService::new(repo, email);
        let outcome = svc.submit_post(&USER, &post()).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted(8));
    }
}
