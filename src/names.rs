pub const LOGIN_URL: &str = "/login";
pub const REGISTER_URL: &str = "/register";
pub const LOGOUT_URL: &str = "/logout";
pub const PROFILE_URL: &str = "/profile";
pub const PROFILE_EDIT_URL: &str = "/profile/edit";
pub const FORGOT_PASSWORD_URL: &str = "/forgot-password";
pub const RESET_PASSWORD_URL: &str = "/reset-password";
pub const WRITE_TO_ADMIN_URL: &str = "/write-to-admin";
pub const CATEGORIES_URL: &str = "/categories";
pub const TEST_URL: &str = "/test";
pub const ANSWER_URL: &str = "/test/answer";
pub const TIME_IS_UP_URL: &str = "/test/time-is-up";
pub const NO_INFO_URL: &str = "/no-info";
pub const SEARCH_URL: &str = "/search";
pub const PROPOSE_QUESTION_URL: &str = "/propose/question";
pub const PROPOSE_POST_URL: &str = "/propose/post";
pub const ADMIN_URL: &str = "/admin";
pub const ADMIN_CATEGORIES_URL: &str = "/admin/categories";

pub const USER_SESSION_COOKIE_NAME: &str = "user_session";
pub const TEST_SESSION_COOKIE_NAME: &str = "test_session";

pub fn category_url(category_id: i64) -> String {
    format!("/category/{category_id}")
}

pub fn start_test_url(category_id: i64) -> String {
    format!("/category/{category_id}/start")
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}")
}

pub fn category_posts_url(category_id: i64) -> String {
    format!("/posts/category/{category_id}")
}

pub fn tag_posts_url(tag: &str) -> String {
    format!("/posts/tag/{tag}")
}

pub fn author_posts_url(author_id: i64) -> String {
    format!("/posts/author/{author_id}")
}

pub fn verify_url(base_url: &str, email: &str, key: &str) -> String {
    format!("{base_url}/verify/{email}/{key}")
}

pub fn reset_password_url(base_url: &str, token: &str) -> String {
    format!("{base_url}{RESET_PASSWORD_URL}/{token}")
}

pub fn toggle_question_url(question_id: i64) -> String {
    format!("/admin/questions/{question_id}/toggle")
}

pub fn toggle_post_url(post_id: i64) -> String {
    format!("/admin/posts/{post_id}/toggle")
}

pub fn toggle_category_url(category_id: i64) -> String {
    format!("/admin/categories/{category_id}/toggle")
}

// Leaderboard and answer page
pub const TOP_USERS_LIMIT: i64 = 5;
pub const RELATED_POSTS_LIMIT: i64 = 4;

// Seconds allowed per question when the time limit is on.
pub const SECONDS_PER_QUESTION: i64 = 15;

// i18n
pub const LOCALE_COOKIE_NAME: &str = "lang";
pub const DEFAULT_LOCALE: &str = "en";
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ru"];
pub const SET_LOCALE_URL: &str = "/set-locale";
