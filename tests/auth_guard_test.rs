mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use interview_quiz::{db::Db, email::ResendEmailSender, names, quiz::Difficulty, router, AppState};
use tower::ServiceExt;

fn app(db: Db) -> axum::Router {
    router(AppState::new(
        db,
        ResendEmailSender::disabled(),
        "http://localhost".to_string(),
        false,
    ))
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Response {
    let mut req = Request::builder().method(method.clone()).uri(uri);
    if method != Method::GET {
        req = req
            .header("HX-Request", "true")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let body = form.map(|f| Body::from(f.to_string())).unwrap_or_else(Body::empty);

    app.clone()
        .oneshot(req.body(body).expect("request build should succeed"))
        .await
        .expect("router should respond")
}

/// `name=value` pairs from every Set-Cookie header of the response.
fn cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .collect()
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn login_cookie(db: &Db, user_id: i64) -> String {
    let session = db.create_user_session(user_id).await.unwrap();
    format!("{}={}", names::USER_SESSION_COOKIE_NAME, session)
}

#[tokio::test]
async fn protected_routes_reject_requests_without_session() {
    let app = app(common::create_test_db().await);

    let cases = [
        (Method::GET, "/profile", None),
        (Method::GET, "/category/1", None),
        (Method::GET, "/test", None),
        (Method::GET, "/propose/question", None),
        (Method::GET, "/admin", None),
        (Method::GET, "/profile/edit", None),
        (Method::GET, "/write-to-admin", None),
        (Method::POST, "/category/1/start", Some("difficulty=NB")),
        (Method::POST, "/test/answer", Some("question_id=1&answer=x")),
        (Method::POST, "/no-info", None),
        (Method::POST, "/profile/edit", Some("first_name=Robert&last_name=Builder")),
        (Method::POST, "/write-to-admin", Some("title=a&content=b&grade=5")),
    ];

    for (method, uri, form) in cases {
        let resp = send(&app, method, uri, None, form).await;
        assert_eq!(
            resp.status(),
            StatusCode::UNAUTHORIZED,
            "expected UNAUTHORIZED for {uri}",
        );
    }
}

#[tokio::test]
async fn state_changing_requests_need_htmx_header() {
    let app = app(common::create_test_db().await);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=a&password=b"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_pages_render() {
    let app = app(common::create_test_db().await);

    for uri in ["/", "/categories", "/login", "/register", "/search?q=rust"] {
        let resp = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(resp.status(), StatusCode::OK, "expected OK for {uri}");
    }

    let resp = send(&app, Method::GET, "/static/index.css", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/css");

    let resp = send(&app, Method::GET, "/no/such/page", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moderation_requires_admin() {
    let db = common::create_test_db().await;
    let user = common::create_user(&db, "plain_user").await;
    let admin = common::create_admin(&db, "site_admin").await;
    let user_cookie = login_cookie(&db, user).await;
    let admin_cookie = login_cookie(&db, admin).await;
    let app = app(db);

    let resp = send(&app, Method::GET, "/admin", Some(&user_cookie), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&app, Method::GET, "/admin", Some(&admin_cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_without_email_logs_in_immediately() {
    let db = common::create_test_db().await;
    let app = app(db.clone());

    let resp = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(
            "username=new_player&email=new%40example.com&first_name=Newton&last_name=Player\
             &password=password123&password_confirm=password123",
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["HX-Redirect"], "/");
    let set = cookies(&resp);
    let session = set
        .iter()
        .find(|c| c.starts_with(names::USER_SESSION_COOKIE_NAME))
        .expect("session cookie");

    let resp = send(&app, Method::GET, "/profile", Some(session), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("new_player"));
}

#[tokio::test]
async fn registration_errors_are_shown_in_form() {
    let app = app(common::create_test_db().await);

    let resp = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(
            "username=abc&email=a%40example.com&first_name=Newton&last_name=Player\
             &password=password123&password_confirm=password123",
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("HX-Redirect").is_none());
    assert!(body_text(resp).await.contains("aria-invalid"));
}

#[tokio::test]
async fn login_with_wrong_password_stays_on_form() {
    let db = common::create_test_db().await;
    common::create_user(&db, "known_user").await;
    let app = app(db);

    let resp = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some("username=known_user&password=nope-nope"),
    )
    .await;
    assert!(resp.headers().get("HX-Redirect").is_none());
    assert!(cookies(&resp).is_empty());

    let resp = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some("username=known_user&password=password123"),
    )
    .await;
    assert_eq!(resp.headers()["HX-Redirect"], "/");
    assert_eq!(cookies(&resp).len(), 1);
}

#[tokio::test]
async fn test_can_be_taken_through_the_router() {
    let db = common::create_test_db().await;
    let admin = common::create_admin(&db, "quiz_admin").await;
    let player = common::create_user(&db, "quiz_player").await;
    let category = db.create_category("Rust", "").await.unwrap();
    common::seed_questions(&db, admin, category, Difficulty::Newbie, 1).await;
    let login = login_cookie(&db, player).await;
    let app = app(db.clone());

    let resp = send(
        &app,
        Method::GET,
        &names::category_url(category),
        Some(&login),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &app,
        Method::POST,
        &names::start_test_url(category),
        Some(&login),
        Some("difficulty=NB&time_limit=true"),
    )
    .await;
    assert_eq!(resp.headers()["HX-Redirect"], names::TEST_URL);
    let test_cookie = cookies(&resp)
        .into_iter()
        .find(|c| c.starts_with(names::TEST_SESSION_COOKIE_NAME))
        .expect("test session cookie");
    let both = format!("{login}; {test_cookie}");

    let resp = send(&app, Method::GET, names::TEST_URL, Some(&both), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_text(resp).await;
    assert!(page.contains("Question 0"));
    assert!(page.contains("time_counter"));

    let question_id = db
        .available_question_ids(category, Difficulty::Newbie)
        .await
        .unwrap()[0];
    let resp = send(
        &app,
        Method::POST,
        names::ANSWER_URL,
        Some(&both),
        Some(&format!("question_id={question_id}&answer=right+0")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.user_score(player).await.unwrap(), 2);

    // Nothing left: the test page now shows the results and drops the cookie.
    let resp = send(&app, Method::GET, names::TEST_URL, Some(&both), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = format!("{}=", names::TEST_SESSION_COOKIE_NAME);
    assert!(cookies(&resp).contains(&cleared));
}

#[tokio::test]
async fn foreign_test_session_is_forbidden() {
    let db = common::create_test_db().await;
    let admin = common::create_admin(&db, "quiz_admin").await;
    let owner = common::create_user(&db, "owner_user").await;
    let intruder = common::create_user(&db, "other_user").await;
    let category = db.create_category("Rust", "").await.unwrap();
    common::seed_questions(&db, admin, category, Difficulty::Newbie, 2).await;

    let token = db
        .start_test(owner, category, Difficulty::Newbie, false)
        .await
        .unwrap()
        .unwrap();
    let cookie = format!(
        "{}; {}={}",
        login_cookie(&db, intruder).await,
        names::TEST_SESSION_COOKIE_NAME,
        token
    );
    let app = app(db);

    let resp = send(&app, Method::GET, names::TEST_URL, Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn password_reset_pages() {
    let db = common::create_test_db().await;
    common::create_user(&db, "alice_dev").await;
    let app = app(db.clone());

    let resp = send(&app, Method::GET, names::LOGIN_URL, None, None).await;
    assert!(body_text(resp).await.contains(names::FORGOT_PASSWORD_URL));

    // No email configured: the reset cannot be offered.
    let resp = send(
        &app,
        Method::POST,
        names::FORGOT_PASSWORD_URL,
        None,
        Some("email=alice_dev%40example.com"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("not configured"));

    let resp = send(&app, Method::GET, "/reset-password/made-up", None, None).await;
    assert!(body_text(resp).await.contains("invalid"));

    let token = db
        .create_password_reset_token("alice_dev@example.com")
        .await
        .unwrap()
        .unwrap();
    let resp = send(&app, Method::GET, &format!("/reset-password/{token}"), None, None).await;
    assert!(body_text(resp).await.contains(&token));

    let resp = send(
        &app,
        Method::POST,
        names::RESET_PASSWORD_URL,
        None,
        Some(&format!(
            "token={token}&password=fresh-secret&password_confirm=fresh-secret"
        )),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(db.verify_user_password("alice_dev", "fresh-secret").await.unwrap());
}

#[tokio::test]
async fn profile_can_be_edited() {
    let db = common::create_test_db().await;
    let user_id = common::create_user(&db, "bob_tester").await;
    let login = login_cookie(&db, user_id).await;
    let app = app(db.clone());

    let resp = send(&app, Method::GET, names::PROFILE_EDIT_URL, Some(&login), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Testerson"));

    let resp = send(
        &app,
        Method::POST,
        names::PROFILE_EDIT_URL,
        Some(&login),
        Some("first_name=Al&last_name=Builder"),
    )
    .await;
    assert!(resp.headers().get("HX-Redirect").is_none());
    assert_eq!(db.get_profile(user_id).await.unwrap().first_name, "Tester");

    let resp = send(
        &app,
        Method::POST,
        names::PROFILE_EDIT_URL,
        Some(&login),
        Some("first_name=Robert&last_name=Builder"),
    )
    .await;
    assert_eq!(resp.headers()["HX-Redirect"], names::PROFILE_URL);
    let profile = db.get_profile(user_id).await.unwrap();
    assert_eq!((profile.first_name.as_str(), profile.last_name.as_str()), ("Robert", "Builder"));
}

#[tokio::test]
async fn writing_to_admin_needs_email() {
    let db = common::create_test_db().await;
    let user_id = common::create_user(&db, "carol_ok").await;
    let login = login_cookie(&db, user_id).await;
    let app = app(db.clone());

    let resp = send(&app, Method::GET, names::WRITE_TO_ADMIN_URL, Some(&login), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &app,
        Method::POST,
        names::WRITE_TO_ADMIN_URL,
        Some(&login),
        Some("title=Hello&content=Nice+quiz&grade=11"),
    )
    .await;
    assert!(body_text(resp).await.contains("must be a number"));

    let resp = send(
        &app,
        Method::POST,
        names::WRITE_TO_ADMIN_URL,
        Some(&login),
        Some("title=Hello&content=Nice+quiz&grade=9"),
    )
    .await;
    assert!(body_text(resp).await.contains("not configured"));
}
