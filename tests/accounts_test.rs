mod common;

use common::{create_test_db, create_user, new_user};
use interview_quiz::db::models::UserConflict;
use interview_quiz::email::ResendEmailSender;
use interview_quiz::services::auth::{AuthService, CreateAdminOutcome, RegisterOutcome};

#[tokio::test]
async fn reset_token_changes_password_once() {
    let db = create_test_db().await;
    let user_id = create_user(&db, "alice_dev").await;
    let session = db.create_user_session(user_id).await.unwrap();

    let token = db
        .create_password_reset_token("alice_dev@example.com")
        .await
        .unwrap()
        .expect("active user gets a token");
    assert_eq!(
        db.validate_password_reset_token(&token).await.unwrap().as_deref(),
        Some("alice_dev@example.com")
    );

    assert!(db.reset_password_with_token(&token, "brand-new-pass").await.unwrap());
    assert!(db.verify_user_password("alice_dev", "brand-new-pass").await.unwrap());
    assert!(!db.verify_user_password("alice_dev", "password123").await.unwrap());

    // Every login session ends with the reset.
    assert!(db.get_user_by_session(&session).await.unwrap().is_none());

    assert!(db.validate_password_reset_token(&token).await.unwrap().is_none());
    assert!(!db.reset_password_with_token(&token, "another-pass").await.unwrap());
    assert!(db.verify_user_password("alice_dev", "brand-new-pass").await.unwrap());
}

#[tokio::test]
async fn reset_token_needs_an_active_account() {
    let db = create_test_db().await;
    db.create_unverified_user(&new_user("bob_tester")).await.unwrap();

    assert!(db
        .create_password_reset_token("bob_tester@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(db
        .create_password_reset_token("nobody@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(db.validate_password_reset_token("made-up").await.unwrap().is_none());
}

#[tokio::test]
async fn newer_reset_token_replaces_older() {
    let db = create_test_db().await;
    create_user(&db, "carol_ok").await;

    let first = db
        .create_password_reset_token("carol_ok@example.com")
        .await
        .unwrap()
        .unwrap();
    let second = db
        .create_password_reset_token("carol_ok@example.com")
        .await
        .unwrap()
        .unwrap();

    assert!(db.validate_password_reset_token(&first).await.unwrap().is_none());
    assert!(db.validate_password_reset_token(&second).await.unwrap().is_some());
}

#[tokio::test]
async fn profile_names_can_be_changed() {
    let db = create_test_db().await;
    let user_id = create_user(&db, "dave_edit").await;

    db.update_user_names(user_id, "David", "Edwards").await.unwrap();

    let profile = db.get_profile(user_id).await.unwrap();
    assert_eq!(profile.first_name, "David");
    assert_eq!(profile.last_name, "Edwards");
}

#[tokio::test]
async fn duplicate_insert_reports_which_field_clashed() {
    let db = create_test_db().await;
    create_user(&db, "erin_first").await;

    let err = db
        .create_user(&new_user("erin_first"), false)
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<UserConflict>(), Some(&UserConflict::Username));

    let mut same_email = new_user("erin_second");
    same_email.email = "erin_first@example.com".to_string();
    let err = db.create_unverified_user(&same_email).await.unwrap_err();
    assert_eq!(err.downcast_ref::<UserConflict>(), Some(&UserConflict::Email));
}

#[tokio::test]
async fn create_admin_rejects_existing_username_and_email() {
    let db = create_test_db().await;
    let auth: AuthService = AuthService::new(
        db.clone(),
        ResendEmailSender::disabled(),
        "http://localhost".to_string(),
    );

    let CreateAdminOutcome::Created(id) = auth.create_admin(&new_user("root_admin")).await.unwrap()
    else {
        panic!("first admin should be created");
    };
    let admin = db.find_user_by_username("root_admin").await.unwrap().unwrap();
    assert_eq!(admin.id, id);
    assert!(admin.is_admin);

    assert_eq!(
        auth.create_admin(&new_user("root_admin")).await.unwrap(),
        CreateAdminOutcome::UsernameTaken
    );

    let mut same_email = new_user("second_admin");
    same_email.email = "root_admin@example.com".to_string();
    assert_eq!(
        auth.create_admin(&same_email).await.unwrap(),
        CreateAdminOutcome::EmailTaken
    );
    assert!(!db.username_exists("second_admin").await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_registrations_get_a_form_error() {
    let db = create_test_db().await;
    let auth: AuthService = AuthService::new(
        db.clone(),
        ResendEmailSender::disabled(),
        "http://localhost".to_string(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let auth = auth.clone();
            tokio::spawn(async move { auth.register(&new_user("fast_fingers"), "password123").await })
        })
        .collect();

    let mut logged_in = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            RegisterOutcome::LoggedIn(_) => logged_in += 1,
            RegisterOutcome::UsernameTaken | RegisterOutcome::EmailTaken => {}
            _ => panic!("unexpected registration outcome"),
        }
    }
    assert_eq!(logged_in, 1);
}
