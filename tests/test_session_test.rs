mod common;

use std::collections::HashSet;

use common::{create_admin, create_test_db, create_user, new_question, seed_questions};
use interview_quiz::db::models::{AnswerResult, CurrentQuestion, QuestionRow, TestSessionModel};
use interview_quiz::db::Db;
use interview_quiz::quiz::{Difficulty, MAX_TEST_QUESTIONS};

struct Fixture {
    db: Db,
    player: i64,
    category: i64,
    questions: Vec<i64>,
}

async fn fixture(difficulty: Difficulty, count: usize) -> Fixture {
    let db = create_test_db().await;
    let admin = create_admin(&db, "quiz_master").await;
    let player = create_user(&db, "player_one").await;
    let category = db.create_category("Rust", "Systems programming").await.unwrap();
    let questions = seed_questions(&db, admin, category, difficulty, count).await;
    Fixture {
        db,
        player,
        category,
        questions,
    }
}

async fn start(f: &Fixture, difficulty: Difficulty) -> TestSessionModel {
    let token = f
        .db
        .start_test(f.player, f.category, difficulty, false)
        .await
        .unwrap()
        .expect("category is available");
    f.db.get_test_session(&token).await.unwrap().unwrap()
}

async fn current(db: &Db, session: &TestSessionModel) -> Option<(QuestionRow, i64, i64)> {
    match db.current_question(session).await.unwrap() {
        CurrentQuestion::Question {
            question,
            number,
            total,
        } => Some((question, number, total)),
        CurrentQuestion::Finished => None,
    }
}

async fn answer(db: &Db, session: &TestSessionModel, question_id: i64, chosen: &str) -> AnswerResult {
    db.submit_answer(session, question_id, chosen).await.unwrap()
}

#[tokio::test]
async fn session_holds_at_most_twenty_distinct_questions() {
    let f = fixture(Difficulty::Newbie, 30).await;
    let session = start(&f, Difficulty::Newbie).await;

    let mut seen = HashSet::new();
    while let Some((question, number, total)) = current(&f.db, &session).await {
        assert_eq!(total, MAX_TEST_QUESTIONS as i64);
        assert_eq!(number, seen.len() as i64 + 1);
        assert!(seen.insert(question.id), "question {} repeated", question.id);
        assert!(f.questions.contains(&question.id));
        answer(&f.db, &session, question.id, &question.right_answer).await;
    }

    assert_eq!(seen.len(), MAX_TEST_QUESTIONS);
}

#[tokio::test]
async fn short_pool_uses_every_question() {
    let f = fixture(Difficulty::Average, 3).await;
    let session = start(&f, Difficulty::Average).await;

    let progress = f.db.test_progress(session.id).await.unwrap();
    assert_eq!(progress.quantity, 3);
    assert_eq!(progress.remaining, 3);
    assert_eq!(progress.points(), 3);
    assert!(!progress.time_limit);
}

#[tokio::test]
async fn other_tiers_are_not_drawn() {
    let f = fixture(Difficulty::Newbie, 5).await;
    let session = start(&f, Difficulty::Smartypants).await;

    assert!(current(&f.db, &session).await.is_none());
    assert_eq!(f.db.test_progress(session.id).await.unwrap().quantity, 0);
}

#[tokio::test]
async fn unavailable_or_missing_category_cannot_start() {
    let f = fixture(Difficulty::Newbie, 2).await;
    f.db.toggle_category(f.category).await.unwrap();

    assert!(f
        .db
        .start_test(f.player, f.category, Difficulty::Newbie, false)
        .await
        .unwrap()
        .is_none());
    assert!(f
        .db
        .start_test(f.player, 4242, Difficulty::Newbie, false)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn right_and_wrong_answers_move_score_and_counts() {
    let f = fixture(Difficulty::Newbie, 3).await;
    let session = start(&f, Difficulty::Newbie).await;

    let (q1, _, _) = current(&f.db, &session).await.unwrap();
    let AnswerResult::Scored(first) = answer(&f.db, &session, q1.id, &q1.right_answer).await else {
        panic!("expected scored answer");
    };
    assert!(first.is_correct);
    assert_eq!(first.points, 2);
    assert_eq!(first.score, 2);

    let (q2, number, _) = current(&f.db, &session).await.unwrap();
    assert_eq!(number, 2);
    assert_ne!(q1.id, q2.id);
    let AnswerResult::Scored(second) = answer(&f.db, &session, q2.id, "nonsense").await else {
        panic!("expected scored answer");
    };
    assert!(!second.is_correct);
    assert_eq!(second.score, 0);

    let progress = f.db.test_progress(session.id).await.unwrap();
    assert_eq!(progress.right_answers, 1);
    assert_eq!(progress.wrong_answers, 1);
    assert_eq!(progress.remaining, 1);

    let log = f.db.user_log(f.player).await.unwrap();
    assert_eq!(log.question_count, 2);
    assert_eq!(log.right_answers, 1);
    assert_eq!(log.wrong_answers, 1);
}

#[tokio::test]
async fn score_never_goes_negative() {
    let f = fixture(Difficulty::Smartypants, 2).await;
    let session = start(&f, Difficulty::Smartypants).await;

    while let Some((question, _, _)) = current(&f.db, &session).await {
        answer(&f.db, &session, question.id, "wrong").await;
    }

    assert_eq!(f.db.user_score(f.player).await.unwrap(), 0);
}

#[tokio::test]
async fn repeated_answer_is_not_scored_twice() {
    let f = fixture(Difficulty::Average, 2).await;
    let session = start(&f, Difficulty::Average).await;

    let (q1, _, _) = current(&f.db, &session).await.unwrap();
    answer(&f.db, &session, q1.id, &q1.right_answer).await;

    let AnswerResult::Scored(repeat) = answer(&f.db, &session, q1.id, "something else").await
    else {
        panic!("expected stored outcome");
    };
    assert!(repeat.already_answered);
    assert!(repeat.is_correct);
    assert_eq!(repeat.chosen_answer, q1.right_answer);
    assert_eq!(repeat.score, 3);

    assert_eq!(f.db.user_score(f.player).await.unwrap(), 3);
    let progress = f.db.test_progress(session.id).await.unwrap();
    assert_eq!(progress.right_answers, 1);
    assert_eq!(progress.wrong_answers, 0);
    assert_eq!(f.db.user_log(f.player).await.unwrap().question_count, 1);
}

#[tokio::test]
async fn only_the_current_question_can_be_answered() {
    let f = fixture(Difficulty::Newbie, 3).await;
    let session = start(&f, Difficulty::Newbie).await;

    let (q1, _, _) = current(&f.db, &session).await.unwrap();
    let later = f
        .questions
        .iter()
        .copied()
        .find(|id| *id != q1.id)
        .unwrap();

    assert!(matches!(
        answer(&f.db, &session, later, "right").await,
        AnswerResult::NotCurrent
    ));
    assert_eq!(f.db.user_score(f.player).await.unwrap(), 0);
}

#[tokio::test]
async fn question_outside_session_is_rejected() {
    let f = fixture(Difficulty::Newbie, 2).await;
    let session = start(&f, Difficulty::Newbie).await;

    assert!(matches!(
        answer(&f.db, &session, 987_654, "anything").await,
        AnswerResult::NotInSession
    ));
}

#[tokio::test]
async fn time_is_up_finishes_the_test() {
    let f = fixture(Difficulty::Newbie, 5).await;
    let session = start(&f, Difficulty::Newbie).await;

    let (q1, _, _) = current(&f.db, &session).await.unwrap();
    answer(&f.db, &session, q1.id, &q1.right_answer).await;

    f.db.finish_test(session.id).await.unwrap();

    assert!(current(&f.db, &session).await.is_none());
    let progress = f.db.test_progress(session.id).await.unwrap();
    assert_eq!(progress.remaining, 0);
    assert_eq!(progress.right_answers, 1);

    let next = f
        .questions
        .iter()
        .copied()
        .find(|id| *id != q1.id)
        .unwrap();
    assert!(matches!(
        answer(&f.db, &session, next, "late").await,
        AnswerResult::SessionFinished
    ));
    assert_eq!(f.db.user_score(f.player).await.unwrap(), 2);
}

#[tokio::test]
async fn starting_again_replaces_previous_test() {
    let f = fixture(Difficulty::Newbie, 4).await;
    let first = start(&f, Difficulty::Newbie).await;

    let (q, _, _) = current(&f.db, &first).await.unwrap();
    answer(&f.db, &first, q.id, &q.right_answer).await;

    let second = start(&f, Difficulty::Newbie).await;
    assert_ne!(first.token, second.token);
    assert!(f.db.get_test_session(&first.token).await.unwrap().is_none());

    let progress = f.db.test_progress(second.id).await.unwrap();
    assert_eq!(progress.remaining, 4);
    assert_eq!(progress.right_answers, 0);
    // Earned points stay with the user.
    assert_eq!(f.db.user_score(f.player).await.unwrap(), 2);
}

#[tokio::test]
async fn other_players_tests_are_kept() {
    let f = fixture(Difficulty::Newbie, 4).await;
    let other = create_user(&f.db, "player_two").await;

    let theirs = f
        .db
        .start_test(other, f.category, Difficulty::Newbie, false)
        .await
        .unwrap()
        .unwrap();
    start(&f, Difficulty::Newbie).await;
    start(&f, Difficulty::Newbie).await;

    assert!(f.db.get_test_session(&theirs).await.unwrap().is_some());
}

#[tokio::test]
async fn pending_questions_are_never_drawn() {
    let f = fixture(Difficulty::Average, 3).await;
    let author = create_user(&f.db, "proposer").await;
    for n in 10..15 {
        f.db.create_question(author, &new_question(f.category, Difficulty::Average, n), false)
            .await
            .unwrap();
    }

    let published: HashSet<i64> = f.questions.iter().copied().collect();
    for _ in 0..5 {
        let session = start(&f, Difficulty::Average).await;
        let progress = f.db.test_progress(session.id).await.unwrap();
        assert_eq!(progress.quantity, 3);

        let mut drawn = HashSet::new();
        while let Some((q, _, _)) = current(&f.db, &session).await {
            assert!(published.contains(&q.id), "pending question {} was drawn", q.id);
            drawn.insert(q.id);
            answer(&f.db, &session, q.id, &q.right_answer).await;
        }
        assert_eq!(drawn, published);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn double_submit_of_same_question_scores_once() {
    let f = fixture(Difficulty::Newbie, 10).await;
    let session = start(&f, Difficulty::Newbie).await;

    while let Some((q, _, _)) = current(&f.db, &session).await {
        let id = q.id;
        let (db_a, db_b) = (f.db.clone(), f.db.clone());
        let (session_a, session_b) = (session.clone(), session.clone());
        let (right_a, right_b) = (q.right_answer.clone(), q.right_answer);

        let a = tokio::spawn(async move { db_a.submit_answer(&session_a, id, &right_a).await });
        let b = tokio::spawn(async move { db_b.submit_answer(&session_b, id, &right_b).await });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        let (AnswerResult::Scored(a), AnswerResult::Scored(b)) = (a.unwrap(), b.unwrap()) else {
            panic!("both submits should see the question");
        };
        assert!(
            a.already_answered != b.already_answered,
            "exactly one submit may be scored"
        );
    }

    let progress = f.db.test_progress(session.id).await.unwrap();
    assert_eq!(progress.right_answers, 10);
    assert_eq!(progress.wrong_answers, 0);
    assert_eq!(f.db.user_score(f.player).await.unwrap(), 20);
    assert_eq!(f.db.user_log(f.player).await.unwrap().question_count, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_players_answer_at_the_same_time() {
    let f = fixture(Difficulty::Average, 8).await;
    let other = create_user(&f.db, "player_two").await;

    let mine = start(&f, Difficulty::Average).await;
    let token = f
        .db
        .start_test(other, f.category, Difficulty::Average, false)
        .await
        .unwrap()
        .unwrap();
    let theirs = f.db.get_test_session(&token).await.unwrap().unwrap();

    async fn play(db: Db, session: TestSessionModel) -> color_eyre::Result<()> {
        loop {
            let CurrentQuestion::Question { question, .. } = db.current_question(&session).await?
            else {
                return Ok(());
            };
            db.submit_answer(&session, question.id, &question.right_answer)
                .await?;
        }
    }

    let a = tokio::spawn(play(f.db.clone(), mine.clone()));
    let b = tokio::spawn(play(f.db.clone(), theirs.clone()));
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(f.db.user_score(f.player).await.unwrap(), 24);
    assert_eq!(f.db.user_score(other).await.unwrap(), 24);
    assert_eq!(f.db.test_progress(mine.id).await.unwrap().right_answers, 8);
    assert_eq!(f.db.test_progress(theirs.id).await.unwrap().right_answers, 8);
}
