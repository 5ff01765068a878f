//! Circulation flows across books and users

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use library_desk::{
    config::AppConfig,
    models::{book::CreateBook, user::CreateUser},
    AppError, AppState,
};

#[fixture]
fn state() -> AppState {
    let mut state = AppState::new(AppConfig::default());
    state
        .repository
        .books
        .add(
            CreateBook::new("The Hobbit", "J.R.R. Tolkien", "111", "Fantasy")
                .with_rental_fee(Decimal::new(250, 2))
                .into_book(),
        )
        .expect("add book");
    for (name, id) in [("Alice", "U1"), ("Bob", "U2"), ("Carol", "U3")] {
        state
            .services
            .users
            .add_user(
                &mut state.repository,
                CreateUser::new(name, id, &format!("{}@example.org", id.to_lowercase())),
                Utc::now(),
            )
            .expect("add user");
    }
    state
}

#[rstest]
fn test_rent_then_rent_again_is_refused(mut state: AppState) {
    let now = Utc::now();
    let checkout = state
        .services
        .circulation
        .rent(&mut state.repository, "111", "U1", now)
        .expect("rent");
    assert_eq!(checkout.fee, Some(Decimal::new(250, 2)));

    let before = state.repository.clone();
    let err = state
        .services
        .circulation
        .rent(&mut state.repository, "111", "U2", now)
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(err.to_string(), "Book is currently borrowed");

    assert!(state.repository.books.get("111").expect("book").is_borrowed());
    assert_eq!(state.repository.users.get("U1").expect("user").borrowed_books(), ["111"]);
    assert!(state.repository.users.get("U2").expect("user").borrowed_books().is_empty());
    assert_eq!(state.repository.users.all(), before.users.all());
    assert_eq!(state.repository.books.all(), before.books.all());
}

#[rstest]
fn test_borrow_count_counts_every_checkout(mut state: AppState) {
    let now = Utc::now();
    let circulation = state.services.circulation.clone();
    circulation.borrow(&mut state.repository, "111", "U1", now).expect("borrow");
    circulation.return_book(&mut state.repository, "111", "U1", now).expect("return");
    circulation.rent(&mut state.repository, "111", "U2", now).expect("rent");

    assert_eq!(state.repository.books.get("111").expect("book").borrow_count(), 2);
}

#[rstest]
fn test_return_updates_both_sides(mut state: AppState) {
    let now = Utc::now();
    let circulation = state.services.circulation.clone();
    circulation.borrow(&mut state.repository, "111", "U1", now).expect("borrow");
    let receipt = circulation
        .return_book(&mut state.repository, "111", "U1", now + Duration::days(1))
        .expect("return");
    assert!(!receipt.fine.is_due());

    let book = state.repository.books.get("111").expect("book");
    assert!(!book.is_borrowed());
    assert!(book.due_date().is_none());
    let user = state.repository.users.get("U1").expect("user");
    assert!(user.borrowed_books().is_empty());
    assert_eq!(user.activity_log().len(), 2);

    // Second return has nothing to act on
    let err = circulation
        .return_book(&mut state.repository, "111", "U1", now)
        .unwrap_err();
    assert!(err.is_no_op());
}

#[rstest]
fn test_reservation_queue_hands_book_over(mut state: AppState) {
    let now = Utc::now();
    let circulation = state.services.circulation.clone();
    circulation.borrow(&mut state.repository, "111", "U1", now).expect("borrow");
    assert_eq!(circulation.reserve(&mut state.repository, "111", "U2").expect("reserve"), 1);
    assert_eq!(circulation.reserve(&mut state.repository, "111", "U3").expect("reserve"), 2);
    assert_eq!(
        circulation.reservations_of(&state.repository, "U3").expect("reservations"),
        ["111"]
    );

    let receipt = circulation
        .return_book(&mut state.repository, "111", "U1", now)
        .expect("return");
    assert_eq!(receipt.next_in_queue.as_deref(), Some("U2"));
    assert_eq!(
        state.repository.users.get("U2").expect("user").notifications().len(),
        1
    );

    // Only the head of the queue may collect
    assert!(matches!(
        circulation.borrow(&mut state.repository, "111", "U3", now),
        Err(AppError::InvalidState(_))
    ));
    circulation.borrow(&mut state.repository, "111", "U2", now).expect("collect");

    let book = state.repository.books.get("111").expect("book");
    assert_eq!(book.reserved_by(), Some("U3"));
    assert!(state.repository.users.get("U2").expect("user").reserved_books().is_empty());
}

#[rstest]
fn test_overdue_fine_and_waiver(mut state: AppState) {
    let now = Utc::now();
    let circulation = state.services.circulation.clone();
    circulation.borrow(&mut state.repository, "111", "U1", now).expect("borrow");
    let due = state.repository.books.get("111").expect("book").due_date();

    let late = now + Duration::days(14) + Duration::hours(49);
    let fine = circulation.assess_fine(&state.repository, "111", late).expect("fine");
    assert_eq!(fine.days_overdue, 3);
    assert_eq!(fine.amount, Decimal::new(75, 2));
    assert_eq!(fine.user_id.as_deref(), Some("U1"));

    circulation.waive_fine(&mut state.repository, "111").expect("waive");
    let fine = circulation.assess_fine(&state.repository, "111", late).expect("fine");
    assert_eq!(fine.amount, Decimal::ZERO);
    assert!(fine.waived);
    assert_eq!(state.repository.books.get("111").expect("book").due_date(), due);
}

#[rstest]
fn test_snapshot_survives_circulation(mut state: AppState) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("library.json");
    let now = Utc::now();
    let circulation = state.services.circulation.clone();
    circulation.rent(&mut state.repository, "111", "U1", now).expect("rent");
    circulation.reserve(&mut state.repository, "111", "U2").expect("reserve");
    state
        .services
        .catalog
        .rate(&mut state.repository, "111", "U3", 5)
        .expect("rate");

    state.services.persistence.save(&state.repository, &path).expect("save");
    let mut restored = AppState::new(AppConfig::default());
    restored
        .services
        .persistence
        .load(&mut restored.repository, &path)
        .expect("load");

    assert_eq!(restored.repository.books.all(), state.repository.books.all());
    assert_eq!(restored.repository.users.all(), state.repository.users.all());
}
