//! Tests for the contacts service.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::MockContactRepository;
use crate::domain::{ContactFields, ErrorCode};
use crate::test_support::MutableClock;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn draft(first_name: &str, birthday: NaiveDate) -> ContactDraft {
    ContactDraft::try_from_fields(ContactFields {
        first_name,
        last_name: "Doe",
        email: "someone@example.com",
        phone_number: "0931234567",
        birthday,
        additional_data: None,
    })
    .expect("valid draft")
}

fn contact(owner: &UserId, first_name: &str, birthday: NaiveDate) -> Contact {
    let created = at(2024, 1, 1);
    Contact::new(
        ContactId::random(),
        owner.clone(),
        draft(first_name, birthday),
        created,
        created,
    )
}

fn service(
    repo: MockContactRepository,
    now: DateTime<Utc>,
) -> ContactsService<MockContactRepository> {
    ContactsService::new(Arc::new(repo), Arc::new(MutableClock::new(now)))
}

#[tokio::test]
async fn create_stamps_owner_and_timestamps() {
    let owner = UserId::random();
    let expected_owner = owner.clone();
    let mut repo = MockContactRepository::new();
    repo.expect_insert()
        .withf(move |contact| {
            *contact.owner() == expected_owner
                && contact.created_at() == at(2024, 5, 1)
                && contact.updated_at() == at(2024, 5, 1)
        })
        .times(1)
        .return_once(|_| Ok(()));

    let created = service(repo, at(2024, 5, 1))
        .create(&owner, draft("Ada", date(1990, 3, 4)))
        .await
        .expect("contact created");
    assert_eq!(created.fields().first_name(), "Ada");
}

#[tokio::test]
async fn create_rejects_future_birthday() {
    let mut repo = MockContactRepository::new();
    repo.expect_insert().never();

    let error = service(repo, at(2024, 5, 1))
        .create(&UserId::random(), draft("Ada", date(2024, 5, 2)))
        .await
        .expect_err("future birthday");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(details["field"], "birthday");
    assert_eq!(details["code"], "birthday_in_future");
}

#[tokio::test]
async fn create_accepts_birthday_today() {
    let mut repo = MockContactRepository::new();
    repo.expect_insert().return_once(|_| Ok(()));

    service(repo, at(2024, 5, 1))
        .create(&UserId::random(), draft("Ada", date(2024, 5, 1)))
        .await
        .expect("today is not the future");
}

#[tokio::test]
async fn get_reports_foreign_or_missing_contact_as_not_found() {
    let mut repo = MockContactRepository::new();
    repo.expect_find().return_once(|_, _| Ok(None));

    let error = service(repo, at(2024, 5, 1))
        .get(&UserId::random(), &ContactId::random())
        .await
        .expect_err("not found");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_passes_clock_time_and_reports_missing() {
    let mut repo = MockContactRepository::new();
    repo.expect_update()
        .withf(|_, _, _, updated_at| *updated_at == at(2024, 5, 1))
        .times(1)
        .return_once(|_, _, _, _| Ok(None));

    let error = service(repo, at(2024, 5, 1))
        .update(
            &UserId::random(),
            &ContactId::random(),
            draft("Ada", date(1990, 3, 4)),
        )
        .await
        .expect_err("not found");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_reports_whether_anything_matched(
    #[case] deleted: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let mut repo = MockContactRepository::new();
    repo.expect_delete().return_once(move |_, _| Ok(deleted));

    let result = service(repo, at(2024, 5, 1))
        .delete(&UserId::random(), &ContactId::random())
        .await;
    assert_eq!(result.err().map(|error| error.code()), expected);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn search_rejects_blank_text(#[case] text: &str) {
    let mut repo = MockContactRepository::new();
    repo.expect_search().never();

    let error = service(repo, at(2024, 5, 1))
        .search(&UserId::random(), text, Page::default())
        .await
        .expect_err("blank search");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn search_trims_text_before_querying() {
    let mut repo = MockContactRepository::new();
    repo.expect_search()
        .withf(|_, needle, _| needle == "doe")
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));

    let found = service(repo, at(2024, 5, 1))
        .search(&UserId::random(), "  doe ", Page::default())
        .await
        .expect("search succeeds");
    assert!(found.is_empty());
}

#[tokio::test]
async fn upcoming_birthdays_wrap_across_year_end() {
    let owner = UserId::random();
    let contacts = vec![
        contact(&owner, "March", date(1985, 3, 1)),
        contact(&owner, "January", date(1990, 1, 2)),
        contact(&owner, "December", date(1992, 12, 31)),
    ];
    let mut repo = MockContactRepository::new();
    repo.expect_list_all().return_once(move |_| Ok(contacts));

    let upcoming = service(repo, at(2024, 12, 28))
        .upcoming_birthdays(&owner, BirthdayWindow::default())
        .await
        .expect("window computed");
    let names: Vec<&str> = upcoming
        .iter()
        .map(|contact| contact.fields().first_name())
        .collect();
    assert_eq!(names, ["December", "January"]);
}

#[tokio::test]
async fn list_maps_connection_failures_to_service_unavailable() {
    let mut repo = MockContactRepository::new();
    repo.expect_list()
        .return_once(|_, _| Err(ContactRepositoryError::connection("pool timed out")));

    let error = service(repo, at(2024, 5, 1))
        .list(&UserId::random(), Page::default())
        .await
        .expect_err("pool down");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
