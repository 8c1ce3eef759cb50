//! Search predicate semantics against a pinned "today".

use chrono::NaiveDate;
use phonebook_common::{ContactStore, NewPerson, NewPhone, SearchFilter};
use tempfile::tempdir;

const TODAY: (i32, u32, u32) = (2025, 8, 7);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
}

fn seeded_store() -> (ContactStore, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = ContactStore::open(dir.path().join("contacts.db"), true).unwrap();

    let people: &[(&str, &str, Option<&str>, bool, &str, Option<&str>)] = &[
        // Age 35 at the pinned date; birthday passed this year.
        ("Ann", "Lee", Some("01-06-1990"), true, "89990001122", None),
        // Age 24; birthday in 13 days.
        ("Bob", "Ray", Some("20-08-2000"), false, "89990001133", Some("work")),
        // Age 29; birthday in ~4 months.
        ("Cat", "Fox", Some("10-12-1995"), false, "89990001144", None),
        // No birthday on file.
        ("Dan", "Orr", None, true, "89990001155", Some("home")),
    ];
    for (first, last, birthday, favourite, number, description) in people {
        store
            .insert_record(
                &NewPerson {
                    first_name: (*first).into(),
                    last_name: (*last).into(),
                    birthday: birthday.map(Into::into),
                    is_favourite: *favourite,
                },
                &NewPhone {
                    number: (*number).into(),
                    description: description.map(Into::into),
                },
            )
            .unwrap();
    }
    (store, dir)
}

fn names(rows: &[phonebook_common::ContactRow]) -> Vec<&str> {
    rows.iter().map(|r| r.first_name.as_str()).collect()
}

#[test]
fn unfiltered_read_returns_everyone_ordered_by_name() {
    let (store, _dir) = seeded_store();
    let rows = store.search_at(&SearchFilter::default(), today()).unwrap();
    assert_eq!(names(&rows), ["Ann", "Bob", "Cat", "Dan"]);
}

#[test]
fn favourite_flag_filters_rows() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        is_favourite: Some(true),
        ..SearchFilter::default()
    };
    let rows = store.search_at(&filter, today()).unwrap();
    assert_eq!(names(&rows), ["Ann", "Dan"]);
}

#[test]
fn birthday_prefix_matches_any_year_and_drops_unset() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        birthday_prefix: Some("20-08".into()),
        ..SearchFilter::default()
    };
    let rows = store.search_at(&filter, today()).unwrap();
    assert_eq!(names(&rows), ["Bob"]);
}

#[test]
fn description_and_number_are_exact_matches() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        description: Some("work".into()),
        ..SearchFilter::default()
    };
    assert_eq!(names(&store.search_at(&filter, today()).unwrap()), ["Bob"]);

    let filter = SearchFilter {
        number: Some("89990001144".into()),
        ..SearchFilter::default()
    };
    assert_eq!(names(&store.search_at(&filter, today()).unwrap()), ["Cat"]);
}

#[test]
fn age_interval_is_inclusive_and_excludes_unset_birthdays() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        age_from: Some(24),
        age_to: Some(29),
        ..SearchFilter::default()
    };
    let rows = store.search_at(&filter, today()).unwrap();
    // Dan has no birthday on file and must not pass an age filter.
    assert_eq!(names(&rows), ["Bob", "Cat"]);
}

#[test]
fn exact_age_keeps_only_that_age() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        age_from: Some(35),
        age_to: Some(35),
        ..SearchFilter::default()
    };
    let rows = store.search_at(&filter, today()).unwrap();
    assert_eq!(names(&rows), ["Ann"]);
    assert_eq!(rows[0].birthday_display(), "01-06-1990\n(35 years)");
}

#[test]
fn nearest_birthday_keeps_the_thirty_day_window() {
    let (store, _dir) = seeded_store();
    let rows = store
        .search_at(&SearchFilter::nearest_birthdays(), today())
        .unwrap();
    // Only Bob's birthday (13 days out) is inside [0, 30]; Dan has none.
    assert_eq!(names(&rows), ["Bob"]);
}

#[test]
fn nearest_birthday_rolls_over_the_year_end() {
    let dir = tempdir().unwrap();
    let store = ContactStore::open(dir.path().join("contacts.db"), true).unwrap();
    store
        .insert_record(
            &NewPerson {
                first_name: "Eve".into(),
                last_name: "Yun".into(),
                birthday: Some("03-01-1992".into()),
                is_favourite: false,
            },
            &NewPhone {
                number: "89990001166".into(),
                description: None,
            },
        )
        .unwrap();

    let late_december = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
    let rows = store
        .search_at(&SearchFilter::nearest_birthdays(), late_december)
        .unwrap();
    assert_eq!(names(&rows), ["Eve"]);
}

#[test]
fn phone_id_and_owner_filters_select_single_rows() {
    let (store, _dir) = seeded_store();
    let all = store.search_at(&SearchFilter::default(), today()).unwrap();
    let bob = all.iter().find(|r| r.first_name == "Bob").unwrap();

    let filter = SearchFilter {
        phone_id: Some(bob.phone_id),
        ..SearchFilter::default()
    };
    assert_eq!(names(&store.search_at(&filter, today()).unwrap()), ["Bob"]);

    let filter = SearchFilter {
        phone_owner: Some(bob.person_id),
        ..SearchFilter::default()
    };
    assert_eq!(names(&store.search_at(&filter, today()).unwrap()), ["Bob"]);
}

#[test]
fn combined_filters_must_all_hold() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        is_favourite: Some(true),
        age_from: Some(30),
        age_to: Some(40),
        ..SearchFilter::default()
    };
    let rows = store.search_at(&filter, today()).unwrap();
    assert_eq!(names(&rows), ["Ann"]);

    // Same age window, wrong favourite flag: nothing qualifies.
    let filter = SearchFilter {
        is_favourite: Some(false),
        age_from: Some(30),
        age_to: Some(40),
        ..SearchFilter::default()
    };
    assert!(store.search_at(&filter, today()).unwrap().is_empty());
}

#[test]
fn rows_without_birthday_pass_only_underived_filters() {
    let (store, _dir) = seeded_store();
    let filter = SearchFilter {
        first_name: Some("Dan".into()),
        ..SearchFilter::default()
    };
    let rows = store.search_at(&filter, today()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].age_years, None);
    assert_eq!(rows[0].birthday_display(), "");
}
