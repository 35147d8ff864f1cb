//! Tests for the entry service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    EntryRepositoryError, MockCompanionRepository, MockCustomTypeRepository, MockEntryRepository,
};
use crate::domain::{CoffeeType, ErrorCode, Patch};
use crate::test_support::{companion, custom_type, entry, fixture_clock, fixture_now, utc};

type Service = EntriesService<MockEntryRepository, MockCustomTypeRepository, MockCompanionRepository>;

fn make_service(
    entries: MockEntryRepository,
    custom_types: MockCustomTypeRepository,
    companions: MockCompanionRepository,
) -> Service {
    EntriesService::new(
        Arc::new(entries),
        Arc::new(custom_types),
        Arc::new(companions),
        fixture_clock(fixture_now()),
    )
}

/// Entry repository that echoes writes back as hydrated entries.
fn echoing_entries() -> MockEntryRepository {
    let mut entries = MockEntryRepository::new();
    entries
        .expect_insert()
        .returning(|write| Ok(CoffeeEntry::from_record(write.record.clone(), None, Vec::new())));
    entries
}

fn new_entry(
    coffee_type: Option<CoffeeType>,
    custom_type_id: Option<CustomTypeId>,
    companion_ids: Vec<CompanionId>,
) -> NewEntry {
    NewEntry::try_new(
        coffee_type,
        custom_type_id,
        CoffeeSize::Large,
        None,
        None,
        companion_ids,
    )
    .expect("valid entry")
}

#[tokio::test]
async fn create_derives_caffeine_and_defaults_consumed_at() {
    let user_id = UserId::random();
    let service = make_service(
        echoing_entries(),
        MockCustomTypeRepository::new(),
        MockCompanionRepository::new(),
    );

    let created = service
        .create(&user_id, new_entry(Some(CoffeeType::Latte), None, vec![]))
        .await
        .expect("create succeeds");

    assert_eq!(created.caffeine_mg, 225);
    assert_eq!(created.consumed_at, fixture_now());
    assert_eq!(created.user_id, user_id);
}

#[tokio::test]
async fn create_scales_custom_type_base() {
    let user_id = UserId::random();
    let custom = custom_type(user_id, "Cold foam", Some(100));
    let custom_id = custom.id;
    let mut custom_types = MockCustomTypeRepository::new();
    custom_types
        .expect_find()
        .return_once(move |_, _| Ok(Some(custom)));

    let created = make_service(echoing_entries(), custom_types, MockCompanionRepository::new())
        .create(&user_id, new_entry(None, Some(custom_id), vec![]))
        .await
        .expect("create succeeds");

    assert_eq!(created.caffeine_mg, 150);
    assert_eq!(created.coffee_type, None);
}

#[tokio::test]
async fn create_rejects_custom_type_owned_by_someone_else() {
    let mut custom_types = MockCustomTypeRepository::new();
    custom_types.expect_find().return_once(|_, _| Ok(None));
    let mut entries = MockEntryRepository::new();
    entries.expect_insert().never();

    let error = make_service(entries, custom_types, MockCompanionRepository::new())
        .create(
            &UserId::random(),
            new_entry(None, Some(CustomTypeId::random()), vec![]),
        )
        .await
        .expect_err("foreign custom type");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn create_rejects_unowned_companions() {
    let user_id = UserId::random();
    let mine = companion(user_id, "Carmen");
    let ids = vec![mine.id, CompanionId::random()];
    let mut companions = MockCompanionRepository::new();
    companions
        .expect_find_many()
        .return_once(move |_, _| Ok(vec![mine]));
    let mut entries = MockEntryRepository::new();
    entries.expect_insert().never();

    let error = make_service(entries, MockCustomTypeRepository::new(), companions)
        .create(&user_id, new_entry(Some(CoffeeType::Drip), None, ids))
        .await
        .expect_err("foreign companion");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Companion not found");
}

fn updating_entries(existing: CoffeeEntry) -> MockEntryRepository {
    let mut entries = MockEntryRepository::new();
    entries
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    entries
        .expect_update()
        .returning(|write| Ok(Some(CoffeeEntry::from_record(write.record.clone(), None, Vec::new()))));
    entries
}

#[tokio::test]
async fn updating_only_size_recomputes_caffeine() {
    let user_id = UserId::random();
    let existing = entry(user_id, CoffeeType::Latte, CoffeeSize::Medium, utc(2024, 3, 1, 8, 0));
    let changes = EntryChanges {
        size: Some(CoffeeSize::Large),
        ..EntryChanges::default()
    };

    let updated = make_service(
        updating_entries(existing.clone()),
        MockCustomTypeRepository::new(),
        MockCompanionRepository::new(),
    )
    .update(&user_id, &existing.id, changes)
    .await
    .expect("update succeeds");

    assert_eq!(updated.caffeine_mg, 225);
    assert_eq!(updated.coffee_type, Some(CoffeeType::Latte));
    assert_eq!(updated.updated_at, fixture_now());
    assert_eq!(updated.created_at, existing.created_at);
}

#[tokio::test]
async fn switching_to_custom_type_clears_fixed_type() {
    let user_id = UserId::random();
    let existing = entry(user_id, CoffeeType::Latte, CoffeeSize::Medium, utc(2024, 3, 1, 8, 0));
    let custom = custom_type(user_id, "Pour over", None);
    let custom_id = custom.id;
    let mut custom_types = MockCustomTypeRepository::new();
    custom_types
        .expect_find()
        .return_once(move |_, _| Ok(Some(custom)));
    let mut entries = MockEntryRepository::new();
    entries
        .expect_find()
        .return_once({
            let existing = existing.clone();
            move |_, _| Ok(Some(existing))
        });
    entries
        .expect_update()
        .withf(move |write| {
            write.record.coffee_type.is_none()
                && write.record.custom_type_id == Some(custom_id)
                && write.record.caffeine_mg == 100
                && write.companion_ids.is_none()
        })
        .times(1)
        .returning(|write| Ok(Some(CoffeeEntry::from_record(write.record.clone(), None, Vec::new()))));

    let changes = EntryChanges {
        custom_type_id: Patch::Set(custom_id),
        ..EntryChanges::default()
    };
    make_service(entries, custom_types, MockCompanionRepository::new())
        .update(&user_id, &existing.id, changes)
        .await
        .expect("update succeeds");
}

#[tokio::test]
async fn clearing_the_only_source_is_rejected() {
    let user_id = UserId::random();
    let existing = entry(user_id, CoffeeType::Mocha, CoffeeSize::Small, utc(2024, 3, 1, 8, 0));
    let mut entries = MockEntryRepository::new();
    entries
        .expect_find()
        .return_once(move |_, _| Ok(Some(existing)));
    entries.expect_update().never();

    let changes = EntryChanges {
        coffee_type: Patch::Clear,
        ..EntryChanges::default()
    };
    let error = make_service(entries, MockCustomTypeRepository::new(), MockCompanionRepository::new())
        .update(&user_id, &EntryId::random(), changes)
        .await
        .expect_err("no caffeine source left");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn resizing_an_entry_orphaned_by_custom_type_delete_uses_fallback() {
    let user_id = UserId::random();
    let mut orphaned = entry(user_id, CoffeeType::Latte, CoffeeSize::Large, utc(2024, 3, 1, 8, 0));
    orphaned.coffee_type = None;
    orphaned.caffeine_mg = 150;
    let changes = EntryChanges {
        size: Some(CoffeeSize::Small),
        ..EntryChanges::default()
    };

    let updated = make_service(
        updating_entries(orphaned.clone()),
        MockCustomTypeRepository::new(),
        MockCompanionRepository::new(),
    )
    .update(&user_id, &orphaned.id, changes)
    .await
    .expect("resize succeeds");

    assert_eq!(updated.caffeine_mg, calculate_custom_caffeine(None, CoffeeSize::Small));
    assert_eq!(updated.coffee_type, None);
    assert_eq!(updated.custom_type_id(), None);
}

#[tokio::test]
async fn clearing_the_type_of_an_orphaned_entry_is_rejected() {
    let user_id = UserId::random();
    let mut orphaned = entry(user_id, CoffeeType::Latte, CoffeeSize::Large, utc(2024, 3, 1, 8, 0));
    orphaned.coffee_type = None;
    let mut entries = MockEntryRepository::new();
    entries
        .expect_find()
        .return_once(move |_, _| Ok(Some(orphaned)));
    entries.expect_update().never();

    let changes = EntryChanges {
        coffee_type: Patch::Clear,
        ..EntryChanges::default()
    };
    let error = make_service(entries, MockCustomTypeRepository::new(), MockCompanionRepository::new())
        .update(&user_id, &EntryId::random(), changes)
        .await
        .expect_err("explicit clear without a source");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn notes_only_update_keeps_caffeine() {
    let user_id = UserId::random();
    let mut existing = entry(user_id, CoffeeType::Mocha, CoffeeSize::Small, utc(2024, 3, 1, 8, 0));
    existing.caffeine_mg = 77;
    let changes = EntryChanges {
        notes: Patch::Set("with oat milk".to_owned()),
        ..EntryChanges::default()
    };

    let updated = make_service(
        updating_entries(existing.clone()),
        MockCustomTypeRepository::new(),
        MockCompanionRepository::new(),
    )
    .update(&user_id, &existing.id, changes)
    .await
    .expect("update succeeds");

    assert_eq!(updated.caffeine_mg, 77);
    assert_eq!(updated.notes.as_deref(), Some("with oat milk"));
}

#[tokio::test]
async fn missing_entries_report_not_found() {
    let mut entries = MockEntryRepository::new();
    entries.expect_find().returning(|_, _| Ok(None));
    entries.expect_delete().returning(|_, _| Ok(false));
    let service = make_service(entries, MockCustomTypeRepository::new(), MockCompanionRepository::new());
    let user_id = UserId::random();
    let entry_id = EntryId::random();

    let get = service.get(&user_id, &entry_id).await.expect_err("missing");
    let update = service
        .update(&user_id, &entry_id, EntryChanges::default())
        .await
        .expect_err("missing");
    let delete = EntriesCommand::delete(&service, &user_id, &entry_id)
        .await
        .expect_err("missing");

    for error in [get, update, delete] {
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}

#[tokio::test]
async fn list_reports_page_window() {
    let user_id = UserId::random();
    let item = entry(user_id, CoffeeType::Drip, CoffeeSize::Medium, utc(2024, 3, 1, 8, 0));
    let mut entries = MockEntryRepository::new();
    entries
        .expect_list_page()
        .withf(|_, _, page| page.limit == 1 && page.offset == 2)
        .return_once(move |_, _, _| Ok((vec![item], 5)));

    let page = make_service(entries, MockCustomTypeRepository::new(), MockCompanionRepository::new())
        .list(
            &user_id,
            DateRange::default(),
            PageRequest { limit: 1, offset: 2 },
        )
        .await
        .expect("list succeeds");

    assert_eq!(page.total, 5);
    assert!(page.has_more());
}

#[tokio::test]
async fn repository_failures_are_mapped() {
    let mut entries = MockEntryRepository::new();
    entries
        .expect_find()
        .return_once(|_, _| Err(EntryRepositoryError::query("syntax error")));

    let error = make_service(entries, MockCustomTypeRepository::new(), MockCompanionRepository::new())
        .get(&UserId::random(), &EntryId::random())
        .await
        .expect_err("query failure");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
