//! Repository layer against a real database.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use scholar_core::assoc::AssocType;
use scholar_core::controlled_vocab::ResultRange;
use scholar_core::payment::{CompletedPayment, QueuedPayment};
use scholar_core::pub_ids::{PubObject, PubObjectKind, PubIdRegistry, PUB_ID_TYPE_PUBLISHER_ID};
use scholar_core::tombstone::DataObjectTombstone;
use scholar_db::models::announcement::{CreateAnnouncement, CreateAnnouncementType, UpdateAnnouncement};
use scholar_db::models::controlled_vocab::CreateEntry;
use scholar_db::models::journal::CreateJournal;
use scholar_db::models::navigation_menu::{AssignItem, CreateNavigationMenu, CreateNavigationMenuItem};
use scholar_db::models::session::CreateSession;
use scholar_db::repositories::{
    is_duplicate_pub_id, AnnouncementRepo, AnnouncementTypeRepo, CompletedPaymentRepo,
    ControlledVocabRepo, JournalRepo, NavigationMenuItemRepo, NavigationMenuRepo,
    PgPubIdRegistry, PubIdRepo,
    QueuedPaymentRepo, ScheduledTaskRepo, SessionRepo, SiteSettingsRepo, SubeditorRepo,
    SubmissionAgencyEntryRepo, TombstoneRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn migrated(pool: &PgPool) {
    scholar_db::run_migrations(pool).await.unwrap();
}

fn localized(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn new_journal(pool: &PgPool, path: &str) -> i64 {
    JournalRepo::create(
        pool,
        &CreateJournal {
            path: path.to_string(),
            primary_locale: "en".to_string(),
            name: Some(format!("Journal {path}")),
            enabled: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Journals and site settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn journal_create_and_lookup(pool: PgPool) {
    migrated(&pool).await;

    let id = new_journal(&pool, "jcs").await;
    let by_path = JournalRepo::find_by_path(&pool, "jcs").await.unwrap().unwrap();
    assert_eq!(by_path.id, id);
    assert_eq!(by_path.display_name(), "Journal jcs");
    assert_eq!(JournalRepo::count(&pool).await.unwrap(), 1);
    assert!(JournalRepo::find_by_id(&pool, id + 1).await.unwrap().is_none());
}

#[sqlx::test(migrations = false)]
async fn bulk_email_contexts_from_site_settings(pool: PgPool) {
    migrated(&pool).await;

    assert!(SiteSettingsRepo::bulk_email_context_ids(&pool).await.unwrap().is_empty());
    SiteSettingsRepo::set(&pool, "enableBulkEmails", "[1, 3]").await.unwrap();
    assert_eq!(
        SiteSettingsRepo::bulk_email_context_ids(&pool).await.unwrap(),
        vec![1, 3]
    );
}

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn announcement_crud_with_localized_settings(pool: PgPool) {
    migrated(&pool).await;
    let journal = AssocType::Journal.code() as i16;

    let kind = AnnouncementTypeRepo::create(
        &pool,
        &CreateAnnouncementType {
            assoc_type: journal,
            assoc_id: 1,
            name: localized(&[("en", "News"), ("fr", "Nouvelles")]),
        },
    )
    .await
    .unwrap();

    let created = AnnouncementRepo::create(
        &pool,
        &CreateAnnouncement {
            assoc_type: Some(journal),
            assoc_id: 1,
            type_id: Some(kind.announcement_type.id),
            date_expire: None,
            title: localized(&[("en", "Call for papers")]),
            description_short: localized(&[("en", "Submit now")]),
            description: BTreeMap::new(),
        },
    )
    .await
    .unwrap();
    let id = created.announcement.id;
    assert_eq!(created.settings["title"]["en"], "Call for papers");

    let updated = AnnouncementRepo::update(
        &pool,
        id,
        &UpdateAnnouncement {
            title: Some(localized(&[("en", "Call for papers (extended)")])),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.settings["title"]["en"], "Call for papers (extended)");
    assert_eq!(updated.settings["descriptionShort"]["en"], "Submit now");

    let listed = AnnouncementRepo::list_by_assoc(&pool, journal, 1, true, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // Deleting the type takes its announcements with it.
    assert!(AnnouncementTypeRepo::delete(&pool, kind.announcement_type.id).await.unwrap());
    assert!(AnnouncementRepo::find_by_id(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = false)]
async fn expired_announcements_are_hidden_from_active_listing(pool: PgPool) {
    migrated(&pool).await;
    let journal = AssocType::Journal.code() as i16;

    let base = CreateAnnouncement {
        assoc_type: Some(journal),
        assoc_id: 1,
        type_id: None,
        date_expire: None,
        title: localized(&[("en", "Current")]),
        description_short: BTreeMap::new(),
        description: BTreeMap::new(),
    };
    AnnouncementRepo::create(&pool, &base).await.unwrap();
    AnnouncementRepo::create(
        &pool,
        &CreateAnnouncement {
            date_expire: NaiveDate::from_ymd_opt(2000, 1, 1),
            title: localized(&[("en", "Old")]),
            ..base.clone()
        },
    )
    .await
    .unwrap();

    let active = AnnouncementRepo::list_by_assoc(&pool, journal, 1, true, None)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].settings["title"]["en"], "Current");

    let all = AnnouncementRepo::list_by_assoc(&pool, journal, 1, false, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

// ---------------------------------------------------------------------------
// Scheduled tasks, sessions, subeditors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn scheduled_task_last_run_upserts(pool: PgPool) {
    migrated(&pool).await;
    let task = "PurgeExpiredQueuedPayments";

    assert!(ScheduledTaskRepo::last_run(&pool, task).await.unwrap().is_none());

    let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(3, 0, 0).unwrap();
    let second = first + Duration::days(1);
    ScheduledTaskRepo::update_last_run(&pool, task, first).await.unwrap();
    ScheduledTaskRepo::update_last_run(&pool, task, second).await.unwrap();

    assert_eq!(ScheduledTaskRepo::last_run(&pool, task).await.unwrap(), Some(second));
    assert_eq!(ScheduledTaskRepo::list(&pool).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = false)]
async fn expire_sessions_removes_everything(pool: PgPool) {
    migrated(&pool).await;

    for (id, remember) in [("a", false), ("b", true)] {
        SessionRepo::create(
            &pool,
            &CreateSession {
                session_id: id.to_string(),
                user_id: Some(1),
                ip_address: "127.0.0.1".to_string(),
                user_agent: None,
                remember,
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(SessionRepo::count(&pool).await.unwrap(), 2);

    // Fresh sessions survive idle expiry.
    let purged = SessionRepo::delete_expired(&pool, Duration::hours(1), Duration::days(30))
        .await
        .unwrap();
    assert_eq!(purged, 0);

    assert_eq!(SessionRepo::delete_all(&pool).await.unwrap(), 2);
    assert_eq!(SessionRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = false)]
async fn subeditors_for_sections_and_categories(pool: PgPool) {
    migrated(&pool).await;
    let section = AssocType::Section.code();
    let category = AssocType::Category.code();

    assert!(SubeditorRepo::assign(&pool, 1, section, 5, 9).await.unwrap());
    assert!(!SubeditorRepo::assign(&pool, 1, section, 5, 9).await.unwrap());
    assert!(SubeditorRepo::assign(&pool, 1, category, 5, 9).await.unwrap());

    assert_eq!(SubeditorRepo::list_by_group(&pool, 1, section, 5).await.unwrap().len(), 1);
    assert_eq!(SubeditorRepo::list_by_user(&pool, 1, 9).await.unwrap().len(), 2);

    assert!(SubeditorRepo::remove(&pool, 1, category, 5, 9).await.unwrap());
    assert_eq!(SubeditorRepo::list_by_user(&pool, 1, 9).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn queued_payment_completes_atomically(pool: PgPool) {
    migrated(&pool).await;

    let mut queued = QueuedPayment::new(25.0, "EUR", Some(4), Some(17));
    queued.payment.context_id = 1;
    queued.set_request_url("https://example.org/return");
    let id = QueuedPaymentRepo::insert(&pool, &queued, None).await.unwrap();

    let stored = QueuedPaymentRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.id(), Some(id));
    assert_eq!(stored.request_url(), Some("https://example.org/return"));
    assert_eq!(stored.payment.amount, 25.0);

    let completed = CompletedPayment::from_queued(&stored, Some("ManualPayment"));
    let completed_id = CompletedPaymentRepo::complete_queued(&pool, id, &completed)
        .await
        .unwrap()
        .unwrap();

    assert!(QueuedPaymentRepo::find_by_id(&pool, id).await.unwrap().is_none());
    let ledger = CompletedPaymentRepo::find_by_id(&pool, completed_id).await.unwrap().unwrap();
    assert_eq!(ledger.payment.currency_code, "EUR");
    assert_eq!(ledger.pay_method_plugin_name.as_deref(), Some("ManualPayment"));

    // A second completion finds nothing to move.
    let again = CompletedPaymentRepo::complete_queued(&pool, id, &completed).await.unwrap();
    assert!(again.is_none());
    assert_eq!(CompletedPaymentRepo::list_by_context(&pool, 1, 50, 0).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = false)]
async fn expired_queued_payments_are_purged(pool: PgPool) {
    migrated(&pool).await;

    let queued = QueuedPayment::new(5.0, "USD", None, None);
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let next_week = (Utc::now() + Duration::days(7)).date_naive();
    let old = QueuedPaymentRepo::insert(&pool, &queued, Some(yesterday)).await.unwrap();
    let live = QueuedPaymentRepo::insert(&pool, &queued, Some(next_week)).await.unwrap();
    let open = QueuedPaymentRepo::insert(&pool, &queued, None).await.unwrap();

    assert_eq!(QueuedPaymentRepo::delete_expired(&pool).await.unwrap(), 1);
    assert!(QueuedPaymentRepo::find_by_id(&pool, old).await.unwrap().is_none());
    assert!(QueuedPaymentRepo::find_by_id(&pool, live).await.unwrap().is_some());
    assert!(QueuedPaymentRepo::find_by_id(&pool, open).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Navigation menus
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn navigation_menu_tree_follows_assignments(pool: PgPool) {
    migrated(&pool).await;

    let menu = NavigationMenuRepo::create(
        &pool,
        1,
        &CreateNavigationMenu {
            title: "Primary".to_string(),
            area_name: Some("primary".to_string()),
        },
    )
    .await
    .unwrap();

    let item = |item_type: &'static str, title: &'static str| {
        let pool = pool.clone();
        async move {
            NavigationMenuItemRepo::create(
                &pool,
                1,
                &CreateNavigationMenuItem {
                    item_type: item_type.to_string(),
                    path: None,
                    titles: localized(&[("en", title)]),
                },
            )
            .await
            .unwrap()
        }
    };
    let about = item("NMI_TYPE_ABOUT", "About").await;
    let contact = item("NMI_TYPE_CONTACT", "Contact").await;
    let archives = item("NMI_TYPE_ARCHIVES", "Archives").await;

    NavigationMenuRepo::replace_assignments(
        &pool,
        menu.id,
        &[
            AssignItem { item_id: archives.id, parent_id: None, seq: 0 },
            AssignItem { item_id: about.id, parent_id: None, seq: 1 },
            AssignItem { item_id: contact.id, parent_id: Some(about.id), seq: 0 },
        ],
    )
    .await
    .unwrap();

    let mut loaded = NavigationMenuRepo::find_by_area(&pool, 1, "primary")
        .await
        .unwrap()
        .unwrap();
    NavigationMenuRepo::load_tree(&pool, &mut loaded).await.unwrap();
    let tree = loaded.menu_tree.unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].item.id, archives.id);
    assert_eq!(tree[1].item.id, about.id);
    assert_eq!(tree[1].children.len(), 1);
    assert_eq!(tree[1].children[0].item.titles["en"], "Contact");

    // Deleting an item drops its assignment; the menu remains.
    assert!(NavigationMenuItemRepo::delete(&pool, 1, archives.id).await.unwrap());
    assert_eq!(NavigationMenuRepo::assignments(&pool, menu.id).await.unwrap().len(), 2);
    assert!(NavigationMenuRepo::find_by_id(&pool, 2, menu.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Tombstones
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn tombstone_keeps_set_objects(pool: PgPool) {
    migrated(&pool).await;

    let mut tombstone =
        DataObjectTombstone::new(42, "jcs:ART", "Articles", "oai:example.org:article/42");
    tombstone.set_oai_set_object_id(AssocType::Journal, 1);
    tombstone.set_oai_set_object_id(AssocType::Section, 3);

    let stored = TombstoneRepo::insert(&pool, &tombstone).await.unwrap();
    assert!(stored.id.is_some());
    assert!(stored.date_deleted.is_some());

    let found = TombstoneRepo::find_by_data_object_id(&pool, 42).await.unwrap().unwrap();
    assert_eq!(found.oai_set_object_id(AssocType::Section), Some(3));
    assert_eq!(found.oai_identifier, "oai:example.org:article/42");

    let harvest = TombstoneRepo::list_for_harvest(&pool, Some("jcs"), None, None, 100, 0)
        .await
        .unwrap();
    assert_eq!(harvest.len(), 1);
    let other_set = TombstoneRepo::list_for_harvest(&pool, Some("jc"), None, None, 100, 0)
        .await
        .unwrap();
    assert!(other_set.is_empty());

    assert_eq!(TombstoneRepo::delete_by_data_object_id(&pool, 42).await.unwrap(), 1);
    assert!(TombstoneRepo::find_by_data_object_id(&pool, 42).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Submission agencies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn agency_entries_are_ordered_and_paged(pool: PgPool) {
    migrated(&pool).await;

    let vocab = ControlledVocabRepo::get_or_create(
        &pool,
        "submissionAgency",
        AssocType::Publication.code(),
        7,
    )
    .await
    .unwrap();
    let same = ControlledVocabRepo::get_or_create(
        &pool,
        "submissionAgency",
        AssocType::Publication.code(),
        7,
    )
    .await
    .unwrap();
    assert_eq!(vocab.id, same.id);

    for (seq, name) in [(3.0, "Gamma"), (1.0, "Alpha"), (2.0, "Beta")] {
        SubmissionAgencyEntryRepo::insert(
            &pool,
            vocab.id,
            &CreateEntry {
                seq: Some(seq),
                values: localized(&[("en", name)]),
            },
        )
        .await
        .unwrap();
    }

    let all = SubmissionAgencyEntryRepo::get_by_controlled_vocab_id(&pool, vocab.id, None)
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    let names: Vec<_> = all.items.iter().filter_map(|e| e.value("en")).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);

    let second_page = SubmissionAgencyEntryRepo::get_by_controlled_vocab_id(
        &pool,
        vocab.id,
        Some(ResultRange::new(2, 2)),
    )
    .await
    .unwrap();
    assert_eq!(second_page.total, 3);
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].value("en"), Some("Gamma"));

    let empty = SubmissionAgencyEntryRepo::get_by_controlled_vocab_id(&pool, vocab.id + 1, None)
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.items.is_empty());
}

#[sqlx::test(migrations = false)]
async fn replace_agencies_normalizes_terms(pool: PgPool) {
    migrated(&pool).await;
    let publication = AssocType::Publication.code();

    let agencies = BTreeMap::from([(
        "en".to_string(),
        vec![" NSF ".to_string(), "NIH".to_string(), "NSF".to_string(), String::new()],
    )]);
    let stored = SubmissionAgencyEntryRepo::replace_agencies(&pool, publication, 3, &agencies)
        .await
        .unwrap();
    assert_eq!(stored["en"], vec!["NSF", "NIH"]);

    let replaced = SubmissionAgencyEntryRepo::replace_agencies(
        &pool,
        publication,
        3,
        &BTreeMap::from([("en".to_string(), vec!["ERC".to_string()])]),
    )
    .await
    .unwrap();
    assert_eq!(replaced["en"], vec!["ERC"]);
}

// ---------------------------------------------------------------------------
// Public identifiers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn publisher_id_uniqueness_lookup(pool: PgPool) {
    migrated(&pool).await;
    let journal_id = new_journal(&pool, "jcs").await;

    let mut article = PubObject::new(PubObjectKind::Submission, 10);
    article.set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, Some("jcs-article"));
    PubIdRepo::save_object(&pool, journal_id, &article).await.unwrap();

    let registry = PgPubIdRegistry::new(pool.clone());
    let submission = AssocType::Submission;

    // Another submission may not reuse it.
    assert!(registry
        .any_pub_id_exists(journal_id, PUB_ID_TYPE_PUBLISHER_ID, "jcs-article", submission, 11, true)
        .await
        .unwrap());
    // The owner itself is excluded.
    assert!(!registry
        .any_pub_id_exists(journal_id, PUB_ID_TYPE_PUBLISHER_ID, "jcs-article", submission, 10, true)
        .await
        .unwrap());
    // Objects of other types are ignored for same-type checks.
    assert!(!registry
        .any_pub_id_exists(
            journal_id,
            PUB_ID_TYPE_PUBLISHER_ID,
            "jcs-article",
            AssocType::Issue,
            10,
            true
        )
        .await
        .unwrap());
    // Other journals are independent.
    assert!(!registry
        .any_pub_id_exists(journal_id + 1, PUB_ID_TYPE_PUBLISHER_ID, "jcs-article", submission, 11, true)
        .await
        .unwrap());

    let stored = PubIdRepo::stored_pub_ids(&pool, journal_id, submission, 10).await.unwrap();
    assert_eq!(stored[PUB_ID_TYPE_PUBLISHER_ID], "jcs-article");

    PubIdRepo::set_pub_id(&pool, journal_id, submission, 10, PUB_ID_TYPE_PUBLISHER_ID, None)
        .await
        .unwrap();
    assert!(PubIdRepo::stored_pub_ids(&pool, journal_id, submission, 10)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = false)]
async fn pub_ids_stay_with_their_journal(pool: PgPool) {
    migrated(&pool).await;
    let journal_id = new_journal(&pool, "jcs").await;
    let other = new_journal(&pool, "other").await;
    let submission = AssocType::Submission;

    let mut article = PubObject::new(PubObjectKind::Submission, 10);
    article.set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, Some("jcs-article"));
    PubIdRepo::save_object(&pool, journal_id, &article).await.unwrap();

    // Saving through another journal neither reads nor moves the identifiers.
    assert!(PubIdRepo::stored_pub_ids(&pool, other, submission, 10)
        .await
        .unwrap()
        .is_empty());
    let mut hijack = PubObject::new(PubObjectKind::Submission, 10);
    hijack.set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, Some("taken-over"));
    PubIdRepo::save_object(&pool, other, &hijack).await.unwrap();

    let stored = PubIdRepo::stored_pub_ids(&pool, journal_id, submission, 10).await.unwrap();
    assert_eq!(stored[PUB_ID_TYPE_PUBLISHER_ID], "jcs-article");
    assert_eq!(
        PubIdRepo::owner_contexts(&pool, submission, 10).await.unwrap(),
        vec![journal_id]
    );
}

#[sqlx::test(migrations = false)]
async fn duplicate_publisher_id_is_refused_by_the_store(pool: PgPool) {
    migrated(&pool).await;
    let journal_id = new_journal(&pool, "jcs").await;

    let mut first = PubObject::new(PubObjectKind::Submission, 10);
    first.set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, Some("jcs-article"));
    PubIdRepo::save_object(&pool, journal_id, &first).await.unwrap();

    let mut second = PubObject::new(PubObjectKind::Submission, 11);
    second.set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, Some("jcs-article"));
    let err = PubIdRepo::save_object(&pool, journal_id, &second).await.unwrap_err();
    assert!(is_duplicate_pub_id(&err));

    // An issue may carry the same identifier.
    let mut issue = PubObject::new(PubObjectKind::Issue, 11);
    issue.set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, Some("jcs-article"));
    PubIdRepo::save_object(&pool, journal_id, &issue).await.unwrap();
}
