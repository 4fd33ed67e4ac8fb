//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod announcement_repo;
pub mod controlled_vocab_repo;
pub mod journal_repo;
pub mod navigation_menu_repo;
pub mod payment_repo;
pub mod pub_id_repo;
pub mod scheduled_task_repo;
pub mod session_repo;
pub mod settings;
pub mod subeditor_repo;
pub mod tombstone_repo;
pub mod version_repo;

pub use announcement_repo::{AnnouncementRepo, AnnouncementTypeRepo};
pub use controlled_vocab_repo::{ControlledVocabRepo, SubmissionAgencyEntryRepo};
pub use journal_repo::{JournalRepo, SiteSettingsRepo};
pub use navigation_menu_repo::{NavigationMenuItemRepo, NavigationMenuRepo};
pub use payment_repo::{CompletedPaymentRepo, PgPaymentStore, QueuedPaymentRepo};
pub use pub_id_repo::{is_duplicate_pub_id, PgPubIdRegistry, PubIdRepo};
pub use scheduled_task_repo::ScheduledTaskRepo;
pub use session_repo::SessionRepo;
pub use subeditor_repo::SubeditorRepo;
pub use tombstone_repo::TombstoneRepo;
pub use version_repo::VersionRepo;
