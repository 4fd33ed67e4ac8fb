//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching database rows
//! - `Deserialize` DTOs for inserts and updates

pub mod announcement;
pub mod controlled_vocab;
pub mod journal;
pub mod navigation_menu;
pub mod payment;
pub mod pub_id;
pub mod scheduled_task;
pub mod session;
pub mod settings;
pub mod subeditor;
pub mod tombstone;
pub mod version;
