//! Domain logic for the journal back-end. No database or HTTP code lives here.

pub mod admin;
pub mod assoc;
pub mod context;
pub mod controlled_vocab;
pub mod error;
pub mod navigation_menu;
pub mod navigation_menu_grid;
pub mod payment;
pub mod pub_ids;
pub mod roles;
pub mod scheduled_task;
pub mod tombstone;
pub mod types;
pub mod version;
