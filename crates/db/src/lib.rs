//! SQLite persistence for freightbot: connection settings, migrations, and
//! the append-only lead store.

pub mod connection;
pub mod lead;
pub mod migrations;

pub use connection::{connect, connect_with_settings, DbPool};
pub use lead::SqlLeadStore;
