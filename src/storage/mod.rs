// storage/mod.rs
// Database operations module

pub mod locks;
pub mod migrations;
pub mod pool;
pub mod sites;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use locks::{RecordGuard, RecordLocks};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use sites::{Collection, SiteStore};
