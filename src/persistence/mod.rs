//! Local persistence
//!
//! - `storage`: JSON values under string keys (LocalStorage on web)
//! - `progress`: unlocked achievements and furthest level reached
//!
//! Settings and high scores persist through `storage` as well.

pub mod progress;
pub mod storage;

pub use progress::Progress;
pub use storage::StorageError;
