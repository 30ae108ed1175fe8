pub mod entry;
pub mod follow;
pub mod stats;
pub mod user;
