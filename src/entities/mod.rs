pub mod prelude;

pub mod anime_entries;
pub mod follows;
pub mod manga_entries;
pub mod users;
