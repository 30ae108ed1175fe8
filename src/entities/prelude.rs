pub use super::anime_entries::Entity as AnimeEntries;
pub use super::follows::Entity as Follows;
pub use super::manga_entries::Entity as MangaEntries;
pub use super::users::Entity as Users;
