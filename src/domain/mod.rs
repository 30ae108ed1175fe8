//! Domain types for the tracking and recommendation subsystem.
//!
//! Newtype wrappers prevent mixing user identifiers with catalog identifiers,
//! and `MediaType` replaces stringly-typed anime/manga switches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a user account.
///
/// User ids are generated as UUIDv4 strings at registration and treated as
/// opaque everywhere else; nothing in this crate parses them.
///
/// # Examples
///
/// ```rust
/// use aninotes::domain::UserId;
///
/// let id = UserId::new("u-123");
/// assert_eq!(id.as_str(), "u-123");
/// assert_eq!(id.to_string(), "u-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier for a new account.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        Ok(Self(id))
    }
}

/// Identifier of a title in the MyAnimeList catalog.
///
/// The same `MalId` correlates one title across every user's tracked entries;
/// it is the key the recommendation engine deduplicates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MalId(i32);

impl MalId {
    /// Creates a new `MalId` from a raw i32 value.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `id` is not positive. Production code should
    /// validate before construction.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id > 0, "MalId should be positive");
        Self(id)
    }

    /// Returns the underlying i32 value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for MalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MalId> for i32 {
    fn from(id: MalId) -> Self {
        id.0
    }
}

impl From<i32> for MalId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for MalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for MalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// The two tracked media variants.
///
/// Anime and manga entries live in separate tables with structurally parallel
/// schemas; every capability query takes a `MediaType` to pick the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anime" => Ok(Self::Anime),
            "manga" => Ok(Self::Manga),
            other => Err(format!("unknown media type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_conversions() {
        let id = UserId::new("abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(UserId::from("abc"), id);
    }

    #[test]
    fn user_id_generate_is_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn mal_id_conversions() {
        let id = MalId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(MalId::from(42), id);
    }

    #[test]
    fn mal_id_serialization() {
        let id = MalId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: MalId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn media_type_round_trip() {
        assert_eq!("anime".parse::<MediaType>().unwrap(), MediaType::Anime);
        assert_eq!("manga".parse::<MediaType>().unwrap(), MediaType::Manga);
        assert!("movie".parse::<MediaType>().is_err());
        assert_eq!(
            serde_json::to_string(&MediaType::Anime).unwrap(),
            "\"anime\""
        );
    }
}
