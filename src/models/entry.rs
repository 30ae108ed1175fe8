use serde::{Deserialize, Serialize};

use crate::domain::MediaType;
use crate::entities::{anime_entries, manga_entries};

/// Media-type-tagged view of a tracked entry row.
///
/// Anime and manga entries live in separate tables; this model unifies them
/// for everything downstream of the repositories (engine output, API DTOs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntry {
    pub media_type: MediaType,
    pub user_id: String,
    pub mal_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    pub media_format: Option<String>,
    /// Airing status for anime, publishing status for manga
    pub release_status: Option<String>,
    pub mal_score: Option<f32>,
    pub status: String,
    pub score: Option<i32>,
    pub progress: EntryProgress,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryProgress {
    Anime {
        episodes_watched: i32,
        total_episodes: Option<i32>,
    },
    Manga {
        chapters_read: i32,
        volumes_read: i32,
        total_chapters: Option<i32>,
        total_volumes: Option<i32>,
    },
}

impl From<anime_entries::Model> for TrackedEntry {
    fn from(model: anime_entries::Model) -> Self {
        Self {
            media_type: MediaType::Anime,
            user_id: model.user_id,
            mal_id: model.mal_id,
            title: model.title,
            image_url: model.image_url,
            synopsis: model.synopsis,
            media_format: model.media_format,
            release_status: model.airing_status,
            mal_score: model.mal_score,
            status: model.status,
            score: model.score,
            progress: EntryProgress::Anime {
                episodes_watched: model.episodes_watched,
                total_episodes: model.total_episodes,
            },
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Payload for creating or updating an anime entry. Field defaults mirror an
/// untouched tracking form: no score, nothing watched yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeEntryInput {
    pub mal_id: i32,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub total_episodes: Option<i32>,
    #[serde(default)]
    pub media_format: Option<String>,
    #[serde(default)]
    pub airing_status: Option<String>,
    #[serde(default)]
    pub mal_score: Option<f32>,
    pub status: String,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub episodes_watched: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaEntryInput {
    pub mal_id: i32,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub total_chapters: Option<i32>,
    #[serde(default)]
    pub total_volumes: Option<i32>,
    #[serde(default)]
    pub media_format: Option<String>,
    #[serde(default)]
    pub publishing_status: Option<String>,
    #[serde(default)]
    pub mal_score: Option<f32>,
    pub status: String,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub chapters_read: i32,
    #[serde(default)]
    pub volumes_read: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<manga_entries::Model> for TrackedEntry {
    fn from(model: manga_entries::Model) -> Self {
        Self {
            media_type: MediaType::Manga,
            user_id: model.user_id,
            mal_id: model.mal_id,
            title: model.title,
            image_url: model.image_url,
            synopsis: model.synopsis,
            media_format: model.media_format,
            release_status: model.publishing_status,
            mal_score: model.mal_score,
            status: model.status,
            score: model.score,
            progress: EntryProgress::Manga {
                chapters_read: model.chapters_read,
                volumes_read: model.volumes_read,
                total_chapters: model.total_chapters,
                total_volumes: model.total_volumes,
            },
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
