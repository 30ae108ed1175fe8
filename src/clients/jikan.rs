use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CatalogConfig;
use crate::domain::MediaType;

#[derive(Debug, Deserialize)]
struct JikanResponse<T> {
    data: T,
}

/// One catalog title as Jikan reports it, for either media type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTitle {
    pub mal_id: i32,
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub episodes: Option<i32>,
    #[serde(default)]
    pub chapters: Option<i32>,
    #[serde(default)]
    pub volumes: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub media_format: Option<String>,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub images: Option<CatalogImages>,
}

impl CatalogTitle {
    /// The medium-size JPEG url, the size the tracking UI stores.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        self.images
            .as_ref()
            .and_then(|i| i.jpg.as_ref())
            .and_then(|j| j.image_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogImages {
    #[serde(default)]
    pub jpg: Option<CatalogImageSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl JikanClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds.into(),
            ))
            .user_agent("AniNotes/1.0")
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    const fn path_for(media_type: MediaType) -> &'static str {
        match media_type {
            MediaType::Anime => "anime",
            MediaType::Manga => "manga",
        }
    }

    pub async fn search(&self, media_type: MediaType, query: &str) -> Result<Vec<CatalogTitle>> {
        let url = format!(
            "{}/{}?q={}&limit=10",
            self.base_url,
            Self::path_for(media_type),
            urlencoding::encode(query)
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Jikan API error: {} - {}", status, body));
        }

        let response: JikanResponse<Vec<CatalogTitle>> = response.json().await?;

        Ok(response.data)
    }

    pub async fn get(&self, media_type: MediaType, mal_id: i32) -> Result<Option<CatalogTitle>> {
        let url = format!("{}/{}/{}", self.base_url, Self::path_for(media_type), mal_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Jikan API error: {} - {}", status, body));
        }

        let response: JikanResponse<CatalogTitle> = response.json().await?;

        Ok(Some(response.data))
    }
}
