use crate::core::error::EngineError;
use crate::engine::TorrentEngine;
use crate::models::torrent::TorrentView;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Client for a torrent engine exposing a JSON REST API
///
/// - `GET    {endpoint}/torrents`
/// - `GET    {endpoint}/torrents/{id}`
/// - `DELETE {endpoint}/torrents/{id}?remove_data=<bool>`
///
/// Every request carries the `api_key` query parameter.
pub struct HttpEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpEngine {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn torrents_url(&self) -> String {
        format!("{}/torrents", self.endpoint)
    }

    fn torrent_url(&self, id: &str) -> String {
        format!("{}/torrents/{}", self.endpoint, id)
    }
}

#[async_trait]
impl TorrentEngine for HttpEngine {
    async fn list_torrent_ids(&self) -> Result<Vec<String>, EngineError> {
        let response = self
            .client
            .get(self.torrents_url())
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Vec<String>>().await?)
    }

    async fn get_torrent(&self, id: &str) -> Result<Option<TorrentView>, EngineError> {
        let response = self
            .client
            .get(self.torrent_url(id))
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<TorrentView>().await?)),
            status => Err(EngineError::Status(status.as_u16())),
        }
    }

    async fn remove_torrent(&self, id: &str, remove_data: bool) -> Result<(), EngineError> {
        let response = self
            .client
            .delete(self.torrent_url(id))
            .query(&[("api_key", self.api_key.as_str()), ("remove_data", if remove_data { "true" } else { "false" })])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(EngineError::NotFound(id.to_string())),
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(EngineError::Rejected(body))
            }
            status => Err(EngineError::Status(status.as_u16())),
        }
    }

    fn engine_type(&self) -> &'static str {
        "http"
    }
}
