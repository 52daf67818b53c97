//! ElasticSearch client for ship documents

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::game::ShipSnapshot;

const SHIPS_INDEX: &str = "ships";

/// One ship as stored in the index, keyed by session token. Field names
/// match the HTTP API so external consumers see one vocabulary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipDocument {
    pub token: String,
    pub id: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub area: f64,
    pub energy: f64,
    pub shield_dir: f64,
    pub shield_width: f64,
    pub alive: bool,
    pub updated_at: DateTime<Utc>,
}

impl ShipDocument {
    pub fn from_snapshot(snapshot: &ShipSnapshot) -> Self {
        Self {
            token: snapshot.token.clone(),
            id: snapshot.id.clone(),
            pos_x: snapshot.pos_x,
            pos_y: snapshot.pos_y,
            vel_x: snapshot.vel_x,
            vel_y: snapshot.vel_y,
            area: snapshot.area,
            energy: snapshot.energy,
            shield_dir: snapshot.shield_dir,
            shield_width: snapshot.shield_width,
            alive: snapshot.alive,
            updated_at: Utc::now(),
        }
    }
}

/// Thin client for the document index.
#[derive(Clone)]
pub struct ElasticClient {
    client: Client,
    base_url: String,
}

impl ElasticClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn doc_url(&self, token: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, SHIPS_INDEX, token)
    }

    /// Upsert one ship document.
    pub async fn put_ship(&self, doc: &ShipDocument) -> Result<(), ElasticError> {
        let response = self
            .client
            .put(self.doc_url(&doc.token))
            .json(doc)
            .send()
            .await
            .map_err(ElasticError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ElasticError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ElasticError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("index error (status {status}): {body}")]
    Api { status: u16, body: String },
}
