// SPDX-License-Identifier: GPL-3.0-only

//! Remote image host upload
//!
//! Speaks the imgbb upload API: a multipart form with the API key, the image
//! as base64 and a name; the reply carries the public URL.

use crate::config::UploadConfig;
use crate::constants::upload;
use crate::errors::EgressError;
use crate::film::Photo;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: Option<String>,
}

/// Upload result of one photo of a roll
#[derive(Debug, Clone)]
pub struct RollUpload {
    pub photo_id: u64,
    pub result: Result<String, EgressError>,
}

/// Image host client
#[derive(Debug, Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ImageHost {
    /// Client for the configured host
    ///
    /// Fails with [`EgressError::UploadNotConfigured`] without an API key.
    pub fn new(config: &UploadConfig) -> Result<Self, EgressError> {
        let api_key = config
            .resolved_api_key()
            .ok_or(EgressError::UploadNotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(upload::REQUEST_TIMEOUT)
            .user_agent(concat!("retrocam/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    /// Upload one photo and return its public URL
    pub async fn upload(&self, photo: &Photo) -> Result<String, EgressError> {
        let payload = base64::engine::general_purpose::STANDARD.encode(photo.jpeg());
        let form = reqwest::multipart::Form::new()
            .text("key", self.api_key.clone())
            .text("image", payload)
            .text("name", photo.file_stem());

        info!(id = photo.id(), endpoint = %self.endpoint, "Uploading photo");
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body: UploadResponse = response.json().await.map_err(|e| {
            EgressError::UploadFailed(format!("unexpected reply ({}): {}", status, e))
        })?;

        match body {
            UploadResponse {
                success: true,
                data: Some(data),
                ..
            } => {
                info!(id = photo.id(), url = %data.url, "Photo uploaded");
                Ok(data.url)
            }
            UploadResponse { error, .. } => {
                let message = error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| format!("host returned {}", status));
                warn!(id = photo.id(), %message, "Upload rejected");
                Err(EgressError::UploadFailed(message))
            }
        }
    }

    /// Upload photos one after another, pausing `step_delay` between them
    pub async fn upload_roll(&self, photos: &[Photo], step_delay: Duration) -> Vec<RollUpload> {
        let mut results = Vec::with_capacity(photos.len());
        for (i, photo) in photos.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(step_delay).await;
            }
            results.push(RollUpload {
                photo_id: photo.id(),
                result: self.upload(photo).await,
            });
        }
        results
    }
}
