use crate::application::ShareTarget;
use async_trait::async_trait;
use leadcard_errors::AppError;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SharePayload<'a> {
    title: &'a str,
    text: &'a str,
}

/// Posts shared leads as JSON to a configured URL.
pub struct WebhookShareTarget {
    http_client: reqwest::Client,
    url: url::Url,
}

impl WebhookShareTarget {
    pub fn new(url: url::Url, timeout: Duration) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client, url })
    }
}

#[async_trait]
impl ShareTarget for WebhookShareTarget {
    async fn share(&self, title: &str, text: &str) -> Result<(), AppError> {
        let response = self
            .http_client
            .post(self.url.clone())
            .json(&SharePayload { title, text })
            .send()
            .await
            .map_err(|e| AppError::Share(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Share(format!(
                "Webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
