use super::ReviewBackend;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    AnalysisDocument, DecisionsDocument, GenerateReceipt, SaveDecisionsPayload, Sermon,
    SermonUpload, Slide, SlideAnalysis, SlideDecisions,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Review service reached over HTTP/JSON
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    analysis_timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            analysis_timeout: config.analysis_timeout(),
        })
    }

    /// Service URL for the given path segments, escaped and appended to the base path
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid review service URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("Service returned {}: {}", status, body);
        Err(Error::from_response(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Malformed(e.to_string()))
    }

    async fn upload_form(upload: &SermonUpload) -> Result<Form> {
        let bytes = tokio::fs::read(&upload.file).await?;
        let file_name = upload
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("sermon.pptx")
            .to_string();
        let mime = mime_guess::from_path(&upload.file).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| Error::UnsupportedFile(e.to_string()))?;

        let mut form = Form::new().text("sermonName", upload.sermon_name.clone());
        if let Some(series) = &upload.series_name {
            form = form.text("seriesName", series.clone());
        }
        if let Some(date) = &upload.week_or_date {
            form = form.text("weekOrDate", date.clone());
        }
        if let Some(pastor) = &upload.pastor_name {
            form = form.text("pastorName", pastor.clone());
        }
        Ok(form.part("file", part))
    }
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    async fn list_sermons(&self) -> Result<Vec<Sermon>> {
        let url = self.endpoint(&["sermons"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn upload_sermon(&self, upload: &SermonUpload) -> Result<Sermon> {
        let url = self.endpoint(&["sermons"])?;
        let form = Self::upload_form(upload).await?;
        debug!("POST {} (multipart)", url);
        self.send_json(self.client.post(url).multipart(form)).await
    }

    async fn list_slides(&self, sermon_id: &str) -> Result<Vec<Slide>> {
        let url = self.endpoint(&["sermons", sermon_id, "slides"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn get_analysis(&self, sermon_id: &str) -> Result<AnalysisDocument> {
        let url = self.endpoint(&["sermons", sermon_id, "analysis"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn get_decisions(&self, sermon_id: &str) -> Result<DecisionsDocument> {
        let url = self.endpoint(&["sermons", sermon_id, "decisions"])?;
        debug!("GET {}", url);
        self.send_json(self.client.get(url)).await
    }

    async fn analyze_slide(&self, sermon_id: &str, slide_number: u32) -> Result<SlideAnalysis> {
        let number = slide_number.to_string();
        let url = self.endpoint(&["sermons", sermon_id, "slides", &number, "analyze"])?;
        debug!("POST {}", url);
        self.send_json(self.client.post(url).timeout(self.analysis_timeout))
            .await
    }

    async fn save_decisions(
        &self,
        sermon_id: &str,
        slide_number: u32,
        payload: &SaveDecisionsPayload,
    ) -> Result<SlideDecisions> {
        let number = slide_number.to_string();
        let url = self.endpoint(&["sermons", sermon_id, "slides", &number, "decisions"])?;
        debug!("POST {}", url);
        self.send_json(self.client.post(url).json(payload)).await
    }

    async fn generate_output(&self, sermon_id: &str) -> Result<GenerateReceipt> {
        let url = self.endpoint(&["sermons", sermon_id, "generate-updated-pptx"])?;
        debug!("POST {}", url);
        self.send_json(self.client.post(url).timeout(self.analysis_timeout))
            .await
    }

    async fn download_output(&self, sermon_id: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&["sermons", sermon_id, "download-updated-pptx"])?;
        debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
