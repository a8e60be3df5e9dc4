use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, instrument};

use crate::config::{AppConfig, Credentials, TABLE_NAME};
use crate::errors::ServiceError;
use crate::models::{FieldsEnvelope, ItemFields, RecordsEnvelope};

/// Raw outcome of one Airtable call: the status code and the unparsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct TableResponse {
    pub status: u16,
    pub body: String,
}

impl TableResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Airtable signals success with exactly 200 on every endpoint used here.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Whether `record_id` survives as its own path segment.
///
/// URL parsing collapses `.` and `..` segments, even percent-encoded, so such ids would
/// address the collection endpoint instead of a record.
pub fn is_addressable_record_id(record_id: &str) -> bool {
    !matches!(record_id, "." | "..")
}

/// Operations against the Inventory table.
///
/// Implementations perform exactly one outbound call per method and never retry.
/// `Err` is reserved for calls that produced no response at all.
#[async_trait]
pub trait TableClient: Send + Sync {
    async fn list_records(&self, credentials: &Credentials) -> Result<TableResponse, ServiceError>;

    async fn create_record(
        &self,
        credentials: &Credentials,
        fields: &ItemFields,
    ) -> Result<TableResponse, ServiceError>;

    async fn update_record(
        &self,
        credentials: &Credentials,
        record_id: &str,
        fields: &ItemFields,
    ) -> Result<TableResponse, ServiceError>;

    async fn delete_record(
        &self,
        credentials: &Credentials,
        record_id: &str,
    ) -> Result<TableResponse, ServiceError>;
}

/// `TableClient` backed by the Airtable REST API.
#[derive(Clone, Debug)]
pub struct HttpTableClient {
    client: Client,
    api_url: Url,
    table: String,
}

impl HttpTableClient {
    pub fn new(api_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let api_url = Url::parse(api_url).context("invalid Airtable API URL")?;
        if api_url.cannot_be_a_base() {
            anyhow::bail!("Airtable API URL cannot carry path segments: {}", api_url);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url,
            table: TABLE_NAME.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(&config.airtable_api_url, config.request_timeout())
    }

    /// `<api>/<base-id>/<table>[/<record-id>]`. Segments are pushed verbatim (percent-encoded),
    /// so an empty record id leaves an empty trailing segment. Callers screen record ids with
    /// [`is_addressable_record_id`] first.
    pub fn table_url(&self, base_id: &str, record_id: Option<&str>) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(base_id).push(&self.table);
            if let Some(record_id) = record_id {
                segments.push(record_id);
            }
        }
        url
    }

    fn request(
        &self,
        method: reqwest::Method,
        credentials: &Credentials,
        record_id: Option<&str>,
    ) -> RequestBuilder {
        let url = self.table_url(credentials.base_id().unwrap_or_default(), record_id);
        self.client
            .request(method, url)
            .bearer_auth(credentials.api_key().unwrap_or_default())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<TableResponse, ServiceError> {
        let response = request.send().await.map_err(ServiceError::transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ServiceError::transport)?;
        debug!(status, body_len = body.len(), "Airtable responded");
        Ok(TableResponse { status, body })
    }
}

#[async_trait]
impl TableClient for HttpTableClient {
    #[instrument(skip_all)]
    async fn list_records(&self, credentials: &Credentials) -> Result<TableResponse, ServiceError> {
        self.execute(self.request(reqwest::Method::GET, credentials, None))
            .await
    }

    #[instrument(skip_all)]
    async fn create_record(
        &self,
        credentials: &Credentials,
        fields: &ItemFields,
    ) -> Result<TableResponse, ServiceError> {
        let envelope = RecordsEnvelope {
            records: vec![FieldsEnvelope { fields }],
        };
        self.execute(
            self.request(reqwest::Method::POST, credentials, None)
                .json(&envelope),
        )
        .await
    }

    #[instrument(skip(self, credentials, fields))]
    async fn update_record(
        &self,
        credentials: &Credentials,
        record_id: &str,
        fields: &ItemFields,
    ) -> Result<TableResponse, ServiceError> {
        self.execute(
            self.request(reqwest::Method::PATCH, credentials, Some(record_id))
                .json(&FieldsEnvelope { fields }),
        )
        .await
    }

    #[instrument(skip(self, credentials))]
    async fn delete_record(
        &self,
        credentials: &Credentials,
        record_id: &str,
    ) -> Result<TableResponse, ServiceError> {
        self.execute(self.request(reqwest::Method::DELETE, credentials, Some(record_id)))
            .await
    }
}
