// Supplier adapters: where the raw hotel records come from

use crate::config::MergeConfig;
use crate::error::{ConfigError, SupplierError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

// One supplier payload entry, field names as the supplier publishes them
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supplier {
    Acme,
    Patagonia,
    Paperflies,
}

impl Supplier {
    pub const ALL: [Supplier; 3] = [Supplier::Acme, Supplier::Patagonia, Supplier::Paperflies];

    // Endpoint path, also used as the snapshot file stem
    pub fn path(&self) -> &'static str {
        match self {
            Supplier::Acme => "acme",
            Supplier::Patagonia => "patagonia",
            Supplier::Paperflies => "paperflies",
        }
    }

    pub fn hotel_key_field(&self) -> &'static str {
        match self {
            Supplier::Acme => "Id",
            Supplier::Patagonia => "id",
            Supplier::Paperflies => "hotel_id",
        }
    }

    pub fn destination_key_field(&self) -> &'static str {
        match self {
            Supplier::Acme => "DestinationId",
            Supplier::Patagonia => "destination",
            Supplier::Paperflies => "destination_id",
        }
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[async_trait]
pub trait SupplierSource: Send + Sync {
    async fn fetch(&self, supplier: Supplier) -> Result<Vec<RawRecord>, SupplierError>;
}

// Raw records of all three suppliers taken at the same moment
#[derive(Debug, Clone, Default)]
pub struct SupplierSnapshot {
    pub acme: Vec<RawRecord>,
    pub patagonia: Vec<RawRecord>,
    pub paperflies: Vec<RawRecord>,
}

// Fetch all suppliers concurrently; the first failure wins and nothing partial is returned
pub async fn fetch_snapshot<S: SupplierSource + ?Sized>(
    source: &S,
) -> Result<SupplierSnapshot, SupplierError> {
    let (acme, patagonia, paperflies) = futures::try_join!(
        source.fetch(Supplier::Acme),
        source.fetch(Supplier::Patagonia),
        source.fetch(Supplier::Paperflies),
    )?;

    Ok(SupplierSnapshot {
        acme,
        patagonia,
        paperflies,
    })
}

// Turn a decoded payload into records, skipping anything that is not a JSON object
pub fn records_from_payload(
    supplier: Supplier,
    payload: Value,
) -> Result<Vec<RawRecord>, SupplierError> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(SupplierError::InvalidFormat {
                supplier,
                message: format!("expected a JSON array, got {}", json_kind(&other)),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record),
            other => warn!(
                supplier = %supplier,
                position,
                kind = json_kind(&other),
                "Skipping non-object supplier entry"
            ),
        }
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Fetches supplier payloads over HTTP, retrying transient failures
pub struct HttpSupplierSource {
    client: reqwest::Client,
    config: MergeConfig,
}

impl HttpSupplierSource {
    pub fn new(config: MergeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn fetch_once(&self, supplier: Supplier) -> Result<Vec<RawRecord>, SupplierError> {
        let url = self.config.supplier_url(supplier.path());
        debug!(supplier = %supplier, url = %url, "Requesting supplier data");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SupplierError::Timeout {
                    supplier,
                    timeout_ms: self.config.timeout_ms,
                }
            } else {
                SupplierError::NetworkError {
                    supplier,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupplierError::ApiResponseError {
                supplier,
                status_code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
                is_retryable: status.is_server_error() || status.as_u16() == 429,
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SupplierError::Timeout {
                    supplier,
                    timeout_ms: self.config.timeout_ms,
                }
            } else {
                SupplierError::JsonParseError {
                    supplier,
                    message: e.to_string(),
                }
            }
        })?;

        records_from_payload(supplier, payload)
    }
}

#[async_trait]
impl SupplierSource for HttpSupplierSource {
    async fn fetch(&self, supplier: Supplier) -> Result<Vec<RawRecord>, SupplierError> {
        let retry = &self.config.retry_config;
        let mut attempt = 0;
        loop {
            match self.fetch_once(supplier).await {
                Ok(records) => {
                    debug!(supplier = %supplier, count = records.len(), "Fetched supplier data");
                    return Ok(records);
                }
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let backoff = retry.backoff(attempt);
                    warn!(
                        supplier = %supplier,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Supplier request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// Reads `{dir}/{supplier}.json` snapshot files
pub struct FileSupplierSource {
    dir: PathBuf,
}

impl FileSupplierSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self, supplier: Supplier) -> PathBuf {
        self.dir.join(format!("{}.json", supplier.path()))
    }
}

#[async_trait]
impl SupplierSource for FileSupplierSource {
    async fn fetch(&self, supplier: Supplier) -> Result<Vec<RawRecord>, SupplierError> {
        let path = self.file_path(supplier);
        debug!(supplier = %supplier, path = %path.display(), "Reading supplier snapshot");

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SupplierError::IoError { supplier, source })?;
        let payload: Value =
            serde_json::from_str(&content).map_err(|e| SupplierError::JsonParseError {
                supplier,
                message: e.to_string(),
            })?;

        records_from_payload(supplier, payload)
    }
}

// In-memory records, keyed by supplier; a supplier without records yields an empty list
#[derive(Debug, Clone, Default)]
pub struct StaticSupplierSource {
    records: HashMap<Supplier, Vec<RawRecord>>,
}

impl StaticSupplierSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, supplier: Supplier, records: Vec<RawRecord>) -> Self {
        self.records.insert(supplier, records);
        self
    }

    // Accepts any JSON value, keeping only object entries of an array
    pub fn with_json(self, supplier: Supplier, payload: Value) -> Result<Self, SupplierError> {
        let records = records_from_payload(supplier, payload)?;
        Ok(self.with_records(supplier, records))
    }
}

#[async_trait]
impl SupplierSource for StaticSupplierSource {
    async fn fetch(&self, supplier: Supplier) -> Result<Vec<RawRecord>, SupplierError> {
        Ok(self.records.get(&supplier).cloned().unwrap_or_default())
    }
}
