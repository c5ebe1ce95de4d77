//! # Providers
//!
//! The async boundary of a session: where the catalog and promotions come
//! from, and where a checked-out order goes.
//!
//! ## Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CatalogProvider   ── fetch_catalog()    ──► CatalogRecord              │
//! │  PromotionProvider ── fetch_promotions() ──► Vec<PromotionRecord>       │
//! │  OrderSubmitter    ── submit(&order)     ──► SubmissionReceipt          │
//! │                                                                         │
//! │  Records are raw provider data; the session validates them before      │
//! │  they reach the cart.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shipped implementations: in-memory providers for tests and embedding, a
//! JSON-file provider for the `promo-check` binary, and an in-memory order
//! submitter.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use bistro_core::{CatalogRecord, OrderPayload, PromotionRecord};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

/// File the JSON provider reads the catalog from.
pub const CATALOG_FILE: &str = "catalog.json";

/// File the JSON provider reads promotions from.
pub const PROMOTIONS_FILE: &str = "promotions.json";

// =============================================================================
// Traits
// =============================================================================

/// Source of dishes and toppings.
pub trait CatalogProvider: Send + Sync {
    fn fetch_catalog(&self) -> impl Future<Output = SessionResult<CatalogRecord>> + Send;
}

/// Source of promotions.
pub trait PromotionProvider: Send + Sync {
    fn fetch_promotions(&self) -> impl Future<Output = SessionResult<Vec<PromotionRecord>>> + Send;
}

/// Destination of checked-out orders.
pub trait OrderSubmitter: Send + Sync {
    fn submit(&self, order: &OrderPayload) -> impl Future<Output = SessionResult<SubmissionReceipt>> + Send;
}

/// Acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub order_id: String,
    pub submitted_at: DateTime<Utc>,
}

// =============================================================================
// In-Memory Providers
// =============================================================================

/// Serves a fixed catalog record.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogProvider {
    record: CatalogRecord,
}

impl StaticCatalogProvider {
    pub fn new(record: CatalogRecord) -> Self {
        StaticCatalogProvider { record }
    }
}

impl CatalogProvider for StaticCatalogProvider {
    async fn fetch_catalog(&self) -> SessionResult<CatalogRecord> {
        Ok(self.record.clone())
    }
}

/// Serves a fixed list of promotion records.
#[derive(Debug, Clone, Default)]
pub struct StaticPromotionProvider {
    records: Vec<PromotionRecord>,
}

impl StaticPromotionProvider {
    pub fn new(records: Vec<PromotionRecord>) -> Self {
        StaticPromotionProvider { records }
    }
}

impl PromotionProvider for StaticPromotionProvider {
    async fn fetch_promotions(&self) -> SessionResult<Vec<PromotionRecord>> {
        Ok(self.records.clone())
    }
}

// =============================================================================
// JSON File Provider
// =============================================================================

/// Reads `catalog.json` and `promotions.json` from a directory.
///
/// Files are re-read on every fetch, so editing them and refreshing the
/// session picks up the change. Each dish, topping and promotion is decoded
/// on its own: a malformed entry is skipped with a warning and the rest of
/// the file still loads. Only a file that is missing or not the expected JSON
/// shape fails the fetch.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    dir: PathBuf,
}

/// Catalog file with entries left undecoded.
#[derive(Debug, Default, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    dishes: Vec<Value>,
    #[serde(default)]
    toppings: BTreeMap<String, Vec<Value>>,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileProvider { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_json<T: DeserializeOwned>(&self, provider: &'static str, file: &str) -> SessionResult<T> {
        let path = self.dir.join(file);
        debug!(?path, "Reading {} file", provider);

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SessionError::provider(provider, format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| SessionError::provider(provider, format!("{}: {}", path.display(), e)))
    }
}

/// Decodes entries one by one, skipping the ones that do not parse.
fn decode_each<T: DeserializeOwned>(kind: &str, values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| {
            let id = value
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or("<no id>")
                .to_string();
            serde_json::from_value(value)
                .map_err(|e| warn!(kind, id = %id, error = %e, "Skipping undecodable record"))
                .ok()
        })
        .collect()
}

impl CatalogProvider for JsonFileProvider {
    async fn fetch_catalog(&self) -> SessionResult<CatalogRecord> {
        let raw: RawCatalog = self.read_json("catalog", CATALOG_FILE).await?;
        Ok(CatalogRecord {
            dishes: decode_each("dish", raw.dishes),
            toppings: raw
                .toppings
                .into_iter()
                .map(|(category, group)| (category, decode_each("topping", group)))
                .collect(),
        })
    }
}

impl PromotionProvider for JsonFileProvider {
    async fn fetch_promotions(&self) -> SessionResult<Vec<PromotionRecord>> {
        let raw: Vec<Value> = self.read_json("promotions", PROMOTIONS_FILE).await?;
        Ok(decode_each("promotion", raw))
    }
}

// =============================================================================
// In-Memory Submitter
// =============================================================================

/// Keeps submitted orders in memory.
#[derive(Debug, Default)]
pub struct InMemorySubmitter {
    orders: Mutex<Vec<OrderPayload>>,
}

impl InMemorySubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders submitted so far, oldest first.
    pub async fn orders(&self) -> Vec<OrderPayload> {
        self.orders.lock().await.clone()
    }
}

impl OrderSubmitter for InMemorySubmitter {
    async fn submit(&self, order: &OrderPayload) -> SessionResult<SubmissionReceipt> {
        let receipt = SubmissionReceipt {
            order_id: Uuid::new_v4().to_string(),
            submitted_at: Utc::now(),
        };
        self.orders.lock().await.push(order.clone());
        info!(order_id = %receipt.order_id, total = %order.final_total, "Order recorded");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::PromotionType;

    const CATALOG: &str = r#"{
        "dishes": [
            {"_id": "d-1", "name": "Bun Cha", "price": 55000, "cost": 20000, "isAvailable": true}
        ],
        "toppings": {
            "Extras": [{"_id": "t-1", "name": "Spring Roll", "price": 10000, "isAvailable": true}]
        }
    }"#;

    const PROMOTIONS: &str = r#"[
        {
            "_id": "p-1",
            "name": "Happy Hour",
            "type": "happy_hour",
            "isActive": true,
            "startDate": "2026-01-01T00:00:00Z",
            "endDate": "2026-12-31T23:59:59Z",
            "discount": {"percentage": 20},
            "conditions": {"timeSlots": [{"start": "17:00", "end": "19:00"}]}
        }
    ]"#;

    #[tokio::test]
    async fn test_json_file_provider_reads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATALOG_FILE), CATALOG).unwrap();
        std::fs::write(dir.path().join(PROMOTIONS_FILE), PROMOTIONS).unwrap();

        let provider = JsonFileProvider::new(dir.path());
        let catalog = provider.fetch_catalog().await.unwrap();
        assert_eq!(catalog.dishes.len(), 1);
        assert_eq!(catalog.toppings["Extras"].len(), 1);

        let promotions = provider.fetch_promotions().await.unwrap();
        assert_eq!(promotions[0].promotion_type, PromotionType::HappyHour);
    }

    #[tokio::test]
    async fn test_json_file_provider_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonFileProvider::new(dir.path());

        assert!(matches!(
            provider.fetch_catalog().await,
            Err(SessionError::ProviderFailed { provider: "catalog", .. })
        ));

        std::fs::write(dir.path().join(PROMOTIONS_FILE), "{not json").unwrap();
        assert!(matches!(
            provider.fetch_promotions().await,
            Err(SessionError::ProviderFailed { provider: "promotions", .. })
        ));
    }

    #[tokio::test]
    async fn test_undecodable_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROMOTIONS_FILE),
            r#"[
                {"_id": "p-good", "name": "Good", "type": "order_percentage", "isActive": true,
                 "startDate": "2026-01-01T00:00:00Z", "endDate": "2026-12-31T23:59:59Z",
                 "discount": {"percentage": 10}},
                {"_id": "p-bad", "name": "Bad", "type": "order_percentage", "isActive": true,
                 "startDate": "2026-01-01", "endDate": "2026-12-31T23:59:59Z",
                 "discount": {"percentage": 10}}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(CATALOG_FILE),
            r#"{
                "dishes": [
                    {"_id": "d-1", "name": "Bun Cha", "price": 55000},
                    {"_id": "d-2", "name": "Half Price", "price": 27500.5},
                    {"_id": "d-3", "price": 30000}
                ],
                "toppings": {
                    "Extras": [
                        {"_id": "t-1", "name": "Spring Roll", "price": 10000},
                        {"_id": "t-2", "name": "Herbs", "price": "free"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let provider = JsonFileProvider::new(dir.path());

        let promotions = provider.fetch_promotions().await.unwrap();
        let ids: Vec<&str> = promotions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-good"]);

        let catalog = provider.fetch_catalog().await.unwrap();
        assert_eq!(catalog.dishes.len(), 1);
        assert_eq!(catalog.dishes[0].id, "d-1");
        assert_eq!(catalog.toppings["Extras"].len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_file_shape_fails_the_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROMOTIONS_FILE), r#"{"promotions": []}"#).unwrap();

        let provider = JsonFileProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_promotions().await,
            Err(SessionError::ProviderFailed { provider: "promotions", .. })
        ));
    }

    #[tokio::test]
    async fn test_bundled_sample_data_loads() {
        let provider = JsonFileProvider::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data"));

        let catalog = provider.fetch_catalog().await.unwrap();
        let (snapshot, rejected) = bistro_core::CatalogSnapshot::ingest(catalog);
        assert!(rejected.is_empty());
        assert_eq!(snapshot.dishes().len(), 3);

        let promotions = provider.fetch_promotions().await.unwrap();
        let (promotions, rejected) = bistro_core::PromotionCatalog::ingest(promotions);
        assert!(rejected.is_empty());
        assert_eq!(promotions.len(), 3);
    }

    #[tokio::test]
    async fn test_static_providers() {
        let catalog = StaticCatalogProvider::default().fetch_catalog().await.unwrap();
        assert!(catalog.dishes.is_empty());

        let promotions = StaticPromotionProvider::default().fetch_promotions().await.unwrap();
        assert!(promotions.is_empty());
    }
}
