use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use ddbtk_api::store::{
    Condition, GetItemOutput, GetItemRequest, KeyCondition, PutItemOutput, PutItemRequest,
    QueryOutput, QueryRequest, StoreClient, StoreFuture,
};
use ddbtk_api::{AttributeMap, AttributeValue, ConfigError, Error};

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreConfig
// ═══════════════════════════════════════════════════════════════

fn default_max_items() -> usize {
    100_000
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TableConfig {
    pub name: String,
    /// Key columns: partition key, then optional sort key.
    pub key: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct MemoryStoreConfig {
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    /// Per-table row limit; writes of new rows beyond it are rejected.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            max_items: default_max_items(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

struct Table {
    key: Vec<String>,
    rows: BTreeMap<Vec<String>, AttributeMap>,
}

/// In-memory wide-column store. For tests and local runs without a real
/// store endpoint.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    max_items: usize,
}

impl MemoryStore {
    pub fn new(config: &MemoryStoreConfig) -> Result<Self, Error> {
        let mut tables = HashMap::with_capacity(config.tables.len());
        for table in &config.tables {
            if table.name.is_empty() {
                return Err(invalid("table name is empty"));
            }
            if table.key.is_empty() || table.key.iter().any(String::is_empty) {
                return Err(invalid(format!("table '{}' needs non-empty key columns", table.name)));
            }
            let entry = Table { key: table.key.clone(), rows: BTreeMap::new() };
            if tables.insert(table.name.clone(), entry).is_some() {
                return Err(invalid(format!("table '{}' declared twice", table.name)));
            }
        }
        Ok(Self {
            tables: RwLock::new(tables),
            max_items: config.max_items,
        })
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    ConfigError::InvalidStoreConfig(msg.into()).into()
}

fn missing_table(name: &str) -> Error {
    Error::store(format!("table '{name}' not found"))
}

/// Comparable form of a value: numbers compare by magnitude, so `"5"` and
/// `"5E+00"` address the same row.
fn canonical(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Text(s) => format!("S:{s}"),
        AttributeValue::Numeric(n) => format!("N:{}", canonical_number(n)),
    }
}

fn canonical_number(text: &str) -> String {
    if let Ok(int) = text.parse::<i128>() {
        return int.to_string();
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e38 => (f as i128).to_string(),
        Ok(f) => format!("{f:E}"),
        Err(_) => text.to_string(),
    }
}

/// Key of `item` under `table`'s key columns.
///
/// With `exact`, columns other than the key columns are rejected (point
/// reads address a row by its key and nothing else).
fn row_key(table: &Table, item: &AttributeMap, exact: bool) -> Result<Vec<String>, Error> {
    if exact && item.len() != table.key.len() {
        return Err(Error::store(format!(
            "key must contain exactly the key columns {:?}",
            table.key
        )));
    }
    table
        .key
        .iter()
        .map(|column| {
            item.get(column)
                .map(canonical)
                .ok_or_else(|| Error::store(format!("missing key column '{column}'")))
        })
        .collect()
}

impl StoreClient for MemoryStore {
    fn get_item(&self, request: GetItemRequest) -> StoreFuture<'_, GetItemOutput> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            let table = tables.get(&request.table).ok_or_else(|| missing_table(&request.table))?;
            let key = row_key(table, &request.key, true)?;
            Ok(GetItemOutput { item: table.rows.get(&key).cloned() })
        })
    }

    fn put_item(&self, request: PutItemRequest) -> StoreFuture<'_, PutItemOutput> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let table = tables
                .get_mut(&request.table)
                .ok_or_else(|| missing_table(&request.table))?;
            let key = row_key(table, &request.item, false)?;
            let existing = table.rows.get(&key);

            if let Some(condition) = &request.condition {
                let Condition::AttributeNotExists(column) = condition;
                if existing.is_some_and(|row| row.contains_key(column)) {
                    tracing::debug!(table = %request.table, %condition, "conditional put rejected");
                    return Err(Error::Conflict {
                        table: request.table.clone(),
                        condition: condition.expression(),
                    });
                }
            }

            if existing.is_none() && table.rows.len() >= self.max_items {
                return Err(Error::store(format!(
                    "table '{}' is full ({} items)",
                    request.table, self.max_items
                )));
            }

            let previous = table.rows.insert(key, request.item);
            Ok(PutItemOutput { previous })
        })
    }

    fn query(&self, request: QueryRequest) -> StoreFuture<'_, QueryOutput> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            let table = tables.get(&request.table).ok_or_else(|| missing_table(&request.table))?;

            let KeyCondition::Equals { column, placeholder } = &request.key_condition;
            let wanted = request
                .values
                .get(placeholder)
                .map(canonical)
                .ok_or_else(|| Error::store(format!("placeholder '{placeholder}' is not bound")))?;

            let items = table
                .rows
                .values()
                .filter(|row| row.get(column).map(canonical).as_ref() == Some(&wanted))
                .cloned()
                .collect();
            Ok(QueryOutput { items })
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreFactory
// ═══════════════════════════════════════════════════════════════

pub struct MemoryStoreFactory;

impl MemoryStoreFactory {
    pub fn create(&self, config_json: &str) -> Result<Arc<dyn StoreClient>, Error> {
        let config: MemoryStoreConfig = if config_json == "{}" {
            MemoryStoreConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(|e| invalid(e.to_string()))?
        };
        Ok(Arc::new(MemoryStore::new(&config)?))
    }
}
