//! Store-access capability and the generic operations built on it.
//!
//! The capability speaks attribute maps only; how it is constructed,
//! authenticated or retried is up to the implementation. Each operation here
//! issues exactly one capability call.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::attribute::AttributeMap;
use crate::codec::{decode_new, encode};
use crate::error::{ConfigError, Error, ErrorKind};
use crate::schema::Record;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

/// Precondition attached to a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Reject the write if the stored row already has this column.
    AttributeNotExists(String),
}

impl Condition {
    /// Expression text in the store's condition language.
    pub fn expression(&self) -> String {
        match self {
            Condition::AttributeNotExists(column) => format!("attribute_not_exists({column})"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

/// Key condition of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCondition {
    /// `column = placeholder`, the placeholder bound in the request values.
    Equals { column: String, placeholder: String },
}

impl KeyCondition {
    pub fn expression(&self) -> String {
        match self {
            KeyCondition::Equals { column, placeholder } => format!("{column} = {placeholder}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetItemRequest {
    pub table: String,
    pub key: AttributeMap,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetItemOutput {
    /// `None` when no row matches the key.
    pub item: Option<AttributeMap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    pub table: String,
    pub item: AttributeMap,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutItemOutput {
    /// Row replaced by the write, if there was one.
    pub previous: Option<AttributeMap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table: String,
    pub key_condition: KeyCondition,
    /// Values bound to the placeholders of `key_condition`.
    pub values: AttributeMap,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub items: Vec<AttributeMap>,
}

/// Minimal access to a wide-column store.
///
/// A rejected write `condition` must be reported as `Error::Conflict`;
/// any other failure as `Error::Store`.
pub trait StoreClient: Send + Sync {
    fn get_item(&self, request: GetItemRequest) -> StoreFuture<'_, GetItemOutput>;

    fn put_item(&self, request: PutItemRequest) -> StoreFuture<'_, PutItemOutput>;

    fn query(&self, request: QueryRequest) -> StoreFuture<'_, QueryOutput>;
}

/// Placeholder the query value is bound to.
const QUERY_PLACEHOLDER: &str = ":queryValue";

/// Bound parameter of the query; its column name must equal
/// `QUERY_PLACEHOLDER`.
#[derive(crate::Record, Default)]
struct QueryValue {
    #[ddb(":queryValue,N")]
    value: i64,
}

fn require(value: &str, operation: &'static str, argument: &'static str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::EmptyArgument { operation, argument });
    }
    Ok(())
}

/// Read the row addressed by `key` from `table`.
///
/// Returns `Ok(None)` when the row does not exist.
pub async fn get_item<S, K, R>(client: &S, table: &str, key: &K) -> Result<Option<R>, Error>
where
    S: StoreClient + ?Sized,
    K: Record,
    R: Record + Default,
{
    require(table, "get_item", "table")?;
    let key = encode(key)?;

    tracing::debug!(table, columns = key.len(), "get_item");
    let output = client
        .get_item(GetItemRequest { table: table.to_string(), key })
        .await
        .map_err(|e| e.with_context(format!("get_item on '{table}'")))?;

    output.item.as_ref().map(decode_new::<R>).transpose()
}

/// Write `item` to `table`, returning the row it replaced.
///
/// With `fail_if_exists = Some(column)` the write is rejected with
/// `Error::Conflict` when the stored row already has `column`. `None` means
/// no precondition; `Some("")` is a config error rather than a synonym for
/// `None`.
pub async fn put_item<S, R>(
    client: &S,
    table: &str,
    item: &R,
    fail_if_exists: Option<&str>,
) -> Result<Option<R>, Error>
where
    S: StoreClient + ?Sized,
    R: Record + Default,
{
    require(table, "put_item", "table")?;
    let condition = match fail_if_exists {
        Some(column) => {
            require(column, "put_item", "fail_if_exists column")?;
            Some(Condition::AttributeNotExists(column.to_string()))
        }
        None => None,
    };
    let item = encode(item)?;

    tracing::debug!(
        table,
        columns = item.len(),
        condition = ?condition.as_ref().map(Condition::expression),
        "put_item"
    );
    let output = client
        .put_item(PutItemRequest { table: table.to_string(), item, condition })
        .await
        .map_err(|e| e.with_context(format!("put_item on '{table}'")))?;

    output.previous.as_ref().map(decode_new::<R>).transpose()
}

/// Query `table` for rows whose `field` equals `value`.
///
/// Rows that fail with a data error are skipped and logged. Config errors
/// and store failures abort the whole call.
pub async fn query_items_by_int_field<S, R>(
    client: &S,
    table: &str,
    field: &str,
    value: i64,
) -> Result<Vec<R>, Error>
where
    S: StoreClient + ?Sized,
    R: Record + Default,
{
    require(table, "query_items_by_int_field", "table")?;
    require(field, "query_items_by_int_field", "field")?;

    let request = QueryRequest {
        table: table.to_string(),
        key_condition: KeyCondition::Equals {
            column: field.to_string(),
            placeholder: QUERY_PLACEHOLDER.to_string(),
        },
        values: encode(&QueryValue { value })?,
    };

    tracing::debug!(table, key_condition = %request.key_condition.expression(), "query");
    let output = client
        .query(request)
        .await
        .map_err(|e| e.with_context(format!("query on '{table}'")))?;

    let mut records = Vec::with_capacity(output.items.len());
    for item in &output.items {
        match decode_new::<R>(item) {
            Ok(record) => records.push(record),
            Err(e) if e.kind() == ErrorKind::Data => {
                tracing::warn!(table, field, error = %e, "skipping row that failed to decode");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}
