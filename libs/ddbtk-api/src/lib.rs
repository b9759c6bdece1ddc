//! Typed records ⇄ attribute maps for wide-column key-value stores.
//!
//! Every wire value is tagged `N` (numeric text) or `S` (text). Field
//! attributes choose the column name and type:
//!
//! ```ignore
//! #[derive(Record, Default)]
//! struct Order {
//!     #[ddb("order_id,N")]
//!     id: u64,
//!     #[ddb(",S")]
//!     customer: String,
//!     #[ddb("-")]
//!     scratch: String,
//! }
//! ```

// Lets the derive's `::ddbtk_api::` paths resolve inside this crate.
extern crate self as ddbtk_api;

pub mod attribute;
pub mod codec;
pub mod error;
pub mod schema;
pub mod store;
pub mod tag;
pub mod value;

pub use ddbtk_api_derive::Record;

pub use attribute::{AttributeMap, AttributeValue, WireType};
pub use codec::{decode, decode_new, encode};
pub use error::{ConfigError, DataError, Error, ErrorKind};
pub use schema::{FieldDef, Record, RecordSchema, SchemaField};
pub use store::{get_item, put_item, query_items_by_int_field, StoreClient};
pub use value::{DataFailure, NativeField, NativeKind};
