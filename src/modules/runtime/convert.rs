//! Conversion between stored BSON documents and JSON wire values

use bson::{oid::ObjectId, Bson, Document};
use chrono::SecondsFormat;
use portfolio_core::PortfolioError;
use serde_json::{Map, Value};

/// Render a stored document as JSON
pub fn document_to_json(doc: Document) -> Value {
    bson_to_json(Bson::Document(doc))
}

/// Render a stored value as JSON
///
/// ObjectIds become hex strings and dates become RFC 3339 strings with
/// millisecond precision, which is how JavaScript clients already see them.
pub fn bson_to_json(bson: Bson) -> Value {
    match bson {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
                .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_else(|| dt.to_string()),
        ),
        Bson::Document(doc) => {
            let mut m = Map::new();
            for (key, value) in doc {
                m.insert(key, bson_to_json(value));
            }
            Value::Object(m)
        }
        Bson::Array(arr) => Value::Array(arr.into_iter().map(bson_to_json).collect()),
        Bson::Decimal128(d) => Value::String(d.to_string()),
        other => bson::from_bson(other).unwrap_or(Value::Null),
    }
}

/// Convert a validated JSON object into a document for the store
pub fn json_to_document(map: Map<String, Value>) -> Result<Document, PortfolioError> {
    bson::to_document(&map)
        .map_err(|e| PortfolioError::Validation(format!("unsupported field value: {}", e)))
}

/// Parse a path identifier into an ObjectId
pub fn parse_object_id(raw: &str) -> Result<ObjectId, PortfolioError> {
    ObjectId::parse_str(raw)
        .map_err(|_| PortfolioError::Validation(format!("'{}' is not a valid id", raw)))
}
