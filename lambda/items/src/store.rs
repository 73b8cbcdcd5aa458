use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{Number, Value};
use tracing::error;

use crate::error::RouterError;
use crate::event::{Item, Record};

const PARTITION_KEY: &str = "itemId";

/// The single table the router reads and writes, keyed by `itemId`.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, item_id: &str) -> Result<Option<Record>, RouterError>;

    /// Writes the item, replacing any existing item with the same id.
    async fn put(&self, item: &Item) -> Result<(), RouterError>;

    async fn delete(&self, item_id: &str) -> Result<(), RouterError>;

    /// Every item in the table, in no particular order.
    async fn scan_all(&self) -> Result<Vec<Record>, RouterError>;
}

/// [`ItemStore`] backed by a DynamoDB table.
pub struct DynamoItemStore {
    client: Client,
    table_name: String,
}

impl DynamoItemStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl ItemStore for DynamoItemStore {
    async fn get(&self, item_id: &str) -> Result<Option<Record>, RouterError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, AttributeValue::S(item_id.to_string()))
            .send()
            .await
            .map_err(store_error)?;

        Ok(result.item.as_ref().map(record_from_attributes))
    }

    async fn put(&self, item: &Item) -> Result<(), RouterError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attributes_from_record(&item.to_record())))
            .send()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, item_id: &str) -> Result<(), RouterError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, AttributeValue::S(item_id.to_string()))
            .send()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<Record>, RouterError> {
        // The paginator keeps following LastEvaluatedKey until the table is exhausted.
        let items: Result<Vec<_>, _> = self
            .client
            .scan()
            .table_name(&self.table_name)
            .into_paginator()
            .items()
            .send()
            .collect()
            .await;

        Ok(items
            .map_err(store_error)?
            .iter()
            .map(record_from_attributes)
            .collect())
    }
}

/// The caller sees the service's own message; the full error chain only goes to the log.
fn store_error<E, R>(err: SdkError<E, R>) -> RouterError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    error!(error = %DisplayErrorContext(err), "dynamodb call failed");
    RouterError::Store(message)
}

fn record_from_attributes(item: &HashMap<String, AttributeValue>) -> Record {
    item.iter()
        .map(|(name, value)| (name.clone(), attribute_to_json(value)))
        .collect()
}

fn attributes_from_record(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), json_to_attribute(value)))
        .collect()
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(list) => AttributeValue::L(list.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(attributes_from_record(map)),
    }
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(record_from_attributes(map)),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::B(blob) => Value::String(general_purpose::STANDARD.encode(blob.as_ref())),
        AttributeValue::Bs(set) => Value::Array(
            set.iter()
                .map(|blob| Value::String(general_purpose::STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

// DynamoDB numbers are strings on the wire; keep the string if it isn't valid JSON.
fn number_to_json(n: &str) -> Value {
    serde_json::from_str::<Number>(n)
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(n.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::primitives::Blob;
    use serde_json::json;

    #[test]
    fn scalar_attributes_convert_to_json() {
        let item = HashMap::from([
            ("itemId".to_string(), AttributeValue::S("a1".to_string())),
            ("price".to_string(), AttributeValue::N("12.5".to_string())),
            ("stock".to_string(), AttributeValue::N("3".to_string())),
            ("active".to_string(), AttributeValue::Bool(true)),
            ("note".to_string(), AttributeValue::Null(true)),
        ]);
        assert_eq!(
            Value::Object(record_from_attributes(&item)),
            json!({"itemId": "a1", "price": 12.5, "stock": 3, "active": true, "note": null})
        );
    }

    #[test]
    fn nested_attributes_convert_to_json() {
        let value = AttributeValue::M(HashMap::from([
            (
                "tags".to_string(),
                AttributeValue::L(vec![
                    AttributeValue::S("fresh".to_string()),
                    AttributeValue::N("7".to_string()),
                ]),
            ),
            (
                "sizes".to_string(),
                AttributeValue::Ns(vec!["1".to_string(), "2".to_string()]),
            ),
        ]));
        assert_eq!(
            attribute_to_json(&value),
            json!({"tags": ["fresh", 7], "sizes": [1, 2]})
        );
    }

    #[test]
    fn item_writes_string_key_and_numeric_price() {
        let item = Item {
            item_id: "a1".to_string(),
            name: "apple".to_string(),
            price: Number::from_f64(0.5).unwrap(),
        };
        let attributes = attributes_from_record(&item.to_record());
        assert_eq!(attributes["itemId"], AttributeValue::S("a1".to_string()));
        assert_eq!(attributes["name"], AttributeValue::S("apple".to_string()));
        assert_eq!(attributes["price"], AttributeValue::N("0.5".to_string()));
        assert_eq!(
            Value::Object(record_from_attributes(&attributes)),
            json!({"itemId": "a1", "name": "apple", "price": 0.5})
        );
    }

    #[test]
    fn store_error_carries_the_service_message_only() {
        use aws_sdk_dynamodb::error::ErrorMetadata;
        use aws_sdk_dynamodb::operation::get_item::GetItemError;
        use aws_sdk_dynamodb::types::error::ResourceNotFoundException;

        let not_found = ResourceNotFoundException::builder()
            .message("Requested resource not found")
            .meta(
                ErrorMetadata::builder()
                    .code("ResourceNotFoundException")
                    .message("Requested resource not found")
                    .build(),
            )
            .build();
        let err = SdkError::<GetItemError, ()>::service_error(
            GetItemError::ResourceNotFoundException(not_found),
            (),
        );
        assert_eq!(
            store_error(err).to_string(),
            "Requested resource not found"
        );
    }

    #[test]
    fn store_error_without_service_message_hides_the_source_chain() {
        use aws_sdk_dynamodb::operation::scan::ScanError;

        let err = SdkError::<ScanError, ()>::construction_failure("table name secret-table");
        let message = store_error(err).to_string();
        assert!(!message.is_empty());
        assert!(!message.contains("secret-table"), "{message}");
    }

    #[test]
    fn binary_attributes_are_base64() {
        let value = AttributeValue::B(Blob::new(b"hi".to_vec()));
        assert_eq!(attribute_to_json(&value), json!("aGk="));
    }

    #[test]
    fn unparsable_number_is_kept_as_string() {
        assert_eq!(number_to_json("1e"), json!("1e"));
        assert_eq!(number_to_json("-0.25"), json!(-0.25));
    }
}
