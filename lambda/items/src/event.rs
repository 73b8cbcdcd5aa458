//! Wire types for the API Gateway HTTP API (payload v2) events this function serves.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use base64::{engine::general_purpose, Engine as _};
use http::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN};
use serde_json::{Map, Number, Value};

use crate::error::RouterError;

/// A stored item as it comes back from the table, untyped.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    DeleteItem,
    GetItem,
    ListItems,
    CreateItem,
    ReplaceItem,
    PreflightCollection,
    PreflightItem,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::DeleteItem => "DELETE /items/{id}",
            Route::GetItem => "GET /items/{id}",
            Route::ListItems => "GET /items",
            Route::CreateItem => "POST /items",
            Route::ReplaceItem => "PUT /items",
            Route::PreflightCollection => "OPTIONS /items",
            Route::PreflightItem => "OPTIONS /items/{id}",
        }
    }
}

impl FromStr for Route {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DELETE /items/{id}" => Ok(Route::DeleteItem),
            "GET /items/{id}" => Ok(Route::GetItem),
            "GET /items" => Ok(Route::ListItems),
            "POST /items" => Ok(Route::CreateItem),
            "PUT /items" => Ok(Route::ReplaceItem),
            "OPTIONS /items" => Ok(Route::PreflightCollection),
            "OPTIONS /items/{id}" => Ok(Route::PreflightItem),
            other => Err(RouterError::UnsupportedRoute(other.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation: the HTTP API request read field by field, plus the raw payload it came from.
///
/// Each field is taken on its own, so a wrongly typed field only fails the routes that read it.
pub struct ItemsEvent<'a> {
    payload: &'a Value,
    request: ApiGatewayV2httpRequest,
}

impl<'a> ItemsEvent<'a> {
    pub fn from_payload(payload: &'a Value) -> Self {
        let mut request = ApiGatewayV2httpRequest::default();
        request.route_key = payload
            .get("routeKey")
            .and_then(Value::as_str)
            .map(str::to_string);
        request.headers = header_map(payload.get("headers"));
        request.path_parameters = string_map(payload.get("pathParameters"));
        request.body = payload.get("body").and_then(Value::as_str).map(str::to_string);
        request.is_base64_encoded = payload
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self { payload, request }
    }

    /// A missing or empty `routeKey` is a malformed event, echoed back in the message.
    pub fn route(&self) -> Result<Route, RouterError> {
        match self.request.route_key.as_deref() {
            Some(key) if !key.is_empty() => key.parse(),
            _ => Err(RouterError::MalformedEvent(self.payload.to_string())),
        }
    }

    pub fn origin(&self) -> Option<&HeaderValue> {
        self.request.headers.get(ORIGIN)
    }

    pub fn path_id(&self) -> Result<&str, RouterError> {
        self.request
            .path_parameters
            .get("id")
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(RouterError::MissingPathParameter("id"))
    }

    /// Decodes and validates the request body as a full item.
    pub fn item(&self) -> Result<Item, RouterError> {
        let raw = match self.request.body.as_deref() {
            Some(body) if !body.is_empty() => body,
            Some(_) => return Err(RouterError::MissingBody),
            None => {
                return match self.payload.get("body") {
                    None | Some(Value::Null) => Err(RouterError::MissingBody),
                    Some(_) => Err(RouterError::InvalidBody("body is not a string".to_string())),
                }
            }
        };

        let json: Value = if self.request.is_base64_encoded {
            let bytes = general_purpose::STANDARD
                .decode(raw)
                .map_err(|e| RouterError::InvalidBody(format!("invalid base64: {e}")))?;
            serde_json::from_slice(&bytes).map_err(|e| RouterError::InvalidBody(e.to_string()))?
        } else {
            serde_json::from_str(raw).map_err(|e| RouterError::InvalidBody(e.to_string()))?
        };

        Item::from_json(&json)
    }
}

// Header names are normalized by `HeaderName`, so lookups ignore case.
fn header_map(raw: Option<&Value>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(raw) = raw.and_then(Value::as_object) else {
        return headers;
    };
    for (name, value) in raw {
        let Some(value) = value.as_str() else {
            continue;
        };
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }
    headers
}

fn string_map(raw: Option<&Value>) -> HashMap<String, String> {
    raw.and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Builds the proxy-integration response. `body` is JSON-encoded, so a message string arrives
/// quoted.
pub fn json_response(
    status_code: u16,
    body: &Value,
    headers: HeaderMap,
) -> ApiGatewayV2httpResponse {
    let mut response = ApiGatewayV2httpResponse::default();
    response.status_code = i64::from(status_code);
    response.headers = headers;
    response.body = Some(Body::Text(body.to_string()));
    response
}

/// A fully validated item, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub item_id: String,
    pub name: String,
    pub price: Number,
}

impl Item {
    /// Validates an untyped body field by field. Fields beyond the three required ones are
    /// dropped.
    pub fn from_json(json: &Value) -> Result<Self, RouterError> {
        let field = |name: &str| json.get(name).filter(|value| is_present(value));

        let (Some(item_id), Some(name), Some(price)) =
            (field("itemId"), field("name"), field("price"))
        else {
            return Err(RouterError::MissingFields);
        };

        match (item_id, name, price) {
            (Value::String(item_id), Value::String(name), Value::Number(price)) => Ok(Item {
                item_id: item_id.clone(),
                name: name.clone(),
                price: price.clone(),
            }),
            _ => Err(RouterError::InvalidFieldTypes),
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("itemId".to_string(), Value::String(self.item_id.clone()));
        record.insert("name".to_string(), Value::String(self.name.clone()));
        record.insert("price".to_string(), Value::Number(self.price.clone()));
        record
    }
}

// null, false, 0 and "" all count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
