use aws_lambda_events::event::apigw::ApiGatewayV2httpResponse;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::cors::CorsPolicy;
use crate::error::RouterError;
use crate::event::{json_response, ItemsEvent, Record, Route};
use crate::store::ItemStore;

pub(crate) async fn function_handler<S: ItemStore>(
    store: &S,
    cors: &CorsPolicy,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayV2httpResponse, Error> {
    Ok(handle(store, cors, &event.payload).await)
}

/// Runs one request to completion. Failures never escape as Lambda errors; they become a 400
/// whose body is the error message.
pub(crate) async fn handle<S: ItemStore>(
    store: &S,
    cors: &CorsPolicy,
    payload: &Value,
) -> ApiGatewayV2httpResponse {
    info!(event = %payload, "received event");
    let event = ItemsEvent::from_payload(payload);
    let headers = cors.headers(event.origin());

    match dispatch(store, &event).await {
        Ok((status, body)) => json_response(status, &body, headers),
        Err(err) => {
            error!(error = %err, "request failed");
            json_response(err.status_code(), &Value::String(err.to_string()), headers)
        }
    }
}

async fn dispatch<S: ItemStore>(
    store: &S,
    event: &ItemsEvent<'_>,
) -> Result<(u16, Value), RouterError> {
    let route = event.route()?;
    debug!(%route, "dispatching");

    let body = match route {
        Route::DeleteItem => {
            let id = event.path_id()?;
            store.delete(id).await?;
            Value::String(format!("Deleted item {id}"))
        }
        Route::GetItem => {
            let id = event.path_id()?;
            Value::Object(store.get(id).await?.unwrap_or_else(Record::new))
        }
        Route::ListItems => {
            Value::Array(store.scan_all().await?.into_iter().map(Value::Object).collect())
        }
        Route::CreateItem => {
            let item = event.item()?;
            store.put(&item).await?;
            Value::String(format!("Posted item {}", item.item_id))
        }
        Route::ReplaceItem => {
            let item = event.item()?;
            store.put(&item).await?;
            Value::String(format!("Updated item {}", item.item_id))
        }
        Route::PreflightCollection | Route::PreflightItem => {
            return Ok((204, Value::String(String::new())));
        }
    };

    Ok((200, body))
}
