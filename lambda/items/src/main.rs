use lambda_runtime::{run, service_fn, tracing, Error};
mod config;
mod cors;
mod error;
mod event;
mod http_handler;
mod store;
use config::Config;
use cors::CorsPolicy;
use http_handler::function_handler;
use store::DynamoItemStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let cfg = Config::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);
    let cors = CorsPolicy::new(&cfg.secure_origin, &cfg.website_origin)?;
    let store = DynamoItemStore::new(client, cfg.table_name);

    run(service_fn(|event| function_handler(&store, &cors, event))).await
}
