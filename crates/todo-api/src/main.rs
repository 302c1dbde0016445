use anyhow::{anyhow, Context as _};
use infrastructure::{DynamoDbClient, DynamoTodoStore};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::telemetry::{create_lambda_span, LambdaTraceContext};
use shared::{init_tracing, Config, SystemClock};
use std::sync::Arc;
use todo_api::{ApiGatewayProxyRequest, ApiGatewayProxyResponse, Router};
use tracing::{info, Instrument};

/// Lambda 呼び出し1回分の処理
async fn function_handler(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    router: &Router,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (payload, context) = event.into_parts();

    let trace_context = LambdaTraceContext::from_lambda_context(&context);
    let span = create_lambda_span("todo-api", &trace_context);

    Ok(router.handle(&payload).instrument(span).await)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow!(e))?;

    let config = Config::from_env().context("設定読み込みエラー")?;
    info!(
        table = %config.dynamodb_table,
        environment = %config.environment,
        region = %config.aws_region,
        "TodoApi 起動"
    );

    // DynamoDBクライアントは起動時に1度だけ作成し、全呼び出しで共有する
    let db_client = DynamoDbClient::new(&config).await;
    let router = Router::new(
        Arc::new(DynamoTodoStore::new(db_client)),
        Arc::new(SystemClock),
    );

    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| {
        let router = router.clone();
        async move { function_handler(event, &router).await }
    }))
    .await
    .map_err(|e| anyhow!(e))
}
