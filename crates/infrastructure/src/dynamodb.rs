use crate::errors::StoreError;
use aws_config::{retry::RetryConfig, BehaviorVersion, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::Client;
use shared::Config;
use tracing::info;

/// DynamoDBクライアントとテーブル名の組
///
/// 起動時に一度だけ作成し、全リクエストで使い回す。
#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        // ストア呼び出しは1回だけ試行する
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint) = &config.dynamodb_endpoint {
            info!("DynamoDBエンドポイントを上書き: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        let aws_config = loader.load().await;

        Self {
            client: Client::new(&aws_config),
            table_name: config.dynamodb_table.clone(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// SDKエラーをストアエラーに変換
    pub fn convert_error<E, R>(&self, error: SdkError<E, R>) -> StoreError
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        StoreError::DynamoDb(DisplayErrorContext(&error).to_string())
    }
}
