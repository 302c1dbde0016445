use thiserror::Error;

/// レコードストア操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Malformed item: {0}")]
    MalformedItem(String),
}
