use std::env;
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "todos-table";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must not be blank")]
    Blank(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dynamodb_table: String,
    pub environment: String,
    pub aws_region: String,
    /// DynamoDB Local などへの接続先上書き
    pub dynamodb_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let dynamodb_table =
            lookup("DYNAMODB_TABLE").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        if dynamodb_table.trim().is_empty() {
            return Err(ConfigError::Blank("DYNAMODB_TABLE"));
        }

        Ok(Config {
            dynamodb_table,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }
}
