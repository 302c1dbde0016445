use crate::response::{json_value_response, ApiGatewayProxyResponse};
use domain::DomainError;
use infrastructure::StoreError;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// ストアを呼び出す操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListTodos,
    CreateTodo,
    GetTodo,
    UpdateTodo,
    DeleteTodo,
}

impl Operation {
    /// ストア障害時にクライアントへ返すメッセージ
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::ListTodos => "Failed to retrieve todos",
            Operation::CreateTodo => "Failed to create todo",
            Operation::GetTodo => "Failed to retrieve todo",
            Operation::UpdateTodo => "Failed to update todo",
            Operation::DeleteTodo => "Failed to delete todo",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.failure_message())
    }
}

/// リクエスト処理中のエラー
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Invalid JSON in request body")]
    InvalidJson,

    #[error("Request body must be a JSON object")]
    BodyNotObject,

    #[error("Todo not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{operation}: {source}")]
    Store {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    /// HTTPステータスコードを取得
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson | ApiError::BodyNotObject => 400,
            ApiError::NotFound => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::Store { .. } | ApiError::Unexpected(_) => 500,
        }
    }

    /// クライアントへ返すJSONボディ
    pub fn body(&self) -> Value {
        match self {
            ApiError::Store { operation, .. } => json!({ "error": operation.failure_message() }),
            ApiError::Unexpected(message) => json!({
                "error": "Internal server error",
                "message": message
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }

    /// エラーをログに記録
    pub fn log(&self) {
        match self {
            ApiError::Store { operation, source } => {
                // 詳細はストア呼び出し時に記録済み
                debug!(error = %source, operation = ?operation, "ストア操作エラー");
            }
            ApiError::Unexpected(message) => {
                error!(error = %message, "予期しないエラー");
            }
            ApiError::NotFound => {
                info!("ToDoが見つかりません");
            }
            _ => {
                warn!(error = %self, status_code = self.status_code(), "リクエストを拒否");
            }
        }
    }

    pub fn into_response(self) -> ApiGatewayProxyResponse {
        json_value_response(self.status_code(), &self.body())
    }
}

/// ストアエラーに操作の種類を付与する
pub trait StoreResultExt<T> {
    fn during(self, operation: Operation) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn during(self, operation: Operation) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::Store { operation, source })
    }
}
