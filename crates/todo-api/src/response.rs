use crate::error::ApiError;
use domain::{Todo, TodoId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const ALLOWED_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";
pub const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// API Gateway プロキシレスポンス構造体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiGatewayProxyResponse {
    /// ボディをJSONとして読み直す
    pub fn json_body(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// ToDo一覧レスポンス
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    pub count: usize,
}

/// ToDo詳細レスポンス
#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

/// 作成・更新結果レスポンス
#[derive(Debug, Serialize)]
pub struct TodoMessageResponse {
    pub message: &'static str,
    pub todo: Todo,
}

/// 削除結果レスポンス
#[derive(Debug, Serialize)]
pub struct TodoDeletedResponse {
    pub message: &'static str,
    pub id: TodoId,
}

/// 全レスポンス共通のヘッダー（JSON + CORS）
pub fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        ALLOWED_HEADERS.to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        ALLOWED_METHODS.to_string(),
    );
    headers
}

/// JSON値からレスポンスを作成
pub fn json_value_response(status_code: u16, body: &Value) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code,
        headers: default_headers(),
        body: body.to_string(),
        is_base64_encoded: false,
    }
}

/// シリアライズ可能な値からレスポンスを作成
pub fn json_response(
    status_code: u16,
    body: &impl Serialize,
) -> Result<ApiGatewayProxyResponse, ApiError> {
    let value = serde_json::to_value(body)
        .map_err(|e| ApiError::Unexpected(format!("レスポンスのシリアライズに失敗: {e}")))?;
    Ok(json_value_response(status_code, &value))
}
