use crate::error::ApiError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use domain::{DomainError, NewTodo, TodoChanges, TodoId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// API Gateway プロキシリクエスト構造体
///
/// ヘッダーやクエリパラメータなど使用しないフィールドは読み捨てる。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
}

impl ApiGatewayProxyRequest {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_path_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// パスパラメータ `id` からTodoIdを取り出す
    pub fn todo_id(&self) -> Result<TodoId, DomainError> {
        TodoId::parse(self.path_parameter("id"))
    }

    /// ボディ文字列を返す。ボディがない場合は空オブジェクトとして扱う
    fn body_text(&self) -> Result<Cow<'_, str>, ApiError> {
        let Some(body) = self.body.as_deref() else {
            return Ok(Cow::Borrowed("{}"));
        };

        if self.is_base64_encoded.unwrap_or(false) {
            let bytes = STANDARD.decode(body).map_err(|_| ApiError::InvalidJson)?;
            let text = String::from_utf8(bytes).map_err(|_| ApiError::InvalidJson)?;
            Ok(Cow::Owned(text))
        } else {
            Ok(Cow::Borrowed(body))
        }
    }

    /// ボディをJSONオブジェクトとして読み取り、指定の型に変換する
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let text = self.body_text()?;
        let value: Value = serde_json::from_str(&text).map_err(|_| ApiError::InvalidJson)?;
        if !value.is_object() {
            return Err(ApiError::BodyNotObject);
        }
        serde_json::from_value(value).map_err(|_| ApiError::InvalidJson)
    }
}

/// キーが存在すれば `null` でも `Some` にする
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// ToDo作成リクエスト
///
/// 型の検証は `validate` で行い、フィールドごとのエラーメッセージを返す。
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Result<NewTodo, DomainError> {
        let title = match &self.title {
            None => return Err(DomainError::TitleRequired),
            Some(Value::String(title)) => title.as_str(),
            Some(_) => return Err(DomainError::TitleNotString),
        };

        let description = match &self.description {
            None => "",
            Some(Value::String(description)) => description.as_str(),
            Some(_) => return Err(DomainError::DescriptionNotString),
        };

        NewTodo::new(title, description)
    }
}

/// ToDo更新リクエスト
///
/// キーが含まれているフィールドだけを更新対象にする。
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Value>,
}

impl UpdateTodoRequest {
    pub fn into_changes(self, now: DateTime<Utc>) -> Result<TodoChanges, DomainError> {
        let mut changes = TodoChanges::new(now);

        if let Some(title) = self.title {
            let Value::String(title) = title else {
                return Err(DomainError::TitleNotString);
            };
            changes = changes.title(&title)?;
        }

        if let Some(description) = self.description {
            let Value::String(description) = description else {
                return Err(DomainError::DescriptionNotString);
            };
            changes = changes.description(&description);
        }

        if let Some(completed) = self.completed {
            let completed = completed
                .as_bool()
                .ok_or(DomainError::CompletedNotBoolean)?;
            changes = changes.completed(completed);
        }

        Ok(changes)
    }
}
