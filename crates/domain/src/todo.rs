use crate::errors::DomainError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ToDoの識別子（UUID v4）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

#[allow(clippy::new_without_default)]
impl TodoId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// パスパラメータから受け取ったIDを検証する。空文字列は指定なしとみなす
    pub fn parse(id: Option<&str>) -> Result<Self, DomainError> {
        match id {
            Some(id) if !id.is_empty() => Ok(Self(id.to_string())),
            _ => Err(DomainError::TodoIdRequired),
        }
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// タイムスタンプをマイクロ秒固定幅のRFC 3339形式に変換する
///
/// 桁数が揃っているため文字列比較の順序が時刻順と一致する。
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Todo {
    /// 検証済みの入力から新しいToDoを作成する
    pub fn create(new_todo: NewTodo, now: DateTime<Utc>) -> Self {
        let timestamp = format_timestamp(now);
        Self {
            id: TodoId::new(),
            title: new_todo.title,
            description: new_todo.description,
            completed: false,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }

    /// 指定されたフィールドだけを書き換える
    pub fn apply(&mut self, changes: &TodoChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = changes.updated_at.clone();
    }
}

/// 作成日時の降順に並べ替える
pub fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// 作成用の検証済み入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    title: String,
    description: String,
}

impl NewTodo {
    pub fn new(title: &str, description: &str) -> Result<Self, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::TitleRequired);
        }

        Ok(Self {
            title: title.to_string(),
            description: description.trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// 部分更新の内容。`None` のフィールドは変更しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub updated_at: String,
}

impl TodoChanges {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            completed: None,
            updated_at: format_timestamp(now),
        }
    }

    pub fn title(mut self, title: &str) -> Result<Self, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::TitleEmpty);
        }
        self.title = Some(title.to_string());
        Ok(self)
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.trim().to_string());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}
