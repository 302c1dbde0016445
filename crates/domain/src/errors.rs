use thiserror::Error;

/// ToDoの入力検証エラー
///
/// `Display` の文字列はそのままクライアントへ返すエラーメッセージになる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title cannot be empty")]
    TitleEmpty,

    #[error("Title must be a string")]
    TitleNotString,

    #[error("Description must be a string")]
    DescriptionNotString,

    #[error("Completed must be a boolean")]
    CompletedNotBoolean,

    #[error("Todo ID is required")]
    TodoIdRequired,
}
