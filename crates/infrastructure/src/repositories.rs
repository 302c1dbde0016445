use crate::errors::StoreError;
use crate::models::{attributes, item_to_todo, items_to_todos, todo_to_item, Item, UpdatePlan};
use crate::DynamoDbClient;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use domain::{Todo, TodoChanges, TodoId};
use shared::telemetry::trace_store_operation;
use tracing::{debug, info};

/// ToDoレコードの保存先
///
/// 各操作は1回だけ実行され、失敗はそのまま呼び出し元に返す。
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// 全件を取得する（ページングなし）
    async fn scan_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError>;

    /// レコードの有無だけを確認する
    ///
    /// 既定の実装は `get` を使う。変換できないレコードも「存在する」と扱う実装は上書きすること。
    async fn exists(&self, id: &TodoId) -> Result<bool, StoreError> {
        Ok(self.get(id).await?.is_some())
    }

    /// 無条件で書き込む。同じIDのレコードは上書きされる
    async fn put(&self, todo: &Todo) -> Result<(), StoreError>;

    /// 指定フィールドのみ更新し、更新後のレコードを返す
    ///
    /// レコードが存在しない場合は `Ok(None)`。
    async fn partial_update(
        &self,
        id: &TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, StoreError>;

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError>;
}

/// DynamoDB をバックエンドとするストア（パーティションキー `id`）
#[derive(Clone)]
pub struct DynamoTodoStore {
    db: DynamoDbClient,
    scan_page_size: Option<i32>,
}

impl DynamoTodoStore {
    pub fn new(db: DynamoDbClient) -> Self {
        Self {
            db,
            scan_page_size: None,
        }
    }

    /// スキャン1ページあたりの最大件数を指定する（未指定時はDynamoDBの上限に従う）
    pub fn with_scan_page_size(mut self, page_size: i32) -> Self {
        self.scan_page_size = Some(page_size);
        self
    }

    fn key(id: &TodoId) -> (String, AttributeValue) {
        (
            attributes::ID.to_string(),
            AttributeValue::S(id.as_str().to_string()),
        )
    }
}

#[async_trait]
impl TodoStore for DynamoTodoStore {
    async fn scan_all(&self) -> Result<Vec<Todo>, StoreError> {
        trace_store_operation(self.db.table_name(), "scan", async {
            let mut todos = Vec::new();
            let mut start_key: Option<Item> = None;
            let mut pages = 0usize;

            loop {
                let output = self
                    .db
                    .client()
                    .scan()
                    .table_name(self.db.table_name())
                    .set_limit(self.scan_page_size)
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await
                    .map_err(|e| self.db.convert_error(e))?;

                pages += 1;
                todos.extend(items_to_todos(output.items()));

                match output.last_evaluated_key {
                    Some(key) if !key.is_empty() => start_key = Some(key),
                    _ => break,
                }
            }

            debug!("スキャン完了: {} 件 ({} ページ)", todos.len(), pages);
            Ok::<_, StoreError>(todos)
        })
        .await
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        trace_store_operation(self.db.table_name(), "get_item", async {
            let (key, value) = Self::key(id);
            let output = self
                .db
                .client()
                .get_item()
                .table_name(self.db.table_name())
                .key(key, value)
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))?;

            output.item.as_ref().map(item_to_todo).transpose()
        })
        .await
    }

    async fn exists(&self, id: &TodoId) -> Result<bool, StoreError> {
        trace_store_operation(self.db.table_name(), "get_item(id)", async {
            let (key, value) = Self::key(id);
            let output = self
                .db
                .client()
                .get_item()
                .table_name(self.db.table_name())
                .key(key, value)
                .projection_expression("#id")
                .expression_attribute_names("#id", attributes::ID)
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))?;

            Ok::<_, StoreError>(output.item.is_some())
        })
        .await
    }

    async fn put(&self, todo: &Todo) -> Result<(), StoreError> {
        trace_store_operation(self.db.table_name(), "put_item", async {
            self.db
                .client()
                .put_item()
                .table_name(self.db.table_name())
                .set_item(Some(todo_to_item(todo)))
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))?;

            debug!("ToDo保存完了: {}", todo.id);
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn partial_update(
        &self,
        id: &TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        trace_store_operation(self.db.table_name(), "update_item", async {
            let plan = UpdatePlan::from_changes(changes);
            let (key, value) = Self::key(id);

            let result = self
                .db
                .client()
                .update_item()
                .table_name(self.db.table_name())
                .key(key, value)
                .update_expression(plan.update_expression)
                .condition_expression(plan.condition_expression)
                .set_expression_attribute_names(Some(plan.names))
                .set_expression_attribute_values(Some(plan.values))
                .return_values(ReturnValue::AllNew)
                .send()
                .await;

            match result {
                Ok(output) => {
                    let attributes = output.attributes.ok_or_else(|| {
                        StoreError::MalformedItem(format!("更新結果が返されませんでした: {id}"))
                    })?;
                    item_to_todo(&attributes).map(Some)
                }
                Err(e)
                    if e.as_service_error()
                        .map(|se| se.is_conditional_check_failed_exception())
                        .unwrap_or(false) =>
                {
                    info!("更新対象が存在しません: {}", id);
                    Ok(None)
                }
                Err(e) => Err(self.db.convert_error(e)),
            }
        })
        .await
    }

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError> {
        trace_store_operation(self.db.table_name(), "delete_item", async {
            let (key, value) = Self::key(id);
            self.db
                .client()
                .delete_item()
                .table_name(self.db.table_name())
                .key(key, value)
                .send()
                .await
                .map_err(|e| self.db.convert_error(e))?;

            debug!("ToDo削除完了: {}", id);
            Ok::<_, StoreError>(())
        })
        .await
    }
}
