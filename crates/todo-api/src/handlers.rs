use crate::error::{ApiError, Operation, StoreResultExt};
use crate::request::{ApiGatewayProxyRequest, CreateTodoRequest, UpdateTodoRequest};
use crate::response::{
    json_response, ApiGatewayProxyResponse, TodoDeletedResponse, TodoListResponse,
    TodoMessageResponse, TodoResponse,
};
use domain::{sort_newest_first, Todo};
use infrastructure::TodoStore;
use shared::Clock;
use std::sync::Arc;
use tracing::info;

type HandlerResult = Result<ApiGatewayProxyResponse, ApiError>;

/// ToDoの各操作
///
/// ストアと時計は起動時に1度だけ作成して注入する。
#[derive(Clone)]
pub struct TodoHandlers {
    store: Arc<dyn TodoStore>,
    clock: Arc<dyn Clock>,
}

impl TodoHandlers {
    pub fn new(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 全件取得して作成日時の降順で返す
    pub async fn list_todos(&self) -> HandlerResult {
        let mut todos = self.store.scan_all().await.during(Operation::ListTodos)?;
        sort_newest_first(&mut todos);

        info!("ToDo一覧取得完了: {} 件", todos.len());
        json_response(
            200,
            &TodoListResponse {
                count: todos.len(),
                todos,
            },
        )
    }

    pub async fn create_todo(&self, request: &ApiGatewayProxyRequest) -> HandlerResult {
        let input: CreateTodoRequest = request.parse_body()?;
        let new_todo = input.validate()?;

        let todo = Todo::create(new_todo, self.clock.now());
        self.store
            .put(&todo)
            .await
            .during(Operation::CreateTodo)?;

        info!("ToDo作成完了: todo_id={}", todo.id);
        json_response(
            201,
            &TodoMessageResponse {
                message: "Todo created successfully",
                todo,
            },
        )
    }

    pub async fn get_todo(&self, request: &ApiGatewayProxyRequest) -> HandlerResult {
        let todo_id = request.todo_id()?;

        let todo = self
            .store
            .get(&todo_id)
            .await
            .during(Operation::GetTodo)?
            .ok_or(ApiError::NotFound)?;

        info!("ToDo詳細取得完了: todo_id={}", todo_id);
        json_response(200, &TodoResponse { todo })
    }

    /// 指定されたフィールドのみ更新する。`updated_at` は常に更新される
    pub async fn update_todo(&self, request: &ApiGatewayProxyRequest) -> HandlerResult {
        let todo_id = request.todo_id()?;
        let input: UpdateTodoRequest = request.parse_body()?;

        self.store
            .get(&todo_id)
            .await
            .during(Operation::UpdateTodo)?
            .ok_or(ApiError::NotFound)?;

        let changes = input.into_changes(self.clock.now())?;

        // 存在確認の後に削除された場合は None が返る
        let todo = self
            .store
            .partial_update(&todo_id, &changes)
            .await
            .during(Operation::UpdateTodo)?
            .ok_or(ApiError::NotFound)?;

        info!("ToDo更新完了: todo_id={}", todo_id);
        json_response(
            200,
            &TodoMessageResponse {
                message: "Todo updated successfully",
                todo,
            },
        )
    }

    pub async fn delete_todo(&self, request: &ApiGatewayProxyRequest) -> HandlerResult {
        let todo_id = request.todo_id()?;

        // 変換できない壊れたレコードも削除できるよう、存在確認だけを行う
        let exists = self
            .store
            .exists(&todo_id)
            .await
            .during(Operation::DeleteTodo)?;
        if !exists {
            return Err(ApiError::NotFound);
        }

        self.store
            .delete(&todo_id)
            .await
            .during(Operation::DeleteTodo)?;

        info!("ToDo削除完了: todo_id={}", todo_id);
        json_response(
            200,
            &TodoDeletedResponse {
                message: "Todo deleted successfully",
                id: todo_id,
            },
        )
    }
}
