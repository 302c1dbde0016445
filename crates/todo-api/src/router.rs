use crate::error::ApiError;
use crate::handlers::TodoHandlers;
use crate::request::ApiGatewayProxyRequest;
use crate::response::ApiGatewayProxyResponse;
use futures::FutureExt;
use infrastructure::TodoStore;
use shared::telemetry::trace_http_response;
use shared::Clock;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::info;

const COLLECTION_PATH: &str = "/todos";
const ITEM_PATH_PREFIX: &str = "/todos/";

/// ルーティング先の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListTodos,
    CreateTodo,
    GetTodo,
    UpdateTodo,
    DeleteTodo,
}

/// メソッドとパスから操作を決定する（上から順に最初に一致したもの）
pub fn resolve_route(method: &str, path: &str) -> Option<Route> {
    match (method, path) {
        ("GET", COLLECTION_PATH) => Some(Route::ListTodos),
        ("POST", COLLECTION_PATH) => Some(Route::CreateTodo),
        ("GET", p) if p.starts_with(ITEM_PATH_PREFIX) => Some(Route::GetTodo),
        ("PUT", p) if p.starts_with(ITEM_PATH_PREFIX) => Some(Route::UpdateTodo),
        ("DELETE", p) if p.starts_with(ITEM_PATH_PREFIX) => Some(Route::DeleteTodo),
        _ => None,
    }
}

/// リクエストを各操作に振り分け、全ての結果をレスポンスに変換する
#[derive(Clone)]
pub struct Router {
    handlers: TodoHandlers,
}

impl Router {
    pub fn new(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            handlers: TodoHandlers::new(store, clock),
        }
    }

    /// リクエストを処理する。エラーやパニックも含めて必ずレスポンスを返す
    pub async fn handle(&self, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
        info!(
            method = %request.http_method,
            path = %request.path,
            path_parameters = ?request.path_parameters,
            body_length = request.body.as_ref().map_or(0, String::len),
            "リクエスト受信"
        );

        let outcome = AssertUnwindSafe(self.dispatch(request))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                e.log();
                e.into_response()
            }
            Err(panic) => {
                let e = ApiError::Unexpected(panic_message(panic.as_ref()));
                e.log();
                e.into_response()
            }
        };

        trace_http_response(&request.http_method, &request.path, response.status_code);
        response
    }

    async fn dispatch(
        &self,
        request: &ApiGatewayProxyRequest,
    ) -> Result<ApiGatewayProxyResponse, ApiError> {
        let route = resolve_route(&request.http_method, &request.path)
            .ok_or(ApiError::MethodNotAllowed)?;

        match route {
            Route::ListTodos => self.handlers.list_todos().await,
            Route::CreateTodo => self.handlers.create_todo(request).await,
            Route::GetTodo => self.handlers.get_todo(request).await,
            Route::UpdateTodo => self.handlers.update_todo(request).await,
            Route::DeleteTodo => self.handlers.delete_todo(request).await,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
