use lambda_runtime::Context;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info, warn, Span};

const XRAY_TRACE_ENV: &str = "_X_AMZN_TRACE_ID";

/// 呼び出しごとの識別情報
#[derive(Debug, Clone)]
pub struct LambdaTraceContext {
    pub function_name: String,
    pub function_version: String,
    pub request_id: String,
    pub xray_trace_id: Option<String>,
}

impl LambdaTraceContext {
    pub fn from_lambda_context(context: &Context) -> Self {
        Self {
            function_name: context.env_config.function_name.clone(),
            function_version: context.env_config.version.clone(),
            request_id: context.request_id.clone(),
            xray_trace_id: std::env::var(XRAY_TRACE_ENV).ok(),
        }
    }
}

/// 1回の呼び出し全体を囲むスパン
pub fn create_lambda_span(service: &str, trace: &LambdaTraceContext) -> Span {
    tracing::info_span!(
        "invocation",
        service,
        function = %trace.function_name,
        version = %trace.function_version,
        request_id = %trace.request_id,
        xray_trace_id = trace.xray_trace_id.as_deref().unwrap_or("-"),
    )
}

/// ストア呼び出しを計測し、結果をそのまま返す
pub async fn trace_store_operation<T, E, Fut>(
    table: &str,
    operation: &str,
    call: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let started = Instant::now();
    let result = call.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Err(e) = &result {
        error!(table, operation, elapsed_ms, error = %e, "ストア呼び出し失敗");
    } else {
        info!(table, operation, elapsed_ms, "ストア呼び出し完了");
    }

    result
}

/// 返却するステータスに応じたレベルでレスポンスを記録
pub fn trace_http_response(method: &str, path: &str, status_code: u16) {
    match status_code {
        500.. => error!(method, path, status_code, "レスポンス返却（サーバーエラー）"),
        400..=499 => warn!(method, path, status_code, "レスポンス返却（クライアントエラー）"),
        _ => info!(method, path, status_code, "レスポンス返却"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_store_operation_returns_inner_result() {
        let ok: Result<u32, String> =
            trace_store_operation("todos-table", "GetItem", async { Ok(7) }).await;
        let err: Result<u32, String> =
            trace_store_operation("todos-table", "GetItem", async { Err("throttled".to_string()) })
                .await;

        assert_eq!(ok, Ok(7));
        assert_eq!(err, Err("throttled".to_string()));
    }
}
