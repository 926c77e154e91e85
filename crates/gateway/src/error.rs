//! # Gateway エラー型
//!
//! 全てのエラーはハンドラの入口で確定したステータスコードに変換される。
//! 内部エラーの詳細はログにのみ出力し、呼び出し元には返さない。

use axum::http::StatusCode;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Refererが許可されていない
    #[error("Forbidden")]
    Forbidden,
    /// パスが空、親ディレクトリ参照を含む、または不正な形式
    #[error("Invalid path")]
    InvalidPath,
    /// 拡張子が許可一覧にない
    #[error("Invalid file type")]
    InvalidFileType,
    /// 署名付きURLの発行に失敗
    #[error("署名付きURLの発行に失敗: {0}")]
    Storage(String),
    /// 上流ストレージからの取得に失敗
    #[error("上流ストレージからの取得に失敗: {0}")]
    Upstream(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl GatewayError {
    /// レスポンスのステータスコード。
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::InvalidPath | GatewayError::InvalidFileType => StatusCode::BAD_REQUEST,
            GatewayError::Storage(_) | GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "リクエスト処理に失敗");
            return (status, "Internal Server Error").into_response();
        }
        (status, self.to_string()).into_response()
    }
}
