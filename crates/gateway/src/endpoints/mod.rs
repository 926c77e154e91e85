//! # Gatewayエンドポイント
//!
//! パスはそのままオブジェクトキーとして扱うため、全てのメソッド・パスを
//! フォールバックハンドラで受け付ける。

pub mod media;

use std::sync::Arc;

pub use media::handle_media;

use crate::config::GatewayState;

/// Gatewayのルーターを構築する。
pub fn build_router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .fallback(handle_media)
        .with_state(state)
}
