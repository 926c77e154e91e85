//! # Media Gateway
//!
//! 非公開のS3互換バケットに置かれたポートフォリオのメディアを配信するGateway。
//! 状態を持たず、リクエストごとに独立して処理する。
//!
//! ## 役割
//! - Refererによる埋め込み元の制限
//! - オブジェクトキーと拡張子の検証
//! - 有効期限300秒の署名付きURL発行
//! - 画像・ドキュメントは署名付きURLへ302リダイレクト
//! - 動画はRangeヘッダを転送しつつストリーミング中継（CORS・キャッシュヘッダ付与）
//!
//! ## 環境変数
//! - `ALLOWED_REFERER`, `ACCESS_KEY_ID`, `SECRET_ACCESS_KEY`, `BUCKET_NAME`（必須）
//! - `ACCOUNT_ID`（R2アカウント）または `STORAGE_ENDPOINT`（エンドポイント上書き）
//! - `GATEWAY_ADDR`, `PRESIGN_MAX_RETRIES`, `PRESIGN_RETRY_BASE_MS`（任意）

mod auth;
mod config;
mod endpoints;
mod error;
mod storage;
mod upstream;

use std::sync::Arc;

use config::{GatewayConfig, GatewayState};
use storage::S3MediaStorage;
use upstream::ReqwestFetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        allowed_referer = %config.allowed_referer,
        presign_max_retries = config.presign_retry.max_retries,
        "設定を読み込みました"
    );

    let storage = S3MediaStorage::from_config(&config)?;
    let addr = config.listen_addr.clone();

    let state = Arc::new(GatewayState {
        config,
        storage: Box::new(storage),
        upstream: Box::new(ReqwestFetcher::new()),
    });

    let app = endpoints::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gatewayを {} で起動します", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gatewayを停止しました");
    Ok(())
}

/// Ctrl-C または SIGTERM を待つ。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl-Cハンドラの登録に失敗: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERMハンドラの登録に失敗: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("終了シグナルを受信しました");
}
