//! # 上流取得
//!
//! 署名付きURLに対するHTTP取得を抽象化する。動画の中継で使用する。
//!
//! レスポンスボディはバッファせずにストリームとして返す。中継先のボディが
//! 破棄される（クライアント切断）と上流のストリームも破棄され、転送は中断される。

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};

use crate::error::GatewayError;

/// 上流レスポンス。中継に必要なヘッダのみを保持する。
pub struct UpstreamResponse {
    /// ステータスコード（200 / 206 等をそのまま中継する）
    pub status: StatusCode,
    /// Content-Type
    pub content_type: Option<HeaderValue>,
    /// Content-Length
    pub content_length: Option<HeaderValue>,
    /// Content-Range（部分レスポンス時のみ）
    pub content_range: Option<HeaderValue>,
    /// レスポンスボディ
    pub body: Body,
}

/// 上流取得の抽象インターフェース。
#[async_trait::async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// `url` をGETする。`range` が指定された場合のみRangeヘッダを付与する。
    ///
    /// Rangeヘッダの値はバイト列のまま転送する。
    async fn fetch(
        &self,
        url: &str,
        range: Option<&HeaderValue>,
    ) -> Result<UpstreamResponse, GatewayError>;
}

/// reqwestによる上流取得。
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// タイムアウトは設定しない。遅い上流はホスト側のリクエストタイムアウトに委ねる。
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UpstreamFetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        url: &str,
        range: Option<&HeaderValue>,
    ) -> Result<UpstreamResponse, GatewayError> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(header::RANGE, range.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        let headers = response.headers();
        let content_type = headers.get(header::CONTENT_TYPE).cloned();
        let content_length = headers.get(header::CONTENT_LENGTH).cloned();
        let content_range = headers.get(header::CONTENT_RANGE).cloned();

        tracing::debug!(
            status = status.as_u16(),
            content_range = ?content_range,
            "上流レスポンス受信"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            content_length,
            content_range,
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}
