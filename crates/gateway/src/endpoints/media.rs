//! # メディア配信
//!
//! 処理順:
//! 1. Referer認証（403）
//! 2. パスからオブジェクトキーを抽出・検証（400）
//! 3. 拡張子の許可一覧チェック（400）
//! 4. 有効期限300秒の署名付きURLを発行（失敗時500）
//! 5. 画像・ドキュメントは302リダイレクト、動画はGatewayが上流を中継

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use media_types::{DeliveryMode, DEFAULT_VIDEO_CONTENT_TYPE};

use crate::auth;
use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::storage::{presign_with_retry, PRESIGN_EXPIRY_SECS};
use crate::upstream::UpstreamResponse;

/// 動画レスポンスのCache-Control。署名付きURLは短命だが、オブジェクト自体は不変として扱う。
const VIDEO_CACHE_CONTROL: &str = "public, max-age=31536000";

/// 全メソッド・全パス: メディア配信。
pub async fn handle_media(
    State(state): State<Arc<GatewayState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let referer = auth::referer(&headers);
    if !auth::is_allowed_referer(referer, &state.config.allowed_referer) {
        tracing::warn!(referer, path = uri.path(), "許可されていないRefererを拒否");
        return Err(GatewayError::Forbidden);
    }

    let object_key = extract_object_key(uri.path())?;

    let mode = media_types::delivery_mode(&object_key).ok_or_else(|| {
        tracing::debug!(object_key = %object_key, "許可されていない拡張子を拒否");
        GatewayError::InvalidFileType
    })?;

    let signed_url = presign_with_retry(
        state.storage.as_ref(),
        &object_key,
        PRESIGN_EXPIRY_SECS,
        &state.config.presign_retry,
    )
    .await?;

    match mode {
        DeliveryMode::Redirect => {
            tracing::info!(object_key = %object_key, "署名付きURLへリダイレクト");
            redirect_to(&signed_url)
        }
        DeliveryMode::Stream => {
            let range = headers.get(header::RANGE);
            tracing::info!(object_key = %object_key, range = ?range, "動画を中継");

            let upstream = state.upstream.fetch(&signed_url, range).await?;
            Ok(stream_response(upstream))
        }
    }
}

/// リクエストパスからオブジェクトキーを取り出す。
///
/// 先頭の `/` を一つ取り除き、パーセントデコードしたうえで、空・`..` を含む・
/// なお `/` で始まる（`//` 始まりのパス）場合は拒否する。
pub(crate) fn extract_object_key(path: &str) -> Result<String, GatewayError> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    let key = urlencoding::decode(raw).map_err(|_| GatewayError::InvalidPath)?;

    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        tracing::debug!(path, "不正なパスを拒否");
        return Err(GatewayError::InvalidPath);
    }

    Ok(key.into_owned())
}

/// 302 Found で署名付きURLへリダイレクトする。
fn redirect_to(signed_url: &str) -> Result<Response, GatewayError> {
    let location = HeaderValue::from_str(signed_url)
        .map_err(|e| GatewayError::Internal(format!("Locationヘッダの構築に失敗: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// 上流レスポンスをステータスそのままに中継し、CORS・キャッシュヘッダを付与する。
fn stream_response(upstream: UpstreamResponse) -> Response {
    let UpstreamResponse {
        status,
        content_type,
        content_length,
        content_range,
        body,
    } = upstream;

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        content_type.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_VIDEO_CONTENT_TYPE)),
    );
    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, length);
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(VIDEO_CACHE_CONTROL),
    );
    if let Some(range) = content_range {
        headers.insert(header::CONTENT_RANGE, range);
    }

    response
}
