//! # Referer認証
//!
//! リクエストの `Referer` ヘッダが許可された接頭辞で始まるかを判定する。
//! ブラウザ以外のクライアントは任意のRefererを送れるため、これは埋め込み元の
//! 制限であって強い認証ではない。

use axum::http::{header, HeaderMap};

/// ローカル開発用に常に許可するReferer接頭辞
pub(crate) const DEV_REFERER_PREFIXES: &[&str] = &["http://localhost:", "http://127.0.0.1:"];

/// リクエストヘッダからRefererを取り出す。未設定または文字列化できない場合は空文字列。
pub(crate) fn referer(headers: &HeaderMap) -> &str {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Refererが許可されているかを判定する。
pub(crate) fn is_allowed_referer(referer: &str, allowed_prefix: &str) -> bool {
    referer.starts_with(allowed_prefix)
        || DEV_REFERER_PREFIXES
            .iter()
            .any(|prefix| referer.starts_with(prefix))
}
