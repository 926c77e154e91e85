//! # メディアストレージ
//!
//! 非公開バケット上のオブジェクトに対する、期限付き読み取りURLの発行元を抽象化する。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

pub mod s3;

pub use s3::S3MediaStorage;

use std::time::Duration;

use rand::Rng;

use crate::error::GatewayError;

/// 署名付きURLの有効期限（秒）
pub const PRESIGN_EXPIRY_SECS: u32 = 300;

/// 署名付きURL発行元の抽象インターフェース。
///
/// S3互換ストレージ（Cloudflare R2, AWS S3, MinIO等）や
/// テスト用のモックを実装として差し替えられる。
#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// `object_key` を読み取るための署名付きURL（GET）を生成する。
    async fn presign_get(&self, object_key: &str, expiry_secs: u32)
        -> Result<String, GatewayError>;
}

/// 署名付きURL発行のリトライ方針。
///
/// `max_retries` が0の場合は一度だけ試行する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRetry {
    /// 初回以降の追加試行回数
    pub max_retries: u32,
    /// 指数バックオフの基準待機時間
    pub base_delay: Duration,
}

impl Default for PresignRetry {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl PresignRetry {
    /// `attempt` 回目の失敗後の待機時間（指数バックオフ + ジッター）。
    fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let backoff_ms = base_ms.saturating_mul(1u64 << attempt.min(16));
        let jitter_ms = if base_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=base_ms)
        };
        Duration::from_millis(backoff_ms.saturating_add(jitter_ms))
    }
}

/// リトライ方針に従って署名付きURLを発行する。
pub async fn presign_with_retry(
    storage: &dyn MediaStorage,
    object_key: &str,
    expiry_secs: u32,
    policy: &PresignRetry,
) -> Result<String, GatewayError> {
    let mut attempt = 0;
    loop {
        match storage.presign_get(object_key, expiry_secs).await {
            Ok(url) => return Ok(url),
            Err(e) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    object_key,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "署名付きURL発行に失敗、再試行します"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
