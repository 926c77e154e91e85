//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 設定は起動時に一度だけ構築され、以後は変更されない。

use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::storage::{MediaStorage, PresignRetry};
use crate::upstream::UpstreamFetcher;

/// 待ち受けアドレスの既定値
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8787";

/// リトライ基準待機時間の既定値（ミリ秒）
const DEFAULT_RETRY_BASE_MS: u64 = 100;

/// Gateway設定。
pub struct GatewayConfig {
    /// 許可するRefererの接頭辞
    pub allowed_referer: String,
    /// ストレージのアカウントID（R2エンドポイントの導出に使用）
    pub account_id: Option<String>,
    /// ストレージのアクセスキーID
    pub access_key_id: String,
    /// ストレージのシークレットアクセスキー
    pub secret_access_key: String,
    /// バケット名
    pub bucket_name: String,
    /// エンドポイントの上書き（MinIO等のローカル開発用）
    pub storage_endpoint: Option<String>,
    /// 待ち受けアドレス
    pub listen_addr: String,
    /// 署名付きURL発行のリトライ方針
    pub presign_retry: PresignRetry,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("allowed_referer", &self.allowed_referer)
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("listen_addr", &self.listen_addr)
            .field("presign_retry", &self.presign_retry)
            .finish()
    }
}

impl GatewayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から構築する。空文字列の値は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &str| {
            get(name).with_context(|| format!("環境変数 {name} が未設定です"))
        };

        let allowed_referer = require("ALLOWED_REFERER")?;
        let access_key_id = require("ACCESS_KEY_ID")?;
        let secret_access_key = require("SECRET_ACCESS_KEY")?;
        let bucket_name = require("BUCKET_NAME")?;
        let account_id = get("ACCOUNT_ID");
        let storage_endpoint = get("STORAGE_ENDPOINT");

        if account_id.is_none() && storage_endpoint.is_none() {
            bail!("ACCOUNT_ID または STORAGE_ENDPOINT のいずれかを設定してください");
        }

        let listen_addr = get("GATEWAY_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let max_retries = get("PRESIGN_MAX_RETRIES")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("PRESIGN_MAX_RETRIES は0以上の整数である必要があります")?
            .unwrap_or(0);
        let base_delay_ms = get("PRESIGN_RETRY_BASE_MS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("PRESIGN_RETRY_BASE_MS は0以上の整数である必要があります")?
            .unwrap_or(DEFAULT_RETRY_BASE_MS);

        Ok(Self {
            allowed_referer,
            account_id,
            access_key_id,
            secret_access_key,
            bucket_name,
            storage_endpoint,
            listen_addr,
            presign_retry: PresignRetry {
                max_retries,
                base_delay: Duration::from_millis(base_delay_ms),
            },
        })
    }

    /// S3互換APIのエンドポイント。
    ///
    /// 上書き指定がなければアカウントIDからCloudflare R2のエンドポイントを導出する。
    pub fn endpoint(&self) -> String {
        match (&self.storage_endpoint, &self.account_id) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(account_id)) => format!("https://{account_id}.r2.cloudflarestorage.com"),
            // from_lookupでどちらか一方の設定を保証している
            (None, None) => String::new(),
        }
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// 起動時に確定した設定
    pub config: GatewayConfig,
    /// 署名付きURLの発行元（S3互換ストレージ等、トレイトで抽象化）
    pub storage: Box<dyn MediaStorage>,
    /// 動画中継時の上流取得
    pub upstream: Box<dyn UpstreamFetcher>,
}
