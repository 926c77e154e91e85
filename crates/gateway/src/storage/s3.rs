//! # S3互換 メディアストレージ実装
//!
//! Cloudflare R2, AWS S3, MinIO 等のS3互換APIで署名付きURLを発行する。
//! 署名はローカルで計算され、発行時にストレージへの通信は発生しない。

use super::MediaStorage;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// R2が要求するリージョン名
const R2_REGION: &str = "auto";

/// S3互換ストレージによるメディアストレージ実装。
pub struct S3MediaStorage {
    bucket: s3::Bucket,
}

impl S3MediaStorage {
    /// S3互換バケットから構築する。
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// S3互換バケットを初期化する。
    fn init_bucket(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket_name: &str,
    ) -> anyhow::Result<s3::Bucket> {
        let region = s3::Region::Custom {
            region: R2_REGION.to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials = s3::creds::Credentials::new(
            Some(access_key),
            Some(secret_key),
            None,
            None,
            None,
        )?;

        let bucket = s3::Bucket::new(bucket_name, region, credentials)?.with_path_style();

        Ok(*bucket)
    }

    /// Gateway設定から構築する。
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let endpoint = config.endpoint();
        tracing::info!(
            storage_endpoint = %endpoint,
            bucket = %config.bucket_name,
            "S3互換ストレージを設定"
        );

        let bucket = Self::init_bucket(
            &endpoint,
            &config.access_key_id,
            &config.secret_access_key,
            &config.bucket_name,
        )?;

        Ok(Self::new(bucket))
    }
}

#[async_trait::async_trait]
impl MediaStorage for S3MediaStorage {
    async fn presign_get(
        &self,
        object_key: &str,
        expiry_secs: u32,
    ) -> Result<String, GatewayError> {
        self.bucket
            .presign_get(object_key, expiry_secs, None)
            .await
            .map_err(|e| GatewayError::Storage(format!("署名付きダウンロードURL生成失敗: {e}")))
    }
}
