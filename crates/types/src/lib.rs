//! # Media Gateway 共有型定義
//!
//! Gatewayとポートフォリオサイトの双方が参照する定義を提供する。
//!
//! - 配信を許可する拡張子の一覧と、オブジェクトキーから配信方式への分類
//! - 相対ファイル名からCDN上のアセットURLを組み立てるヘルパー
//!
//! ネットワークI/Oは一切行わない。

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// メディア分類
// ---------------------------------------------------------------------------

/// 配信対象メディアの種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// 画像（jpg, png 等）
    Image,
    /// ドキュメント（pdf）
    Document,
    /// 動画（mp4, mov）
    Video,
}

/// Gatewayがクライアントにバイト列を届ける方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// 署名付きURLへの302リダイレクト
    Redirect,
    /// Gateway自身が上流を取得してストリーミング中継する
    Stream,
}

impl MediaKind {
    /// 種別ごとの配信方式。
    ///
    /// 動画はRangeリクエストの中継とCORS/キャッシュヘッダ付与のためにストリーミングする。
    pub const fn delivery_mode(self) -> DeliveryMode {
        match self {
            MediaKind::Video => DeliveryMode::Stream,
            MediaKind::Image | MediaKind::Document => DeliveryMode::Redirect,
        }
    }
}

/// 配信を許可する拡張子と、その種別。
///
/// 照合は大文字小文字を区別する接尾辞一致。
pub const ALLOWED_EXTENSIONS: &[(&str, MediaKind)] = &[
    (".jpg", MediaKind::Image),
    (".jpeg", MediaKind::Image),
    (".png", MediaKind::Image),
    (".gif", MediaKind::Image),
    (".webp", MediaKind::Image),
    (".pdf", MediaKind::Document),
    (".mp4", MediaKind::Video),
    (".mov", MediaKind::Video),
];

/// 上流がContent-Typeを返さなかった場合の動画MIMEタイプ
pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// オブジェクトキーの拡張子から種別を判定する。許可一覧にない場合は `None`。
pub fn classify(key: &str) -> Option<MediaKind> {
    ALLOWED_EXTENSIONS
        .iter()
        .find(|(ext, _)| key.ends_with(ext))
        .map(|(_, kind)| *kind)
}

/// オブジェクトキーから配信方式を決定する。
pub fn delivery_mode(key: &str) -> Option<DeliveryMode> {
    classify(key).map(MediaKind::delivery_mode)
}

// ---------------------------------------------------------------------------
// アセットURL
// ---------------------------------------------------------------------------

/// アセットURL構築エラー。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetUrlError {
    /// フォルダが空
    #[error("folder is required")]
    MissingFolder,
    /// ファイル名が空
    #[error("filename is required")]
    MissingFilename,
}

/// CDN上のアセット配置設定。
///
/// ベースURLを差し替えるだけで全アセットの配信元を移行できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// GatewayのベースURL（末尾スラッシュなし）
    pub base_url: String,
    /// プロジェクトアセットのルートフォルダ
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,
    /// ヒーロー動画のフォルダ
    #[serde(default = "default_hero_dir")]
    pub hero_dir: String,
}

fn default_projects_dir() -> String {
    "projects".to_string()
}

fn default_hero_dir() -> String {
    "hero".to_string()
}

impl AssetConfig {
    /// ベースURLから設定を構築する。末尾のスラッシュは取り除く。
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            projects_dir: default_projects_dir(),
            hero_dir: default_hero_dir(),
        }
    }

    /// フォルダとファイル名から完全なアセットURLを組み立てる。
    ///
    /// `http://` / `https://` で始まるファイル名は外部URLとしてそのまま返す。
    pub fn asset_url(&self, folder: &str, filename: &str) -> Result<String, AssetUrlError> {
        if folder.is_empty() {
            return Err(AssetUrlError::MissingFolder);
        }
        if filename.is_empty() {
            return Err(AssetUrlError::MissingFilename);
        }

        if filename.starts_with("http://") || filename.starts_with("https://") {
            return Ok(filename.to_string());
        }

        Ok(format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            folder,
            filename
        ))
    }

    /// プロジェクトフォルダ配下のアセットURL。
    pub fn project_asset_url(
        &self,
        project_folder: &str,
        filename: &str,
    ) -> Result<String, AssetUrlError> {
        if project_folder.is_empty() {
            return Err(AssetUrlError::MissingFolder);
        }
        self.asset_url(&format!("{}/{}", self.projects_dir, project_folder), filename)
    }

    /// ヒーロー動画のアセットURL。
    pub fn hero_asset_url(&self, filename: &str) -> Result<String, AssetUrlError> {
        self.asset_url(&self.hero_dir, filename)
    }
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
