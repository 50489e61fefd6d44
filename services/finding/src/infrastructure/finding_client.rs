// Finding API HTTPクライアント
//
// 組み立て済みのクエリURLにGETリクエストを送信し、レスポンスボディを返す。
// 再試行は行わない（呼び出し元の責務）。

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use super::config::FindingConfig;
use crate::domain::FindingError;

/// Finding API通信のエラー型
///
/// # エラー種別
/// - `HttpError`: 2xx以外のステータスコード
/// - `NetworkError`: 接続・タイムアウト・ボディ読み込みのエラー
/// - `ClientBuildError`: HTTPクライアントの構築失敗
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTPエラー（ステータスコード付き）
    #[error("HTTPエラー: status={status}")]
    HttpError {
        /// HTTPステータスコード
        status: u16,
        /// レスポンスボディ
        body: String,
    },

    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    NetworkError(String),

    /// クライアント構築エラー
    #[error("HTTPクライアントの構築に失敗: {0}")]
    ClientBuildError(String),
}

impl From<TransportError> for FindingError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::HttpError { status, body } => FindingError::UpstreamStatus { status, body },
            other => FindingError::Transport(other.to_string()),
        }
    }
}

/// Finding API送信トレイト（テスト用の抽象化）
#[async_trait]
pub trait FindingTransport: Send + Sync {
    /// クエリ付きURLにGETリクエストを送信し、2xxの場合のみボディを返す
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}

/// reqwestを使用したFinding API送信実装
#[derive(Clone)]
pub struct HttpFindingTransport {
    client: Client,
}

impl std::fmt::Debug for HttpFindingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFindingTransport").finish_non_exhaustive()
    }
}

impl HttpFindingTransport {
    /// 設定のタイムアウトでクライアントを作成
    pub fn new(config: &FindingConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::ClientBuildError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FindingTransport for HttpFindingTransport {
    // URLにはApp IDが含まれるためログに出さない
    #[instrument(skip_all, fields(host = url.host_str().unwrap_or_default()))]
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            error!(error = %e, "Finding APIリクエスト失敗");
            TransportError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, "レスポンスボディの読み込みに失敗");
            TransportError::NetworkError(e.to_string())
        })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!(status = %status, body = %body, "Finding APIエラーレスポンス");
            return Err(TransportError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = %status, bytes = body.len(), "Finding APIレスポンス受信");
        Ok(body.to_vec())
    }
}
