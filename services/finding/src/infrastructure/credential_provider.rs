//! App ID（SECURITY-APPNAME）取得モジュール
//!
//! - SSM Parameter Storeから暗号化パラメータを復号して取得
//! - 環境変数で直接指定された値をそのまま返却

use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::config::{AppIdSource, FindingConfig};
use crate::domain::FindingError;

/// App ID取得のエラー型
#[derive(Debug, Error)]
pub enum CredentialError {
    /// AWS SDK エラー
    #[error("AWS SSM APIエラー: {0}")]
    AwsSdkError(String),
    /// パラメータに値がない
    #[error("SSMパラメータに値がありません: {0}")]
    EmptyParameter(String),
}

impl From<CredentialError> for FindingError {
    fn from(err: CredentialError) -> Self {
        FindingError::CredentialRetrieval(err.to_string())
    }
}

/// App ID取得トレイト（テスト用の抽象化）
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Finding APIのApp IDを取得する
    async fn app_id(&self) -> Result<String, CredentialError>;
}

#[async_trait]
impl<T: CredentialProvider + ?Sized> CredentialProvider for Box<T> {
    async fn app_id(&self) -> Result<String, CredentialError> {
        (**self).app_id().await
    }
}

/// SSM Parameter StoreからApp IDを取得する実装
///
/// 取得した値はインスタンスに保持し、Lambdaのwarm start時は再取得しない。
pub struct SsmCredentialProvider {
    client: SsmClient,
    parameter_name: String,
    cached: OnceCell<String>,
}

impl SsmCredentialProvider {
    pub fn new(client: SsmClient, parameter_name: impl Into<String>) -> Self {
        Self {
            client,
            parameter_name: parameter_name.into(),
            cached: OnceCell::new(),
        }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_parameter_name(parameter_name: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(SsmClient::new(&config), parameter_name)
    }

    async fn fetch(&self) -> Result<String, CredentialError> {
        info!(parameter_name = %self.parameter_name, "SSMからApp IDを取得");

        let response = self
            .client
            .get_parameter()
            .name(&self.parameter_name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| CredentialError::AwsSdkError(e.to_string()))?;

        response
            .parameter()
            .and_then(|p| p.value())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| CredentialError::EmptyParameter(self.parameter_name.clone()))
    }
}

#[async_trait]
impl CredentialProvider for SsmCredentialProvider {
    async fn app_id(&self) -> Result<String, CredentialError> {
        let value = self.cached.get_or_try_init(|| self.fetch()).await?;
        debug!(parameter_name = %self.parameter_name, "App IDを取得");
        Ok(value.clone())
    }
}

impl std::fmt::Debug for SsmCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmCredentialProvider")
            .field("parameter_name", &self.parameter_name)
            .finish_non_exhaustive()
    }
}

/// 固定値のApp IDを返す実装
pub struct StaticCredentialProvider {
    app_id: String,
}

impl StaticCredentialProvider {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn app_id(&self) -> Result<String, CredentialError> {
        Ok(self.app_id.clone())
    }
}

/// 設定に応じたCredentialProviderを作成
pub async fn credential_provider_from_config(config: &FindingConfig) -> Box<dyn CredentialProvider> {
    match config.app_id() {
        AppIdSource::Direct(app_id) => Box::new(StaticCredentialProvider::new(app_id.clone())),
        AppIdSource::SsmParameter(name) => {
            Box::new(SsmCredentialProvider::from_parameter_name(name.clone()).await)
        }
    }
}
