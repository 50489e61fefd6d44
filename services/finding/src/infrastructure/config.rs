/// Finding API接続設定
///
/// 環境変数:
/// - FINDING_API_ENDPOINT: Finding APIのエンドポイント（省略時は本番URL）
/// - FINDING_APP_ID: App IDを直接指定（ローカル実行用）
/// - FINDING_APP_ID_PARAMETER: App IDを保持するSSMパラメータ名
/// - FINDING_REQUEST_TIMEOUT_SECS: リクエストタイムアウト秒数（省略時30）
/// - FINDING_CONNECT_TIMEOUT_SECS: 接続タイムアウト秒数（省略時10）
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Finding APIの本番エンドポイント
pub const DEFAULT_ENDPOINT: &str = "https://svcs.ebay.com/services/search/FindingService/v1";

/// デフォルトのリクエストタイムアウト（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// デフォルトの接続タイムアウト（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const ENDPOINT_ENV: &str = "FINDING_API_ENDPOINT";
const APP_ID_ENV: &str = "FINDING_APP_ID";
const APP_ID_PARAMETER_ENV: &str = "FINDING_APP_ID_PARAMETER";
const REQUEST_TIMEOUT_ENV: &str = "FINDING_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_ENV: &str = "FINDING_CONNECT_TIMEOUT_SECS";

/// 設定読み込みのエラー型
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FindingConfigError {
    /// 必須の環境変数が設定されていない
    #[error("必須の環境変数が設定されていません: {0}")]
    MissingEnvVar(String),

    /// 環境変数の値が不正
    #[error("環境変数の値が不正です: {name}={value}")]
    InvalidEnvVar { name: String, value: String },
}

/// App IDの取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppIdSource {
    /// 環境変数で直接指定
    Direct(String),
    /// SSMパラメータ名
    SsmParameter(String),
}

/// Finding API接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingConfig {
    endpoint: Url,
    app_id: AppIdSource,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl FindingConfig {
    /// 明示的な値で設定を作成（タイムアウトはデフォルト値）
    pub fn new(endpoint: Url, app_id: AppIdSource) -> Self {
        Self {
            endpoint,
            app_id,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// 環境変数から設定を読み込む
    ///
    /// FINDING_APP_IDとFINDING_APP_ID_PARAMETERが両方ある場合はFINDING_APP_IDを優先する。
    pub fn from_env() -> Result<Self, FindingConfigError> {
        let endpoint = match std::env::var(ENDPOINT_ENV) {
            Ok(value) => Url::parse(&value).map_err(|_| FindingConfigError::InvalidEnvVar {
                name: ENDPOINT_ENV.to_string(),
                value,
            })?,
            Err(_) => Url::parse(DEFAULT_ENDPOINT).map_err(|_| FindingConfigError::InvalidEnvVar {
                name: ENDPOINT_ENV.to_string(),
                value: DEFAULT_ENDPOINT.to_string(),
            })?,
        };

        let app_id = match (std::env::var(APP_ID_ENV), std::env::var(APP_ID_PARAMETER_ENV)) {
            (Ok(app_id), _) if !app_id.is_empty() => AppIdSource::Direct(app_id),
            (_, Ok(parameter)) if !parameter.is_empty() => AppIdSource::SsmParameter(parameter),
            _ => return Err(FindingConfigError::MissingEnvVar(APP_ID_PARAMETER_ENV.to_string())),
        };

        Ok(Self {
            endpoint,
            app_id,
            request_timeout: timeout_from_env(REQUEST_TIMEOUT_ENV, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_timeout: timeout_from_env(CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        })
    }

    /// タイムアウトを設定
    pub fn with_timeouts(mut self, request_timeout: Duration, connect_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn app_id(&self) -> &AppIdSource {
        &self.app_id
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

/// 秒数の環境変数を読み込む（未設定ならデフォルト値、0は不正）
fn timeout_from_env(name: &str, default_secs: u64) -> Result<Duration, FindingConfigError> {
    let Ok(value) = std::env::var(name) else {
        return Ok(Duration::from_secs(default_secs));
    };
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(FindingConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
    }
}
