/// オペレーション別Lambdaの共通エントリポイント
///
/// Lambda Function URL / API Gateway経由のGETリクエストのクエリ文字列を
/// 生パラメータとして検索ハンドラーに渡す。
use std::sync::Arc;

use lambda_http::{Body, Error, Request, Response, run, service_fn};
use tracing::info;
use url::form_urlencoded;

use crate::application::{RawParameters, SearchHandler};
use crate::domain::Operation;
use crate::infrastructure::{
    CredentialProvider, FindingConfig, HttpFindingTransport, TracingItemSink, TransportError,
    credential_provider_from_config, init_logging,
};

/// Lambdaで使用する検索ハンドラー
pub type LambdaSearchHandler =
    SearchHandler<Box<dyn CredentialProvider>, HttpFindingTransport, TracingItemSink>;

/// 設定から検索ハンドラーを構築
pub async fn build_handler(config: &FindingConfig) -> Result<LambdaSearchHandler, TransportError> {
    let credentials = credential_provider_from_config(config).await;
    let transport = HttpFindingTransport::new(config)?;
    Ok(SearchHandler::new(
        credentials,
        transport,
        TracingItemSink,
        config.endpoint().clone(),
    ))
}

/// リクエストのクエリ文字列を生パラメータに変換
///
/// 同じキーが複数回現れた場合は最後の値を使う。
pub fn raw_parameters(request: &Request) -> RawParameters {
    let query = request.uri().query().unwrap_or_default();
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

/// 指定オペレーションのLambda関数を実行
///
/// ハンドラーはコールドスタート時に一度だけ構築し、warm start時は再利用する。
pub async fn run_operation(operation: Operation) -> Result<(), Error> {
    init_logging();

    info!(operation = %operation, "Lambda関数を初期化");

    let config = FindingConfig::from_env()?;
    let handler = Arc::new(build_handler(&config).await?);

    run(service_fn(move |request: Request| {
        let handler = Arc::clone(&handler);
        async move {
            let params = raw_parameters(&request);
            info!(operation = %operation, param_count = params.len(), "検索リクエスト受信");
            Ok::<Response<Body>, Error>(handler.respond(operation, &params).await)
        }
    }))
    .await
}
