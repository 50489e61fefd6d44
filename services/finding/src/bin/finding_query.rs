/// Finding APIクエリのローカル実行ツール
///
/// `key=value`形式の生パラメータを検証し、Finding APIのリクエストURLを組み立てる。
/// `--execute`を指定した場合は実際にAPIを呼び出し、デコード結果をJSONで出力する。
///
/// # ローカル実行
/// ```bash
/// # URLの確認のみ（App ID未設定時はプレースホルダーを使用）
/// cargo run --bin finding_query -- --operation findItemsByKeywords keywords=harry+potter
///
/// # 実行
/// export FINDING_APP_ID=your-app-id
/// export FINDING_API_ENDPOINT=https://svcs.sandbox.ebay.com/services/search/FindingService/v1
/// cargo run --bin finding_query -- --operation findItemsAdvanced --execute \
///     categoryId=267 'itemFilter(0).name=MaxPrice' 'itemFilter(0).value=25.0'
/// ```
use clap::Parser;
use finding::application::{FindingQuery, RawParameters, RequestValidator};
use finding::domain::Operation;
use finding::infrastructure::config::DEFAULT_ENDPOINT;
use finding::infrastructure::{AppIdSource, FindingConfig, init_logging};
use finding::lambda_entry::build_handler;
use lambda_http::Error;
use tracing::{error, info};
use url::Url;

/// URL確認時にApp IDの代わりに埋め込む値
const APP_ID_PLACEHOLDER: &str = "YOUR-APP-ID";

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "finding_query")]
#[command(about = "eBay Finding APIリクエストの検証とURL組み立て")]
struct CliArgs {
    /// オペレーション名（findItemsByKeywords, findItemsByCategory, findItemsAdvanced,
    /// findItemsByProduct, findItemsIneBayStores）
    #[arg(long, short = 'o')]
    operation: Operation,

    /// 実際にFinding APIを呼び出す
    #[arg(long, short = 'x')]
    execute: bool,

    /// 検索パラメータ（key=value形式、複数指定可）
    #[arg(value_parser = parse_key_value)]
    params: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("key=value形式ではありません: {raw}"))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let args = CliArgs::parse();
    let params: RawParameters = args.params.into_iter().collect();

    info!(
        operation = %args.operation,
        param_count = params.len(),
        execute = args.execute,
        "コマンドライン引数をパース"
    );

    if args.execute {
        execute(args.operation, &params).await
    } else {
        print_url(args.operation, &params)
    }
}

/// 検証と組み立てのみを行いURLを出力
///
/// SSMパラメータ指定時もSSMにはアクセスせず、プレースホルダーを埋め込む。
fn print_url(operation: Operation, params: &RawParameters) -> Result<(), Error> {
    let request = RequestValidator::new().validate(operation, params).map_err(|e| {
        error!(error = %e, "リクエストの検証に失敗");
        e
    })?;

    let (endpoint, app_id): (Url, String) = match FindingConfig::from_env() {
        Ok(config) => {
            let app_id = match config.app_id() {
                AppIdSource::Direct(app_id) => app_id.clone(),
                AppIdSource::SsmParameter(_) => APP_ID_PLACEHOLDER.to_string(),
            };
            (config.endpoint().clone(), app_id)
        }
        Err(e) => {
            info!(reason = %e, "設定を読み込めないため既定のエンドポイントを使用");
            (DEFAULT_ENDPOINT.parse()?, APP_ID_PLACEHOLDER.to_string())
        }
    };

    let url = FindingQuery::build(&request, &app_id).url(&endpoint);
    println!("{url}");
    Ok(())
}

/// Finding APIを呼び出してデコード結果を出力
async fn execute(operation: Operation, params: &RawParameters) -> Result<(), Error> {
    let config = FindingConfig::from_env()?;
    let handler = build_handler(&config).await?;

    let response = handler.handle(operation, params).await.map_err(|e| {
        error!(error = %e, kind = ?e.kind(), "検索に失敗");
        e
    })?;

    println!("{}", serde_json::to_string_pretty(&response.to_json()?)?);
    Ok(())
}
