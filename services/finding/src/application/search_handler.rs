/// 検索ハンドラー
///
/// 検証 -> App ID取得 -> クエリ組み立て -> 送信 -> デコード -> アイテム出力
/// の順に処理し、結果をJSONのHTTPレスポンスに変換する。
use lambda_http::http::StatusCode;
use lambda_http::http::header::{CONTENT_TYPE, HeaderValue};
use lambda_http::{Body, Response};
use tracing::{error, info, warn};
use url::Url;

use crate::application::{FindingQuery, RawParameters, RequestValidator};
use crate::domain::{FindingError, Operation, SearchResponse};
use crate::infrastructure::{CredentialProvider, FindingTransport, ItemSink};

/// Finding API検索ハンドラー
pub struct SearchHandler<C, T, S>
where
    C: CredentialProvider,
    T: FindingTransport,
    S: ItemSink,
{
    /// App ID取得
    credentials: C,
    /// HTTP送信
    transport: T,
    /// アイテム出力先
    sink: S,
    /// Finding APIエンドポイント
    endpoint: Url,
}

impl<C, T, S> SearchHandler<C, T, S>
where
    C: CredentialProvider,
    T: FindingTransport,
    S: ItemSink,
{
    pub fn new(credentials: C, transport: T, sink: S, endpoint: Url) -> Self {
        Self {
            credentials,
            transport,
            sink,
            endpoint,
        }
    }

    /// 検索を実行
    ///
    /// 検証エラーはネットワーク通信の前に返る。
    /// 0件の結果や上流のerrorMessageはエラーではなく、デコード結果として返す。
    pub async fn handle(
        &self,
        operation: Operation,
        params: &RawParameters,
    ) -> Result<SearchResponse, FindingError> {
        let request = RequestValidator::new().validate(operation, params)?;

        let app_id = self.credentials.app_id().await?;
        let query = FindingQuery::build(&request, &app_id);

        let body = self.transport.get(&query.url(&self.endpoint)).await?;
        let response = SearchResponse::decode(operation, &body)?;

        if response.has_upstream_errors() {
            for upstream in response.upstream_errors() {
                warn!(
                    operation = %operation,
                    error_id = upstream.error_id.first().map(String::as_str).unwrap_or_default(),
                    message = upstream.message.first().map(String::as_str).unwrap_or_default(),
                    "Finding APIがエラーを返却"
                );
            }
        }

        let items = response.items();
        self.sink.store(operation, &items).await?;

        info!(operation = %operation, item_count = items.len(), "検索完了");
        Ok(response)
    }

    /// 検索を実行してHTTPレスポンスに変換
    ///
    /// - 成功: 200 + デコード済みJSON
    /// - 検証エラー: 400 + `{"error", "message"}`
    /// - その他: 500 + `{"error", "message"}`
    pub async fn respond(&self, operation: Operation, params: &RawParameters) -> Response<Body> {
        let result = self
            .handle(operation, params)
            .await
            .and_then(|response| response.to_json());

        match result {
            Ok(json) => json_response(StatusCode::OK, json.to_string()),
            Err(err) => error_response(operation, &err),
        }
    }
}

fn error_response(operation: Operation, err: &FindingError) -> Response<Body> {
    let kind = err.kind();
    if kind.is_validation() {
        warn!(operation = %operation, error_kind = %kind, error = %err, "リクエスト検証エラー");
    } else {
        error!(operation = %operation, error_kind = %kind, error = %err, "検索処理エラー");
    }

    let body = serde_json::to_string(&err.to_body()).unwrap_or_default();
    json_response(err.status_code(), body)
}

fn json_response(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::Text(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
