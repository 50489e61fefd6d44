/// 製品ID検索 Lambda関数
///
/// クエリ文字列の生パラメータを検証し、findItemsByProduct としてFinding APIを呼び出す。
///
/// # 環境変数
/// - FINDING_APP_ID: App IDの直接指定（ローカル/テスト用）
/// - FINDING_APP_ID_PARAMETER: App IDを格納したSSMパラメータ名（FINDING_APP_ID未設定時は必須）
/// - FINDING_API_ENDPOINT: Finding APIのエンドポイント（省略時は本番URL）
use finding::domain::Operation;
use lambda_http::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    finding::run_operation(Operation::FindItemsByProduct).await
}
