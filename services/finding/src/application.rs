// アプリケーション層モジュール
pub mod param_parser;
pub mod query_builder;
pub mod request_validator;
pub mod search_handler;

// 再エクスポート
pub use param_parser::{FilterSyntax, RawParameters};
pub use query_builder::FindingQuery;
pub use request_validator::RequestValidator;
pub use search_handler::SearchHandler;
