// デコード済みアイテムの出力先
//
// 永続化先はItemSinkの実装で差し替える。
// 既定の実装は構造化ログへの出力。

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::domain::{FindingError, Operation, SearchItem};

/// アイテム出力のエラー型
#[derive(Debug, Error)]
pub enum ItemSinkError {
    /// 書き込み失敗
    #[error("アイテムの書き込みに失敗: {0}")]
    WriteFailed(String),
}

impl From<ItemSinkError> for FindingError {
    fn from(err: ItemSinkError) -> Self {
        FindingError::Persistence(err.to_string())
    }
}

/// アイテム出力トレイト
#[async_trait]
pub trait ItemSink: Send + Sync {
    /// 1回の検索で得られたアイテムを書き込む（0件の場合も呼ばれる）
    async fn store(&self, operation: Operation, items: &[&SearchItem]) -> Result<(), ItemSinkError>;
}

/// アイテムを構造化ログとして出力する実装
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingItemSink;

#[async_trait]
impl ItemSink for TracingItemSink {
    async fn store(&self, operation: Operation, items: &[&SearchItem]) -> Result<(), ItemSinkError> {
        for item in items {
            info!(
                operation = %operation,
                item_id = item.item_id.first().map(String::as_str).unwrap_or_default(),
                title = item.title.first().map(String::as_str).unwrap_or_default(),
                "検索結果アイテム"
            );
        }
        Ok(())
    }
}
