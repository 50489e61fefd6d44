/// Finding APIリクエスト処理のエラー分類
///
/// すべての失敗は`FindingError`のいずれかのバリアントで表現され、
/// `ErrorKind`を経由してHTTPステータス（400/500）に対応付けられる。
use lambda_http::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item_filter::ItemFilterName;

/// エラー種別
///
/// 呼び出し側はメッセージ文字列ではなくこの種別で分岐する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// keywords / categoryId / productId などの必須パラメータが欠落
    MissingRequiredField,
    /// 番号付き構文と番号なし構文が混在
    InvalidFilterSyntax,
    /// 値のないフィルター名、またはparamName/paramValueの片方のみ指定
    IncompleteFilter,
    /// 未知のフィルター名・商品ID種別
    UnsupportedFilterType,
    /// 列挙値の範囲外
    InvalidEnumValue,
    /// 数値・長さ・日時の範囲外
    InvalidRange,
    /// 複数フィールドにまたがる制約違反
    InvalidCrossFieldConstraint,
    /// 商品IDのチェックサム不一致
    InvalidChecksum,
    /// 認証情報（App ID）の取得失敗
    CredentialRetrievalFailure,
    /// HTTP通信の失敗
    TransportFailure,
    /// 上流APIが2xx以外を返却
    UpstreamStatusError,
    /// レスポンスJSONのデコード失敗
    DecodeFailure,
    /// デコード済みアイテムの保存失敗
    PersistenceFailure,
}

impl ErrorKind {
    /// 種別名（レスポンスボディの`error`フィールドに使用）
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "MissingRequiredField",
            ErrorKind::InvalidFilterSyntax => "InvalidFilterSyntax",
            ErrorKind::IncompleteFilter => "IncompleteFilter",
            ErrorKind::UnsupportedFilterType => "UnsupportedFilterType",
            ErrorKind::InvalidEnumValue => "InvalidEnumValue",
            ErrorKind::InvalidRange => "InvalidRange",
            ErrorKind::InvalidCrossFieldConstraint => "InvalidCrossFieldConstraint",
            ErrorKind::InvalidChecksum => "InvalidChecksum",
            ErrorKind::CredentialRetrievalFailure => "CredentialRetrievalFailure",
            ErrorKind::TransportFailure => "TransportFailure",
            ErrorKind::UpstreamStatusError => "UpstreamStatusError",
            ErrorKind::DecodeFailure => "DecodeFailure",
            ErrorKind::PersistenceFailure => "PersistenceFailure",
        }
    }

    /// ネットワーク呼び出し前に検出される検証エラーかどうか
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ErrorKind::CredentialRetrievalFailure
                | ErrorKind::TransportFailure
                | ErrorKind::UpstreamStatusError
                | ErrorKind::DecodeFailure
                | ErrorKind::PersistenceFailure
        )
    }

    /// HTTPステータスコード
    ///
    /// - 検証エラー: 400 Bad Request
    /// - それ以外: 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding APIリクエスト処理エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FindingError {
    // ==================== MissingRequiredField ====================
    #[error("{0} parameter is missing")]
    MissingParameter(&'static str),

    #[error("both categoryId and keywords parameters are missing")]
    CategoryIdAndKeywordsMissing,

    #[error("at least one of storeName, categoryId or keywords must be specified")]
    StoreNameCategoryIdAndKeywordsMissing,

    // ==================== InvalidFilterSyntax ====================
    #[error("invalid filter syntax: both numbered and non-numbered syntax specified for {0}")]
    InvalidFilterSyntax(String),

    // ==================== IncompleteFilter ====================
    #[error("incomplete filter: missing {0}")]
    IncompleteFilter(String),

    #[error("incomplete item filter: paramName and paramValue must be specified together")]
    IncompleteFilterParam,

    #[error("affiliate networkId and trackingId must be specified together")]
    NetworkIdOrTrackingIdMissing,

    // ==================== UnsupportedFilterType ====================
    #[error("unsupported item filter type: {0}")]
    UnsupportedItemFilterType(String),

    #[error("unsupported product ID type: {0}")]
    UnsupportedProductIdType(String),

    // ==================== InvalidEnumValue ====================
    #[error("invalid {name} value {value:?}: must be true or false")]
    InvalidBooleanValue { name: String, value: String },

    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    #[error("invalid currency ID: {0}")]
    InvalidCurrencyId(String),

    #[error("invalid global ID: {0}")]
    InvalidGlobalId(String),

    #[error("invalid listing type: {0}")]
    InvalidListingType(String),

    #[error("'All' listing type cannot be combined with other listing types")]
    InvalidAllListingType,

    #[error("duplicate listing type: {0}")]
    DuplicateListingType(String),

    #[error("'Auction' and 'AuctionWithBIN' listing types cannot be combined")]
    InvalidAuctionListingTypes,

    #[error("invalid expedited shipping type: {0}")]
    InvalidExpeditedShippingType(String),

    #[error("invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("invalid seller business type: {0}")]
    InvalidSellerBusinessType(String),

    #[error("invalid value box inventory: {0}")]
    InvalidValueBoxInventory(String),

    #[error("invalid output selector: {0}")]
    InvalidOutputSelector(String),

    #[error("invalid sort order: {0}")]
    InvalidSortOrder(String),

    // ==================== InvalidRange ====================
    #[error("invalid {name} value {value:?}: must be an integer")]
    InvalidInteger { name: String, value: String },

    #[error("invalid {name} value {value}: must be greater than or equal to {min}")]
    IntegerBelowMinimum { name: String, value: i64, min: i64 },

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid {name} date time {value:?}: must be RFC3339 in UTC")]
    InvalidDateTime { name: String, value: String },

    #[error("invalid {name} date time {value}: must be in the future")]
    DateTimeNotInFuture { name: String, value: String },

    #[error("invalid {name} date time {value}: must be in the past")]
    DateTimeNotInPast { name: String, value: String },

    #[error("maximum {name} values to specify is {max}")]
    TooManyValues { name: String, max: usize },

    #[error("invalid keywords length {0}: must be between 2 and 350 characters")]
    InvalidKeywordsLength(usize),

    #[error("invalid keyword {0:?}: must be no more than 98 characters")]
    InvalidKeywordLength(String),

    #[error("maximum category IDs to specify is 3")]
    MaxCategoryIds,

    #[error("invalid category ID {0:?}: must be 1 to 10 digits")]
    InvalidCategoryId(String),

    #[error("invalid buyerPostalCode {0:?}: must be at least 3 characters")]
    InvalidPostalCode(String),

    #[error("invalid paginationInput.entriesPerPage {0:?}: must be between 1 and 100")]
    InvalidEntriesPerPage(String),

    #[error("invalid paginationInput.pageNumber {0:?}: must be between 1 and 100")]
    InvalidPageNumber(String),

    #[error("invalid affiliate.customId length {0}: must be no more than 256 characters")]
    InvalidCustomIdLength(usize),

    #[error("invalid affiliate.networkId {0:?}: must be between 2 and 9")]
    InvalidNetworkId(String),

    #[error("invalid productId length {0}: must not be empty")]
    InvalidReferenceIdLength(usize),

    #[error("invalid ISBN length {0}: must be 10 or 13 characters")]
    InvalidIsbnLength(usize),

    #[error("invalid UPC length {0}: must be 12 characters")]
    InvalidUpcLength(usize),

    #[error("invalid EAN length {0}: must be 8 or 13 characters")]
    InvalidEanLength(usize),

    // ==================== InvalidCrossFieldConstraint ====================
    #[error("{max} must be greater than or equal to {min}")]
    InvalidNumericFilter {
        max: ItemFilterName,
        min: ItemFilterName,
    },

    #[error("maximum price must be greater than or equal to minimum price")]
    InvalidMaxPrice,

    #[error("invalid price paramName {0:?}: must be Currency")]
    InvalidPriceParamName(String),

    #[error("{first} item filter cannot be used together with {second}")]
    ExclusiveFilters {
        first: ItemFilterName,
        second: ItemFilterName,
    },

    #[error("duplicate item filter: {0}")]
    DuplicateItemFilter(ItemFilterName),

    #[error("{0} requires buyerPostalCode")]
    BuyerPostalCodeMissing(String),

    #[error("LocalSearchOnly item filter requires MaxDistance item filter")]
    MaxDistanceMissing,

    #[error("sortOrder {0} requires Auction listing type")]
    AuctionListingMissing(String),

    #[error("invalid affiliate.trackingId {0:?}: campaign ID must be 10 digits for networkId 9")]
    InvalidCampaignId(String),

    // ==================== InvalidChecksum ====================
    #[error("invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("invalid UPC: {0}")]
    InvalidUpc(String),

    #[error("invalid EAN: {0}")]
    InvalidEan(String),

    // ==================== 通信・デコード ====================
    #[error("failed to retrieve API credential: {0}")]
    CredentialRetrieval(String),

    #[error("failed to perform Finding API request: {0}")]
    Transport(String),

    #[error("Finding API request failed with status code {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("failed to decode Finding API response body: {0}")]
    Decode(String),

    #[error("failed to persist items: {0}")]
    Persistence(String),
}

impl FindingError {
    /// エラー種別を判定
    pub fn kind(&self) -> ErrorKind {
        use FindingError::*;
        match self {
            MissingParameter(_)
            | CategoryIdAndKeywordsMissing
            | StoreNameCategoryIdAndKeywordsMissing => ErrorKind::MissingRequiredField,

            InvalidFilterSyntax(_) => ErrorKind::InvalidFilterSyntax,

            IncompleteFilter(_) | IncompleteFilterParam | NetworkIdOrTrackingIdMissing => {
                ErrorKind::IncompleteFilter
            }

            UnsupportedItemFilterType(_) | UnsupportedProductIdType(_) => {
                ErrorKind::UnsupportedFilterType
            }

            InvalidBooleanValue { .. }
            | InvalidCountryCode(_)
            | InvalidCondition(_)
            | InvalidCurrencyId(_)
            | InvalidGlobalId(_)
            | InvalidListingType(_)
            | InvalidAllListingType
            | DuplicateListingType(_)
            | InvalidAuctionListingTypes
            | InvalidExpeditedShippingType(_)
            | InvalidPaymentMethod(_)
            | InvalidSellerBusinessType(_)
            | InvalidValueBoxInventory(_)
            | InvalidOutputSelector(_)
            | InvalidSortOrder(_) => ErrorKind::InvalidEnumValue,

            InvalidInteger { .. }
            | IntegerBelowMinimum { .. }
            | InvalidPrice(_)
            | InvalidDateTime { .. }
            | DateTimeNotInFuture { .. }
            | DateTimeNotInPast { .. }
            | TooManyValues { .. }
            | InvalidKeywordsLength(_)
            | InvalidKeywordLength(_)
            | MaxCategoryIds
            | InvalidCategoryId(_)
            | InvalidPostalCode(_)
            | InvalidEntriesPerPage(_)
            | InvalidPageNumber(_)
            | InvalidCustomIdLength(_)
            | InvalidNetworkId(_)
            | InvalidReferenceIdLength(_)
            | InvalidIsbnLength(_)
            | InvalidUpcLength(_)
            | InvalidEanLength(_) => ErrorKind::InvalidRange,

            InvalidNumericFilter { .. }
            | InvalidMaxPrice
            | InvalidPriceParamName(_)
            | ExclusiveFilters { .. }
            | DuplicateItemFilter(_)
            | BuyerPostalCodeMissing(_)
            | MaxDistanceMissing
            | AuctionListingMissing(_)
            | InvalidCampaignId(_) => ErrorKind::InvalidCrossFieldConstraint,

            InvalidIsbn(_) | InvalidUpc(_) | InvalidEan(_) => ErrorKind::InvalidChecksum,

            CredentialRetrieval(_) => ErrorKind::CredentialRetrievalFailure,
            Transport(_) => ErrorKind::TransportFailure,
            UpstreamStatus { .. } => ErrorKind::UpstreamStatusError,
            Decode(_) => ErrorKind::DecodeFailure,
            Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }

    /// HTTPステータスコード
    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// APIレスポンス用のエラーボディに変換
    pub fn to_body(&self) -> ApiErrorBody {
        ApiErrorBody {
            error: self.kind().as_str().to_string(),
            message: self.to_string(),
        }
    }
}

/// APIエラーレスポンスのボディ
///
/// JSON形式で`error`（エラー種別）と`message`（詳細メッセージ）を含む。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// エラー種別（例: "InvalidEnumValue", "TransportFailure"）
    pub error: String,
    /// 詳細なエラーメッセージ
    pub message: String,
}
