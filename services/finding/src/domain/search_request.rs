/// 検証済み検索リクエストのモデル
///
/// 5種類のFinding APIオペレーションに対応する判別共用体と、
/// 各オペレーション共通のパラメータ群を定義する。
use std::str::FromStr;

use super::item_filter::{AspectFilter, ItemFilter};
use super::product_id::ProductId;
use super::FindingError;

/// Finding APIオペレーション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FindItemsByKeywords,
    FindItemsByCategory,
    FindItemsAdvanced,
    FindItemsByProduct,
    FindItemsInEbayStores,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::FindItemsByKeywords,
        Operation::FindItemsByCategory,
        Operation::FindItemsAdvanced,
        Operation::FindItemsByProduct,
        Operation::FindItemsInEbayStores,
    ];

    /// OPERATION-NAMEの値
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FindItemsByKeywords => "findItemsByKeywords",
            Operation::FindItemsByCategory => "findItemsByCategory",
            Operation::FindItemsAdvanced => "findItemsAdvanced",
            Operation::FindItemsByProduct => "findItemsByProduct",
            Operation::FindItemsInEbayStores => "findItemsIneBayStores",
        }
    }

    /// レスポンスJSONのトップレベルキー
    pub fn response_key(&self) -> &'static str {
        match self {
            Operation::FindItemsByKeywords => "findItemsByKeywordsResponse",
            Operation::FindItemsByCategory => "findItemsByCategoryResponse",
            Operation::FindItemsAdvanced => "findItemsAdvancedResponse",
            Operation::FindItemsByProduct => "findItemsByProductResponse",
            Operation::FindItemsInEbayStores => "findItemsIneBayStoresResponse",
        }
    }

    /// aspectFilterを受け付けるか
    pub fn accepts_aspect_filters(&self) -> bool {
        !matches!(self, Operation::FindItemsByProduct)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident { $($variant:ident),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }
        }

        impl FromStr for $name {
            type Err = FindingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)*
                    other => Err(FindingError::$error(other.to_string())),
                }
            }
        }
    };
}

string_enum! {
    /// 並び順
    SortOrder, InvalidSortOrder {
        BestMatch,
        BidCountFewest,
        BidCountMost,
        CountryAscending,
        CountryDescending,
        CurrentPriceHighest,
        DistanceNearest,
        EndTimeSoonest,
        PricePlusShippingHighest,
        PricePlusShippingLowest,
        StartTimeNewest,
        WatchCountDecreaseSort,
    }
}

string_enum! {
    /// レスポンスに含める追加情報
    OutputSelector, InvalidOutputSelector {
        AspectHistogram,
        CategoryHistogram,
        ConditionHistogram,
        GalleryInfo,
        PictureURLLarge,
        PictureURLSuperSize,
        SellerInfo,
        StoreInfo,
        UnitPriceInfo,
    }
}

/// アフィリエイトのトラッキング情報
///
/// networkIdとtrackingIdは常に組で存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliateTracking {
    /// 2〜9
    pub network_id: u8,
    /// networkIdが9の場合は10桁のキャンペーンID
    pub tracking_id: String,
}

/// アフィリエイト情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affiliate {
    pub custom_id: Option<String>,
    pub geo_targeting: Option<bool>,
    pub tracking: Option<AffiliateTracking>,
}

/// ページング指定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationInput {
    pub entries_per_page: Option<u8>,
    pub page_number: Option<u8>,
}

impl PaginationInput {
    pub fn is_empty(&self) -> bool {
        self.entries_per_page.is_none() && self.page_number.is_none()
    }
}

/// 検索キーワード（2〜350文字、各単語98文字以下）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords(String);

impl Keywords {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 350;
    pub const MAX_WORD_LENGTH: usize = 98;

    pub fn new(keywords: impl Into<String>) -> Result<Self, FindingError> {
        let keywords = keywords.into();
        let len = keywords.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(FindingError::InvalidKeywordsLength(len));
        }
        if let Some(word) = keywords
            .split_whitespace()
            .find(|word| word.chars().count() > Self::MAX_WORD_LENGTH)
        {
            return Err(FindingError::InvalidKeywordLength(word.to_string()));
        }
        Ok(Self(keywords))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// カテゴリーID一覧（カンマ区切りで最大3件、各1〜10桁の数字）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryIds(Vec<String>);

impl CategoryIds {
    pub const MAX_IDS: usize = 3;
    pub const MAX_ID_LENGTH: usize = 10;

    pub fn parse(raw: &str) -> Result<Self, FindingError> {
        let ids: Vec<&str> = raw.split(',').collect();
        if ids.len() > Self::MAX_IDS {
            return Err(FindingError::MaxCategoryIds);
        }
        for id in &ids {
            let valid = !id.is_empty()
                && id.len() <= Self::MAX_ID_LENGTH
                && id.chars().all(|c| c.is_ascii_digit());
            if !valid {
                return Err(FindingError::InvalidCategoryId(id.to_string()));
            }
        }
        Ok(Self(ids.into_iter().map(str::to_string).collect()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// 全オペレーション共通のパラメータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCommon {
    pub item_filters: Vec<ItemFilter>,
    pub aspect_filters: Vec<AspectFilter>,
    pub output_selectors: Vec<OutputSelector>,
    pub affiliate: Option<Affiliate>,
    pub buyer_postal_code: Option<String>,
    pub pagination: PaginationInput,
    pub sort_order: Option<SortOrder>,
}

/// 検証済み検索リクエスト
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    ByKeywords {
        keywords: Keywords,
        common: SearchCommon,
    },
    ByCategory {
        category_ids: CategoryIds,
        common: SearchCommon,
    },
    /// categoryIdとkeywordsの少なくとも一方を持つ
    Advanced {
        category_ids: Option<CategoryIds>,
        keywords: Option<Keywords>,
        description_search: Option<bool>,
        common: SearchCommon,
    },
    ByProduct {
        product_id: ProductId,
        common: SearchCommon,
    },
    /// storeName、categoryId、keywordsの少なくとも一つを持つ
    InStores {
        store_name: Option<String>,
        category_ids: Option<CategoryIds>,
        keywords: Option<Keywords>,
        common: SearchCommon,
    },
}

impl SearchRequest {
    pub fn operation(&self) -> Operation {
        match self {
            SearchRequest::ByKeywords { .. } => Operation::FindItemsByKeywords,
            SearchRequest::ByCategory { .. } => Operation::FindItemsByCategory,
            SearchRequest::Advanced { .. } => Operation::FindItemsAdvanced,
            SearchRequest::ByProduct { .. } => Operation::FindItemsByProduct,
            SearchRequest::InStores { .. } => Operation::FindItemsInEbayStores,
        }
    }

    pub fn common(&self) -> &SearchCommon {
        match self {
            SearchRequest::ByKeywords { common, .. }
            | SearchRequest::ByCategory { common, .. }
            | SearchRequest::Advanced { common, .. }
            | SearchRequest::ByProduct { common, .. }
            | SearchRequest::InStores { common, .. } => common,
        }
    }
}
