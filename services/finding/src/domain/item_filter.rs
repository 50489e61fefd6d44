/// アイテムフィルターとアスペクトフィルターのモデル
use std::str::FromStr;

macro_rules! item_filter_names {
    ($($variant:ident),* $(,)?) => {
        /// Finding APIがサポートするアイテムフィルター名
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ItemFilterName {
            $($variant),*
        }

        impl ItemFilterName {
            /// 全フィルター名
            pub const ALL: &'static [ItemFilterName] = &[$(ItemFilterName::$variant),*];

            /// APIパラメータ上の名前
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ItemFilterName::$variant => stringify!($variant)),*
                }
            }
        }

        impl FromStr for ItemFilterName {
            type Err = super::FindingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(ItemFilterName::$variant),)*
                    other => Err(super::FindingError::UnsupportedItemFilterType(other.to_string())),
                }
            }
        }
    };
}

item_filter_names! {
    AuthorizedSellerOnly,
    AvailableTo,
    BestOfferOnly,
    CharityOnly,
    Condition,
    Currency,
    EndTimeFrom,
    EndTimeTo,
    ExcludeAutoPay,
    ExcludeCategory,
    ExcludeSeller,
    ExpeditedShippingType,
    FeaturedOnly,
    FeedbackScoreMax,
    FeedbackScoreMin,
    FreeShippingOnly,
    GetItFastOnly,
    HideDuplicateItems,
    ListedIn,
    ListingType,
    LocalPickupOnly,
    LocalSearchOnly,
    LocatedIn,
    LotsOnly,
    MaxBids,
    MaxDistance,
    MaxHandlingTime,
    MaxPrice,
    MaxQuantity,
    MinBids,
    MinPrice,
    MinQuantity,
    ModTimeFrom,
    OutletSellerOnly,
    PaymentMethod,
    ReturnsAcceptedOnly,
    Seller,
    SellerBusinessType,
    SoldItemsOnly,
    StartTimeFrom,
    StartTimeTo,
    TopRatedSellerOnly,
    ValueBoxInventory,
    WorldOfGoodOnly,
}

impl std::fmt::Display for ItemFilterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// アイテムフィルターの補助パラメータ（paramName / paramValue）
///
/// 片方だけが存在する状態は表現できない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParam {
    pub name: String,
    pub value: String,
}

/// アイテムフィルター
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub name: ItemFilterName,
    /// 1件以上の値（件数の上限はフィルター名ごとに異なる）
    pub values: Vec<String>,
    pub param: Option<FilterParam>,
}

impl ItemFilter {
    pub fn new(name: ItemFilterName, values: Vec<String>) -> Self {
        Self {
            name,
            values,
            param: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.param = Some(FilterParam {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// 先頭の値（単一値フィルター用）
    pub fn first_value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }
}

/// アスペクトフィルター
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AspectFilter {
    pub aspect_name: String,
    pub value_names: Vec<String>,
}
