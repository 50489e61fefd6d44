/// アイテムフィルター単体の検証ルール
///
/// フィルター名ごとに検証関数を対応付けたディスパッチテーブル。
/// 複数フィルターにまたがる制約は`cross_filter`で扱う。
use chrono::{DateTime, Utc};

use super::item_filter::{ItemFilter, ItemFilterName};
use super::FindingError;

/// 検証関数の型
pub type FilterRule = fn(&ItemFilter, &FilterContext) -> Result<(), FindingError>;

/// コンディションID
pub const CONDITION_IDS: [u16; 14] = [
    1000, 1500, 1750, 2000, 2010, 2020, 2030, 2500, 2750, 3000, 4000, 5000, 6000, 7000,
];

/// 通貨コード（ISO 4217のうちFinding APIが受け付けるもの）
pub const CURRENCY_IDS: [&str; 15] = [
    "AUD", "CAD", "CHF", "CNY", "EUR", "GBP", "HKD", "INR", "MYR", "PHP", "PLN", "SEK", "SGD",
    "TWD", "USD",
];

/// グローバルID（出品サイト）
pub const GLOBAL_IDS: [&str; 22] = [
    "EBAY-AT", "EBAY-AU", "EBAY-CH", "EBAY-DE", "EBAY-ENCA", "EBAY-ES", "EBAY-FR", "EBAY-FRBE",
    "EBAY-FRCA", "EBAY-GB", "EBAY-HK", "EBAY-IE", "EBAY-IN", "EBAY-IT", "EBAY-MOTOR", "EBAY-MY",
    "EBAY-NL", "EBAY-NLBE", "EBAY-PH", "EBAY-PL", "EBAY-SG", "EBAY-US",
];

/// 出品形式
pub const LISTING_TYPES: [&str; 6] = [
    "Auction",
    "AuctionWithBIN",
    "Classified",
    "FixedPrice",
    "StoreInventory",
    "All",
];

pub const EXPEDITED_SHIPPING_TYPES: [&str; 2] = ["Expedited", "OneDayShipping"];

pub const PAYMENT_METHODS: [&str; 3] = ["PayPal", "PaisaPay", "PaisaPayEMI"];

pub const SELLER_BUSINESS_TYPES: [&str; 2] = ["Business", "Private"];

/// ExcludeCategory / LocatedInの最大指定数
pub const MAX_CATEGORY_LIKE_VALUES: usize = 25;

/// Seller / ExcludeSellerの最大指定数
pub const MAX_SELLER_VALUES: usize = 100;

/// 単体検証時に参照するリクエスト全体の情報
#[derive(Debug, Clone, Copy)]
pub struct FilterContext {
    /// 検証基準時刻
    pub now: DateTime<Utc>,
    /// buyerPostalCodeが指定されているか
    pub has_buyer_postal_code: bool,
}

impl FilterContext {
    pub fn new(now: DateTime<Utc>, has_buyer_postal_code: bool) -> Self {
        Self {
            now,
            has_buyer_postal_code,
        }
    }
}

/// フィルター名に対応する検証関数を返す
pub fn rule_for(name: ItemFilterName) -> FilterRule {
    use ItemFilterName::*;
    match name {
        AuthorizedSellerOnly | BestOfferOnly | CharityOnly | ExcludeAutoPay | FeaturedOnly
        | FreeShippingOnly | GetItFastOnly | HideDuplicateItems | LocalPickupOnly
        | LocalSearchOnly | LotsOnly | OutletSellerOnly | ReturnsAcceptedOnly | SoldItemsOnly
        | TopRatedSellerOnly | WorldOfGoodOnly => validate_boolean,
        AvailableTo => validate_available_to,
        LocatedIn => validate_located_in,
        Condition => validate_condition,
        Currency => validate_currency,
        EndTimeFrom | EndTimeTo | StartTimeFrom | StartTimeTo => validate_future_date_time,
        ModTimeFrom => validate_past_date_time,
        ExcludeCategory => validate_exclude_category,
        ExcludeSeller | Seller => validate_sellers,
        ExpeditedShippingType => validate_expedited_shipping_type,
        FeedbackScoreMax | FeedbackScoreMin | MaxBids | MinBids => validate_non_negative,
        MaxHandlingTime | MaxQuantity | MinQuantity => validate_positive,
        MaxDistance => validate_max_distance,
        ListedIn => validate_listed_in,
        ListingType => validate_listing_type,
        MaxPrice | MinPrice => validate_price,
        PaymentMethod => validate_payment_method,
        SellerBusinessType => validate_seller_business_type,
        ValueBoxInventory => validate_value_box_inventory,
    }
}

/// フィルターを単体で検証する
pub fn validate_item_filter(filter: &ItemFilter, ctx: &FilterContext) -> Result<(), FindingError> {
    rule_for(filter.name)(filter, ctx)
}

/// 値の件数上限チェック
fn ensure_max_values(filter: &ItemFilter, max: usize) -> Result<(), FindingError> {
    if filter.values.len() > max {
        return Err(FindingError::TooManyValues {
            name: filter.name.to_string(),
            max,
        });
    }
    Ok(())
}

/// 単一値フィルターの値を取得
fn single_value(filter: &ItemFilter) -> Result<&str, FindingError> {
    ensure_max_values(filter, 1)?;
    Ok(filter.first_value())
}

/// "true" / "false" の判定
pub fn parse_boolean(name: &str, value: &str) -> Result<bool, FindingError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FindingError::InvalidBooleanValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// 整数として解釈し、下限と比較する
pub fn parse_integer_at_least(name: &str, value: &str, min: i64) -> Result<i64, FindingError> {
    let n: i64 = value.parse().map_err(|_| FindingError::InvalidInteger {
        name: name.to_string(),
        value: value.to_string(),
    })?;
    if n < min {
        return Err(FindingError::IntegerBelowMinimum {
            name: name.to_string(),
            value: n,
            min,
        });
    }
    Ok(n)
}

/// 0以上の価格として解釈する
pub fn parse_price(value: &str) -> Result<f64, FindingError> {
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(FindingError::InvalidPrice(value.to_string())),
    }
}

pub fn is_valid_currency(value: &str) -> bool {
    CURRENCY_IDS.contains(&value)
}

fn validate_boolean(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    parse_boolean(filter.name.as_str(), single_value(filter)?).map(|_| ())
}

/// 国コードは大文字アルファベット2文字
fn validate_country_code(value: &str) -> Result<(), FindingError> {
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(FindingError::InvalidCountryCode(value.to_string()))
    }
}

fn validate_available_to(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    validate_country_code(single_value(filter)?)
}

fn validate_located_in(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    ensure_max_values(filter, MAX_CATEGORY_LIKE_VALUES)?;
    filter
        .values
        .iter()
        .try_for_each(|value| validate_country_code(value))
}

/// 整数として解釈できない値はコンディション名として受け付ける
fn validate_condition(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    for value in &filter.values {
        if let Ok(id) = value.parse::<i64>() {
            let known = u16::try_from(id).is_ok_and(|id| CONDITION_IDS.contains(&id));
            if !known {
                return Err(FindingError::InvalidCondition(value.clone()));
            }
        }
    }
    Ok(())
}

fn validate_currency(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    let value = single_value(filter)?;
    if is_valid_currency(value) {
        Ok(())
    } else {
        Err(FindingError::InvalidCurrencyId(value.to_string()))
    }
}

/// UTCのRFC3339日時として解釈する
fn parse_utc_date_time(filter: &ItemFilter) -> Result<DateTime<Utc>, FindingError> {
    let value = single_value(filter)?;
    let invalid = || FindingError::InvalidDateTime {
        name: filter.name.to_string(),
        value: value.to_string(),
    };
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|_| invalid())?;
    if parsed.offset().local_minus_utc() != 0 {
        return Err(invalid());
    }
    Ok(parsed.with_timezone(&Utc))
}

fn validate_future_date_time(filter: &ItemFilter, ctx: &FilterContext) -> Result<(), FindingError> {
    let at = parse_utc_date_time(filter)?;
    if at <= ctx.now {
        return Err(FindingError::DateTimeNotInFuture {
            name: filter.name.to_string(),
            value: filter.first_value().to_string(),
        });
    }
    Ok(())
}

fn validate_past_date_time(filter: &ItemFilter, ctx: &FilterContext) -> Result<(), FindingError> {
    let at = parse_utc_date_time(filter)?;
    if at >= ctx.now {
        return Err(FindingError::DateTimeNotInPast {
            name: filter.name.to_string(),
            value: filter.first_value().to_string(),
        });
    }
    Ok(())
}

fn validate_exclude_category(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    ensure_max_values(filter, MAX_CATEGORY_LIKE_VALUES)?;
    for value in &filter.values {
        parse_integer_at_least(filter.name.as_str(), value, 0)?;
    }
    Ok(())
}

fn validate_sellers(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    ensure_max_values(filter, MAX_SELLER_VALUES)
}

fn validate_expedited_shipping_type(
    filter: &ItemFilter,
    _ctx: &FilterContext,
) -> Result<(), FindingError> {
    let value = single_value(filter)?;
    if EXPEDITED_SHIPPING_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(FindingError::InvalidExpeditedShippingType(value.to_string()))
    }
}

fn validate_non_negative(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    parse_integer_at_least(filter.name.as_str(), single_value(filter)?, 0).map(|_| ())
}

fn validate_positive(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    parse_integer_at_least(filter.name.as_str(), single_value(filter)?, 1).map(|_| ())
}

fn validate_max_distance(filter: &ItemFilter, ctx: &FilterContext) -> Result<(), FindingError> {
    parse_integer_at_least(filter.name.as_str(), single_value(filter)?, 5)?;
    if !ctx.has_buyer_postal_code {
        return Err(FindingError::BuyerPostalCodeMissing(filter.name.to_string()));
    }
    Ok(())
}

fn validate_listed_in(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    let value = single_value(filter)?;
    if GLOBAL_IDS.contains(&value) {
        Ok(())
    } else {
        Err(FindingError::InvalidGlobalId(value.to_string()))
    }
}

fn validate_listing_type(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    let mut seen: Vec<&str> = Vec::with_capacity(filter.values.len());
    for value in &filter.values {
        let value = value.as_str();
        if !LISTING_TYPES.contains(&value) {
            return Err(FindingError::InvalidListingType(value.to_string()));
        }
        if value == "All" && filter.values.len() > 1 {
            return Err(FindingError::InvalidAllListingType);
        }
        if seen.contains(&value) {
            return Err(FindingError::DuplicateListingType(value.to_string()));
        }
        let conflicting = match value {
            "Auction" => "AuctionWithBIN",
            "AuctionWithBIN" => "Auction",
            _ => "",
        };
        if seen.contains(&conflicting) {
            return Err(FindingError::InvalidAuctionListingTypes);
        }
        seen.push(value);
    }
    Ok(())
}

fn validate_price(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    parse_price(single_value(filter)?)?;
    if let Some(param) = &filter.param {
        if param.name != "Currency" {
            return Err(FindingError::InvalidPriceParamName(param.name.clone()));
        }
        if !is_valid_currency(&param.value) {
            return Err(FindingError::InvalidCurrencyId(param.value.clone()));
        }
    }
    Ok(())
}

fn validate_payment_method(filter: &ItemFilter, _ctx: &FilterContext) -> Result<(), FindingError> {
    let value = single_value(filter)?;
    if PAYMENT_METHODS.contains(&value) {
        Ok(())
    } else {
        Err(FindingError::InvalidPaymentMethod(value.to_string()))
    }
}

fn validate_seller_business_type(
    filter: &ItemFilter,
    _ctx: &FilterContext,
) -> Result<(), FindingError> {
    let value = single_value(filter)?;
    if SELLER_BUSINESS_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(FindingError::InvalidSellerBusinessType(value.to_string()))
    }
}

/// "0" / "1" で表す唯一のブール値フィルター
fn validate_value_box_inventory(
    filter: &ItemFilter,
    _ctx: &FilterContext,
) -> Result<(), FindingError> {
    let value = single_value(filter)?;
    if value == "0" || value == "1" {
        Ok(())
    } else {
        Err(FindingError::InvalidValueBoxInventory(value.to_string()))
    }
}
