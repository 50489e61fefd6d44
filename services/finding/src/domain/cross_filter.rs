/// 複数フィルターにまたがる制約の検証
///
/// 全フィルターの単体検証が終わった後、収集済みのフィルター一覧全体に対して実行する。
/// 入力順に依存しない結果を返すため、排他チェックは正規順序で報告する。
use super::filter_rules::{parse_integer_at_least, parse_price};
use super::item_filter::{ItemFilter, ItemFilterName};
use super::search_request::SortOrder;
use super::FindingError;

/// 最大値・最小値の組（整数）
const INTEGER_MIN_MAX_PAIRS: [(ItemFilterName, ItemFilterName); 3] = [
    (ItemFilterName::MaxBids, ItemFilterName::MinBids),
    (ItemFilterName::FeedbackScoreMax, ItemFilterName::FeedbackScoreMin),
    (ItemFilterName::MaxQuantity, ItemFilterName::MinQuantity),
];

/// 同時に指定できないフィルター
const EXCLUSIVE_SELLER_FILTERS: [ItemFilterName; 3] = [
    ItemFilterName::Seller,
    ItemFilterName::ExcludeSeller,
    ItemFilterName::TopRatedSellerOnly,
];

/// フィルター一覧全体の制約を検証する
///
/// チェック順序: 重複 -> 排他 -> 最大/最小 -> LocalSearchOnly
pub fn validate_item_filter_set(
    filters: &[ItemFilter],
    has_buyer_postal_code: bool,
) -> Result<(), FindingError> {
    validate_no_duplicates(filters)?;
    validate_exclusive_sellers(filters)?;
    validate_min_max(filters)?;
    validate_local_search(filters, has_buyer_postal_code)?;
    Ok(())
}

/// sortOrderの依存関係を検証する
///
/// - BidCountFewest / BidCountMost: Auctionを含むListingTypeフィルターが必要
/// - DistanceNearest: buyerPostalCodeが必要
pub fn validate_sort_order(
    sort_order: SortOrder,
    filters: &[ItemFilter],
    has_buyer_postal_code: bool,
) -> Result<(), FindingError> {
    match sort_order {
        SortOrder::BidCountFewest | SortOrder::BidCountMost => {
            let has_auction = find(filters, ItemFilterName::ListingType)
                .is_some_and(|f| f.values.iter().any(|v| v == "Auction"));
            if !has_auction {
                return Err(FindingError::AuctionListingMissing(
                    sort_order.as_str().to_string(),
                ));
            }
        }
        SortOrder::DistanceNearest if !has_buyer_postal_code => {
            return Err(FindingError::BuyerPostalCodeMissing(format!(
                "sortOrder {}",
                sort_order.as_str()
            )));
        }
        _ => {}
    }
    Ok(())
}

fn find(filters: &[ItemFilter], name: ItemFilterName) -> Option<&ItemFilter> {
    filters.iter().find(|f| f.name == name)
}

fn validate_no_duplicates(filters: &[ItemFilter]) -> Result<(), FindingError> {
    for (i, filter) in filters.iter().enumerate() {
        if filters[..i].iter().any(|f| f.name == filter.name) {
            return Err(FindingError::DuplicateItemFilter(filter.name));
        }
    }
    Ok(())
}

fn validate_exclusive_sellers(filters: &[ItemFilter]) -> Result<(), FindingError> {
    let present: Vec<ItemFilterName> = EXCLUSIVE_SELLER_FILTERS
        .into_iter()
        .filter(|name| find(filters, *name).is_some())
        .collect();
    if let [first, second, ..] = present.as_slice() {
        return Err(FindingError::ExclusiveFilters {
            first: *first,
            second: *second,
        });
    }
    Ok(())
}

fn validate_min_max(filters: &[ItemFilter]) -> Result<(), FindingError> {
    for (max_name, min_name) in INTEGER_MIN_MAX_PAIRS {
        if let (Some(max), Some(min)) = (find(filters, max_name), find(filters, min_name)) {
            let max_value = parse_integer_at_least(max_name.as_str(), max.first_value(), i64::MIN)?;
            let min_value = parse_integer_at_least(min_name.as_str(), min.first_value(), i64::MIN)?;
            if max_value < min_value {
                return Err(FindingError::InvalidNumericFilter {
                    max: max_name,
                    min: min_name,
                });
            }
        }
    }

    let max_price = find(filters, ItemFilterName::MaxPrice);
    let min_price = find(filters, ItemFilterName::MinPrice);
    if let (Some(max), Some(min)) = (max_price, min_price) {
        if parse_price(max.first_value())? < parse_price(min.first_value())? {
            return Err(FindingError::InvalidMaxPrice);
        }
    }
    Ok(())
}

fn validate_local_search(
    filters: &[ItemFilter],
    has_buyer_postal_code: bool,
) -> Result<(), FindingError> {
    if find(filters, ItemFilterName::LocalSearchOnly).is_none() {
        return Ok(());
    }
    if !has_buyer_postal_code {
        return Err(FindingError::BuyerPostalCodeMissing(
            ItemFilterName::LocalSearchOnly.to_string(),
        ));
    }
    if find(filters, ItemFilterName::MaxDistance).is_none() {
        return Err(FindingError::MaxDistanceMissing);
    }
    Ok(())
}
