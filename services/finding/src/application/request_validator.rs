// リクエスト検証
//
// 生パラメータを検証済みのSearchRequestに変換する。
// 最初に見つかった違反で即座に打ち切る。
//
// 検証順序:
// 1. buyerPostalCode
// 2. aspectFilter
// 3. itemFilter（構文解析 -> 単体ルール -> フィルター間制約）
// 4. outputSelector
// 5. affiliate
// 6. paginationInput
// 7. sortOrder
// 8. オペレーション固有の必須パラメータ

use chrono::{DateTime, Utc};
use tracing::debug;

use super::param_parser::{
    RawParameters, parse_aspect_filters, parse_item_filters, parse_output_selector_values,
    parse_values,
};
use crate::domain::cross_filter::{validate_item_filter_set, validate_sort_order};
use crate::domain::filter_rules::parse_boolean;
use crate::domain::{
    Affiliate, AffiliateTracking, CategoryIds, FilterContext, FindingError, ItemFilter, Keywords,
    Operation, OutputSelector, PaginationInput, ProductId, ProductIdType, SearchCommon,
    SearchRequest, SortOrder, validate_item_filter,
};

/// buyerPostalCodeの最小文字数
const MIN_POSTAL_CODE_LENGTH: usize = 3;

/// affiliate.customIdの最大文字数
const MAX_CUSTOM_ID_LENGTH: usize = 256;

/// キャンペーンIDを要求するnetworkId
const CAMPAIGN_NETWORK_ID: u8 = 9;

/// キャンペーンIDの桁数
const CAMPAIGN_ID_LENGTH: usize = 10;

/// リクエスト検証器
///
/// 日時フィルターの比較基準となる時刻をインスタンス生成時に固定する。
#[derive(Debug, Clone, Copy)]
pub struct RequestValidator {
    now: DateTime<Utc>,
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestValidator {
    /// 現在時刻を基準にした検証器を作成
    pub fn new() -> Self {
        Self::with_now(Utc::now())
    }

    /// 任意の基準時刻で検証器を作成
    pub fn with_now(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// 生パラメータを検証してSearchRequestを構築
    ///
    /// # Arguments
    /// * `operation` - 対象オペレーション
    /// * `params` - 呼び出し元から受け取ったパラメータ
    ///
    /// # Returns
    /// * `Ok(SearchRequest)` - 全ルールを満たした場合
    /// * `Err(FindingError)` - 最初に検出した違反
    pub fn validate(
        &self,
        operation: Operation,
        params: &RawParameters,
    ) -> Result<SearchRequest, FindingError> {
        let common = self.validate_common(operation, params)?;

        let request = match operation {
            Operation::FindItemsByKeywords => SearchRequest::ByKeywords {
                keywords: Keywords::new(required(params, "keywords")?)?,
                common,
            },
            Operation::FindItemsByCategory => SearchRequest::ByCategory {
                category_ids: optional_category_ids(params)?
                    .ok_or(FindingError::MissingParameter("categoryId"))?,
                common,
            },
            Operation::FindItemsAdvanced => {
                let category_ids = optional_category_ids(params)?;
                let keywords = optional_keywords(params)?;
                if category_ids.is_none() && keywords.is_none() {
                    return Err(FindingError::CategoryIdAndKeywordsMissing);
                }
                let description_search = params
                    .get("descriptionSearch")
                    .map(|v| parse_boolean("descriptionSearch", v))
                    .transpose()?;
                SearchRequest::Advanced {
                    category_ids,
                    keywords,
                    description_search,
                    common,
                }
            }
            Operation::FindItemsByProduct => {
                let value = required(params, "productId")?;
                let id_type: ProductIdType = required(params, "productId.@type")?.parse()?;
                SearchRequest::ByProduct {
                    product_id: ProductId::new(id_type, value)?,
                    common,
                }
            }
            Operation::FindItemsInEbayStores => {
                let store_name = params.get("storeName").map(str::to_string);
                let category_ids = optional_category_ids(params)?;
                let keywords = optional_keywords(params)?;
                if store_name.is_none() && category_ids.is_none() && keywords.is_none() {
                    return Err(FindingError::StoreNameCategoryIdAndKeywordsMissing);
                }
                SearchRequest::InStores {
                    store_name,
                    category_ids,
                    keywords,
                    common,
                }
            }
        };

        debug!(
            operation = %operation,
            item_filters = request.common().item_filters.len(),
            aspect_filters = request.common().aspect_filters.len(),
            "リクエストを検証"
        );

        Ok(request)
    }

    /// 全オペレーション共通のパラメータを検証
    fn validate_common(
        &self,
        operation: Operation,
        params: &RawParameters,
    ) -> Result<SearchCommon, FindingError> {
        let buyer_postal_code = validate_buyer_postal_code(params)?;

        // findItemsByProductはaspectFilterを受け付けないため読み飛ばす
        let aspect_filters = if operation.accepts_aspect_filters() {
            parse_aspect_filters(params)?
        } else {
            Vec::new()
        };

        let item_filters = self.validate_item_filters(params, buyer_postal_code.is_some())?;

        let output_selectors = parse_output_selector_values(params)?
            .iter()
            .map(|v| v.parse::<OutputSelector>())
            .collect::<Result<Vec<_>, _>>()?;

        let affiliate = validate_affiliate(params)?;
        let pagination = validate_pagination(params)?;

        let sort_order = params
            .get("sortOrder")
            .map(str::parse::<SortOrder>)
            .transpose()?;
        if let Some(sort_order) = sort_order {
            validate_sort_order(sort_order, &item_filters, buyer_postal_code.is_some())?;
        }

        Ok(SearchCommon {
            item_filters,
            aspect_filters,
            output_selectors,
            affiliate,
            buyer_postal_code,
            pagination,
            sort_order,
        })
    }

    /// itemFilterを単体ルール、フィルター間制約の順に検証
    fn validate_item_filters(
        &self,
        params: &RawParameters,
        has_buyer_postal_code: bool,
    ) -> Result<Vec<ItemFilter>, FindingError> {
        let filters = parse_item_filters(params)?;
        let ctx = FilterContext::new(self.now, has_buyer_postal_code);
        for filter in &filters {
            validate_item_filter(filter, &ctx)?;
        }
        validate_item_filter_set(&filters, has_buyer_postal_code)?;
        Ok(filters)
    }
}

fn required<'a>(params: &'a RawParameters, key: &'static str) -> Result<&'a str, FindingError> {
    params.get(key).ok_or(FindingError::MissingParameter(key))
}

fn optional_keywords(params: &RawParameters) -> Result<Option<Keywords>, FindingError> {
    params.get("keywords").map(Keywords::new).transpose()
}

/// categoryIdはカンマ区切り・番号付き構文のどちらでも受け付ける
fn optional_category_ids(params: &RawParameters) -> Result<Option<CategoryIds>, FindingError> {
    if !params.contains("categoryId") && !params.contains("categoryId(0)") {
        return Ok(None);
    }
    let ids = parse_values(params, "categoryId")?;
    CategoryIds::parse(&ids.join(",")).map(Some)
}

fn validate_buyer_postal_code(params: &RawParameters) -> Result<Option<String>, FindingError> {
    let Some(code) = params.get("buyerPostalCode") else {
        return Ok(None);
    };
    if code.chars().count() < MIN_POSTAL_CODE_LENGTH {
        return Err(FindingError::InvalidPostalCode(code.to_string()));
    }
    Ok(Some(code.to_string()))
}

/// affiliate.*を検証
///
/// networkIdとtrackingIdは組で指定する必要があり、
/// networkIdが9の場合trackingIdは10桁のキャンペーンID。
fn validate_affiliate(params: &RawParameters) -> Result<Option<Affiliate>, FindingError> {
    let custom_id = params.get("affiliate.customId");
    let geo_targeting = params.get("affiliate.geoTargeting");
    let network_id = params.get("affiliate.networkId");
    let tracking_id = params.get("affiliate.trackingId");

    if custom_id.is_none() && geo_targeting.is_none() && network_id.is_none() && tracking_id.is_none()
    {
        return Ok(None);
    }

    if let Some(custom_id) = custom_id {
        let len = custom_id.chars().count();
        if len > MAX_CUSTOM_ID_LENGTH {
            return Err(FindingError::InvalidCustomIdLength(len));
        }
    }

    let geo_targeting = geo_targeting
        .map(|v| parse_boolean("affiliate.geoTargeting", v))
        .transpose()?;

    let tracking = match (network_id, tracking_id) {
        (Some(network_id), Some(tracking_id)) => {
            Some(validate_tracking(network_id, tracking_id)?)
        }
        (None, None) => None,
        _ => return Err(FindingError::NetworkIdOrTrackingIdMissing),
    };

    Ok(Some(Affiliate {
        custom_id: custom_id.map(str::to_string),
        geo_targeting,
        tracking,
    }))
}

fn validate_tracking(network_id: &str, tracking_id: &str) -> Result<AffiliateTracking, FindingError> {
    let parsed = network_id
        .parse::<u8>()
        .ok()
        .filter(|id| (2..=CAMPAIGN_NETWORK_ID).contains(id))
        .ok_or_else(|| FindingError::InvalidNetworkId(network_id.to_string()))?;

    if parsed == CAMPAIGN_NETWORK_ID {
        let is_campaign_id = tracking_id.len() == CAMPAIGN_ID_LENGTH
            && tracking_id.chars().all(|c| c.is_ascii_digit());
        if !is_campaign_id {
            return Err(FindingError::InvalidCampaignId(tracking_id.to_string()));
        }
    }

    Ok(AffiliateTracking {
        network_id: parsed,
        tracking_id: tracking_id.to_string(),
    })
}

fn validate_pagination(params: &RawParameters) -> Result<PaginationInput, FindingError> {
    let entries_per_page = params
        .get("paginationInput.entriesPerPage")
        .map(|v| parse_page_value(v).ok_or_else(|| FindingError::InvalidEntriesPerPage(v.to_string())))
        .transpose()?;
    let page_number = params
        .get("paginationInput.pageNumber")
        .map(|v| parse_page_value(v).ok_or_else(|| FindingError::InvalidPageNumber(v.to_string())))
        .transpose()?;
    Ok(PaginationInput {
        entries_per_page,
        page_number,
    })
}

/// 1〜100の整数
fn parse_page_value(value: &str) -> Option<u8> {
    value.parse::<u8>().ok().filter(|n| (1..=100).contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, ItemFilterName};
    use chrono::TimeZone;

    fn params(pairs: &[(&str, &str)]) -> RawParameters {
        pairs.iter().copied().collect()
    }

    fn validator() -> RequestValidator {
        RequestValidator::with_now(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
    }

    fn validate_keywords(pairs: &[(&str, &str)]) -> Result<SearchRequest, FindingError> {
        let mut all = vec![("keywords", "marshmallows")];
        all.extend_from_slice(pairs);
        validator().validate(Operation::FindItemsByKeywords, &params(&all))
    }

    // ==================== オペレーション固有 ====================

    #[test]
    fn test_keywords_only() {
        let request = validate_keywords(&[]).unwrap();
        assert_eq!(request.operation(), Operation::FindItemsByKeywords);
        assert_eq!(request.common(), &SearchCommon::default());
        match request {
            SearchRequest::ByKeywords { keywords, .. } => assert_eq!(keywords.as_str(), "marshmallows"),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_fields() {
        let v = validator();
        let empty = params(&[]);
        assert_eq!(
            v.validate(Operation::FindItemsByKeywords, &empty),
            Err(FindingError::MissingParameter("keywords"))
        );
        assert_eq!(
            v.validate(Operation::FindItemsByCategory, &empty),
            Err(FindingError::MissingParameter("categoryId"))
        );
        assert_eq!(
            v.validate(Operation::FindItemsAdvanced, &empty),
            Err(FindingError::CategoryIdAndKeywordsMissing)
        );
        assert_eq!(
            v.validate(Operation::FindItemsByProduct, &empty),
            Err(FindingError::MissingParameter("productId"))
        );
        assert_eq!(
            v.validate(
                Operation::FindItemsByProduct,
                &params(&[("productId", "53039031")])
            ),
            Err(FindingError::MissingParameter("productId.@type"))
        );
        assert_eq!(
            v.validate(Operation::FindItemsInEbayStores, &empty),
            Err(FindingError::StoreNameCategoryIdAndKeywordsMissing)
        );

        for op in Operation::ALL {
            let err = v.validate(op, &empty).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        }
    }

    #[test]
    fn test_advanced_with_category_only() {
        let request = validator()
            .validate(
                Operation::FindItemsAdvanced,
                &params(&[("categoryId", "267,1249"), ("descriptionSearch", "true")]),
            )
            .unwrap();
        match request {
            SearchRequest::Advanced {
                category_ids,
                keywords,
                description_search,
                ..
            } => {
                assert_eq!(category_ids.unwrap().as_slice(), ["267", "1249"]);
                assert!(keywords.is_none());
                assert_eq!(description_search, Some(true));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_numbered_category_ids() {
        let request = validator()
            .validate(
                Operation::FindItemsByCategory,
                &params(&[("categoryId(0)", "267"), ("categoryId(1)", "1249")]),
            )
            .unwrap();
        match request {
            SearchRequest::ByCategory { category_ids, .. } => {
                assert_eq!(category_ids.as_slice(), ["267", "1249"]);
            }
            other => panic!("unexpected request: {other:?}"),
        }

        let result = validator().validate(
            Operation::FindItemsByCategory,
            &params(&[("categoryId", "267"), ("categoryId(0)", "1249")]),
        );
        assert_eq!(
            result,
            Err(FindingError::InvalidFilterSyntax("categoryId".to_string()))
        );
    }

    #[test]
    fn test_description_search_must_be_boolean() {
        let result = validator().validate(
            Operation::FindItemsAdvanced,
            &params(&[("keywords", "harry potter"), ("descriptionSearch", "yes")]),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidEnumValue);
    }

    #[test]
    fn test_by_product() {
        let request = validator()
            .validate(
                Operation::FindItemsByProduct,
                &params(&[("productId", "9780131103627"), ("productId.@type", "ISBN")]),
            )
            .unwrap();
        match request {
            SearchRequest::ByProduct { product_id, .. } => {
                assert_eq!(product_id.id_type(), ProductIdType::Isbn);
                assert_eq!(product_id.value(), "9780131103627");
            }
            other => panic!("unexpected request: {other:?}"),
        }

        let err = validator()
            .validate(
                Operation::FindItemsByProduct,
                &params(&[("productId", "9780131103628"), ("productId.@type", "ISBN")]),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidChecksum);
    }

    #[test]
    fn test_by_product_ignores_aspect_filters() {
        let request = validator()
            .validate(
                Operation::FindItemsByProduct,
                &params(&[
                    ("productId", "53039031"),
                    ("productId.@type", "ReferenceID"),
                    ("aspectFilter.aspectName", "Size"),
                ]),
            )
            .unwrap();
        assert!(request.common().aspect_filters.is_empty());
    }

    #[test]
    fn test_in_stores_with_store_name_only() {
        let request = validator()
            .validate(
                Operation::FindItemsInEbayStores,
                &params(&[("storeName", "Example Store")]),
            )
            .unwrap();
        match request {
            SearchRequest::InStores { store_name, .. } => {
                assert_eq!(store_name.as_deref(), Some("Example Store"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    // ==================== itemFilter ====================

    #[test]
    fn test_max_price_with_unknown_currency() {
        let result = validate_keywords(&[
            ("itemFilter.name", "MaxPrice"),
            ("itemFilter.value", "5.0"),
            ("itemFilter.paramName", "Currency"),
            ("itemFilter.paramValue", "ZZZ"),
        ]);
        assert_eq!(result, Err(FindingError::InvalidCurrencyId("ZZZ".to_string())));
    }

    #[test]
    fn test_numbered_item_filters_are_collected_before_cross_checks() {
        let result = validate_keywords(&[
            ("itemFilter(0).name", "ExcludeSeller"),
            ("itemFilter(0).value", "b"),
            ("itemFilter(1).name", "Seller"),
            ("itemFilter(1).value", "a"),
        ]);
        assert_eq!(
            result,
            Err(FindingError::ExclusiveFilters {
                first: ItemFilterName::Seller,
                second: ItemFilterName::ExcludeSeller,
            })
        );
    }

    #[test]
    fn test_local_search_only() {
        let filters = [
            ("itemFilter(0).name", "LocalSearchOnly"),
            ("itemFilter(0).value", "true"),
        ];
        let result = validate_keywords(&[filters[0], filters[1], ("buyerPostalCode", "95125")]);
        assert_eq!(result, Err(FindingError::MaxDistanceMissing));

        let result = validate_keywords(&[
            filters[0],
            filters[1],
            ("itemFilter(1).name", "MaxDistance"),
            ("itemFilter(1).value", "25"),
            ("buyerPostalCode", "95125"),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_exclude_category_limit() {
        let ids: Vec<String> = (0..26).map(|i| i.to_string()).collect();
        let keys: Vec<String> = (0..26).map(|i| format!("itemFilter.value({i})")).collect();

        let mut pairs = vec![("itemFilter.name", "ExcludeCategory")];
        pairs.extend(keys.iter().zip(&ids).take(25).map(|(k, v)| (k.as_str(), v.as_str())));
        assert!(validate_keywords(&pairs).is_ok());

        pairs.push((keys[25].as_str(), ids[25].as_str()));
        assert_eq!(
            validate_keywords(&pairs),
            Err(FindingError::TooManyValues {
                name: "ExcludeCategory".to_string(),
                max: 25,
            })
        );
    }

    #[test]
    fn test_start_time_must_be_after_validator_clock() {
        let result = validate_keywords(&[
            ("itemFilter.name", "StartTimeFrom"),
            ("itemFilter.value", "2024-05-31T00:00:00Z"),
        ]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidRange);

        let result = validate_keywords(&[
            ("itemFilter.name", "StartTimeFrom"),
            ("itemFilter.value", "2024-06-02T00:00:00Z"),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_mixed_item_filter_syntax() {
        let result = validate_keywords(&[
            ("itemFilter.name", "FreeShippingOnly"),
            ("itemFilter.value", "true"),
            ("itemFilter(0).name", "LotsOnly"),
            ("itemFilter(0).value", "true"),
        ]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidFilterSyntax);
    }

    #[test]
    fn test_item_filter_fields_without_name_are_ignored() {
        let request = validate_keywords(&[("itemFilter.value", "true")]).unwrap();
        assert!(request.common().item_filters.is_empty());

        let request = validate_keywords(&[
            ("itemFilter(0).name", "FreeShippingOnly"),
            ("itemFilter(0).value", "true"),
            ("itemFilter.paramName", "Currency"),
        ])
        .unwrap();
        assert_eq!(request.common().item_filters.len(), 1);
    }

    // ==================== 共通パラメータ ====================

    #[test]
    fn test_buyer_postal_code_length() {
        assert_eq!(
            validate_keywords(&[("buyerPostalCode", "95")]),
            Err(FindingError::InvalidPostalCode("95".to_string()))
        );
        assert!(validate_keywords(&[("buyerPostalCode", "951")]).is_ok());
    }

    #[test]
    fn test_output_selectors() {
        let request = validate_keywords(&[
            ("outputSelector(0)", "SellerInfo"),
            ("outputSelector(1)", "StoreInfo"),
        ])
        .unwrap();
        assert_eq!(
            request.common().output_selectors,
            vec![OutputSelector::SellerInfo, OutputSelector::StoreInfo]
        );

        assert_eq!(
            validate_keywords(&[("outputSelector", "Everything")]),
            Err(FindingError::InvalidOutputSelector("Everything".to_string()))
        );
    }

    #[test]
    fn test_pagination_bounds() {
        let request = validate_keywords(&[
            ("paginationInput.entriesPerPage", "100"),
            ("paginationInput.pageNumber", "1"),
        ])
        .unwrap();
        assert_eq!(
            request.common().pagination,
            PaginationInput {
                entries_per_page: Some(100),
                page_number: Some(1),
            }
        );

        assert_eq!(
            validate_keywords(&[("paginationInput.entriesPerPage", "101")]),
            Err(FindingError::InvalidEntriesPerPage("101".to_string()))
        );
        assert_eq!(
            validate_keywords(&[("paginationInput.pageNumber", "0")]),
            Err(FindingError::InvalidPageNumber("0".to_string()))
        );
        assert!(validate_keywords(&[("paginationInput.pageNumber", "ten")]).is_err());
    }

    #[test]
    fn test_sort_order() {
        assert!(validate_keywords(&[("sortOrder", "EndTimeSoonest")]).is_ok());
        assert_eq!(
            validate_keywords(&[("sortOrder", "Cheapest")]),
            Err(FindingError::InvalidSortOrder("Cheapest".to_string()))
        );
        assert_eq!(
            validate_keywords(&[("sortOrder", "BidCountMost")]),
            Err(FindingError::AuctionListingMissing("BidCountMost".to_string()))
        );
        assert!(validate_keywords(&[
            ("sortOrder", "BidCountMost"),
            ("itemFilter.name", "ListingType"),
            ("itemFilter.value", "Auction"),
        ])
        .is_ok());
    }

    // ==================== affiliate ====================

    #[test]
    fn test_affiliate() {
        let request = validate_keywords(&[
            ("affiliate.customId", "k-123"),
            ("affiliate.geoTargeting", "true"),
            ("affiliate.networkId", "9"),
            ("affiliate.trackingId", "5337000000"),
        ])
        .unwrap();
        assert_eq!(
            request.common().affiliate,
            Some(Affiliate {
                custom_id: Some("k-123".to_string()),
                geo_targeting: Some(true),
                tracking: Some(AffiliateTracking {
                    network_id: 9,
                    tracking_id: "5337000000".to_string(),
                }),
            })
        );
    }

    #[test]
    fn test_affiliate_tracking_must_be_paired() {
        assert_eq!(
            validate_keywords(&[("affiliate.networkId", "2")]),
            Err(FindingError::NetworkIdOrTrackingIdMissing)
        );
        assert_eq!(
            validate_keywords(&[("affiliate.trackingId", "abc")]),
            Err(FindingError::NetworkIdOrTrackingIdMissing)
        );
    }

    #[test]
    fn test_affiliate_network_id_range() {
        for network_id in ["1", "10", "x"] {
            assert_eq!(
                validate_keywords(&[
                    ("affiliate.networkId", network_id),
                    ("affiliate.trackingId", "abc"),
                ]),
                Err(FindingError::InvalidNetworkId(network_id.to_string()))
            );
        }
        assert!(validate_keywords(&[
            ("affiliate.networkId", "2"),
            ("affiliate.trackingId", "abc"),
        ])
        .is_ok());
    }

    #[test]
    fn test_affiliate_campaign_id() {
        assert_eq!(
            validate_keywords(&[
                ("affiliate.networkId", "9"),
                ("affiliate.trackingId", "123456789"),
            ]),
            Err(FindingError::InvalidCampaignId("123456789".to_string()))
        );
    }

    #[test]
    fn test_affiliate_custom_id_length() {
        let long = "c".repeat(257);
        assert_eq!(
            validate_keywords(&[("affiliate.customId", long.as_str())]),
            Err(FindingError::InvalidCustomIdLength(257))
        );
    }
}
