/// Finding APIレスポンスエンベロープ
///
/// 上流APIはXMLからの変換の都合で、すべてのスカラー値・構造体を要素数1の配列で包んで返す。
/// 下流では`[0]`で参照するため、この形はそのまま保持する。
use serde::{Deserialize, Serialize};

use super::search_request::Operation;
use super::FindingError;

/// 通貨付き金額: `{"@currencyId": "USD", "__value__": "1.0"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    #[serde(rename = "@currencyId", default, skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    #[serde(rename = "__value__", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub category_id: Vec<String>,
    #[serde(default)]
    pub category_name: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    #[serde(default)]
    pub shipping_service_cost: Vec<Amount>,
    #[serde(default)]
    pub shipping_type: Vec<String>,
    #[serde(default)]
    pub ship_to_locations: Vec<String>,
    #[serde(default)]
    pub expedited_shipping: Vec<String>,
    #[serde(default)]
    pub one_day_shipping_available: Vec<String>,
    #[serde(default)]
    pub handling_time: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellingStatus {
    #[serde(default)]
    pub current_price: Vec<Amount>,
    #[serde(default)]
    pub converted_current_price: Vec<Amount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bid_count: Vec<String>,
    #[serde(default)]
    pub selling_state: Vec<String>,
    #[serde(default)]
    pub time_left: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInfo {
    #[serde(default)]
    pub best_offer_enabled: Vec<String>,
    #[serde(default)]
    pub buy_it_now_available: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buy_it_now_price: Vec<Amount>,
    #[serde(default)]
    pub start_time: Vec<String>,
    #[serde(default)]
    pub end_time: Vec<String>,
    #[serde(default)]
    pub listing_type: Vec<String>,
    #[serde(default)]
    pub gift: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watch_count: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCondition {
    #[serde(default)]
    pub condition_id: Vec<String>,
    #[serde(default)]
    pub condition_display_name: Vec<String>,
}

/// 検索結果のアイテム
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    #[serde(default)]
    pub item_id: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub global_id: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitle: Vec<String>,
    #[serde(default)]
    pub primary_category: Vec<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_category: Vec<Category>,
    #[serde(rename = "galleryURL", default)]
    pub gallery_url: Vec<String>,
    #[serde(rename = "viewItemURL", default)]
    pub view_item_url: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_id: Vec<Amount>,
    #[serde(default)]
    pub auto_pay: Vec<String>,
    #[serde(default)]
    pub postal_code: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub country: Vec<String>,
    #[serde(default)]
    pub shipping_info: Vec<ShippingInfo>,
    #[serde(default)]
    pub selling_status: Vec<SellingStatus>,
    #[serde(default)]
    pub listing_info: Vec<ListingInfo>,
    #[serde(default)]
    pub returns_accepted: Vec<String>,
    #[serde(default)]
    pub condition: Vec<ItemCondition>,
    #[serde(default)]
    pub is_multi_variation_listing: Vec<String>,
    #[serde(default)]
    pub top_rated_listing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "@count", default)]
    pub count: String,
    #[serde(default)]
    pub item: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOutput {
    #[serde(default)]
    pub page_number: Vec<String>,
    #[serde(default)]
    pub entries_per_page: Vec<String>,
    #[serde(default)]
    pub total_pages: Vec<String>,
    #[serde(default)]
    pub total_entries: Vec<String>,
}

/// 上流APIが報告するエラー詳細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamError {
    #[serde(default)]
    pub error_id: Vec<String>,
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub severity: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub message: Vec<String>,
    #[serde(default)]
    pub subdomain: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub error: Vec<UpstreamError>,
}

/// オペレーション共通のレスポンス本体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindItemsResponse {
    #[serde(default)]
    pub ack: Vec<String>,
    #[serde(default)]
    pub version: Vec<String>,
    #[serde(default)]
    pub timestamp: Vec<String>,
    #[serde(default)]
    pub search_result: Vec<SearchResult>,
    #[serde(default)]
    pub pagination_output: Vec<PaginationOutput>,
    #[serde(rename = "itemSearchURL", default)]
    pub item_search_url: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_message: Vec<ErrorMessage>,
}

/// デコード済みレスポンス
///
/// トップレベル配列が空でも、errorMessageを含んでいてもデコード自体は成功とし、
/// 0件検索と上流エラーの区別は呼び出し側が行う。
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub operation: Operation,
    pub responses: Vec<FindItemsResponse>,
}

impl SearchResponse {
    /// `{"<operation>Response": [...]}`形式のJSONをデコード
    pub fn decode(operation: Operation, body: &[u8]) -> Result<Self, FindingError> {
        let mut envelope: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(body).map_err(|e| FindingError::Decode(e.to_string()))?;

        let payload = envelope.remove(operation.response_key()).ok_or_else(|| {
            FindingError::Decode(format!("missing {} field", operation.response_key()))
        })?;

        let responses: Vec<FindItemsResponse> =
            serde_json::from_value(payload).map_err(|e| FindingError::Decode(e.to_string()))?;

        Ok(Self {
            operation,
            responses,
        })
    }

    /// エンベロープ形式のJSONに戻す
    pub fn to_json(&self) -> Result<serde_json::Value, FindingError> {
        let responses =
            serde_json::to_value(&self.responses).map_err(|e| FindingError::Decode(e.to_string()))?;
        let mut envelope = serde_json::Map::new();
        envelope.insert(self.operation.response_key().to_string(), responses);
        Ok(serde_json::Value::Object(envelope))
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// 全レスポンスのアイテム
    pub fn items(&self) -> Vec<&SearchItem> {
        self.responses
            .iter()
            .flat_map(|r| &r.search_result)
            .flat_map(|sr| &sr.item)
            .collect()
    }

    /// 上流APIが報告したエラー
    pub fn upstream_errors(&self) -> Vec<&UpstreamError> {
        self.responses
            .iter()
            .flat_map(|r| &r.error_message)
            .flat_map(|m| &m.error)
            .collect()
    }

    pub fn has_upstream_errors(&self) -> bool {
        !self.upstream_errors().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYWORDS_RESPONSE: &str = r#"{
        "findItemsByKeywordsResponse": [{
            "ack": ["Success"],
            "version": ["1.13.0"],
            "timestamp": ["2026-10-19T12:00:00.000Z"],
            "searchResult": [{
                "@count": "1",
                "item": [{
                    "itemId": ["402695528150"],
                    "title": ["Campfire Marshmallows"],
                    "globalId": ["EBAY-US"],
                    "primaryCategory": [{"categoryId": ["11116"], "categoryName": ["Candy"]}],
                    "galleryURL": ["https://i.ebayimg.com/thumbs/1.jpg"],
                    "viewItemURL": ["https://www.ebay.com/itm/402695528150"],
                    "autoPay": ["true"],
                    "postalCode": ["100**"],
                    "location": ["New York,NY,USA"],
                    "country": ["US"],
                    "shippingInfo": [{
                        "shippingServiceCost": [{"@currencyId": "USD", "__value__": "0.0"}],
                        "shippingType": ["Free"],
                        "shipToLocations": ["Worldwide"],
                        "expeditedShipping": ["false"],
                        "oneDayShippingAvailable": ["false"],
                        "handlingTime": ["1"]
                    }],
                    "sellingStatus": [{
                        "currentPrice": [{"@currencyId": "USD", "__value__": "4.99"}],
                        "convertedCurrentPrice": [{"@currencyId": "USD", "__value__": "4.99"}],
                        "sellingState": ["Active"],
                        "timeLeft": ["P29DT1H"]
                    }],
                    "listingInfo": [{
                        "bestOfferEnabled": ["false"],
                        "buyItNowAvailable": ["false"],
                        "startTime": ["2026-10-01T00:00:00.000Z"],
                        "endTime": ["2026-11-01T00:00:00.000Z"],
                        "listingType": ["FixedPrice"],
                        "gift": ["false"]
                    }],
                    "returnsAccepted": ["true"],
                    "condition": [{"conditionId": ["1000"], "conditionDisplayName": ["New"]}],
                    "isMultiVariationListing": ["false"],
                    "topRatedListing": ["true"]
                }]
            }],
            "paginationOutput": [{
                "pageNumber": ["1"],
                "entriesPerPage": ["100"],
                "totalPages": ["1"],
                "totalEntries": ["1"]
            }],
            "itemSearchURL": ["https://www.ebay.com/sch/i.html?_nkw=marshmallows"]
        }]
    }"#;

    #[test]
    fn test_decode_keeps_single_element_arrays() {
        let response =
            SearchResponse::decode(Operation::FindItemsByKeywords, KEYWORDS_RESPONSE.as_bytes())
                .unwrap();

        assert_eq!(response.responses.len(), 1);
        let body = &response.responses[0];
        assert_eq!(body.ack, vec!["Success"]);
        assert_eq!(body.search_result[0].count, "1");

        let items = response.items();
        assert_eq!(items.len(), 1);
        let item = items[0];
        assert_eq!(item.item_id[0], "402695528150");
        assert_eq!(item.primary_category[0].category_name[0], "Candy");
        assert_eq!(item.selling_status[0].current_price[0].value, "4.99");
        assert_eq!(
            item.selling_status[0].current_price[0].currency_id.as_deref(),
            Some("USD")
        );
        assert_eq!(item.shipping_info[0].shipping_type[0], "Free");
        assert_eq!(item.listing_info[0].listing_type[0], "FixedPrice");
        assert_eq!(item.condition[0].condition_display_name[0], "New");
        assert_eq!(
            body.item_search_url[0],
            "https://www.ebay.com/sch/i.html?_nkw=marshmallows"
        );
        assert!(!response.has_upstream_errors());
    }

    #[test]
    fn test_to_json_preserves_envelope_shape() {
        let response =
            SearchResponse::decode(Operation::FindItemsByKeywords, KEYWORDS_RESPONSE.as_bytes())
                .unwrap();
        let json = response.to_json().unwrap();

        let item = &json["findItemsByKeywordsResponse"][0]["searchResult"][0]["item"][0];
        assert_eq!(item["itemId"][0], "402695528150");
        assert_eq!(item["sellingStatus"][0]["currentPrice"][0]["__value__"], "4.99");
        assert_eq!(item["viewItemURL"][0], "https://www.ebay.com/itm/402695528150");
    }

    #[test]
    fn test_empty_top_level_array_is_valid() {
        let body = br#"{"findItemsByCategoryResponse": []}"#;
        let response = SearchResponse::decode(Operation::FindItemsByCategory, body).unwrap();

        assert!(response.is_empty());
        assert!(response.items().is_empty());
    }

    #[test]
    fn test_error_message_is_valid_decoded_value() {
        let body = br#"{
            "findItemsAdvancedResponse": [{
                "ack": ["Failure"],
                "errorMessage": [{
                    "error": [{
                        "errorId": ["2"],
                        "domain": ["Security"],
                        "severity": ["Error"],
                        "category": ["System"],
                        "message": ["Authentication failed : Invalid Application"],
                        "subdomain": ["Authentication"]
                    }]
                }],
                "version": ["1.13.0"],
                "timestamp": ["2026-10-19T12:00:00.000Z"]
            }]
        }"#;
        let response = SearchResponse::decode(Operation::FindItemsAdvanced, body).unwrap();

        assert!(response.items().is_empty());
        assert!(response.has_upstream_errors());
        let errors = response.upstream_errors();
        assert_eq!(errors[0].error_id, vec!["2"]);
        assert_eq!(
            errors[0].message[0],
            "Authentication failed : Invalid Application"
        );
    }

    #[test]
    fn test_malformed_json_is_decode_failure() {
        let result = SearchResponse::decode(Operation::FindItemsByKeywords, b"<html>");
        assert!(matches!(result, Err(FindingError::Decode(_))));
    }

    #[test]
    fn test_wrong_operation_key_is_decode_failure() {
        let result =
            SearchResponse::decode(Operation::FindItemsByProduct, KEYWORDS_RESPONSE.as_bytes());
        assert_eq!(
            result,
            Err(FindingError::Decode(
                "missing findItemsByProductResponse field".to_string()
            ))
        );
    }

    #[test]
    fn test_unwrapped_scalar_is_decode_failure() {
        // 配列で包まれていない値は上流の形式に反する
        let body = br#"{"findItemsByKeywordsResponse": [{"ack": "Success"}]}"#;
        let result = SearchResponse::decode(Operation::FindItemsByKeywords, body);
        assert!(matches!(result, Err(FindingError::Decode(_))));
    }
}
