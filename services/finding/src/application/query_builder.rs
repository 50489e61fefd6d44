// Finding APIクエリの組み立て
//
// 検証済みのSearchRequestを送信用のクエリパラメータ列に変換する。
// 繰り返し属性は入力の構文に関わらず常に番号付き構文で出力する。

use url::Url;
use url::form_urlencoded;

use crate::domain::{SearchCommon, SearchRequest};

/// SERVICE-VERSIONの値
pub const SERVICE_VERSION: &str = "1.0.0";

/// RESPONSE-DATA-FORMATの値
pub const RESPONSE_DATA_FORMAT: &str = "JSON";

/// 制御パラメータのキー
pub const CONTROL_KEYS: [&str; 4] = [
    "OPERATION-NAME",
    "SERVICE-VERSION",
    "SECURITY-APPNAME",
    "RESPONSE-DATA-FORMAT",
];

/// 送信用クエリ
///
/// 制御パラメータ4件に続けて、検証済みフィールドを決まった順序で保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingQuery {
    pairs: Vec<(String, String)>,
}

impl FindingQuery {
    /// 検証済みリクエストとApp IDからクエリを組み立てる
    pub fn build(request: &SearchRequest, app_id: &str) -> Self {
        let mut query = Self { pairs: Vec::new() };

        query.push("OPERATION-NAME", request.operation().name());
        query.push("SERVICE-VERSION", SERVICE_VERSION);
        query.push("SECURITY-APPNAME", app_id);
        query.push("RESPONSE-DATA-FORMAT", RESPONSE_DATA_FORMAT);

        match request {
            SearchRequest::ByKeywords { keywords, common } => {
                query.push("keywords", keywords.as_str());
                query.push_common(common);
            }
            SearchRequest::ByCategory {
                category_ids,
                common,
            } => {
                query.push_list("categoryId", category_ids.as_slice());
                query.push_common(common);
            }
            SearchRequest::Advanced {
                category_ids,
                keywords,
                description_search,
                common,
            } => {
                if let Some(ids) = category_ids {
                    query.push_list("categoryId", ids.as_slice());
                }
                if let Some(keywords) = keywords {
                    query.push("keywords", keywords.as_str());
                }
                if let Some(description_search) = description_search {
                    query.push("descriptionSearch", &description_search.to_string());
                }
                query.push_common(common);
            }
            SearchRequest::ByProduct { product_id, common } => {
                query.push("productId.@type", product_id.id_type().as_str());
                query.push("productId", product_id.value());
                query.push_common(common);
            }
            SearchRequest::InStores {
                store_name,
                category_ids,
                keywords,
                common,
            } => {
                if let Some(store_name) = store_name {
                    query.push("storeName", store_name);
                }
                if let Some(ids) = category_ids {
                    query.push_list("categoryId", ids.as_slice());
                }
                if let Some(keywords) = keywords {
                    query.push("keywords", keywords.as_str());
                }
                query.push_common(common);
            }
        }

        query
    }

    /// キーと値の組
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// 制御パラメータを除いた組
    pub fn field_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .filter(|(key, _)| !CONTROL_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// URLエンコード済みのクエリ文字列
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }

    /// エンドポイントにクエリを付与したURL
    pub fn url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut().extend_pairs(&self.pairs);
        url
    }

    fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    fn push_list(&mut self, root: &str, values: &[String]) {
        for (i, value) in values.iter().enumerate() {
            self.push(format!("{root}({i})"), value.as_str());
        }
    }

    fn push_common(&mut self, common: &SearchCommon) {
        for (i, filter) in common.item_filters.iter().enumerate() {
            let prefix = format!("itemFilter({i})");
            self.push(format!("{prefix}.name"), filter.name.as_str());
            self.push_list(&format!("{prefix}.value"), &filter.values);
            if let Some(param) = &filter.param {
                self.push(format!("{prefix}.paramName"), param.name.as_str());
                self.push(format!("{prefix}.paramValue"), param.value.as_str());
            }
        }

        for (i, filter) in common.aspect_filters.iter().enumerate() {
            let prefix = format!("aspectFilter({i})");
            self.push(format!("{prefix}.aspectName"), filter.aspect_name.as_str());
            self.push_list(&format!("{prefix}.aspectValueName"), &filter.value_names);
        }

        for (i, selector) in common.output_selectors.iter().enumerate() {
            self.push(format!("outputSelector({i})"), selector.as_str());
        }

        if let Some(affiliate) = &common.affiliate {
            if let Some(custom_id) = &affiliate.custom_id {
                self.push("affiliate.customId", custom_id.as_str());
            }
            if let Some(geo_targeting) = affiliate.geo_targeting {
                self.push("affiliate.geoTargeting", geo_targeting.to_string());
            }
            if let Some(tracking) = &affiliate.tracking {
                self.push("affiliate.networkId", tracking.network_id.to_string());
                self.push("affiliate.trackingId", tracking.tracking_id.as_str());
            }
        }

        if let Some(code) = &common.buyer_postal_code {
            self.push("buyerPostalCode", code.as_str());
        }

        if let Some(entries) = common.pagination.entries_per_page {
            self.push("paginationInput.entriesPerPage", entries.to_string());
        }
        if let Some(page) = common.pagination.page_number {
            self.push("paginationInput.pageNumber", page.to_string());
        }

        if let Some(sort_order) = common.sort_order {
            self.push("sortOrder", sort_order.as_str());
        }
    }
}
