// Domain layer modules
pub mod cross_filter;
pub mod error;
pub mod filter_rules;
pub mod item_filter;
pub mod product_id;
pub mod response;
pub mod search_request;

// Re-exports
pub use error::{ApiErrorBody, ErrorKind, FindingError};
pub use filter_rules::{FilterContext, FilterRule, rule_for, validate_item_filter};
pub use item_filter::{AspectFilter, FilterParam, ItemFilter, ItemFilterName};
pub use product_id::{ProductId, ProductIdType};
pub use response::{FindItemsResponse, SearchItem, SearchResponse, UpstreamError};
pub use search_request::{
    Affiliate, AffiliateTracking, CategoryIds, Keywords, Operation, OutputSelector,
    PaginationInput, SearchCommon, SearchRequest, SortOrder,
};
