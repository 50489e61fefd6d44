// クエリパラメータの構文解析
//
// フラットな文字列マップから、繰り返し属性（itemFilter / aspectFilter /
// outputSelector）を番号付き構文・番号なし構文のどちらかで取り出す。
// 値の妥当性はここでは検証しない。

use std::collections::BTreeMap;

use crate::domain::{AspectFilter, FilterParam, FindingError, ItemFilter, ItemFilterName};

/// 呼び出し元から受け取った生パラメータ
///
/// キーは一意で順序は意味を持たない。受信後は変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParameters(BTreeMap<String, String>);

impl RawParameters {
    pub fn new(params: BTreeMap<String, String>) -> Self {
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// 指定プレフィックスで始まるキーが存在するか
    pub fn has_key_with_prefix(&self, prefix: &str) -> bool {
        self.0.keys().any(|key| key.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// 繰り返し属性の構文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSyntax {
    /// 指定なし
    Absent,
    /// `family.field`
    NonNumbered,
    /// `family(0).field`
    Numbered,
}

/// 繰り返しキーの値一覧を取得
///
/// `root(0)`, `root(1)`, ... を最初の欠番まで収集し、
/// 番号付きキーがなければ`root`そのものを使う。
///
/// # Errors
/// - `root`と`root(0)`が両方ある: `InvalidFilterSyntax`
/// - どちらもない: `IncompleteFilter`
pub fn parse_values(params: &RawParameters, root: &str) -> Result<Vec<String>, FindingError> {
    let bare = params.get(root);
    if bare.is_some() && params.contains(&indexed(root, 0)) {
        return Err(FindingError::InvalidFilterSyntax(root.to_string()));
    }

    let values: Vec<String> = (0..)
        .map_while(|i| params.get(&indexed(root, i)).map(str::to_string))
        .collect();
    if !values.is_empty() {
        return Ok(values);
    }

    bare.map(|v| vec![v.to_string()])
        .ok_or_else(|| FindingError::IncompleteFilter(root.to_string()))
}

/// フィルター系統の構文を判定
///
/// 名前フィールド（`family.name`と`family(0).name`）の有無だけで判定する。
/// 両方あればエラー、どちらもなければ指定なし。
pub fn classify(
    params: &RawParameters,
    family: &str,
    name_field: &str,
) -> Result<FilterSyntax, FindingError> {
    let non_numbered = params.contains(&format!("{family}.{name_field}"));
    let numbered = params.contains(&format!("{}.{name_field}", indexed(family, 0)));
    match (non_numbered, numbered) {
        (true, true) => Err(FindingError::InvalidFilterSyntax(family.to_string())),
        (true, false) => Ok(FilterSyntax::NonNumbered),
        (false, true) => Ok(FilterSyntax::Numbered),
        (false, false) => Ok(FilterSyntax::Absent),
    }
}

/// itemFilterを全件取り出す（単体検証前）
pub fn parse_item_filters(params: &RawParameters) -> Result<Vec<ItemFilter>, FindingError> {
    group_prefixes(params, "itemFilter", "name")?
        .iter()
        .map(|prefix| parse_item_filter(params, prefix))
        .collect()
}

/// aspectFilterを全件取り出す
pub fn parse_aspect_filters(params: &RawParameters) -> Result<Vec<AspectFilter>, FindingError> {
    group_prefixes(params, "aspectFilter", "aspectName")?
        .iter()
        .map(|prefix| -> Result<AspectFilter, FindingError> {
            let name_key = format!("{prefix}.aspectName");
            let aspect_name = params
                .get(&name_key)
                .ok_or(FindingError::IncompleteFilter(name_key))?;
            Ok(AspectFilter {
                aspect_name: aspect_name.to_string(),
                value_names: parse_values(params, &format!("{prefix}.aspectValueName"))?,
            })
        })
        .collect()
}

/// outputSelectorの値一覧を取り出す（未指定なら空）
///
/// outputSelectorはフィールドを持たないため、`outputSelector`と
/// `outputSelector(0)`の組み合わせで構文を判定する。
pub fn parse_output_selector_values(params: &RawParameters) -> Result<Vec<String>, FindingError> {
    const ROOT: &str = "outputSelector";
    if !params.contains(ROOT) && !params.has_key_with_prefix(&format!("{ROOT}(")) {
        return Ok(Vec::new());
    }
    parse_values(params, ROOT)
}

fn indexed(root: &str, index: usize) -> String {
    format!("{root}({index})")
}

/// 系統ごとのグループのキープレフィックス一覧
///
/// 番号なし構文なら`family`一つ、番号付き構文なら`family(0)`から
/// 名前フィールドが途切れるまで。
fn group_prefixes(
    params: &RawParameters,
    family: &str,
    name_field: &str,
) -> Result<Vec<String>, FindingError> {
    let prefixes = match classify(params, family, name_field)? {
        FilterSyntax::Absent => Vec::new(),
        FilterSyntax::NonNumbered => vec![family.to_string()],
        FilterSyntax::Numbered => (0..)
            .map(|i| indexed(family, i))
            .take_while(|prefix| params.contains(&format!("{prefix}.{name_field}")))
            .collect(),
    };
    Ok(prefixes)
}

fn parse_item_filter(params: &RawParameters, prefix: &str) -> Result<ItemFilter, FindingError> {
    let name_key = format!("{prefix}.name");
    let name: ItemFilterName = params
        .get(&name_key)
        .ok_or(FindingError::IncompleteFilter(name_key))?
        .parse()?;
    let values = parse_values(params, &format!("{prefix}.value"))?;

    let param_name = params.get(&format!("{prefix}.paramName"));
    let param_value = params.get(&format!("{prefix}.paramValue"));
    let param = match (param_name, param_value) {
        (Some(name), Some(value)) => Some(FilterParam {
            name: name.to_string(),
            value: value.to_string(),
        }),
        (None, None) => None,
        _ => return Err(FindingError::IncompleteFilterParam),
    };

    Ok(ItemFilter {
        name,
        values,
        param,
    })
}
