/// 商品識別子（productId）の検証
///
/// - ReferenceID: 空でない任意の文字列
/// - ISBN: 10桁（末尾のみ'X'可）または13桁
/// - UPC: 12桁
/// - EAN: 8桁または13桁
use std::str::FromStr;

use super::FindingError;

/// productId.@typeの値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductIdType {
    ReferenceId,
    Isbn,
    Upc,
    Ean,
}

impl ProductIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductIdType::ReferenceId => "ReferenceID",
            ProductIdType::Isbn => "ISBN",
            ProductIdType::Upc => "UPC",
            ProductIdType::Ean => "EAN",
        }
    }
}

impl FromStr for ProductIdType {
    type Err = FindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ReferenceID" => Ok(ProductIdType::ReferenceId),
            "ISBN" => Ok(ProductIdType::Isbn),
            "UPC" => Ok(ProductIdType::Upc),
            "EAN" => Ok(ProductIdType::Ean),
            other => Err(FindingError::UnsupportedProductIdType(other.to_string())),
        }
    }
}

/// 検証済みの商品識別子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductId {
    id_type: ProductIdType,
    value: String,
}

impl ProductId {
    /// 種別ごとの長さ・チェックサムを検証して作成
    pub fn new(id_type: ProductIdType, value: impl Into<String>) -> Result<Self, FindingError> {
        let value = value.into();
        match id_type {
            ProductIdType::ReferenceId => {
                if value.is_empty() {
                    return Err(FindingError::InvalidReferenceIdLength(0));
                }
            }
            ProductIdType::Isbn => validate_isbn(&value)?,
            ProductIdType::Upc => validate_upc(&value)?,
            ProductIdType::Ean => validate_ean(&value)?,
        }
        Ok(Self { id_type, value })
    }

    pub fn id_type(&self) -> ProductIdType {
        self.id_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// ISBN-10またはISBN-13を検証
pub fn validate_isbn(isbn: &str) -> Result<(), FindingError> {
    let valid = match isbn.len() {
        10 => is_valid_isbn10(isbn),
        13 => is_valid_gtin(isbn),
        len => return Err(FindingError::InvalidIsbnLength(len)),
    };
    if valid {
        Ok(())
    } else {
        Err(FindingError::InvalidIsbn(isbn.to_string()))
    }
}

/// UPC-Aを検証
pub fn validate_upc(upc: &str) -> Result<(), FindingError> {
    if upc.len() != 12 {
        return Err(FindingError::InvalidUpcLength(upc.len()));
    }
    if is_valid_gtin(upc) {
        Ok(())
    } else {
        Err(FindingError::InvalidUpc(upc.to_string()))
    }
}

/// EAN-8またはEAN-13を検証
pub fn validate_ean(ean: &str) -> Result<(), FindingError> {
    if ean.len() != 8 && ean.len() != 13 {
        return Err(FindingError::InvalidEanLength(ean.len()));
    }
    if is_valid_gtin(ean) {
        Ok(())
    } else {
        Err(FindingError::InvalidEan(ean.to_string()))
    }
}

/// ISBN-10のチェックサム
///
/// 各桁の累積和をさらに合計し、11で割り切れれば有効。
/// 10を表す'X'は最終桁のみ。
fn is_valid_isbn10(isbn: &str) -> bool {
    let mut running = 0u32;
    let mut total = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let digit = match c {
            'X' if i == 9 => 10,
            c => match c.to_digit(10) {
                Some(d) => d,
                None => return false,
            },
        };
        running += digit;
        total += running;
    }
    total % 11 == 0
}

/// UPC / EAN / ISBN-13 共通のチェックサム
///
/// チェックディジットの重みが1になるよう右端から1,3,1,3...と重み付けする。
/// そのため偶数位置の重みは長さ8・12では3、長さ13では1になる。
fn is_valid_gtin(code: &str) -> bool {
    let len = code.len();
    let mut sum = 0u32;
    for (i, c) in code.chars().enumerate() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        let weight = if (len - 1 - i) % 2 == 1 { 3 } else { 1 };
        sum += digit * weight;
    }
    sum % 10 == 0
}
