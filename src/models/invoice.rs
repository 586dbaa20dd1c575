use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Datelike, Utc};
use serde::{ser::Error as _, Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// document 字段允许的最大长度 (按 Unicode 码点计)
pub const DOCUMENT_MAX_LENGTH: usize = 14;

/// 发票记录 (invoice 表)
///
/// `deactivated_at` 有值 ⇔ `is_active == false`
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub reference_month: i32,
    pub reference_year: i32,
    pub document: String,
    /// 没有描述时输出空字符串
    #[serde(serialize_with = "description_or_empty")]
    pub description: Option<String>,
    /// 存储为 NUMERIC, JSON 中输出为数字
    #[serde(serialize_with = "amount_as_number")]
    pub amount: BigDecimal,
    pub is_active: bool,
    #[serde(rename = "deactiveAt")]
    pub deactivated_at: Option<DateTime<Utc>>,
}

fn description_or_empty<S: Serializer>(
    description: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(description.as_deref().unwrap_or_default())
}

fn amount_as_number<S: Serializer>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    match amount.to_f64() {
        Some(value) if value.is_finite() => serializer.serialize_f64(value),
        _ => Err(S::Error::custom(format!("amount {} is out of range", amount))),
    }
}

/// 新建发票 (尚未分配 id)
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub created_at: DateTime<Utc>,
    pub reference_month: i32,
    pub reference_year: i32,
    pub document: String,
    pub description: Option<String>,
    pub amount: BigDecimal,
}

impl NewInvoice {
    /// 以当前时间作为创建时间和所属期间
    pub fn issued_now(document: String, description: Option<String>, amount: BigDecimal) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            reference_month: now.month() as i32,
            reference_year: now.year(),
            document,
            description,
            amount,
        }
    }

    pub fn into_invoice(self, id: i64) -> Invoice {
        Invoice {
            id,
            created_at: self.created_at,
            reference_month: self.reference_month,
            reference_year: self.reference_year,
            document: self.document,
            description: self.description,
            amount: self.amount,
            is_active: true,
            deactivated_at: None,
        }
    }
}

/// document 长度是否超限
pub fn document_too_long(document: &str) -> bool {
    document.chars().count() > DOCUMENT_MAX_LENGTH
}
