use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// 可过滤、可排序的字段 (封闭集合)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryField {
    Document,
    ReferenceMonth,
    ReferenceYear,
}

impl QueryField {
    pub const ALL: [QueryField; 3] = [
        QueryField::Document,
        QueryField::ReferenceMonth,
        QueryField::ReferenceYear,
    ];

    /// 查询参数中的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryField::Document => "document",
            QueryField::ReferenceMonth => "referenceMonth",
            QueryField::ReferenceYear => "referenceYear",
        }
    }

    /// 对应的数据库列名
    pub fn column(&self) -> &'static str {
        match self {
            QueryField::Document => "document",
            QueryField::ReferenceMonth => "reference_month",
            QueryField::ReferenceYear => "reference_year",
        }
    }
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or(())
    }
}

/// 排序指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: QueryField,
    pub desc: bool,
}

impl Sort {
    pub fn asc(field: QueryField) -> Self {
        Self { field, desc: false }
    }

    pub fn desc(field: QueryField) -> Self {
        Self { field, desc: true }
    }

    /// SQL 排序方向
    pub fn direction(&self) -> &'static str {
        if self.desc {
            "DESC"
        } else {
            "ASC"
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction())
    }
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 5;

/// 分页参数, page 从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }
    }

    /// ceil(total / per_page); total 为 0 时返回 0
    pub fn last_page(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let per_page = self.per_page.max(1);
        // total > 0, 不会溢出
        (total - 1) / per_page + 1
    }

    pub fn is_within(&self, last_page: i64) -> bool {
        self.page >= 1 && self.page <= last_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// 单次列表请求的过滤、排序和分页条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filters: IndexMap<QueryField, String>,
    /// 靠前的排序指令优先级更高
    pub sorts: Vec<Sort>,
    pub pagination: Pagination,
}

impl QueryOptions {
    pub fn with_pagination(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }

    pub fn filter(&self, field: QueryField) -> Option<&str> {
        self.filters.get(&field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sort_renders_direction() {
        assert_eq!(Sort::asc(QueryField::Document).direction(), "ASC");
        assert_eq!(Sort::desc(QueryField::Document).direction(), "DESC");
        assert_eq!(Sort::asc(QueryField::Document).to_string(), "document ASC");
        assert_eq!(
            Sort::desc(QueryField::ReferenceYear).to_string(),
            "referenceYear DESC"
        );
    }

    #[test]
    fn field_names_round_trip() {
        for field in QueryField::ALL {
            assert_eq!(field.as_str().parse::<QueryField>(), Ok(field));
        }
        assert!("Document".parse::<QueryField>().is_err());
        assert!("amount".parse::<QueryField>().is_err());
    }

    #[test]
    fn default_pagination() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 5);
        assert_eq!(pagination.offset(), 0);
        assert_eq!(pagination.limit(), 5);
    }

    #[test]
    fn last_page_and_bounds() {
        let pagination = Pagination::new(3, 5);
        assert_eq!(pagination.last_page(0), 0);
        assert_eq!(pagination.last_page(1), 1);
        assert_eq!(pagination.last_page(5), 1);
        assert_eq!(pagination.last_page(6), 2);
        assert_eq!(pagination.last_page(25), 5);
        assert_eq!(pagination.offset(), 10);

        assert!(pagination.is_within(3));
        assert!(!pagination.is_within(2));
        assert!(!Pagination::new(0, 5).is_within(3));
        assert!(!Pagination::new(-1, 5).is_within(3));
    }

    #[test]
    fn huge_per_page_fits_one_page() {
        let pagination = Pagination::new(1, i64::MAX);
        assert_eq!(pagination.last_page(2), 1);
        assert_eq!(pagination.last_page(i64::MAX), 1);
        assert!(pagination.is_within(pagination.last_page(2)));
        assert_eq!(pagination.offset(), 0);
        assert_eq!(Pagination::new(3, i64::MAX).offset(), i64::MAX);
        assert_eq!(Pagination::new(1, 1).last_page(i64::MAX), i64::MAX);
    }

    proptest! {
        #[test]
        fn last_page_is_ceiling(total in 1i64..=i64::MAX, per_page in 1i64..=i64::MAX) {
            let pagination = Pagination::new(1, per_page);
            let last = pagination.last_page(total);

            prop_assert!(pagination.is_within(last));
            // 最后一页必然非空
            let last_offset = Pagination::new(last, per_page).offset();
            prop_assert!(last_offset < total);
            prop_assert!(i128::from(last_offset) + i128::from(per_page) >= i128::from(total));
        }

        #[test]
        fn last_page_matches_small_ceiling(total in 1i64..100_000, per_page in 1i64..500) {
            let last = Pagination::new(1, per_page).last_page(total);
            prop_assert_eq!(last, (total as f64 / per_page as f64).ceil() as i64);
        }
    }
}
