//! 列表查询参数: 原始参数 → 校验 → `QueryOptions`

use crate::models::{document_too_long, Pagination, QueryField, QueryOptions, Sort, DOCUMENT_MAX_LENGTH};
use indexmap::IndexMap;

/// 列表接口认可的参数
pub const RECOGNIZED_PARAMS: [&str; 7] = [
    "document",
    "referenceMonth",
    "referenceYear",
    "sort",
    "apiToken",
    "page",
    "perPage",
];

pub const MALFORMED_SORT_MSG: &str =
    "malformed sort query. Correct syntax: sort=[-](document|referenceMonth|referenceYear)[,...]";

pub fn document_length_msg() -> String {
    format!(
        "parameter document cannot have length greater than {} characters",
        DOCUMENT_MAX_LENGTH
    )
}

/// 原始查询参数: 参数名 → 所有取值, 保持首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams(IndexMap<String, Vec<String>>);

impl RawParams {
    /// 解析 URL 查询串 (不含 `?`)
    pub fn parse(query: &str) -> Self {
        Self::from_bytes(query.as_bytes())
    }

    /// 解析 `application/x-www-form-urlencoded` 编码的内容
    pub fn from_bytes(input: &[u8]) -> Self {
        let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in url::form_urlencoded::parse(input) {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// 仅在参数恰好出现一次时返回其值
    pub fn single(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some([value]) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// 用单个值替换某参数的所有取值
    pub fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), vec![value]);
    }
}

/// 校验列表查询参数, 返回全部错误 (为空表示通过)
pub fn validate(params: &RawParams) -> Vec<String> {
    let mut errors = Vec::new();

    for (key, values) in params.iter() {
        if !RECOGNIZED_PARAMS.contains(&key) {
            errors.push(format!("invalid parameter {}", key));
            continue;
        }

        if values.len() > 1 {
            errors.push(format!("duplicate parameter {}", key));
        }

        match key {
            "document" => {
                for value in values {
                    if document_too_long(value) {
                        errors.push(document_length_msg());
                    }
                }
            }
            "referenceMonth" | "referenceYear" | "page" | "perPage" => {
                for value in values {
                    match value.parse::<i64>() {
                        Err(_) => errors.push(format!("parameter {} must be an integer", key)),
                        Ok(per_page) if key == "perPage" && per_page < 1 => {
                            errors.push("parameter perPage must be greater than zero".to_string())
                        }
                        Ok(_) => {}
                    }
                }
            }
            "sort" => {
                for value in values {
                    for field in value.split(',') {
                        let name = field.strip_prefix('-').unwrap_or(field);
                        if name.parse::<QueryField>().is_err() {
                            errors.push(MALFORMED_SORT_MSG.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    errors
}

/// 解析排序参数, 如 `-referenceYear,document`
pub fn parse_sorts(value: &str) -> Vec<Sort> {
    value
        .split(',')
        .filter_map(|field| {
            let (name, desc) = match field.strip_prefix('-') {
                Some(name) => (name, true),
                None => (field, false),
            };
            name.parse::<QueryField>()
                .ok()
                .map(|field| Sort { field, desc })
        })
        .collect()
}

/// 由已校验的参数构建 `QueryOptions`; 只采用恰好出现一次的参数
pub fn build_options(params: &RawParams, defaults: Pagination) -> QueryOptions {
    let mut opts = QueryOptions::with_pagination(defaults);

    for field in QueryField::ALL {
        if let Some(value) = params.single(field.as_str()) {
            opts.filters.insert(field, value.to_string());
        }
    }

    if let Some(page) = params.single("page").and_then(|v| v.parse().ok()) {
        opts.pagination.page = page;
    }
    if let Some(per_page) = params.single("perPage").and_then(|v| v.parse().ok()) {
        opts.pagination.per_page = per_page;
    }
    if let Some(sort) = params.single("sort") {
        opts.sorts = parse_sorts(sort);
    }

    opts
}
