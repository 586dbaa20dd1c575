//! RFC 5988 风格的分页导航链接

use crate::api::params::RawParams;
use std::collections::BTreeMap;

/// 导航关系
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rel {
    Next,
    Last,
    First,
    Prev,
}

impl Rel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rel::Next => "next",
            Rel::Last => "last",
            Rel::First => "first",
            Rel::Prev => "prev",
        }
    }
}

/// 需要输出的导航页, 顺序固定为 next, last, first, prev
pub fn navigation_pages(page: i64, last_page: i64) -> Vec<(Rel, i64)> {
    let mut pages = Vec::with_capacity(4);
    if page < last_page {
        pages.push((Rel::Next, page + 1));
        pages.push((Rel::Last, last_page));
    }
    if page > 1 {
        pages.push((Rel::First, 1));
        pages.push((Rel::Prev, page - 1));
    }
    pages
}

/// 按参数名排序编码查询串
fn encode_query(params: &RawParams) -> String {
    let sorted: BTreeMap<&str, &[String]> = params.iter().collect();
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, values) in sorted {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// 生成 `Link` 头的值, 没有可用链接时返回 `None`
pub fn link_header(host: &str, params: &RawParams, page: i64, last_page: i64) -> Option<String> {
    let links: Vec<String> = navigation_pages(page, last_page)
        .into_iter()
        .map(|(rel, target)| {
            let mut params = params.clone();
            params.set("page", target.to_string());
            format!(
                "<{}/invoices?{}>; rel=\"{}\"",
                host,
                encode_query(&params),
                rel.as_str()
            )
        })
        .collect();

    if links.is_empty() {
        None
    } else {
        Some(links.join(", "))
    }
}
