use crate::db::InvoiceRepository;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{Invoice, NewInvoice, QueryField, QueryOptions, Sort};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

/// 内存发票仓储 (开发模式与测试使用)
///
/// 自然顺序为 id 升序。
#[derive(Debug)]
pub struct MemoryInvoiceRepository {
    invoices: DashMap<i64, Invoice>,
    next_id: AtomicI64,
}

impl Default for MemoryInvoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInvoiceRepository {
    pub fn new() -> Self {
        Self {
            invoices: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// 直接读取一条记录, 包括已删除的
    pub fn snapshot(&self, id: i64) -> Option<Invoice> {
        self.invoices.get(&id).map(|entry| entry.value().clone())
    }

    /// 满足过滤条件的有效记录, 按 id 升序
    fn matching(&self, opts: &QueryOptions) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|entry| entry.is_active && matches_filters(entry.value(), opts))
            .map(|entry| entry.value().clone())
            .collect();
        invoices.sort_by_key(|invoice| invoice.id);
        invoices
    }
}

fn matches_filters(invoice: &Invoice, opts: &QueryOptions) -> bool {
    opts.filters.iter().all(|(field, value)| match field {
        QueryField::Document => invoice.document == *value,
        QueryField::ReferenceMonth => value.parse::<i64>() == Ok(invoice.reference_month as i64),
        QueryField::ReferenceYear => value.parse::<i64>() == Ok(invoice.reference_year as i64),
    })
}

fn compare_by(a: &Invoice, b: &Invoice, sort: &Sort) -> Ordering {
    let ordering = match sort.field {
        QueryField::Document => a.document.cmp(&b.document),
        QueryField::ReferenceMonth => a.reference_month.cmp(&b.reference_month),
        QueryField::ReferenceYear => a.reference_year.cmp(&b.reference_year),
    };
    if sort.desc {
        ordering.reverse()
    } else {
        ordering
    }
}

#[async_trait]
impl InvoiceRepository for MemoryInvoiceRepository {
    async fn count(&self, opts: &QueryOptions) -> RepositoryResult<i64> {
        Ok(self.matching(opts).len() as i64)
    }

    async fn list(&self, opts: &QueryOptions) -> RepositoryResult<Vec<Invoice>> {
        let mut invoices = self.matching(opts);

        // 稳定排序, 靠前的排序指令优先
        invoices.sort_by(|a, b| {
            opts.sorts
                .iter()
                .fold(Ordering::Equal, |acc, sort| acc.then_with(|| compare_by(a, b, sort)))
        });

        let offset = opts.pagination.offset().max(0) as usize;
        let limit = opts.pagination.limit().max(0) as usize;
        Ok(invoices.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Invoice> {
        self.invoices
            .get(&id)
            .filter(|entry| entry.is_active)
            .map(|entry| entry.value().clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn insert(&self, invoice: NewInvoice) -> RepositoryResult<i64> {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        self.invoices.insert(id, invoice.into_invoice(id));
        tracing::info!("Inserted invoice {}", id);
        Ok(id)
    }

    async fn soft_delete(&self, id: i64) -> RepositoryResult<u64> {
        match self.invoices.get_mut(&id) {
            Some(mut entry) if entry.is_active => {
                entry.is_active = false;
                entry.deactivated_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn update_description(&self, id: i64, description: &str) -> RepositoryResult<u64> {
        match self.invoices.get_mut(&id) {
            Some(mut entry) if entry.is_active => {
                entry.description = Some(description.to_string());
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
