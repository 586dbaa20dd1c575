use crate::db::InvoiceRepository;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Invoice, NewInvoice, QueryOptions};
use std::sync::Arc;

/// 当前页在全部结果中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub last_page: i64,
}

/// 列表查询结果
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePage {
    pub items: Vec<Invoice>,
    /// 过滤后、分页前的总数
    pub total_count: i64,
    /// 总数为 0 时没有分页信息
    pub window: Option<PageWindow>,
}

impl InvoicePage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            window: None,
        }
    }
}

/// 发票服务: 编排仓储调用, 不持有跨请求的可变状态
#[derive(Clone)]
pub struct InvoiceService {
    repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceService {
    pub fn new(repo: Arc<dyn InvoiceRepository>) -> Self {
        Self { repo }
    }

    /// 列表查询: 先计数, 总数为 0 直接返回空列表; 否则校验页码后再查询
    #[tracing::instrument(skip(self, opts), fields(page = opts.pagination.page, per_page = opts.pagination.per_page))]
    pub async fn list(&self, opts: &QueryOptions) -> ServiceResult<InvoicePage> {
        let total_count = self.repo.count(opts).await.map_err(|e| {
            tracing::error!("Failed to count invoices: {}", e);
            e
        })?;

        if total_count == 0 {
            tracing::debug!("No invoices match the filters");
            return Ok(InvoicePage::empty());
        }

        let last_page = opts.pagination.last_page(total_count);
        if !opts.pagination.is_within(last_page) {
            tracing::debug!(
                "Page {} out of range [1, {}]",
                opts.pagination.page,
                last_page
            );
            return Err(ServiceError::InvalidPage);
        }

        let items = self.repo.list(opts).await.map_err(|e| {
            tracing::error!("Failed to list invoices: {}", e);
            e
        })?;

        Ok(InvoicePage {
            items,
            total_count,
            window: Some(PageWindow {
                page: opts.pagination.page,
                last_page,
            }),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> ServiceResult<Invoice> {
        Ok(self.repo.get_by_id(id).await?)
    }

    #[tracing::instrument(skip(self, invoice), fields(document = %invoice.document))]
    pub async fn create(&self, invoice: NewInvoice) -> ServiceResult<i64> {
        Ok(self.repo.insert(invoice).await?)
    }

    /// 修改描述; 没有匹配的有效记录时返回 NotFound
    #[tracing::instrument(skip(self, description))]
    pub async fn update_description(&self, id: i64, description: &str) -> ServiceResult<u64> {
        let rows = self.repo.update_description(id, description).await?;
        if rows == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(rows)
    }

    /// 软删除; 记录不存在或已删除时返回 NotFound
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let rows = self.repo.soft_delete(id).await?;
        if rows == 0 {
            return Err(ServiceError::NotFound);
        }
        tracing::info!("Invoice {} deactivated", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryInvoiceRepository;
    use crate::error::{RepositoryError, RepositoryResult};
    use crate::models::Pagination;
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 记录调用次数, 计数固定返回给定值
    struct CountingRepo {
        total: i64,
        fail_count: bool,
        fail_list: bool,
        list_calls: AtomicUsize,
    }

    impl CountingRepo {
        fn new(total: i64) -> Self {
            Self {
                total,
                fail_count: false,
                fail_list: false,
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InvoiceRepository for CountingRepo {
        async fn count(&self, _opts: &QueryOptions) -> RepositoryResult<i64> {
            if self.fail_count {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.total)
        }

        async fn list(&self, _opts: &QueryOptions) -> RepositoryResult<Vec<Invoice>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            Ok(Vec::new())
        }

        async fn get_by_id(&self, _id: i64) -> RepositoryResult<Invoice> {
            Err(RepositoryError::NotFound)
        }

        async fn insert(&self, _invoice: NewInvoice) -> RepositoryResult<i64> {
            Ok(1)
        }

        async fn soft_delete(&self, _id: i64) -> RepositoryResult<u64> {
            Ok(0)
        }

        async fn update_description(&self, _id: i64, _description: &str) -> RepositoryResult<u64> {
            Ok(0)
        }
    }

    fn paged(page: i64, per_page: i64) -> QueryOptions {
        QueryOptions::with_pagination(Pagination::new(page, per_page))
    }

    #[tokio::test]
    async fn zero_results_skip_page_check_and_listing() {
        let repo = Arc::new(CountingRepo::new(0));
        let service = InvoiceService::new(repo.clone());

        for opts in [paged(1, 5), paged(0, 5), paged(99, 1)] {
            assert_eq!(service.list(&opts).await.unwrap(), InvoicePage::empty());
        }
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn out_of_range_page_is_rejected_before_listing() {
        let repo = Arc::new(CountingRepo::new(11));
        let service = InvoiceService::new(repo.clone());

        assert!(matches!(
            service.list(&paged(4, 5)).await,
            Err(ServiceError::InvalidPage)
        ));
        assert!(matches!(
            service.list(&paged(0, 5)).await,
            Err(ServiceError::InvalidPage)
        ));
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 0);

        let page = service.list(&paged(3, 5)).await.unwrap();
        assert_eq!(page.total_count, 11);
        assert_eq!(
            page.window,
            Some(PageWindow {
                page: 3,
                last_page: 3
            })
        );
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repository_failures_surface() {
        let mut repo = CountingRepo::new(3);
        repo.fail_count = true;
        let service = InvoiceService::new(Arc::new(repo));
        assert!(matches!(
            service.list(&paged(1, 5)).await,
            Err(ServiceError::Repository(_))
        ));

        let mut repo = CountingRepo::new(3);
        repo.fail_list = true;
        let service = InvoiceService::new(Arc::new(repo));
        assert!(matches!(
            service.list(&paged(1, 5)).await,
            Err(ServiceError::Repository(_))
        ));
    }

    #[tokio::test]
    async fn last_page_is_never_empty() {
        let repo = Arc::new(MemoryInvoiceRepository::new());
        let service = InvoiceService::new(repo.clone());
        for i in 0..7 {
            service
                .create(NewInvoice::issued_now(
                    format!("doc{}", i),
                    None,
                    BigDecimal::from(i),
                ))
                .await
                .unwrap();
        }

        let page = service.list(&paged(3, 3)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 7);
        assert_eq!(page.window.unwrap().last_page, 3);
    }

    #[tokio::test]
    async fn delete_and_update_report_missing_rows() {
        let repo = Arc::new(MemoryInvoiceRepository::new());
        let service = InvoiceService::new(repo);
        let id = service
            .create(NewInvoice::issued_now("doc".into(), None, BigDecimal::from(1)))
            .await
            .unwrap();

        assert_eq!(service.update_description(id, "x").await.unwrap(), 1);
        service.delete(id).await.unwrap();
        assert!(matches!(service.delete(id).await, Err(ServiceError::NotFound)));
        assert!(matches!(
            service.update_description(id, "y").await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(service.get(id).await, Err(ServiceError::NotFound)));
    }
}
