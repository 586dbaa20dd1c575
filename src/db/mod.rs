pub mod memory;
pub mod pool;
pub mod queries;

use crate::error::RepositoryResult;
use crate::models::{Invoice, NewInvoice, QueryOptions};
use async_trait::async_trait;

pub use memory::MemoryInvoiceRepository;
pub use pool::create_pool;
pub use queries::PgInvoiceRepository;

/// 发票仓储能力
///
/// 所有读操作只返回有效 (is_active) 的记录。
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// 满足过滤条件的记录总数 (忽略排序和分页)
    async fn count(&self, opts: &QueryOptions) -> RepositoryResult<i64>;

    /// 按过滤、排序、分页条件查询
    async fn list(&self, opts: &QueryOptions) -> RepositoryResult<Vec<Invoice>>;

    /// 不存在或已删除时返回 `RepositoryError::NotFound`
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Invoice>;

    async fn insert(&self, invoice: NewInvoice) -> RepositoryResult<i64>;

    /// 软删除, 返回受影响行数
    async fn soft_delete(&self, id: i64) -> RepositoryResult<u64>;

    /// 返回受影响行数
    async fn update_description(&self, id: i64, description: &str) -> RepositoryResult<u64>;
}
