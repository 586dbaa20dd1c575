use crate::db::InvoiceRepository;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{Invoice, NewInvoice, QueryField, QueryOptions};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const INVOICE_COLUMNS: &str = "id, created_at, reference_month, reference_year, document, \
                               description, amount, is_active, deactivated_at";

/// Postgres 发票仓储
///
/// 表结构:
/// ```sql
/// CREATE TABLE invoice (
///     id              BIGSERIAL PRIMARY KEY,
///     created_at      TIMESTAMPTZ NOT NULL,
///     reference_month INT NOT NULL,
///     reference_year  INT NOT NULL,
///     document        VARCHAR(14) NOT NULL,
///     description     TEXT,
///     amount          NUMERIC NOT NULL,
///     is_active       BOOLEAN NOT NULL DEFAULT TRUE,
///     deactivated_at  TIMESTAMPTZ
/// );
/// ```
#[derive(Clone)]
pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 追加过滤条件, 过滤值全部使用绑定参数
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, opts: &QueryOptions) {
    for (field, value) in &opts.filters {
        match field {
            QueryField::Document => {
                builder.push(" AND document = ").push_bind(value.clone());
            }
            QueryField::ReferenceMonth | QueryField::ReferenceYear => match value.parse::<i64>() {
                Ok(number) => {
                    builder
                        .push(" AND ")
                        .push(field.column())
                        .push(" = ")
                        .push_bind(number);
                }
                // 校验阶段已拦截非整数, 这里不匹配任何记录
                Err(_) => {
                    builder.push(" AND FALSE");
                }
            },
        }
    }
}

/// 构建计数语句
pub fn build_count_query(opts: &QueryOptions) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM invoice WHERE is_active");
    push_filters(&mut builder, opts);
    builder
}

/// 构建列表语句: 过滤 + 排序 + LIMIT/OFFSET
pub fn build_list_query(opts: &QueryOptions) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {INVOICE_COLUMNS} FROM invoice WHERE is_active"
    ));
    push_filters(&mut builder, opts);

    if !opts.sorts.is_empty() {
        builder.push(" ORDER BY ");
        let mut separated = builder.separated(", ");
        for sort in &opts.sorts {
            separated.push(format!("{} {}", sort.field.column(), sort.direction()));
        }
    }

    builder
        .push(" LIMIT ")
        .push_bind(opts.pagination.limit())
        .push(" OFFSET ")
        .push_bind(opts.pagination.offset());
    builder
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn count(&self, opts: &QueryOptions) -> RepositoryResult<i64> {
        let count: i64 = build_count_query(opts)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, opts: &QueryOptions) -> RepositoryResult<Vec<Invoice>> {
        let invoices = build_list_query(opts)
            .build_query_as::<Invoice>()
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Invoice> {
        sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice WHERE is_active AND id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn insert(&self, invoice: NewInvoice) -> RepositoryResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice (
                created_at, reference_month, reference_year,
                document, description, amount,
                is_active, deactivated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, NULL)
            RETURNING id
            "#,
        )
        .bind(invoice.created_at)
        .bind(invoice.reference_month)
        .bind(invoice.reference_year)
        .bind(invoice.document)
        .bind(invoice.description)
        .bind(invoice.amount)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Inserted invoice {}", id);
        Ok(id)
    }

    async fn soft_delete(&self, id: i64) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invoice
            SET is_active = FALSE, deactivated_at = now()
            WHERE is_active AND id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_description(&self, id: i64, description: &str) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invoice
            SET description = $1
            WHERE is_active AND id = $2
            "#,
        )
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pagination, Sort};

    fn options() -> QueryOptions {
        let mut opts = QueryOptions::with_pagination(Pagination::new(3, 10));
        opts.filters
            .insert(QueryField::Document, "x\" OR 1=1 --".to_string());
        opts.filters
            .insert(QueryField::ReferenceYear, "2016".to_string());
        opts.sorts = vec![
            Sort::desc(QueryField::ReferenceYear),
            Sort::asc(QueryField::Document),
        ];
        opts
    }

    #[test]
    fn count_query_binds_filters_and_skips_ordering() {
        let builder = build_count_query(&options());
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM invoice WHERE is_active \
             AND document = $1 AND reference_year = $2"
        );
    }

    #[test]
    fn list_query_orders_and_limits_with_bound_values() {
        let builder = build_list_query(&options());
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT id, created_at"));
        assert!(sql.ends_with(
            "WHERE is_active AND document = $1 AND reference_year = $2 \
             ORDER BY reference_year DESC, document ASC LIMIT $3 OFFSET $4"
        ));
        assert!(!sql.contains("OR 1=1"));
    }

    #[test]
    fn list_query_without_sorts_has_no_order_clause() {
        let builder = build_list_query(&QueryOptions::default());
        assert!(!builder.sql().contains("ORDER BY"));
        assert!(builder.sql().ends_with("WHERE is_active LIMIT $1 OFFSET $2"));
    }
}
