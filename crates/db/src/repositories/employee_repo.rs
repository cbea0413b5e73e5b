//! Repository for the `employees` table.

use herald_core::record::{NotificationStatus, FLAG_PENDING};
use herald_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::employee::Employee;

/// Column list for `employees` queries.
const COLUMNS: &str = "employee_id, phone_number, status";

pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert an employee, returning the generated ID.
    ///
    /// `status` of `None` stores `NULL`, which reads back as pending.
    pub async fn create(
        pool: &SqlitePool,
        phone_number: &str,
        status: Option<NotificationStatus>,
    ) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query("INSERT INTO employees (phone_number, status) VALUES (?, ?)")
            .bind(phone_number)
            .bind(status.map(NotificationStatus::as_flag))
            .execute(pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE employee_id = ?");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List employees whose persisted flag is absent or `'N'`.
    pub async fn list_pending(pool: &SqlitePool) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees \
             WHERE COALESCE(status, '{FLAG_PENDING}') = '{FLAG_PENDING}'"
        );
        sqlx::query_as::<_, Employee>(&query).fetch_all(pool).await
    }

    /// Conditionally move an employee from `from` to `to`.
    ///
    /// The row only changes if its current flag still matches `from`, so two
    /// concurrent callers cannot both succeed. Returns rows affected.
    pub async fn update_status(
        pool: &SqlitePool,
        id: DbId,
        from: NotificationStatus,
        to: NotificationStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(&format!(
            "UPDATE employees \
             SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
             WHERE employee_id = ? AND COALESCE(status, '{FLAG_PENDING}') = ?"
        ))
        .bind(to.as_flag())
        .bind(id)
        .bind(from.as_flag())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Count employees currently in `status`.
    pub async fn count_with_status(
        pool: &SqlitePool,
        status: NotificationStatus,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM employees WHERE COALESCE(status, '{FLAG_PENDING}') = ?"
        ))
        .bind(status.as_flag())
        .fetch_one(pool)
        .await
    }
}
