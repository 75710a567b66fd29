use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

/// Creates the `employees` table when it does not exist yet.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id          BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            name        VARCHAR(255)    NOT NULL,
            employee_id VARCHAR(64)     NOT NULL,
            salary      DOUBLE          NOT NULL DEFAULT 0,
            department  VARCHAR(64)     NOT NULL,
            created_at  TIMESTAMP(6)    NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
            updated_at  TIMESTAMP(6)    NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
            KEY idx_employees_department (department),
            KEY idx_employees_created_at (created_at)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
