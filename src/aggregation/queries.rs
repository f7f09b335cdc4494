use std::collections::HashMap;

use sqlx::{PgPool, Result, Row};

/// Execute one batched counting statement and collect the raw label to count
/// mapping. Store failures bubble up unchanged.
pub async fn fetch_counts(pool: &PgPool, sql: &str) -> Result<HashMap<String, i64>> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;

    let mut counts = HashMap::with_capacity(rows.len());
    for row in rows {
        let label: String = row.try_get("label")?;
        let total: i64 = row.try_get("total")?;
        counts.insert(label, total);
    }

    Ok(counts)
}
