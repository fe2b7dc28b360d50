use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Dashboard counters shown on the home screen.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub mailings_total: i64,
    pub attempts_successful: i64,
    pub attempts_failed: i64,
    pub unique_recipients: i64,
}

pub async fn overview(pool: &SqlitePool) -> Result<Stats> {
    let mailings_total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mailings")
        .fetch_one(pool)
        .await?;
    let attempts_successful =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attempts WHERE status = 'completed'")
            .fetch_one(pool)
            .await?;
    let attempts_failed =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attempts WHERE status = 'failed'")
            .fetch_one(pool)
            .await?;
    let unique_recipients =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT email) FROM recipients")
            .fetch_one(pool)
            .await?;

    Ok(Stats {
        mailings_total,
        attempts_successful,
        attempts_failed,
        unique_recipients,
    })
}
