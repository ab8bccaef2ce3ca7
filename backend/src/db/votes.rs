use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqliteExecutor};

use crate::core::DbError;

/// Outcome of trying to add a vote row
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteInsert {
    Inserted,
    Duplicate,
    PostNotFound,
}

/// Inserts the `(post_id, user_id)` row if the post exists in the tenant.
///
/// Duplicates are absorbed by the primary key (`ON CONFLICT DO NOTHING`), so two racing
/// inserts for the same pair can never both succeed. The statement writes before it reads
/// anything else, which keeps it safe as the first statement of a transaction.
pub async fn insert_vote(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    post_id: i64,
    user_id: i64,
) -> Result<VoteInsert, DbError> {
    let result = sqlx::query(
        r#"
        INSERT INTO votes (post_id, user_id, tenant_id, created_at)
        SELECT p.id, ?, p.tenant_id, ?
        FROM posts p
        WHERE p.id = ? AND p.tenant_id = ?
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(Utc::now().naive_utc())
    .bind(post_id)
    .bind(tenant_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(VoteInsert::Inserted);
    }

    let matching_posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = ? AND tenant_id = ?")
        .bind(post_id)
        .bind(tenant_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(if matching_posts > 0 { VoteInsert::Duplicate } else { VoteInsert::PostNotFound })
}

pub async fn count_votes(executor: impl SqliteExecutor<'_>, post_id: i64) -> Result<i64, DbError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(executor)
        .await?;
    Ok(total)
}
