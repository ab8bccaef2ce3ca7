use serde::Serialize;

use crate::cfg::DuplicateVotePolicy;
use crate::core::{DbContext, DbError, ServiceError};
use crate::db;
use crate::db::VoteInsert;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct VoteOutcome {
    pub post_id: i64,
    pub accepted: bool,
    pub total: i64,
}

/// Records the user's vote on a post of the tenant and returns the resulting tally.
///
/// Insert and count share one transaction, so `total` always includes this vote.
pub async fn cast_vote(
    db: &DbContext,
    tenant_id: i64,
    post_id: i64,
    user_id: i64,
    policy: DuplicateVotePolicy,
) -> Result<VoteOutcome, ServiceError> {
    let mut tx = db.begin().await.map_err(DbError::from)?;

    let inserted = match db::insert_vote(&mut *tx, tenant_id, post_id, user_id).await? {
        VoteInsert::Inserted => true,
        VoteInsert::Duplicate if policy == DuplicateVotePolicy::Strict => {
            tracing::info!(post_id, user_id, "Duplicate vote rejected");
            return Err(ServiceError::conflict(format!("already voted on post {post_id}")));
        }
        VoteInsert::Duplicate => false,
        VoteInsert::PostNotFound => return Err(ServiceError::not_found(format!("post {post_id}"))),
    };

    let total = db::count_votes(&mut *tx, post_id).await?;
    tx.commit().await.map_err(DbError::from)?;

    tracing::info!(post_id, tenant_id, user_id, accepted = inserted, total, "Vote cast");
    Ok(VoteOutcome {
        post_id,
        accepted: inserted,
        total,
    })
}

pub async fn count_votes(db: &DbContext, post_id: i64) -> Result<i64, ServiceError> {
    Ok(db::count_votes(db, post_id).await?)
}
