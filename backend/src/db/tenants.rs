use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{DbContext, DbError};

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub company_name: String,
    pub slug: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewTenant {
    pub company_name: String,
    pub slug: String,
}

pub async fn create_tenant(db: &DbContext, new_tenant: NewTenant) -> Result<Tenant, DbError> {
    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        INSERT INTO tenants (company_name, slug, created_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        RETURNING id, company_name, slug, created_at
        "#,
    )
    .bind(new_tenant.company_name)
    .bind(new_tenant.slug)
    .fetch_one(db)
    .await?;
    Ok(tenant)
}

pub async fn list_tenants(db: &DbContext) -> Result<Vec<Tenant>, DbError> {
    let tenants = sqlx::query_as::<_, Tenant>(
        r#"
        SELECT id, company_name, slug, created_at
        FROM tenants
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(tenants)
}

pub async fn get_tenant_by_id(db: &DbContext, id: i64) -> Result<Tenant, DbError> {
    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        SELECT id, company_name, slug, created_at
        FROM tenants
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(tenant)
}

pub async fn get_tenant_by_slug(db: &DbContext, slug: &str) -> Result<Tenant, DbError> {
    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        SELECT id, company_name, slug, created_at
        FROM tenants
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_one(db)
    .await?;
    Ok(tenant)
}
