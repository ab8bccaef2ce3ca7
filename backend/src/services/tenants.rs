use crate::core::{DbContext, DbError, ServiceError};
use crate::db;

/// Registers a new tenant workspace. Slugs are stored trimmed and lowercased.
pub async fn create_tenant(db: &DbContext, company_name: &str, slug: &str) -> Result<db::Tenant, ServiceError> {
    let company_name = company_name.trim();
    let slug = slug.trim().to_lowercase();
    if company_name.is_empty() {
        return Err(ServiceError::invalid_input("company_name must not be empty"));
    }
    if slug.is_empty() {
        return Err(ServiceError::invalid_input("slug must not be empty"));
    }

    let new_tenant = db::NewTenant {
        company_name: company_name.to_string(),
        slug: slug.clone(),
    };
    let tenant = db::create_tenant(db, new_tenant).await.map_err(|e| match e {
        DbError::UniqueViolation(_) => ServiceError::conflict(format!("tenant slug '{slug}' is already taken")),
        other => other.into(),
    })?;

    tracing::info!(tenant_id = tenant.id, slug = %tenant.slug, "Tenant created");
    Ok(tenant)
}

pub async fn list_tenants(db: &DbContext) -> Result<Vec<db::Tenant>, ServiceError> {
    Ok(db::list_tenants(db).await?)
}

pub async fn get_tenant(db: &DbContext, id: i64) -> Result<db::Tenant, ServiceError> {
    db::get_tenant_by_id(db, id).await.map_err(|e| match e {
        DbError::RowNotFound(_) => ServiceError::not_found(format!("tenant {id}")),
        other => other.into(),
    })
}

pub async fn get_tenant_by_slug(db: &DbContext, slug: &str) -> Result<db::Tenant, ServiceError> {
    let slug = slug.trim().to_lowercase();
    db::get_tenant_by_slug(db, &slug).await.map_err(|e| match e {
        DbError::RowNotFound(_) => ServiceError::not_found(format!("tenant '{slug}'")),
        other => other.into(),
    })
}
