use crate::auth;
use crate::cfg;

pub type DbContext = sqlx::SqlitePool;

pub type ArcContext = std::sync::Arc<Context>;

#[derive(Clone)]
pub struct Context {
    pub db: DbContext,
    pub jwt: auth::JwtContext,
    pub settings: cfg::AppSettings,
}

impl Context {
    #[must_use]
    pub fn new(db: DbContext, jwt: auth::JwtContext, settings: cfg::AppSettings) -> ArcContext {
        Self { db, jwt, settings }.into()
    }
}
