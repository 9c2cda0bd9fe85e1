use std::sync::Arc;

use crate::auth::{
    repo::{MemoryUserStore, PgUserStore, UserStore},
    services::AuthService,
    session::SessionKeys,
};
use crate::config::AppConfig;
use crate::db;
use crate::reports::{
    repo::{MemoryReportStore, PgReportStore, ReportStore},
    services::ReportsService,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub auth: AuthService,
    pub reports: ReportsService,
    pub session: SessionKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let (users, reports) = match config.database_url.as_deref() {
            Some(url) => {
                let pool = db::connect(url).await?;
                db::migrate(&pool).await;
                (
                    Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgReportStore::new(pool)) as Arc<dyn ReportStore>,
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; data lives in memory and is lost on exit");
                (
                    Arc::new(MemoryUserStore::default()) as Arc<dyn UserStore>,
                    Arc::new(MemoryReportStore::default()) as Arc<dyn ReportStore>,
                )
            }
        };

        Ok(Self::from_parts(&config, users, reports))
    }

    pub fn from_parts(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        reports: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone(), config.admin_emails.iter().cloned()),
            reports: ReportsService::new(reports),
            session: SessionKeys::new(&config.session),
            users,
        }
    }

    /// In-memory state for tests; `admin@example.com` signs up as an admin.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = AppConfig {
            database_url: None,
            session: crate::config::SessionConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                ttl_minutes: 5,
                cookie_name: "session".into(),
                cookie_secure: false,
            },
            admin_emails: vec!["admin@example.com".into()],
        };
        Self::from_parts(
            &config,
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryReportStore::default()),
        )
    }
}
