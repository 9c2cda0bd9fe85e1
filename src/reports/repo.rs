use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::reports::repo_types::{EstimateQuery, NewReport, Report, COORD_WINDOW, YEAR_WINDOW};

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts an unapproved report owned by `user_id`.
    async fn create(&self, report: NewReport, user_id: i64) -> Result<Report, StoreError>;
    /// Returns `None` when no report has that id.
    async fn set_approval(&self, id: i64, approved: bool) -> Result<Option<Report>, StoreError>;
    /// Approved reports admitted by `query`, closest mileage first, at most `limit`.
    async fn nearest_approved(
        &self,
        query: &EstimateQuery,
        limit: i64,
    ) -> Result<Vec<Report>, StoreError>;
}

#[derive(Clone)]
pub struct PgReportStore {
    db: PgPool,
}

impl PgReportStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn create(&self, report: NewReport, user_id: i64) -> Result<Report, StoreError> {
        let row = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (price, make, model, year, lat, lng, mileage, approved, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8)
            RETURNING id, price, make, model, year, lat, lng, mileage, approved, user_id
            "#,
        )
        .bind(report.price)
        .bind(&report.make)
        .bind(&report.model)
        .bind(report.year)
        .bind(report.lat)
        .bind(report.lng)
        .bind(report.mileage)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn set_approval(&self, id: i64, approved: bool) -> Result<Option<Report>, StoreError> {
        let row = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
               SET approved = $2
             WHERE id = $1
            RETURNING id, price, make, model, year, lat, lng, mileage, approved, user_id
            "#,
        )
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn nearest_approved(
        &self,
        query: &EstimateQuery,
        limit: i64,
    ) -> Result<Vec<Report>, StoreError> {
        let rows = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, price, make, model, year, lat, lng, mileage, approved, user_id
              FROM reports
             WHERE approved IS TRUE
               AND make = $1
               AND model = $2
               AND year BETWEEN $3 AND $4
               AND lat BETWEEN $5 AND $6
               AND lng BETWEEN $7 AND $8
             ORDER BY ABS(mileage - $9) ASC, id ASC
             LIMIT $10
            "#,
        )
        .bind(&query.make)
        .bind(&query.model)
        .bind(query.year - YEAR_WINDOW)
        .bind(query.year + YEAR_WINDOW)
        .bind(query.lat - COORD_WINDOW)
        .bind(query.lat + COORD_WINDOW)
        .bind(query.lng - COORD_WINDOW)
        .bind(query.lng + COORD_WINDOW)
        .bind(query.mileage)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// Process-local report store, used when no database is configured.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: RwLock<Vec<Report>>,
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create(&self, report: NewReport, user_id: i64) -> Result<Report, StoreError> {
        let mut reports = self.reports.write().await;
        let created = Report {
            id: reports.len() as i64 + 1,
            price: report.price,
            make: report.make,
            model: report.model,
            year: report.year,
            lat: report.lat,
            lng: report.lng,
            mileage: report.mileage,
            approved: false,
            user_id,
        };
        reports.push(created.clone());
        Ok(created)
    }

    async fn set_approval(&self, id: i64, approved: bool) -> Result<Option<Report>, StoreError> {
        let mut reports = self.reports.write().await;
        Ok(reports.iter_mut().find(|r| r.id == id).map(|r| {
            r.approved = approved;
            r.clone()
        }))
    }

    async fn nearest_approved(
        &self,
        query: &EstimateQuery,
        limit: i64,
    ) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().await;
        let mut matches: Vec<Report> = reports.iter().filter(|r| query.admits(r)).cloned().collect();
        matches.sort_by(|a, b| {
            query
                .mileage_distance(a)
                .total_cmp(&query.mileage_distance(b))
                .then(a.id.cmp(&b.id))
        });
        matches.truncate(limit.max(0) as usize);
        Ok(matches)
    }
}
