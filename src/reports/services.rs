use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    auth::repo_types::User,
    error::AppError,
    reports::{
        repo::ReportStore,
        repo_types::{EstimateQuery, NewReport, Report, MAX_COMPARABLES},
    },
};

#[derive(Clone)]
pub struct ReportsService {
    reports: Arc<dyn ReportStore>,
}

impl ReportsService {
    pub fn new(reports: Arc<dyn ReportStore>) -> Self {
        Self { reports }
    }

    pub async fn create(&self, report: NewReport, owner: &User) -> Result<Report, AppError> {
        let report = self.reports.create(report, owner.id).await?;
        info!(report_id = report.id, user_id = owner.id, "report submitted");
        Ok(report)
    }

    /// Callers must have checked that the actor is an admin.
    pub async fn change_approval(&self, id: i64, approved: bool) -> Result<Report, AppError> {
        let report = self
            .reports
            .set_approval(id, approved)
            .await?
            .ok_or_else(|| AppError::NotFound("report not found".into()))?;
        info!(report_id = id, approved, "report approval changed");
        Ok(report)
    }

    /// Mean price of the closest-by-mileage approved comparables, `None` if
    /// nothing matches.
    pub async fn create_estimate(&self, query: &EstimateQuery) -> Result<Option<f64>, AppError> {
        let comparables = self.reports.nearest_approved(query, MAX_COMPARABLES).await?;
        debug!(
            make = %query.make,
            model = %query.model,
            count = comparables.len(),
            "estimate comparables"
        );
        Ok(mean_price(&comparables))
    }
}

fn mean_price(reports: &[Report]) -> Option<f64> {
    if reports.is_empty() {
        return None;
    }
    let total: f64 = reports.iter().map(|r| r.price).sum();
    Some(total / reports.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::repo::MemoryReportStore;

    fn owner() -> User {
        User {
            id: 1,
            email: "seller@example.com".into(),
            password: "aa.bb".into(),
            admin: false,
        }
    }

    fn corolla(price: f64, mileage: f64) -> NewReport {
        NewReport {
            price,
            make: "Toyota".into(),
            model: "Corolla".into(),
            year: 2018,
            lat: 10.0,
            lng: 10.0,
            mileage,
        }
    }

    fn query(mileage: f64) -> EstimateQuery {
        EstimateQuery {
            make: "Toyota".into(),
            model: "Corolla".into(),
            year: 2018,
            lat: 10.0,
            lng: 10.0,
            mileage,
        }
    }

    async fn approved(service: &ReportsService, report: NewReport) -> Report {
        let created = service.create(report, &owner()).await.unwrap();
        service.change_approval(created.id, true).await.unwrap()
    }

    fn service() -> ReportsService {
        ReportsService::new(Arc::new(MemoryReportStore::default()))
    }

    #[tokio::test]
    async fn create_links_owner_and_starts_unapproved() {
        let report = service().create(corolla(1.0, 1.0), &owner()).await.unwrap();
        assert_eq!(report.user_id, 1);
        assert!(!report.approved);
    }

    #[tokio::test]
    async fn estimate_averages_matching_approved_reports() {
        let service = service();
        approved(&service, corolla(10_000.0, 50_000.0)).await;
        approved(&service, corolla(12_000.0, 60_000.0)).await;

        let estimate = service.create_estimate(&query(55_000.0)).await.unwrap();
        assert_eq!(estimate, Some(11_000.0));
    }

    #[tokio::test]
    async fn estimate_ignores_unapproved_reports() {
        let service = service();
        approved(&service, corolla(10_000.0, 50_000.0)).await;
        service
            .create(corolla(90_000.0, 55_000.0), &owner())
            .await
            .unwrap();

        let estimate = service.create_estimate(&query(55_000.0)).await.unwrap();
        assert_eq!(estimate, Some(10_000.0));
    }

    #[tokio::test]
    async fn estimate_uses_three_closest_by_mileage() {
        let service = service();
        approved(&service, corolla(1_000.0, 10_000.0)).await;
        approved(&service, corolla(2_000.0, 11_000.0)).await;
        approved(&service, corolla(3_000.0, 12_000.0)).await;
        approved(&service, corolla(100_000.0, 900_000.0)).await;

        let estimate = service.create_estimate(&query(10_000.0)).await.unwrap();
        assert_eq!(estimate, Some(2_000.0));
    }

    #[tokio::test]
    async fn estimate_skips_other_models_and_distant_reports() {
        let service = service();
        let mut civic = corolla(50_000.0, 50_000.0);
        civic.make = "Honda".into();
        civic.model = "Civic".into();
        approved(&service, civic).await;
        let mut far = corolla(50_000.0, 50_000.0);
        far.lng = 16.0;
        approved(&service, far).await;
        let mut old = corolla(50_000.0, 50_000.0);
        old.year = 2010;
        approved(&service, old).await;

        let estimate = service.create_estimate(&query(50_000.0)).await.unwrap();
        assert_eq!(estimate, None);
    }

    #[tokio::test]
    async fn change_approval_on_missing_report_is_not_found() {
        let store = Arc::new(MemoryReportStore::default());
        let service = ReportsService::new(store.clone());
        let err = service.change_approval(42, true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // the store is still empty, so the first id is still unassigned
        assert_eq!(store.set_approval(1, true).await.unwrap(), None);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean_price(&[]), None);
    }
}
