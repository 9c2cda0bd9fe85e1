use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Report record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub price: f64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: f64,
    pub lng: f64,
    pub mileage: f64,
    pub approved: bool,
    pub user_id: i64,
}

/// Validated vehicle attributes of a report submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub price: f64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: f64,
    pub lng: f64,
    pub mileage: f64,
}

/// Vehicle to price. Comparables share make and model and sit inside the
/// year and coordinate windows below.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateQuery {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: f64,
    pub lng: f64,
    pub mileage: f64,
}

pub const YEAR_WINDOW: i32 = 3;
pub const COORD_WINDOW: f64 = 5.0;
pub const MAX_COMPARABLES: i64 = 3;

impl EstimateQuery {
    /// Whether `report` may take part in this estimate.
    pub fn admits(&self, report: &Report) -> bool {
        report.approved
            && report.make == self.make
            && report.model == self.model
            && (report.year - self.year).abs() <= YEAR_WINDOW
            && (report.lat - self.lat).abs() <= COORD_WINDOW
            && (report.lng - self.lng).abs() <= COORD_WINDOW
    }

    pub fn mileage_distance(&self, report: &Report) -> f64 {
        (report.mileage - self.mileage).abs()
    }
}
