use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    reports::repo_types::{EstimateQuery, NewReport, Report},
    validation::{ValidationErrors, Validator},
};

const PRICE: std::ops::RangeInclusive<f64> = 0.0..=1_000_000.0;
const YEAR: std::ops::RangeInclusive<i64> = 1930..=2050;
const MILEAGE: std::ops::RangeInclusive<f64> = 0.0..=10_000_000.0;
const LAT: std::ops::RangeInclusive<f64> = -90.0..=90.0;
const LNG: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Body of `POST /reports`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReportRequest {
    pub price: Option<Value>,
    pub make: Option<Value>,
    pub model: Option<Value>,
    pub year: Option<Value>,
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub mileage: Option<Value>,
}

impl CreateReportRequest {
    pub fn validate(&self) -> Result<NewReport, ValidationErrors> {
        let mut v = Validator::default();
        let price = v.number("price", self.price.as_ref(), PRICE);
        let make = v.string("make", self.make.as_ref());
        let model = v.string("model", self.model.as_ref());
        let year = v.integer("year", self.year.as_ref(), YEAR);
        let lat = v.number("lat", self.lat.as_ref(), LAT);
        let lng = v.number("lng", self.lng.as_ref(), LNG);
        let mileage = v.number("mileage", self.mileage.as_ref(), MILEAGE);

        match (price, make, model, year, lat, lng, mileage) {
            (Some(price), Some(make), Some(model), Some(year), Some(lat), Some(lng), Some(mileage)) => {
                Ok(NewReport {
                    price,
                    make,
                    model,
                    year: year as i32,
                    lat,
                    lng,
                    mileage,
                })
            }
            _ => Err(v.into_errors()),
        }
    }
}

/// Body of `PATCH /reports/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveReportRequest {
    pub approved: Option<Value>,
}

impl ApproveReportRequest {
    pub fn validate(&self) -> Result<bool, ValidationErrors> {
        let mut v = Validator::default();
        v.boolean("approved", self.approved.as_ref())
            .ok_or_else(|| v.into_errors())
    }
}

/// Query string of `GET /reports`; every value arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct GetEstimateQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub mileage: Option<String>,
}

impl GetEstimateQuery {
    pub fn validate(&self) -> Result<EstimateQuery, ValidationErrors> {
        let mut v = Validator::default();
        let make = v.query_string("make", self.make.as_deref());
        let model = v.query_string("model", self.model.as_deref());
        let year = v.query_integer("year", self.year.as_deref(), YEAR);
        let lat = v.query_number("lat", self.lat.as_deref(), LAT);
        let lng = v.query_number("lng", self.lng.as_deref(), LNG);
        let mileage = v.query_number("mileage", self.mileage.as_deref(), MILEAGE);

        match (make, model, year, lat, lng, mileage) {
            (Some(make), Some(model), Some(year), Some(lat), Some(lng), Some(mileage)) => {
                Ok(EstimateQuery {
                    make,
                    model,
                    year: year as i32,
                    lat,
                    lng,
                    mileage,
                })
            }
            _ => Err(v.into_errors()),
        }
    }
}

/// Report as returned to clients.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
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

impl From<Report> for ReportResponse {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            price: r.price,
            make: r.make,
            model: r.model,
            year: r.year,
            lat: r.lat,
            lng: r.lng,
            mileage: r.mileage,
            approved: r.approved,
            user_id: r.user_id,
        }
    }
}

/// `price` is `null` when no approved report matched.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> CreateReportRequest {
        serde_json::from_value(json!({
            "price": 15000,
            "make": "Toyota",
            "model": "Corolla",
            "year": 2018,
            "lat": 45.5,
            "lng": -122.6,
            "mileage": 50000
        }))
        .unwrap()
    }

    #[test]
    fn accepts_a_complete_report() {
        let report = valid_body().validate().unwrap();
        assert_eq!(report.year, 2018);
        assert_eq!(report.price, 15000.0);
        assert_eq!(report.make, "Toyota");
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut body = valid_body();
        body.price = Some(json!(1_000_001));
        body.year = Some(json!(1929));
        body.lat = Some(json!(91));
        body.lng = Some(json!(-181));
        body.mileage = Some(json!(-1));
        let errors = body.validate().unwrap_err();
        for field in ["price", "year", "lat", "lng", "mileage"] {
            assert!(errors.has(field), "{field} should be rejected");
        }
        assert!(!errors.has("make"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut body = valid_body();
        body.price = Some(json!(1_000_000));
        body.year = Some(json!(2050));
        body.mileage = Some(json!(0));
        body.lat = Some(json!(-90));
        body.lng = Some(json!(180));
        assert!(body.validate().is_ok());
    }

    #[test]
    fn approval_must_be_boolean() {
        let ok = ApproveReportRequest {
            approved: Some(json!(true)),
        };
        assert_eq!(ok.validate(), Ok(true));
        let bad = ApproveReportRequest {
            approved: Some(json!("yes")),
        };
        assert!(bad.validate().unwrap_err().has("approved"));
        assert!(ApproveReportRequest::default().validate().is_err());
    }

    #[test]
    fn estimate_query_parses_text_values() {
        let q = GetEstimateQuery {
            make: Some("Toyota".into()),
            model: Some("Corolla".into()),
            year: Some("2018".into()),
            lat: Some("10.5".into()),
            lng: Some("-10".into()),
            mileage: Some("55000".into()),
        };
        let parsed = q.validate().unwrap();
        assert_eq!(parsed.year, 2018);
        assert_eq!(parsed.lat, 10.5);
        assert_eq!(parsed.lng, -10.0);
    }

    #[test]
    fn estimate_query_reports_missing_values() {
        let errors = GetEstimateQuery::default().validate().unwrap_err();
        assert_eq!(errors.fields().len(), 6);
    }

    #[test]
    fn empty_estimate_serializes_as_null() {
        let json = serde_json::to_string(&EstimateResponse { price: None }).unwrap();
        assert_eq!(json, r#"{"price":null}"#);
    }
}
