use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company_name: String,
    pub role: String,
    pub application_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>, // canonical absolute-URL string
    pub cover_letter: bool,
    pub interview_date: Option<NaiveDate>,
    pub offer: bool,
    pub salary: Option<Decimal>,
    pub equity: bool,
    pub bonus: Option<f64>, // fraction, e.g. 0.125 for "12.5%"
    pub health_coverage: bool,
    pub pto: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub application_id: i64,
    pub content: String, // begins with the "[YYYY-MM-DD HH:MM:SS] -- " stamp
    pub created_at: String,
}
