use crate::db::schema::requests;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{Insertable, Queryable, Selectable};
use rust_decimal::Decimal;
use travel_manager_api::{RequestStatus, TravelRequestResponse};
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = requests)]
pub struct NewTravelRequest {
    pub request_id: Uuid,
    pub faculty_user_id: String,
    pub conference_name: String,
    pub purpose_of_attending: String,
    pub conference_url: Option<String>,
    pub destination: String,
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub per_diem: Decimal,
    pub registration_fee: Decimal,
    pub visa_fee: Decimal,
    pub index_type: Option<String>,
    pub status: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TravelRequest {
    pub request_id: Uuid,
    pub faculty_user_id: String,
    pub conference_name: String,
    pub purpose_of_attending: String,
    pub conference_url: Option<String>,
    pub destination: String,
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub per_diem: Decimal,
    pub registration_fee: Decimal,
    pub visa_fee: Decimal,
    pub index_type: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub reviewer_id: Option<String>,
    pub review_comments: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// `per_diem + registration_fee + visa_fee`
pub fn total_cost(per_diem: Decimal, registration_fee: Decimal, visa_fee: Decimal) -> Decimal {
    per_diem + registration_fee + visa_fee
}

impl TravelRequest {
    pub fn total_cost(&self) -> Decimal {
        total_cost(self.per_diem, self.registration_fee, self.visa_fee)
    }

    pub fn status(&self) -> Result<RequestStatus, String> {
        self.status.parse()
    }

    pub fn into_response(self) -> Result<TravelRequestResponse, String> {
        let status = self.status()?;
        let total_cost = self.total_cost();
        Ok(TravelRequestResponse {
            request_id: self.request_id,
            faculty_user_id: self.faculty_user_id,
            conference_name: self.conference_name,
            purpose_of_attending: self.purpose_of_attending,
            conference_url: self.conference_url,
            destination: self.destination,
            city: self.city,
            date_from: self.date_from,
            date_to: self.date_to,
            per_diem: self.per_diem,
            registration_fee: self.registration_fee,
            visa_fee: self.visa_fee,
            total_cost,
            index_type: self.index_type,
            status,
            created_at: self.created_at,
            reviewer_id: self.reviewer_id,
            review_comments: self.review_comments,
            reviewed_at: self.reviewed_at,
        })
    }
}
