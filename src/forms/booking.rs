use super::{Form, FormErrors};
use crate::client::TripfferClient;
use crate::error::{ApiError, FieldErrors};
use crate::models::{Booking, Hotel, Id, Review};
use crate::resources::{BookingRequest, ReviewRequest, SearchParams};
use crate::validate;
use async_trait::async_trait;
use chrono::NaiveDate;

// Shared by the booking and reschedule forms; problems are reported under
// a single `dates` input
fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), FormErrors> {
    let mut errors = FormErrors::new();
    let start = errors.date("dates", start);
    let end = errors.date("dates", end);
    if !errors.is_empty() {
        return Err(errors);
    }
    validate::date_range(start, end).map_err(|message| {
        errors.set("dates", message);
        errors
    })
}

fn into_validation(errors: FormErrors) -> ApiError {
    ApiError::Validation(FieldErrors::from(errors))
}

#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub room_id: Id,
    pub start_date: String,
    pub end_date: String,
}

#[async_trait]
impl Form for BookingForm {
    type Output = Booking;

    fn fields(&self) -> &'static [&'static str] {
        &["dates", "start_date", "end_date", "room"]
    }

    fn validate(&self) -> FormErrors {
        parse_range(&self.start_date, &self.end_date)
            .err()
            .unwrap_or_default()
    }

    async fn submit(&self, client: &TripfferClient) -> Result<Booking, ApiError> {
        let (start_date, end_date) =
            parse_range(&self.start_date, &self.end_date).map_err(into_validation)?;
        client
            .create_booking(&BookingRequest {
                room: self.room_id,
                start_date,
                end_date,
            })
            .await
    }
}

#[derive(Debug, Clone, Default)]
pub struct RescheduleForm {
    pub booking_id: Id,
    pub start_date: String,
    pub end_date: String,
}

impl RescheduleForm {
    pub fn for_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            start_date: booking.start_date.format("%Y-%m-%d").to_string(),
            end_date: booking.end_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[async_trait]
impl Form for RescheduleForm {
    type Output = Booking;

    fn fields(&self) -> &'static [&'static str] {
        &["dates", "start_date", "end_date"]
    }

    fn validate(&self) -> FormErrors {
        parse_range(&self.start_date, &self.end_date)
            .err()
            .unwrap_or_default()
    }

    async fn submit(&self, client: &TripfferClient) -> Result<Booking, ApiError> {
        let (start, end) = parse_range(&self.start_date, &self.end_date).map_err(into_validation)?;
        client.reschedule_booking(self.booking_id, start, end).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    pub hotel_id: Id,
    // 0 until a star is picked
    pub rating: u8,
    pub comment: String,
}

#[async_trait]
impl Form for ReviewForm {
    type Output = Review;

    fn fields(&self) -> &'static [&'static str] {
        &["rating", "comment"]
    }

    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.rating == 0 {
            errors.set("rating", "Rating is required");
        }
        errors.check("rating", validate::rating(self.rating));
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<Review, ApiError> {
        client
            .add_review(&ReviewRequest {
                hotel: self.hotel_id,
                rating: self.rating,
                comment: self.comment.trim().to_string(),
            })
            .await
    }
}

// Home page and search page query box
#[derive(Debug, Clone)]
pub struct SearchForm {
    pub destination: String,
    pub check_in: String,
    pub check_out: String,
    pub adults: u32,
    pub beds: Option<u32>,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            destination: String::new(),
            check_in: String::new(),
            check_out: String::new(),
            adults: 1,
            beds: None,
        }
    }
}

impl SearchForm {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            city: Some(self.destination.trim().to_string()).filter(|d| !d.is_empty()),
            beds: self.beds,
            adults: Some(self.adults),
            check_in: validate::parse_date(&self.check_in),
            check_out: validate::parse_date(&self.check_out),
        }
    }
}

#[async_trait]
impl Form for SearchForm {
    type Output = Vec<Hotel>;

    fn fields(&self) -> &'static [&'static str] {
        &["destination", "check_in", "check_out", "adults"]
    }

    // Every input is optional, but dates given must be ordered
    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        let check_in = errors.date("check_in", &self.check_in);
        let check_out = errors.date("check_out", &self.check_out);
        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            if let Err(message) = validate::date_range(Some(check_in), Some(check_out)) {
                errors.set("check_out", message);
            }
        }
        if self.adults == 0 {
            errors.set("adults", "At least one adult is required.");
        }
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<Vec<Hotel>, ApiError> {
        client.search_hotels(&self.params()).await
    }
}
