use crate::cache::{Invalidation, QueryKey, Resource};
use crate::client::{Mutation, Query, TripfferClient};
use crate::error::ApiError;
use crate::models::{self, Booking, BookingStatus, Id};
use crate::transport::ApiRequest;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub room: Id,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// A booking change affects the guest's list, the owner's list and room
// availability shown on the hotel pages
fn booking_mutation(request: ApiRequest) -> Mutation {
    [
        Resource::Bookings,
        Resource::HotelBookings,
        Resource::HotelDetails,
        Resource::HotelSearch,
    ]
    .into_iter()
    .map(Invalidation::Resource)
    .fold(Mutation::new(request), Mutation::invalidates)
}

impl TripfferClient {
    pub async fn user_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        let query = Query::new(
            QueryKey::new(Resource::Bookings),
            ApiRequest::get("hotels/bookings/"),
        );
        self.fetch(&query).await
    }

    pub async fn upcoming_bookings(&self, today: NaiveDate) -> Result<Vec<Booking>, ApiError> {
        let bookings = self.user_bookings().await?;
        Ok(models::upcoming_bookings(&bookings, today)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn past_bookings(&self, today: NaiveDate) -> Result<Vec<Booking>, ApiError> {
        let bookings = self.user_bookings().await?;
        Ok(models::past_bookings(&bookings, today)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn create_booking(&self, booking: &BookingRequest) -> Result<Booking, ApiError> {
        let request = ApiRequest::post("hotels/bookings/").json(serde_json::to_value(booking)?);
        self.mutate(booking_mutation(request)).await
    }

    // The server keeps the booking and marks it cancelled
    pub async fn cancel_booking(&self, booking_id: Id) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("hotels/bookings/{}/", booking_id));
        self.mutate::<()>(booking_mutation(request)).await?;
        tracing::info!(booking_id, "Booking cancelled");
        Ok(())
    }

    pub async fn reschedule_booking(
        &self,
        booking_id: Id,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Booking, ApiError> {
        let request = ApiRequest::post(format!("hotels/bookings/{}/reschedule/", booking_id))
            .json(json!({"start_date": start_date, "end_date": end_date}));
        self.mutate(booking_mutation(request)).await
    }

    // Hotel owners confirm, cancel or complete bookings for their rooms
    pub async fn update_booking_status(
        &self,
        booking_id: Id,
        status: BookingStatus,
    ) -> Result<Booking, ApiError> {
        let request = ApiRequest::patch(format!("hotels/bookings/{}/", booking_id))
            .json(json!({"status": status}));
        self.mutate(booking_mutation(request)).await
    }
}
