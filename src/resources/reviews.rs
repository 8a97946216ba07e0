use crate::cache::{Invalidation, QueryKey, Resource};
use crate::client::{Mutation, Query, TripfferClient};
use crate::error::{ApiError, FieldErrors};
use crate::models::{Id, Review};
use crate::transport::ApiRequest;
use crate::validate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRequest {
    pub hotel: Id,
    pub rating: u8,
    pub comment: String,
}

impl TripfferClient {
    pub async fn hotel_reviews(&self, hotel_id: Id) -> Result<Vec<Review>, ApiError> {
        let query = Query::new(
            QueryKey::with_id(Resource::Reviews, hotel_id),
            ApiRequest::get("hotels/reviews/").query("hotel_id", hotel_id),
        );
        self.fetch(&query).await
    }

    // The server keeps one review per user and hotel; posting again replaces it
    pub async fn add_review(&self, review: &ReviewRequest) -> Result<Review, ApiError> {
        if let Err(message) = validate::rating(review.rating) {
            let mut errors = FieldErrors::new();
            errors.push("rating", message);
            return Err(ApiError::Validation(errors));
        }

        let request = ApiRequest::post("hotels/reviews/").json(serde_json::to_value(review)?);
        self.mutate(
            Mutation::new(request)
                .invalidates(Invalidation::Key(QueryKey::with_id(Resource::Reviews, review.hotel)))
                .invalidates(Invalidation::Key(QueryKey::with_id(
                    Resource::HotelDetails,
                    review.hotel,
                )))
                .invalidates(Invalidation::Resource(Resource::HotelSearch)),
        )
        .await
    }
}
