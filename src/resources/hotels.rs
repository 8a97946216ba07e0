use super::ImageUpload;
use crate::cache::{Invalidation, QueryKey, Resource};
use crate::client::{Mutation, Query, TripfferClient};
use crate::error::ApiError;
use crate::models::{Booking, Hotel, Id};
use crate::transport::{ApiRequest, FormPart};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub city: Option<String>,
    pub beds: Option<u32>,
    pub adults: Option<u32>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

impl SearchParams {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            pairs.push(("city", city.to_string()));
        }
        if let Some(beds) = self.beds {
            pairs.push(("beds", beds.to_string()));
        }
        if let Some(adults) = self.adults {
            pairs.push(("adults", adults.to_string()));
        }
        if let Some(check_in) = self.check_in {
            pairs.push(("check_in", check_in.format("%Y-%m-%d").to_string()));
        }
        if let Some(check_out) = self.check_out {
            pairs.push(("check_out", check_out.format("%Y-%m-%d").to_string()));
        }
        pairs
    }

    // Distinct searches are cached under distinct keys
    pub fn cache_id(&self) -> String {
        self.pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub(crate) fn to_query(&self) -> Query {
        let request = self
            .pairs()
            .into_iter()
            .fold(ApiRequest::get("hotels/search/"), |req, (k, v)| req.query(k, v));
        Query::new(QueryKey::with_id(Resource::HotelSearch, self.cache_id()), request)
    }
}

// Partial update of the owner's hotel. Features are sent as a
// comma-separated list of names; images are appended to the gallery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub stars: Option<u8>,
    pub price_per_night: Option<f64>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub images: Vec<ImageUpload>,
}

impl HotelUpdate {
    pub(crate) fn to_parts(&self) -> Vec<FormPart> {
        let mut parts = Vec::new();
        let texts = [
            ("name", self.name.clone()),
            ("address", self.address.clone()),
            ("website", self.website.clone()),
            ("description", self.description.clone()),
            ("stars", self.stars.map(|s| s.to_string())),
            ("price_per_night", self.price_per_night.map(|p| format!("{:.2}", p))),
            ("contact_phone", self.contact_phone.clone()),
            ("contact_email", self.contact_email.clone()),
            ("amenities", self.amenities.as_ref().map(|a| a.join(","))),
            ("features", self.features.as_ref().map(|f| f.join(","))),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                parts.push(FormPart::text(name, value));
            }
        }
        parts.extend(self.images.iter().map(|image| image.to_part("images")));
        parts
    }
}

impl TripfferClient {
    pub async fn search_hotels(&self, params: &SearchParams) -> Result<Vec<Hotel>, ApiError> {
        self.fetch(&params.to_query()).await
    }

    pub async fn hotel_details(&self, hotel_id: Id) -> Result<Hotel, ApiError> {
        let query = Query::new(
            QueryKey::with_id(Resource::HotelDetails, hotel_id),
            ApiRequest::get(format!("hotels/search/{}/", hotel_id)),
        );
        self.fetch(&query).await
    }

    // The hotel owned by the signed-in HOTEL account
    pub async fn my_hotel(&self) -> Result<Hotel, ApiError> {
        let query = Query::new(
            QueryKey::new(Resource::MyHotel),
            ApiRequest::get("hotels/my-hotel/"),
        );
        self.fetch(&query).await
    }

    pub async fn update_my_hotel(&self, update: &HotelUpdate) -> Result<Hotel, ApiError> {
        let request =
            ApiRequest::put("hotels/my-hotel/update_hotel/").multipart(update.to_parts());
        self.mutate(
            Mutation::new(request)
                .invalidates(Invalidation::Resource(Resource::MyHotel))
                .invalidates(Invalidation::Resource(Resource::CurrentUser))
                .invalidates(Invalidation::Resource(Resource::HotelDetails))
                .invalidates(Invalidation::Resource(Resource::HotelSearch)),
        )
        .await
    }

    pub async fn hotel_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        let query = Query::new(
            QueryKey::new(Resource::HotelBookings),
            ApiRequest::get("hotels/my-hotel/bookings/"),
        );
        self.fetch(&query).await
    }
}
