use super::{Form, FormErrors};
use crate::client::TripfferClient;
use crate::error::{ApiError, FieldErrors};
use crate::models::{Hotel, Id, Room, RoomType};
use crate::resources::{HotelUpdate, ImageUpload, RoomPayload};
use crate::validate;
use async_trait::async_trait;

// Settings form for the owner's hotel
#[derive(Debug, Clone, Default)]
pub struct HotelProfileForm {
    pub name: String,
    pub address: String,
    pub website: String,
    pub description: String,
    pub stars: String,
    pub price_per_night: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub amenities: Vec<String>,
    // Comma-separated feature names
    pub features: String,
    pub images: Vec<ImageUpload>,
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

impl HotelProfileForm {
    pub fn from_hotel(hotel: &Hotel) -> Self {
        Self {
            name: hotel.name.clone(),
            address: hotel.address.clone(),
            website: hotel.website.clone().unwrap_or_default(),
            description: hotel.description.clone().unwrap_or_default(),
            stars: hotel.stars.to_string(),
            price_per_night: hotel
                .price_per_night
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default(),
            contact_phone: hotel.contact_phone.clone().unwrap_or_default(),
            contact_email: hotel.contact_email.clone().unwrap_or_default(),
            amenities: hotel.amenities.clone(),
            features: String::new(),
            images: Vec::new(),
        }
    }

    fn update(&self) -> HotelUpdate {
        let features: Vec<String> = self
            .features
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        HotelUpdate {
            name: optional(&self.name),
            address: optional(&self.address),
            website: optional(&self.website),
            description: optional(&self.description),
            stars: self.stars.trim().parse().ok(),
            price_per_night: self.price_per_night.trim().parse().ok(),
            contact_phone: optional(&self.contact_phone),
            contact_email: optional(&self.contact_email),
            amenities: Some(self.amenities.clone()),
            features: (!features.is_empty()).then_some(features),
            images: self.images.clone(),
        }
    }
}

#[async_trait]
impl Form for HotelProfileForm {
    type Output = Hotel;

    fn fields(&self) -> &'static [&'static str] {
        &[
            "name",
            "address",
            "website",
            "description",
            "stars",
            "price_per_night",
            "contact_phone",
            "contact_email",
            "amenities",
            "features",
            "images",
        ]
    }

    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.check("name", validate::required(&self.name, "Hotel name is required"));
        errors.check("address", validate::required(&self.address, "Address is required"));
        errors.check("website", validate::website(&self.website));
        if !self.stars.trim().is_empty() {
            match self.stars.trim().parse::<u8>() {
                Ok(stars) => errors.check("stars", validate::stars(stars)),
                Err(_) => errors.set("stars", "Enter a whole number of stars."),
            }
        }
        if !self.price_per_night.trim().is_empty() {
            match self.price_per_night.trim().parse::<f64>() {
                Ok(price) if price.is_finite() && price >= 0.0 => {}
                _ => errors.set("price_per_night", "Enter a valid price."),
            }
        }
        errors.check("contact_phone", validate::phone_number(&self.contact_phone));
        if !self.contact_email.trim().is_empty() {
            errors.check("contact_email", validate::email(&self.contact_email));
        }
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<Hotel, ApiError> {
        client.update_my_hotel(&self.update()).await
    }
}

// Add a room, or edit one when `room_id` is set. Numeric inputs are kept as
// typed so a blank one can be reported as missing.
#[derive(Debug, Clone, Default)]
pub struct RoomForm {
    pub room_id: Option<Id>,
    pub price: String,
    pub description: String,
    pub bed_count: String,
    pub max_adults: String,
    pub room_type: String,
    pub images: Vec<ImageUpload>,
}

impl RoomForm {
    pub fn edit(room: &Room) -> Self {
        Self {
            room_id: Some(room.id),
            price: format!("{:.2}", room.price),
            description: room.description.clone().unwrap_or_default(),
            bed_count: room.bed_count.to_string(),
            max_adults: room.max_adults.to_string(),
            room_type: room.room_type.to_string(),
            images: Vec::new(),
        }
    }

    fn parse(&self) -> Result<RoomPayload, FormErrors> {
        let mut errors = FormErrors::new();
        let price: Option<f64> =
            errors.number("price", &self.price, "Price is required", "Enter a valid price.");
        if price.map_or(false, |p| !p.is_finite() || p < 0.0) {
            errors.set("price", "Enter a valid price.");
        }
        let bed_count: Option<u32> = errors.number(
            "bed_count",
            &self.bed_count,
            "Bed count is required",
            "Enter a valid bed count.",
        );
        let max_adults: Option<u32> = errors.number(
            "max_adults",
            &self.max_adults,
            "Max adults is required",
            "Enter a valid number of adults.",
        );
        let room_type = if self.room_type.trim().is_empty() {
            errors.set("room_type", "Room type is required");
            None
        } else {
            let parsed = RoomType::parse(&self.room_type);
            if parsed.is_none() {
                errors.set("room_type", "Select a valid room type.");
            }
            parsed
        };

        match (price, bed_count, max_adults, room_type) {
            (Some(price), Some(bed_count), Some(max_adults), Some(room_type)) if errors.is_empty() => {
                Ok(RoomPayload {
                    price,
                    description: self.description.trim().to_string(),
                    bed_count,
                    max_adults,
                    room_type,
                    images: self.images.clone(),
                })
            }
            _ => Err(errors),
        }
    }
}

#[async_trait]
impl Form for RoomForm {
    type Output = Room;

    fn fields(&self) -> &'static [&'static str] {
        &["price", "description", "bed_count", "max_adults", "room_type", "images"]
    }

    fn validate(&self) -> FormErrors {
        self.parse().err().unwrap_or_default()
    }

    async fn submit(&self, client: &TripfferClient) -> Result<Room, ApiError> {
        let payload = self
            .parse()
            .map_err(|errors| ApiError::Validation(FieldErrors::from(errors)))?;
        match self.room_id {
            Some(room_id) => client.update_room(room_id, &payload).await,
            None => client.add_room(&payload).await,
        }
    }
}
