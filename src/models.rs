// Data structures mirrored from the booking backend's JSON representations

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Id = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Hotel,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelProfile {
    pub hotel_name: String,
    pub address: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub hotel_stars: Option<u8>,
    pub hotel_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub role: Role,
    pub profile: Option<UserProfile>,
    pub hotel_profile: Option<HotelProfile>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_hotel(&self) -> bool {
        self.role == Role::Hotel || self.hotel_profile.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// Response of both `accounts/login/` and `accounts/register/`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl AuthResponse {
    pub fn tokens(&self) -> AuthTokens {
        AuthTokens {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    pub id: Id,
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    #[default]
    Single,
    Double,
    Triple,
    Quad,
    King,
    Suite,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::Single,
        RoomType::Double,
        RoomType::Triple,
        RoomType::Quad,
        RoomType::King,
        RoomType::Suite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "SINGLE",
            RoomType::Double => "DOUBLE",
            RoomType::Triple => "TRIPLE",
            RoomType::Quad => "QUAD",
            RoomType::King => "KING",
            RoomType::Suite => "SUITE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Room {
    pub id: Id,
    #[serde(with = "decimal")]
    pub price: f64,
    pub description: Option<String>,
    pub bed_count: u32,
    pub max_adults: u32,
    pub room_type: RoomType,
    pub images: Vec<Image>,
    pub hotel_name: Option<String>,
    pub hotel_address: Option<String>,
    pub hotel_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: Id,
    // Username of the author
    pub user: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotel {
    pub id: Id,
    pub name: String,
    pub stars: u8,
    pub address: String,
    pub website: Option<String>,
    pub description: Option<String>,
    #[serde(with = "decimal::option")]
    pub price_per_night: Option<f64>,
    pub availability_start_date: Option<NaiveDate>,
    pub availability_end_date: Option<NaiveDate>,
    pub features: Vec<Id>,
    pub amenities: Vec<String>,
    pub images: Vec<Image>,
    pub rooms: Vec<Room>,
    pub photo_url: Option<String>,
    pub guest_score: Option<f64>,
    pub distance_to_center: Option<f64>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub number_of_adults: Option<u32>,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub reviews: Vec<Review>,
}

impl Hotel {
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
        Some(total as f64 / self.reviews.len() as f64)
    }

    pub fn cheapest_room(&self) -> Option<&Room> {
        self.rooms
            .iter()
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        let after_start = self.availability_start_date.map_or(true, |s| date >= s);
        let before_end = self.availability_end_date.map_or(true, |e| date <= e);
        after_start && before_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Id,
    #[serde(default)]
    pub user: Option<Id>,
    pub room: Room,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, with = "decimal")]
    pub total_price: f64,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(0)
    }

    // Starts after `today` and is still pending or confirmed
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start_date > today && self.status.is_active()
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.end_date < today && self.status == BookingStatus::Confirmed
    }
}

pub fn upcoming_bookings(bookings: &[Booking], today: NaiveDate) -> Vec<&Booking> {
    bookings.iter().filter(|b| b.is_upcoming(today)).collect()
}

pub fn past_bookings(bookings: &[Booking], today: NaiveDate) -> Vec<&Booking> {
    bookings.iter().filter(|b| b.is_past(today)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteHotel {
    pub id: Id,
    #[serde(default)]
    pub user: Option<Id>,
    pub hotel: Hotel,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub fn find_favorite(favorites: &[FavoriteHotel], hotel_id: Id) -> Option<&FavoriteHotel> {
    favorites.iter().find(|f| f.hotel.id == hotel_id)
}

// The backend serializes decimals as strings ("120.50") but older payloads
// and computed fields (total_price = 0) come through as numbers
mod decimal {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.2}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal as a number or string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid decimal '{}'", v)))
        }
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super")] f64);

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|w| w.0))
        }
    }
}
