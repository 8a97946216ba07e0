use super::ImageUpload;
use crate::cache::{Invalidation, QueryKey, Resource};
use crate::client::{Mutation, Query, TripfferClient};
use crate::error::ApiError;
use crate::models::{Id, Room, RoomType};
use crate::transport::{ApiRequest, FormPart};

#[derive(Debug, Clone, PartialEq)]
pub struct RoomPayload {
    pub price: f64,
    pub description: String,
    pub bed_count: u32,
    pub max_adults: u32,
    pub room_type: RoomType,
    pub images: Vec<ImageUpload>,
}

impl RoomPayload {
    pub(crate) fn to_parts(&self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("price", format!("{:.2}", self.price)),
            FormPart::text("description", &self.description),
            FormPart::text("bed_count", self.bed_count),
            FormPart::text("max_adults", self.max_adults),
            FormPart::text("room_type", self.room_type),
        ];
        parts.extend(self.images.iter().map(|image| image.to_part("images")));
        parts
    }
}

// Rooms show up in the owner's hotel, the public hotel pages and search
// results, and the account payload
fn room_change() -> impl Iterator<Item = Invalidation> {
    [
        Resource::Rooms,
        Resource::MyHotel,
        Resource::HotelDetails,
        Resource::HotelSearch,
        Resource::CurrentUser,
    ]
    .into_iter()
    .map(Invalidation::Resource)
}

fn room_mutation(request: ApiRequest) -> Mutation {
    room_change().fold(Mutation::new(request), Mutation::invalidates)
}

impl TripfferClient {
    pub async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        let query = Query::new(QueryKey::new(Resource::Rooms), ApiRequest::get("hotels/rooms/"));
        self.fetch(&query).await
    }

    pub async fn add_room(&self, room: &RoomPayload) -> Result<Room, ApiError> {
        let request = ApiRequest::post("hotels/rooms/").multipart(room.to_parts());
        self.mutate(room_mutation(request)).await
    }

    pub async fn update_room(&self, room_id: Id, room: &RoomPayload) -> Result<Room, ApiError> {
        let request =
            ApiRequest::patch(format!("hotels/rooms/{}/", room_id)).multipart(room.to_parts());
        self.mutate(room_mutation(request)).await
    }

    pub async fn delete_room(&self, room_id: Id) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("hotels/rooms/{}/", room_id));
        self.mutate(room_mutation(request)).await
    }

    pub async fn delete_room_image(&self, room_id: Id, image_id: Id) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("hotels/rooms/{}/images/{}/", room_id, image_id));
        self.mutate(room_mutation(request)).await
    }
}
