use crate::cache::{Invalidation, QueryKey, Resource};
use crate::client::{Mutation, Query, TripfferClient};
use crate::error::ApiError;
use crate::models::{find_favorite, FavoriteHotel, Id};
use crate::transport::ApiRequest;
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteToggle {
    Added(FavoriteHotel),
    Removed { favorite_id: Id },
}

impl FavoriteToggle {
    pub fn is_favorite(&self) -> bool {
        matches!(self, FavoriteToggle::Added(_))
    }
}

fn favorites_mutation(request: ApiRequest) -> Mutation {
    Mutation::new(request).invalidates(Invalidation::Resource(Resource::Favorites))
}

impl TripfferClient {
    pub async fn favorites(&self) -> Result<Vec<FavoriteHotel>, ApiError> {
        let query = Query::new(
            QueryKey::new(Resource::Favorites),
            ApiRequest::get("hotels/favorites/"),
        );
        self.fetch(&query).await
    }

    pub async fn is_favorite(&self, hotel_id: Id) -> Result<bool, ApiError> {
        let favorites = self.favorites().await?;
        Ok(find_favorite(&favorites, hotel_id).is_some())
    }

    pub async fn add_favorite(&self, hotel_id: Id) -> Result<FavoriteHotel, ApiError> {
        let request = ApiRequest::post("hotels/favorites/").json(json!({ "hotel": hotel_id }));
        self.mutate(favorites_mutation(request)).await
    }

    // Takes the favorite entry id, not the hotel id
    pub async fn remove_favorite(&self, favorite_id: Id) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("hotels/favorites/{}/", favorite_id));
        self.mutate(favorites_mutation(request)).await
    }

    pub async fn toggle_favorite(&self, hotel_id: Id) -> Result<FavoriteToggle, ApiError> {
        let favorites = self.favorites().await?;
        match find_favorite(&favorites, hotel_id) {
            Some(existing) => {
                let favorite_id = existing.id;
                self.remove_favorite(favorite_id).await?;
                tracing::debug!(hotel_id, favorite_id, "Removed hotel from favorites");
                Ok(FavoriteToggle::Removed { favorite_id })
            }
            None => {
                let added = self.add_favorite(hotel_id).await?;
                tracing::debug!(hotel_id, favorite_id = added.id, "Added hotel to favorites");
                Ok(FavoriteToggle::Added(added))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_with;
    use crate::mock::{MockReply, MockServer};
    use crate::transport::Method;
    use std::sync::Arc;

    fn favorite(id: Id, hotel_id: Id) -> serde_json::Value {
        json!({"id": id, "user": 1, "hotel": {"id": hotel_id, "name": "Seaside Inn"}, "created_at": "2025-05-01T09:00:00Z"})
    }

    #[tokio::test]
    async fn test_toggle_adds_then_list_reflects_it() {
        let server = Arc::new(MockServer::new());
        server
            .ok(Method::GET, "hotels/favorites/", json!([]))
            .ok(Method::GET, "hotels/favorites/", json!([favorite(11, 4)]));
        server.on(Method::POST, "hotels/favorites/", MockReply::Status(201, favorite(11, 4)));
        let client = client_with(&server, Some("t"));

        let toggled = client.toggle_favorite(4).await.unwrap();
        assert!(toggled.is_favorite());
        assert_eq!(
            server.requests()[1].json_body().cloned().unwrap(),
            json!({"hotel": 4})
        );

        assert!(client.is_favorite(4).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_removes_existing_favorite_by_entry_id() {
        let server = Arc::new(MockServer::new());
        server
            .ok(Method::GET, "hotels/favorites/", json!([favorite(11, 4), favorite(12, 5)]))
            .ok(Method::GET, "hotels/favorites/", json!([favorite(12, 5)]));
        server.on(Method::DELETE, "hotels/favorites/11/", MockReply::Empty(204));
        let client = client_with(&server, Some("t"));

        let toggled = client.toggle_favorite(4).await.unwrap();
        assert_eq!(toggled, FavoriteToggle::Removed { favorite_id: 11 });

        let remaining = client.favorites().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].hotel.id, 5);
        assert_eq!(server.count(&Method::POST, "hotels/favorites/"), 0);
    }

    #[tokio::test]
    async fn test_failed_toggle_leaves_list_cached() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/favorites/", json!([]));
        server.on(
            Method::POST,
            "hotels/favorites/",
            MockReply::Status(404, json!({"detail": "Hotel not found."})),
        );
        let client = client_with(&server, Some("t"));

        let err = client.toggle_favorite(99).await.unwrap_err();
        assert_eq!(err.user_message(), "Hotel not found.");

        client.favorites().await.unwrap();
        assert_eq!(server.count(&Method::GET, "hotels/favorites/"), 1);
    }
}
