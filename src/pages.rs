// View loaders: each page's reads, issued concurrently through the cache

use crate::client::TripfferClient;
use crate::error::{ApiError, FieldErrors};
use crate::forms::Form;
use crate::models::{self, Booking, FavoriteHotel, Hotel, Id, Review, Room, User};
use crate::routes::{Route, SearchQuery};
use crate::validate;
use crate::widgets::{paginate, Carousel, Page};
use chrono::NaiveDate;
use futures::try_join;

// Request state of a page, as rendered
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PageState<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => PageState::Ready(value),
            Err(err) => PageState::Failed(err.user_message()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub user: User,
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
    pub favorites: Vec<FavoriteHotel>,
}

#[derive(Debug, Clone)]
pub struct BookingsView {
    pub upcoming: Vec<Booking>,
    pub past: Vec<Booking>,
    pub all: Vec<Booking>,
}

#[derive(Debug, Clone)]
pub struct HotelDetailsView {
    pub hotel: Hotel,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
    // `None` for anonymous visitors
    pub is_favorite: Option<bool>,
    pub gallery: Carousel,
}

#[derive(Debug, Clone)]
pub struct HotelDashboardView {
    pub user: User,
    pub hotel: Hotel,
    pub rooms: Vec<Room>,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone)]
pub struct BookingPageView {
    pub hotel: Hotel,
    pub room: Room,
}

#[derive(Debug, Clone)]
pub struct SearchView {
    pub query: SearchQuery,
    pub results: Page<Hotel>,
}

#[derive(Debug, Clone)]
pub struct SettingsView {
    pub user: User,
    pub hotel: Option<Hotel>,
}

#[derive(Debug, Clone)]
pub enum View {
    Dashboard(DashboardView),
    Bookings(BookingsView),
    Favorites(Vec<FavoriteHotel>),
    HotelDetails(Box<HotelDetailsView>),
    HotelDashboard(Box<HotelDashboardView>),
    Book(BookingPageView),
    Search(SearchView),
    Settings(SettingsView),
    // Home, login, register and the informational pages need no data
    Static(Route),
    Redirect(Route),
    NotFound(String),
}

impl TripfferClient {
    pub async fn load_dashboard(&self, today: NaiveDate) -> Result<DashboardView, ApiError> {
        let (user, bookings, favorites) =
            try_join!(self.current_user(), self.user_bookings(), self.favorites())?;
        Ok(DashboardView {
            user,
            upcoming: models::upcoming_bookings(&bookings, today).into_iter().cloned().collect(),
            past: models::past_bookings(&bookings, today).into_iter().cloned().collect(),
            favorites,
        })
    }

    pub async fn load_bookings(&self, today: NaiveDate) -> Result<BookingsView, ApiError> {
        let all = self.user_bookings().await?;
        Ok(BookingsView {
            upcoming: models::upcoming_bookings(&all, today).into_iter().cloned().collect(),
            past: models::past_bookings(&all, today).into_iter().cloned().collect(),
            all,
        })
    }

    pub async fn load_hotel_details(&self, hotel_id: Id) -> Result<HotelDetailsView, ApiError> {
        let (hotel, reviews) = try_join!(self.hotel_details(hotel_id), self.hotel_reviews(hotel_id))?;
        let is_favorite = if self.is_authenticated() {
            Some(self.is_favorite(hotel_id).await?)
        } else {
            None
        };

        let average_rating = if reviews.is_empty() {
            hotel.average_rating()
        } else {
            let total: u32 = reviews.iter().map(|r| r.rating as u32).sum();
            Some(total as f64 / reviews.len() as f64)
        };
        let gallery = Carousel::new(hotel.images.clone());
        Ok(HotelDetailsView {
            hotel,
            reviews,
            average_rating,
            is_favorite,
            gallery,
        })
    }

    pub async fn load_hotel_dashboard(&self) -> Result<HotelDashboardView, ApiError> {
        let (user, hotel, rooms, bookings) = try_join!(
            self.current_user(),
            self.my_hotel(),
            self.rooms(),
            self.hotel_bookings()
        )?;
        Ok(HotelDashboardView {
            user,
            hotel,
            rooms,
            bookings,
        })
    }

    pub async fn load_booking_page(
        &self,
        hotel_id: Id,
        room_id: Id,
    ) -> Result<BookingPageView, ApiError> {
        let hotel = self.hotel_details(hotel_id).await?;
        let room = hotel
            .rooms
            .iter()
            .find(|r| r.id == room_id)
            .cloned()
            .ok_or_else(|| ApiError::ClientError(format!("Room {} not found in this hotel", room_id)))?;
        Ok(BookingPageView { hotel, room })
    }

    // Malformed or reversed dates fail locally with field errors
    pub async fn load_search(&self, query: &SearchQuery, page: usize) -> Result<SearchView, ApiError> {
        let form = query.to_form();
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(FieldErrors::from(errors)));
        }
        let params = form.params();
        let hotels = self.search_hotels(&params).await?;
        Ok(SearchView {
            query: query.clone(),
            results: paginate(hotels, page, self.config().items_per_page),
        })
    }

    pub async fn load_settings(&self) -> Result<SettingsView, ApiError> {
        let user = self.current_user().await?;
        let hotel = if user.is_hotel() {
            Some(self.my_hotel().await?)
        } else {
            None
        };
        Ok(SettingsView { user, hotel })
    }

    // Resolves a path to its data, applying the route's access rule first.
    // A rejected session (the tokens are already cleared) sends the visitor
    // to login.
    pub async fn load_route(&self, path: &str, today: NaiveDate) -> Result<View, ApiError> {
        match self.resolve_route(Route::parse(path), today).await {
            Err(ApiError::Unauthorized(message)) => {
                tracing::info!(%message, "Session rejected, redirecting to login");
                Ok(View::Redirect(Route::Login))
            }
            other => other,
        }
    }

    async fn resolve_route(&self, route: Route, today: NaiveDate) -> Result<View, ApiError> {
        if route.access() != crate::routes::Access::Public {
            if !self.is_authenticated() {
                return Ok(View::Redirect(Route::Login));
            }
            let user = self.current_user().await?;
            if let Some(redirect) = route.redirect_for(Some(&user)) {
                return Ok(View::Redirect(redirect));
            }
        }

        tracing::debug!(route = %route, "Loading view");
        let view = match route {
            Route::Dashboard => View::Dashboard(self.load_dashboard(today).await?),
            Route::Bookings => View::Bookings(self.load_bookings(today).await?),
            Route::Favorites => View::Favorites(self.favorites().await?),
            Route::HotelDetails { hotel_id } => {
                View::HotelDetails(Box::new(self.load_hotel_details(hotel_id).await?))
            }
            Route::HotelDashboard => View::HotelDashboard(Box::new(self.load_hotel_dashboard().await?)),
            Route::Book { hotel_id, room_id } => {
                View::Book(self.load_booking_page(hotel_id, room_id).await?)
            }
            Route::Search(query) => View::Search(self.load_search(&query, 1).await?),
            Route::Settings => View::Settings(self.load_settings().await?),
            Route::NotFound(path) => View::NotFound(path),
            other => View::Static(other),
        };
        Ok(view)
    }
}

// Nights and price for a booking draft, shown before submitting
pub fn booking_quote(room: &Room, start: &str, end: &str) -> Option<(i64, f64)> {
    let (start, end) =
        validate::date_range(validate::parse_date(start), validate::parse_date(end)).ok()?;
    let nights = (end - start).num_days();
    Some((nights, nights as f64 * room.price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_with;
    use crate::mock::{MockReply, MockServer};
    use crate::transport::Method;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        validate::parse_date(s).unwrap()
    }

    fn hotel_json(id: Id) -> Value {
        json!({
            "id": id, "name": format!("Hotel {}", id),
            "images": [{"id": 1, "image": "/media/hotel_images/a.jpg"}, {"id": 2, "image": "/media/hotel_images/b.jpg"}],
            "rooms": [{"id": 9, "price": "80.00", "room_type": "DOUBLE"}],
            "reviews": [{"id": 1, "user": "ana", "rating": 5}]
        })
    }

    #[tokio::test]
    async fn test_dashboard_loads_reads_together() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "accounts/profile/", json!({"id": 1, "first_name": "Ana"}));
        server.ok(
            Method::GET,
            "hotels/bookings/",
            json!([
                {"id": 1, "room": {"id": 9, "price": "80.00"}, "start_date": "2025-07-01", "end_date": "2025-07-03", "status": "pending"},
                {"id": 2, "room": {"id": 9, "price": "80.00"}, "start_date": "2025-05-01", "end_date": "2025-05-03", "status": "confirmed"}
            ]),
        );
        server.ok(Method::GET, "hotels/favorites/", json!([]));
        let client = client_with(&server, Some("t"));

        let view = client.load_dashboard(date("2025-06-10")).await.unwrap();

        assert_eq!(server.request_count(), 3);
        assert_eq!(view.user.first_name, "Ana");
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.past.len(), 1);
        assert!(view.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_hotel_details_for_anonymous_visitor() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/search/4/", hotel_json(4));
        server.ok(
            Method::GET,
            "hotels/reviews/",
            json!([{"id": 1, "user": "ana", "rating": 5}, {"id": 2, "user": "ben", "rating": 2}]),
        );
        let client = client_with(&server, None);

        let view = client.load_hotel_details(4).await.unwrap();

        assert_eq!(view.is_favorite, None);
        assert_eq!(view.average_rating, Some(3.5));
        assert_eq!(view.gallery.len(), 2);
        assert_eq!(server.count(&Method::GET, "hotels/favorites/"), 0);
    }

    #[tokio::test]
    async fn test_route_guard_redirects() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "accounts/profile/", json!({"id": 1, "role": "USER"}));
        let today = date("2025-06-10");

        let anonymous = client_with(&server, None);
        assert!(matches!(
            anonymous.load_route("/bookings", today).await.unwrap(),
            View::Redirect(Route::Login)
        ));

        let guest = client_with(&server, Some("t"));
        assert!(matches!(
            guest.load_route("/hotel-dashboard", today).await.unwrap(),
            View::Redirect(Route::Dashboard)
        ));
        assert!(matches!(
            guest.load_route("/nowhere", today).await.unwrap(),
            View::NotFound(ref p) if p == "/nowhere"
        ));
        assert!(matches!(
            guest.load_route("/about", today).await.unwrap(),
            View::Static(Route::About)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_redirects_to_login() {
        let server = Arc::new(MockServer::new());
        server.on(
            Method::GET,
            "accounts/profile/",
            MockReply::Status(401, json!({"detail": "Given token not valid for any token type"})),
        );
        let client = client_with(&server, Some("expired"));

        let view = client.load_route("/bookings", date("2025-06-10")).await.unwrap();

        assert!(matches!(view, View::Redirect(Route::Login)));
        assert!(!client.is_authenticated());
        assert_eq!(server.count(&Method::GET, "hotels/bookings/"), 0);
    }

    #[tokio::test]
    async fn test_search_with_reversed_dates_is_not_sent() {
        let server = Arc::new(MockServer::new());
        let client = client_with(&server, None);
        let query = SearchQuery {
            destination: Some("Varna".to_string()),
            check_in: Some("2025-07-05".to_string()),
            check_out: Some("2025-07-01".to_string()),
            adults: Some(2),
        };

        let err = client.load_search(&query, 1).await.unwrap_err();

        let fields = err.field_errors().unwrap();
        assert_eq!(
            fields.get("check_out"),
            Some(&["End date must be after start date.".to_string()][..])
        );
        assert_eq!(server.request_count(), 0);
    }

    #[tokio::test]
    async fn test_booking_page_and_search() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/search/4/", hotel_json(4));
        server.ok(
            Method::GET,
            "hotels/search/",
            Value::Array((1..=14).map(hotel_json).collect()),
        );
        let client = client_with(&server, Some("t"));

        let page = tokio_test::assert_ok!(client.load_booking_page(4, 9).await);
        assert_eq!(page.room.price, 80.0);
        tokio_test::assert_err!(client.load_booking_page(4, 10).await);

        let query = SearchQuery {
            destination: Some("Varna".to_string()),
            ..SearchQuery::default()
        };
        let view = client.load_search(&query, 2).await.unwrap();
        assert_eq!(view.results.total_items, 14);
        assert_eq!(view.results.items.len(), 2);
        assert_eq!(server.last_request().unwrap().query_value("city"), Some("Varna"));
    }

    #[test]
    fn test_booking_quote() {
        let room = Room {
            price: 80.0,
            ..Room::default()
        };
        assert_eq!(booking_quote(&room, "2025-07-01", "2025-07-04"), Some((3, 240.0)));
        assert_eq!(booking_quote(&room, "2025-07-04", "2025-07-01"), None);
    }

    #[test]
    fn test_page_state() {
        let ready: PageState<u8> = PageState::from_result(Ok(3));
        assert_eq!(ready.ready(), Some(&3));

        let failed: PageState<u8> = PageState::from_result(Err(ApiError::Timeout(30_000)));
        assert_eq!(
            failed,
            PageState::Failed("An unexpected error occurred. Please try again.".to_string())
        );
        assert!(PageState::<u8>::Loading.ready().is_none());
    }
}
