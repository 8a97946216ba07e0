// Client routes: path parsing, canonical paths and access rules

use crate::forms::SearchForm;
use crate::models::{Id, User};
use std::fmt;
use url::Url;

// Parsed `?destination=..&checkIn=..&checkOut=..&adults=..`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub destination: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub adults: Option<u32>,
}

impl SearchQuery {
    pub fn to_form(&self) -> SearchForm {
        SearchForm {
            destination: self.destination.clone().unwrap_or_default(),
            check_in: self.check_in.clone().unwrap_or_default(),
            check_out: self.check_out.clone().unwrap_or_default(),
            adults: self.adults.unwrap_or(1).max(1),
            beds: None,
        }
    }

    pub fn from_form(form: &SearchForm) -> Self {
        let non_empty = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            destination: non_empty(&form.destination),
            check_in: non_empty(&form.check_in),
            check_out: non_empty(&form.check_out),
            adults: Some(form.adults),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    HotelOwner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Search(SearchQuery),
    Login,
    Register,
    Dashboard,
    HotelDashboard,
    HotelDetails { hotel_id: Id },
    Book { hotel_id: Id, room_id: Id },
    Bookings,
    Favorites,
    Settings,
    About,
    Help,
    Contact,
    NotFound(String),
}

impl Route {
    // Accepts a bare path (`/hotel/search/4`) or a full URL
    pub fn parse(input: &str) -> Route {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(_) => {
                let base = Url::parse("http://localhost/").ok();
                match base.and_then(|b| b.join(input).ok()) {
                    Some(url) => url,
                    None => return Route::NotFound(input.to_string()),
                }
            }
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] => Route::Home,
            ["search"] => Route::Search(search_query(&url)),
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["hotel-dashboard"] => Route::HotelDashboard,
            ["hotel", "search", id] => match id.parse() {
                Ok(hotel_id) => Route::HotelDetails { hotel_id },
                Err(_) => Route::NotFound(url.path().to_string()),
            },
            ["hotel", hotel, "room", room, "book"] => match (hotel.parse(), room.parse()) {
                (Ok(hotel_id), Ok(room_id)) => Route::Book { hotel_id, room_id },
                _ => Route::NotFound(url.path().to_string()),
            },
            ["bookings"] => Route::Bookings,
            ["favorites"] => Route::Favorites,
            ["settings"] => Route::Settings,
            ["about"] => Route::About,
            ["help"] => Route::Help,
            ["contact"] => Route::Contact,
            _ => Route::NotFound(url.path().to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Search(query) => {
                let mut params = url::form_urlencoded::Serializer::new(String::new());
                if let Some(destination) = &query.destination {
                    params.append_pair("destination", destination);
                }
                if let Some(check_in) = &query.check_in {
                    params.append_pair("checkIn", check_in);
                }
                if let Some(check_out) = &query.check_out {
                    params.append_pair("checkOut", check_out);
                }
                if let Some(adults) = query.adults {
                    params.append_pair("adults", &adults.to_string());
                }
                let encoded = params.finish();
                if encoded.is_empty() {
                    "/search".to_string()
                } else {
                    format!("/search?{}", encoded)
                }
            }
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::HotelDashboard => "/hotel-dashboard".to_string(),
            Route::HotelDetails { hotel_id } => format!("/hotel/search/{}", hotel_id),
            Route::Book { hotel_id, room_id } => {
                format!("/hotel/{}/room/{}/book", hotel_id, room_id)
            }
            Route::Bookings => "/bookings".to_string(),
            Route::Favorites => "/favorites".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::About => "/about".to_string(),
            Route::Help => "/help".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Dashboard
            | Route::Book { .. }
            | Route::Bookings
            | Route::Favorites
            | Route::Settings => Access::Authenticated,
            Route::HotelDashboard => Access::HotelOwner,
            _ => Access::Public,
        }
    }

    // Where to send `user` instead, if they may not open this route
    pub fn redirect_for(&self, user: Option<&User>) -> Option<Route> {
        match (self.access(), user) {
            (Access::Public, _) => None,
            (_, None) => Some(Route::Login),
            (Access::HotelOwner, Some(user)) if !user.is_hotel() => Some(Route::Dashboard),
            _ => None,
        }
    }

    // Landing page after login
    pub fn home_for(user: &User) -> Route {
        if user.is_hotel() {
            Route::HotelDashboard
        } else {
            Route::Dashboard
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn search_query(url: &Url) -> SearchQuery {
    let mut query = SearchQuery::default();
    for (key, value) in url.query_pairs() {
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "destination" => query.destination = Some(value),
            "checkIn" => query.check_in = Some(value),
            "checkOut" => query.check_out = Some(value),
            "adults" => query.adults = value.parse().ok(),
            _ => {}
        }
    }
    query
}
