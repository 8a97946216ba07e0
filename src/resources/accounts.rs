use super::ImageUpload;
use crate::cache::{Invalidation, QueryKey, Resource};
use crate::client::{Mutation, Query, TripfferClient};
use crate::error::{ApiError, ClientError};
use crate::models::{AuthResponse, Role, User};
use crate::transport::ApiRequest;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HotelRegistration {
    pub name: String,
    pub address: String,
    pub website: String,
    pub description: String,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel: Option<HotelRegistration>,
}

// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub(crate) fn to_json(&self) -> Value {
        let mut body = serde_json::Map::new();
        insert_set(&mut body, "first_name", &self.first_name);
        insert_set(&mut body, "last_name", &self.last_name);
        insert_set(&mut body, "email", &self.email);

        let mut profile = serde_json::Map::new();
        insert_set(&mut profile, "phone_number", &self.phone_number);
        insert_set(&mut profile, "bio", &self.bio);
        if let Some(date) = self.date_of_birth {
            profile.insert("date_of_birth".to_string(), json!(date));
        }
        if !profile.is_empty() {
            body.insert("profile".to_string(), Value::Object(profile));
        }
        Value::Object(body)
    }
}

fn insert_set(map: &mut serde_json::Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

fn current_user_query() -> Query {
    Query::new(
        QueryKey::new(Resource::CurrentUser),
        ApiRequest::get("accounts/profile/"),
    )
}

impl TripfferClient {
    // Stores the returned token pair and drops everything cached for the
    // previous session
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let request = ApiRequest::post("accounts/login/")
            .anonymous()
            .json(serde_json::to_value(credentials)?);
        let auth: AuthResponse = serde_json::from_value(self.send(request).await?)?;

        self.tokens()
            .save(&auth.tokens())
            .map_err(|e| ApiError::ClientError(e.to_string()))?;
        self.cache().invalidate(&Invalidation::All);
        tracing::info!(user = %auth.user.email, role = ?auth.user.role, "Logged in");
        Ok(auth.user)
    }

    // Creates the account without signing in
    pub async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let request = ApiRequest::post("accounts/register/")
            .anonymous()
            .json(serde_json::to_value(registration)?);
        let auth: AuthResponse = serde_json::from_value(self.send(request).await?)?;
        tracing::info!(user = %auth.user.email, "Registered account");
        Ok(auth.user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens().clear()?;
        let dropped = self.cache().clear();
        tracing::info!(dropped, "Logged out");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch(&current_user_query()).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.mutate(
            Mutation::new(ApiRequest::put("accounts/profile/").json(update.to_json()))
                .invalidates(Invalidation::Resource(Resource::CurrentUser)),
        )
        .await
    }

    // Only accepted by the server when flagged as coming from the settings view
    pub async fn upload_profile_picture(&self, picture: &ImageUpload) -> Result<User, ApiError> {
        let request = ApiRequest::put("accounts/profile/")
            .header("X-Settings-Update", "true")
            .multipart(vec![picture.to_part("profile_picture")]);
        self.mutate(
            Mutation::new(request).invalidates(Invalidation::Resource(Resource::CurrentUser)),
        )
        .await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        let _: Value = self
            .mutate(Mutation::new(
                ApiRequest::post("accounts/change-password/").json(serde_json::to_value(change)?),
            ))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_with;
    use crate::mock::{MockReply, MockServer};
    use crate::transport::{Method, PartValue, RequestBody};
    use std::sync::Arc;

    fn auth_body() -> Value {
        json!({
            "user": {"id": 1, "username": "ana", "email": "ana@example.com", "first_name": "Ana", "last_name": "Ivanova"},
            "access": "access-token",
            "refresh": "refresh-token"
        })
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_resets_cache() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "hotels/favorites/", json!([]));
        server.ok(Method::POST, "accounts/login/", auth_body());
        server.ok(Method::GET, "accounts/profile/", auth_body()["user"].clone());
        let client = client_with(&server, None);

        let _ = client.favorites().await;
        assert!(!client.cache().is_empty());

        let user = client
            .login(&Credentials {
                email: "ana@example.com".to_string(),
                password: "secret1".to_string(),
                remember_me: false,
            })
            .await
            .unwrap();

        assert_eq!(user.username, "ana");
        assert_eq!(client.tokens().access_token().as_deref(), Some("access-token"));
        assert!(client.cache().is_empty());

        let sent = server.last_request().unwrap();
        assert!(sent.bearer.is_none());
        assert!(sent.json_body().unwrap().get("remember_me").is_none());

        client.current_user().await.unwrap();
        assert_eq!(server.last_request().unwrap().bearer.as_deref(), Some("access-token"));
    }

    #[tokio::test]
    async fn test_register_does_not_sign_in() {
        let server = Arc::new(MockServer::new());
        server.on(Method::POST, "accounts/register/", MockReply::Status(201, auth_body()));
        let client = client_with(&server, None);

        let registration = Registration {
            username: "ana@example.com".to_string(),
            email: "ana@example.com".to_string(),
            password: "abcd1234".to_string(),
            password_confirm: "abcd1234".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Ivanova".to_string(),
            role: Role::User,
            hotel: None,
        };
        client.register(&registration).await.unwrap();

        let body = server.last_request().unwrap().json_body().cloned().unwrap();
        assert_eq!(body["role"], "USER");
        assert!(body.get("hotel").is_none());
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::GET, "accounts/profile/", auth_body()["user"].clone());
        let client = client_with(&server, Some("t"));

        client.current_user().await.unwrap();
        client.logout().unwrap();

        assert!(!client.is_authenticated());
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_refreshes_current_user() {
        let server = Arc::new(MockServer::new());
        server
            .ok(Method::GET, "accounts/profile/", json!({"id": 1, "first_name": "Ana"}))
            .ok(Method::GET, "accounts/profile/", json!({"id": 1, "first_name": "Anna"}));
        server.ok(Method::PUT, "accounts/profile/", json!({"id": 1, "first_name": "Anna"}));
        let client = client_with(&server, Some("t"));

        assert_eq!(client.current_user().await.unwrap().first_name, "Ana");
        client
            .update_profile(&ProfileUpdate {
                first_name: Some("Anna".to_string()),
                phone_number: Some("+359 888 123 456".to_string()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();

        let put = server
            .requests()
            .into_iter()
            .find(|r| r.method == Method::PUT)
            .unwrap();
        let body = put.json_body().unwrap();
        assert_eq!(body["first_name"], "Anna");
        assert_eq!(body["profile"]["phone_number"], "+359 888 123 456");
        assert!(body.get("email").is_none());

        assert_eq!(client.current_user().await.unwrap().first_name, "Anna");
    }

    #[tokio::test]
    async fn test_profile_picture_upload_is_flagged() {
        let server = Arc::new(MockServer::new());
        server.ok(Method::PUT, "accounts/profile/", json!({"id": 1}));
        let client = client_with(&server, Some("t"));

        client
            .upload_profile_picture(&ImageUpload::new("me.png", &b"png"[..]))
            .await
            .unwrap();

        let sent = server.last_request().unwrap();
        assert!(sent
            .headers
            .contains(&("X-Settings-Update".to_string(), "true".to_string())));
        match sent.body {
            RequestBody::Multipart(parts) => {
                assert_eq!(parts[0].name, "profile_picture");
                assert!(matches!(parts[0].value, PartValue::File { .. }));
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_change_password_surfaces_field_error() {
        let server = Arc::new(MockServer::new());
        server.on(
            Method::POST,
            "accounts/change-password/",
            MockReply::Status(400, json!({"old_password": ["Old password is not correct"]})),
        );
        let client = client_with(&server, Some("t"));

        let err = client
            .change_password(&PasswordChange {
                old_password: "wrong".to_string(),
                new_password: "abcd1234".to_string(),
                new_password_confirm: "abcd1234".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.field_errors().unwrap().get("old_password").unwrap()[0],
            "Old password is not correct"
        );
    }
}
