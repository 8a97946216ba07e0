use super::{Form, FormErrors};
use crate::client::TripfferClient;
use crate::error::ApiError;
use crate::models::{Role, User};
use crate::resources::{Credentials, HotelRegistration, PasswordChange, ProfileUpdate, Registration};
use crate::validate;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[async_trait]
impl Form for LoginForm {
    type Output = User;

    fn fields(&self) -> &'static [&'static str] {
        &["email", "password"]
    }

    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.check("email", validate::email(&self.email));
        errors.check("password", validate::login_password(&self.password));
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<User, ApiError> {
        client
            .login(&Credentials {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
                remember_me: self.remember_me,
            })
            .await
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // Falls back to the email when left blank
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    pub role: Role,
    pub hotel_name: String,
    pub address: String,
    pub website: String,
    pub description: String,
    pub amenities: Vec<String>,
}

impl RegisterForm {
    pub fn registration(&self) -> Registration {
        let email = self.email.trim().to_string();
        let username = match self.username.trim() {
            "" => email.clone(),
            name => name.to_string(),
        };
        let hotel = (self.role == Role::Hotel).then(|| HotelRegistration {
            name: self.hotel_name.trim().to_string(),
            address: self.address.trim().to_string(),
            website: self.website.trim().to_string(),
            description: self.description.trim().to_string(),
            amenities: self.amenities.clone(),
        });
        Registration {
            username,
            email,
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role: self.role,
            hotel,
        }
    }
}

#[async_trait]
impl Form for RegisterForm {
    type Output = User;

    fn fields(&self) -> &'static [&'static str] {
        &[
            "first_name",
            "last_name",
            "email",
            "username",
            "password",
            "password_confirm",
            "hotel_name",
            "address",
            "website",
            "amenities",
        ]
    }

    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.check("first_name", validate::required(&self.first_name, "First name is required"));
        errors.check("last_name", validate::required(&self.last_name, "Last name is required"));
        errors.check("email", validate::email(&self.email));
        errors.check("password", validate::register_password(&self.password));
        errors.check(
            "password_confirm",
            validate::password_confirmation(
                &self.password,
                &self.password_confirm,
                "The passwords do not match",
            ),
        );
        if self.role == Role::Hotel {
            errors.check("hotel_name", validate::required(&self.hotel_name, "Hotel name is required"));
            errors.check("address", validate::required(&self.address, "Address is required"));
            errors.check("website", validate::website(&self.website));
            if self.amenities.iter().all(|a| a.trim().is_empty()) {
                errors.set("amenities", "Please select at least one amenity");
            }
        }
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<User, ApiError> {
        client.register(&self.registration()).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[async_trait]
impl Form for ChangePasswordForm {
    type Output = ();

    fn fields(&self) -> &'static [&'static str] {
        &["old_password", "new_password", "new_password_confirm"]
    }

    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.check(
            "old_password",
            validate::required(&self.old_password, "Current password is required"),
        );
        errors.check("new_password", validate::register_password(&self.new_password));
        errors.check(
            "new_password_confirm",
            validate::password_confirmation(
                &self.new_password,
                &self.new_password_confirm,
                "New passwords do not match",
            ),
        );
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<(), ApiError> {
        client
            .change_password(&PasswordChange {
                old_password: self.old_password.clone(),
                new_password: self.new_password.clone(),
                new_password_confirm: self.new_password_confirm.clone(),
            })
            .await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    // `YYYY-MM-DD`, may be blank
    pub date_of_birth: String,
    pub bio: String,
}

impl ProfileForm {
    // Prefills the inputs from the current account
    pub fn from_user(user: &User) -> Self {
        let profile = user.profile.clone().unwrap_or_default();
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: profile.phone_number.unwrap_or_default(),
            date_of_birth: profile
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            bio: profile.bio.unwrap_or_default(),
        }
    }

    fn update(&self) -> ProfileUpdate {
        let optional = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        ProfileUpdate {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            phone_number: optional(&self.phone_number),
            date_of_birth: validate::parse_date(&self.date_of_birth),
            bio: optional(&self.bio),
        }
    }
}

#[async_trait]
impl Form for ProfileForm {
    type Output = User;

    fn fields(&self) -> &'static [&'static str] {
        &["first_name", "last_name", "email", "phone_number", "date_of_birth", "bio"]
    }

    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.check("first_name", validate::required(&self.first_name, "First name is required"));
        errors.check("last_name", validate::required(&self.last_name, "Last name is required"));
        errors.check("email", validate::email(&self.email));
        errors.check("phone_number", validate::phone_number(&self.phone_number));
        errors.date("date_of_birth", &self.date_of_birth);
        errors
    }

    async fn submit(&self, client: &TripfferClient) -> Result<User, ApiError> {
        client.update_profile(&self.update()).await
    }
}
