//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use shared::{
    validate_email, validate_password, Coordinates, NewUser, User, UserLocation,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::GeocodingClient;
use crate::repository::UserRepository;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    geocoder: GeocodingClient,
    jwt_secret: String,
    access_token_expiry: i64,
    bcrypt_cost: u32,
}

/// Input for creating an account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub location: Option<Coordinates>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: i64,
    pub iat: i64,
}

/// Token and account returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(users: Arc<dyn UserRepository>, geocoder: GeocodingClient, config: &Config) -> Self {
        Self {
            users,
            geocoder,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            bcrypt_cost: config.auth.bcrypt_cost,
        }
    }

    /// Register a new account and sign it in
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(validation("name", "Name is required"));
        }
        validate_email(&input.email).map_err(|m| validation("email", m))?;
        validate_password(&input.password).map_err(|m| validation("password", m))?;

        if let Some(coords) = input.location {
            if !coords.is_valid() {
                return Err(validation("location", "Coordinates are out of range"));
            }
        }

        let location = match input.location {
            Some(coords) => {
                let place = self.geocoder.reverse(coords).await;
                UserLocation {
                    city: non_empty_or_unknown(place.city),
                    state: non_empty_or_unknown(place.state),
                    latitude: Some(coords.latitude),
                    longitude: Some(coords.longitude),
                }
            }
            None => UserLocation {
                city: "Unknown".to_string(),
                state: "Unknown".to_string(),
                latitude: None,
                longitude: None,
            },
        };

        let password_hash = hash(&input.password, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = self
            .users
            .create(NewUser {
                name,
                email: input.email,
                password_hash,
                phone: input
                    .phone
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty()),
                location,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Registered new user");
        self.session_for(user)
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.session_for(user)
    }

    /// Account behind an authenticated request
    pub async fn me(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, &self.jwt_secret)
    }

    fn session_for(&self, user: User) -> AppResult<AuthSession> {
        let access_token = self.issue_token(user.id)?;
        Ok(AuthSession {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user,
        })
    }

    /// Sign an access token for a user
    pub fn issue_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Decode an HS256 access token
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

fn validation(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn non_empty_or_unknown(value: String) -> String {
    if value.trim().is_empty() {
        "Unknown".to_string()
    } else {
        value
    }
}
