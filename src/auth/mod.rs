use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};

use crate::config::Config;
use crate::database::models::EmployeeType;
use crate::error::AppError;

/// Identity of the employee behind a request. Tokens are issued elsewhere;
/// this service only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // employee id
    pub role: EmployeeType,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn employee_id(&self) -> i64 {
        self.sub
    }

    /// Signs a token for `employee_id`. Used by tooling and tests.
    pub fn issue(
        config: &Config,
        employee_id: i64,
        role: EmployeeType,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let exp = (Utc::now() + ttl).timestamp() as usize;
        let claims = Claims {
            sub: employee_id,
            role,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::internal_server_error_message(format!("token encoding: {}", e)))
    }

    pub fn verify(config: &Config, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("Rejected bearer token: {}", e);
            AppError::Unauthorized
        })
    }
}

impl FromRequest for Claims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));

        let result = match (token, req.app_data::<Data<Config>>()) {
            (Some(token), Some(config)) => Claims::verify(config, token),
            (Some(_), None) => {
                log::error!("Config missing from app data; cannot verify tokens");
                Err(AppError::internal_server_error_message("configuration unavailable"))
            }
            (None, _) => Err(AppError::Unauthorized),
        };

        ready(result)
    }
}
