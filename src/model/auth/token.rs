use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Config;

use super::user::{Rights, User};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token representing a specific user with specific rights.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken<U> {
    id: String,
    #[serde(rename = "rgt")]
    rights: Rights,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    /// Get the user ID: an admission number for students.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the user's rights.
    pub fn rights(&self) -> Rights {
        self.rights
    }

    /// Does this token permit the given rights?
    pub fn permits(&self, target: Rights) -> bool {
        self.rights == target
    }
}

impl<U> AuthToken<U>
where
    U: User,
{
    /// Create a new [`AuthToken`] for the given user, with the correct rights for
    /// that user type.
    pub fn new(user: &U) -> Self {
        Self {
            id: user.id(),
            rights: U::RIGHTS,
            phantom: PhantomData,
        }
    }

    /// Serialize this token into a signed, http-only cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>, JwtError> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie, checking its signature and expiry.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: User + Send,
{
    type Error = Error;

    /// Get an AuthToken from the cookie and verify that it has the correct rights
    /// for this user type.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            error!("Config is not in managed state");
            let err = Error::internal("Authentication is unavailable");
            return request::Outcome::Failure((err.status(), err));
        };

        let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) else {
            return request::Outcome::Failure((
                Status::Unauthorized,
                Error::unauthorized("Not logged in"),
            ));
        };
        let token: Self = match Self::from_cookie(cookie, config) {
            Ok(token) => token,
            Err(err) => {
                debug!("Rejected auth token: {err}");
                return request::Outcome::Failure((Status::Unauthorized, err.into()));
            }
        };

        if token.permits(U::RIGHTS) {
            request::Outcome::Success(token)
        } else {
            request::Outcome::Failure((
                Status::Unauthorized,
                Error::unauthorized(format!("{} rights required", U::RIGHTS)),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{admin::Admin, student::Student};

    #[test]
    fn tokens_round_trip_through_cookies() {
        let config = Config::example();
        let cookie = AuthToken::new(&Student::example())
            .into_cookie(&config)
            .unwrap();
        assert_eq!(cookie.name(), AUTH_TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));

        let token = AuthToken::<Student>::from_cookie(&cookie, &config).unwrap();
        assert_eq!(token.id(), "1001");
        assert_eq!(token.rights(), Rights::Student);
        assert!(!token.permits(Rights::Admin));
    }

    #[get("/whoami")]
    fn whoami(token: AuthToken<Student>) -> String {
        token.id().to_string()
    }

    #[rocket::async_test]
    async fn missing_config_is_a_server_error() {
        let rocket = rocket::build().mount("/", routes![whoami]);
        let client = rocket::local::asynchronous::Client::tracked(rocket)
            .await
            .unwrap();
        let response = client.get(uri!(whoami)).dispatch().await;
        assert_eq!(Status::InternalServerError, response.status());

        let err = Error::internal("Authentication is unavailable");
        assert_eq!(err.status(), Status::InternalServerError);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let cookie = AuthToken::new(&Admin)
            .into_cookie(&Config::example())
            .unwrap();
        let other = Config::example_with_secret("a different secret");
        assert!(AuthToken::<Admin>::from_cookie(&cookie, &other).is_err());
    }
}
