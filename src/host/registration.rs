use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use serde_json::{json, Value};

use crate::detection::CredentialToken;
use crate::host::constants::{REGISTER_PATH, TOKEN_PATH};
use crate::host::error::{internal_error, invalid_argument, registration_failed, HostError, HostResult};
use crate::host::LOGGER;
use crate::logger::redact;

/// Which server endpoint receives push tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationRoute {
    /// `POST /api/fcm/register` with `{token, platform, userId}`.
    #[default]
    Register,
    /// `POST /api/fcm/token` with `{token, platform, deviceId}`.
    Token,
}

impl RegistrationRoute {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationRoute::Register => "register",
            RegistrationRoute::Token => "token",
        }
    }

    fn path(self) -> &'static [&'static str] {
        match self {
            RegistrationRoute::Register => &REGISTER_PATH,
            RegistrationRoute::Token => &TOKEN_PATH,
        }
    }
}

impl fmt::Display for RegistrationRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationRoute {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "register" => Ok(RegistrationRoute::Register),
            "token" => Ok(RegistrationRoute::Token),
            other => Err(invalid_argument(format!(
                "Unknown registration route \"{other}\" (expected \"register\" or \"token\")"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RegistrationRequest<'a> {
    pub token: &'a str,
    pub platform: &'a str,
    pub user_id: &'a str,
    pub device_id: &'a str,
    pub credential: Option<&'a CredentialToken>,
}

/// Posts push tokens to the application server. No retry, no timeout.
#[derive(Clone, Debug)]
pub struct RegistrationClient {
    http: Client,
    base_url: Url,
    route: RegistrationRoute,
}

impl RegistrationClient {
    pub fn new(base_url: &str, route: RegistrationRoute) -> HostResult<Self> {
        let url = Url::parse(base_url).map_err(|err| {
            invalid_argument(format!("Invalid registration endpoint '{base_url}': {err}"))
        })?;
        let http = Client::builder()
            .user_agent(format!("webview-push-bridge/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| internal_error(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: url,
            route,
        })
    }

    pub fn route(&self) -> RegistrationRoute {
        self.route
    }

    pub fn endpoint(&self) -> HostResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid_argument("Registration endpoint is not a base URL"))?;
            segments.pop_if_empty().extend(self.route.path());
        }
        Ok(url)
    }

    pub fn body(&self, request: &RegistrationRequest<'_>) -> Value {
        match self.route {
            RegistrationRoute::Register => json!({
                "token": request.token,
                "platform": request.platform,
                "userId": request.user_id,
            }),
            RegistrationRoute::Token => json!({
                "token": request.token,
                "platform": request.platform,
                "deviceId": request.device_id,
            }),
        }
    }

    pub async fn register(&self, request: &RegistrationRequest<'_>) -> HostResult<()> {
        let url = self.endpoint()?;
        let mut builder = self.http.post(url).json(&self.body(request));
        if let Some(credential) = request.credential {
            let value = HeaderValue::from_str(&credential.bearer())
                .map_err(|err| invalid_argument(format!("Invalid credential header: {err}")))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| registration_failed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(registration_failed(format!(
                "Registration endpoint answered with status {status}"
            )));
        }
        LOGGER.info(format!(
            "Push token {} registered via /{}",
            redact(request.token),
            self.route.path().join("/")
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request<'a>(credential: Option<&'a CredentialToken>) -> RegistrationRequest<'a> {
        RegistrationRequest {
            token: "push-token",
            platform: "android",
            user_id: "user-7",
            device_id: "device_1_abcdefghi",
            credential,
        }
    }

    #[test]
    fn parses_routes() {
        assert_eq!("Register".parse::<RegistrationRoute>().unwrap(), RegistrationRoute::Register);
        assert_eq!(" token ".parse::<RegistrationRoute>().unwrap(), RegistrationRoute::Token);
        assert_eq!(
            "legacy".parse::<RegistrationRoute>().unwrap_err().code_str(),
            "host/invalid-argument"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client =
            RegistrationClient::new("https://api.example.com/v2/", RegistrationRoute::Token).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://api.example.com/v2/api/fcm/token"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn register_route_posts_user_id_with_bearer() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/fcm/register")
                .header("authorization", "Bearer cred.abc.def")
                .json_body(json!({
                    "token": "push-token",
                    "platform": "android",
                    "userId": "user-7",
                }));
            then.status(200);
        });

        let credential = CredentialToken::new("cred.abc.def").unwrap();
        let client = RegistrationClient::new(&server.base_url(), RegistrationRoute::Register).unwrap();
        client.register(&request(Some(&credential))).await.unwrap();
        mock.assert();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn token_route_posts_device_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/fcm/token").json_body(json!({
                "token": "push-token",
                "platform": "android",
                "deviceId": "device_1_abcdefghi",
            }));
            then.status(201);
        });

        let client = RegistrationClient::new(&server.base_url(), RegistrationRoute::Token).unwrap();
        client.register(&request(None)).await.unwrap();
        mock.assert();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn server_error_is_reported_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/fcm/register");
            then.status(500);
        });

        let client = RegistrationClient::new(&server.base_url(), RegistrationRoute::Register).unwrap();
        let err = client.register(&request(None)).await.unwrap_err();
        assert_eq!(err.code_str(), "host/registration-failed");
        mock.assert_hits(1);
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = RegistrationClient::new("not a url", RegistrationRoute::Register).unwrap_err();
        assert_eq!(err.code_str(), "host/invalid-argument");
    }
}
