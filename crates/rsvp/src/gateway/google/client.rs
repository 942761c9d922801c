//! Google Calendar REST client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use rsvp_core::gateway::{CalendarEvent, CalendarGateway, EventStatus, GatewayError, Result};

use super::conversions::{
    from_calendar_event, to_calendar_event, GoogleErrorBody, GoogleEvent, GoogleEventList,
};

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Connection settings for [`GoogleCalendarGateway`].
#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    pub api_url: String,
    pub calendar_id: String,
    pub access_token: String,
    /// Timezone attached to created events.
    pub timezone: Tz,
    /// HTTP-level timeout for a single request.
    pub timeout: Duration,
}

/// The subset of an OAuth token file this client needs.
#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
}

impl GoogleCalendarConfig {
    /// Reads the access token from an OAuth token JSON file.
    pub fn read_access_token(path: &Path) -> std::io::Result<String> {
        let contents = std::fs::read_to_string(path)?;
        let token: TokenFile = serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(token.access_token)
    }
}

/// Calendar gateway backed by the Google Calendar v3 REST API.
pub struct GoogleCalendarGateway {
    client: reqwest::Client,
    config: GoogleCalendarConfig,
}

impl GoogleCalendarGateway {
    pub fn new(config: GoogleCalendarConfig) -> Result<Self> {
        Url::parse(&config.api_url)
            .map_err(|e| GatewayError::Request(format!("invalid calendar API url: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// `{api}/calendars/{calendar}/events[/{event}]`, with each segment escaped.
    fn events_url(&self, event_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| GatewayError::Request(format!("invalid calendar API url: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::Request("calendar API url cannot be a base".to_string()))?;
            segments
                .pop_if_empty()
                .push("calendars")
                .push(&self.config.calendar_id)
                .push("events");
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.access_token)
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    operation,
                    duration: self.config.timeout,
                }
            } else {
                GatewayError::Request(e.to_string())
            }
        })
    }

    /// Maps non-success statuses. 404 and 410 on an event become `EventNotFound`.
    async fn check(response: Response, event_id: Option<&str>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let Some(event_id) = event_id {
            if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
                return Err(GatewayError::EventNotFound(event_id.to_string()));
            }
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn fetch(&self, event_id: &str) -> Result<GoogleEvent> {
        let url = self.events_url(Some(event_id))?;
        let response = self.send("get_event", self.request(Method::GET, url)).await?;
        let response = Self::check(response, Some(event_id)).await?;
        Self::json(response).await
    }

    async fn put(&self, operation: &'static str, event: &GoogleEvent) -> Result<()> {
        let url = self.events_url(Some(&event.id))?;
        let response = self
            .send(operation, self.request(Method::PUT, url).json(event))
            .await?;
        Self::check(response, Some(&event.id)).await?;
        Ok(())
    }

    async fn list(&self, query: &[(&str, String)]) -> Result<Vec<CalendarEvent>> {
        let mut url = self.events_url(None)?;
        url.query_pairs_mut()
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime")
            .append_pair("showDeleted", "false")
            .extend_pairs(query);
        let response = self.send("list_events", self.request(Method::GET, url)).await?;
        let response = Self::check(response, None).await?;
        let list: GoogleEventList = Self::json(response).await?;
        list.items.iter().map(to_calendar_event).collect()
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        to_calendar_event(&self.fetch(event_id).await?)
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<()> {
        let url = self.events_url(None)?;
        let body = from_calendar_event(event, self.config.timezone);
        let response = self
            .send("create_event", self.request(Method::POST, url).json(&body))
            .await?;
        match Self::check(response, None).await {
            Err(GatewayError::Api { status: 409, .. }) => {
                return Err(GatewayError::EventAlreadyExists(event.id.clone()));
            }
            result => result?,
        };
        tracing::info!(event_id = %event.id, start = %event.start_time, "Created calendar event");
        Ok(())
    }

    async fn invite_to_event(&self, event_id: &str, email: &str, name: &str) -> Result<()> {
        let mut raw = self.fetch(event_id).await?;
        let mut event = to_calendar_event(&raw)?;
        if !event.invite(email, name) {
            tracing::info!(email = %email, event_id = %event_id, "Already invited");
            return Ok(());
        }
        raw.merge_attendees(&event.attendees);
        self.put("invite_to_event", &raw).await?;
        tracing::info!(email = %email, event_id = %event_id, "Invited to calendar event");
        Ok(())
    }

    async fn decline_event(&self, event_id: &str, email: &str) -> Result<()> {
        let mut raw = self.fetch(event_id).await?;
        let mut event = to_calendar_event(&raw)?;
        if !event.decline(email) {
            return Err(GatewayError::NotInvited {
                event_id: event_id.to_string(),
                email: email.to_string(),
            });
        }
        raw.merge_attendees(&event.attendees);
        self.put("decline_event", &raw).await
    }

    async fn list_events(&self, limit: usize) -> Result<Vec<CalendarEvent>> {
        self.list(&[
            ("timeMin", rfc3339(Utc::now())),
            ("maxResults", limit.to_string()),
        ])
        .await
    }

    async fn list_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>> {
        self.list(&[
            ("timeMin", rfc3339(start)),
            ("timeMax", rfc3339(end)),
            ("maxResults", limit.to_string()),
        ])
        .await
    }

    /// Deleting a Google event leaves it readable with status `cancelled`.
    async fn cancel_event(&self, event_id: &str) -> Result<()> {
        let url = self.events_url(Some(event_id))?;
        let response = self
            .send("cancel_event", self.request(Method::DELETE, url))
            .await?;
        Self::check(response, Some(event_id)).await?;
        tracing::info!(event_id = %event_id, "Cancelled calendar event");
        Ok(())
    }

    async fn activate_event(&self, event_id: &str) -> Result<()> {
        let mut raw = self.fetch(event_id).await?;
        raw.status = Some(EventStatus::Confirmed);
        self.put("activate_event", &raw).await?;
        tracing::info!(event_id = %event_id, "Activated calendar event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const EVENT_PATH: &str = "/calendars/primary/events/1718404200";

    fn gateway(server: &MockServer) -> GoogleCalendarGateway {
        GoogleCalendarGateway::new(GoogleCalendarConfig {
            api_url: server.uri(),
            calendar_id: "primary".to_string(),
            access_token: "test-token".to_string(),
            timezone: chrono_tz::America::New_York,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn event_json(attendees: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "1718404200",
            "etag": "\"1\"",
            "status": "confirmed",
            "summary": "Pizza Friday",
            "start": {"dateTime": "2024-06-14T17:30:00-04:00"},
            "end": {"dateTime": "2024-06-14T21:30:00-04:00"},
            "attendees": attendees
        })
    }

    #[tokio::test]
    async fn test_get_event_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(json!([
                {"email": "roy@richmond.com", "responseStatus": "declined"}
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let event = gateway(&server).get_event("1718404200").await.unwrap();

        assert_eq!(event.summary, "Pizza Friday");
        assert_eq!(event.declined().collect::<Vec<_>>(), vec!["roy@richmond.com"]);
    }

    #[tokio::test]
    async fn test_not_found_is_event_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Not Found"}
            })))
            .mount(&server)
            .await;

        let result = gateway(&server).get_event("1718404200").await;

        assert_eq!(
            result,
            Err(GatewayError::EventNotFound("1718404200".to_string()))
        );
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": 503, "message": "Backend Error"}
            })))
            .mount(&server)
            .await;

        let result = gateway(&server).get_event("1718404200").await;

        assert_eq!(
            result,
            Err(GatewayError::Api {
                status: 503,
                message: "Backend Error".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_invite_appends_needs_action_attendee() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(json!([]))))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(EVENT_PATH))
            .and(body_partial_json(json!({
                "etag": "\"1\"",
                "attendees": [{
                    "email": "keeley@richmond.com",
                    "displayName": "Keeley",
                    "responseStatus": "needsAction"
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server)
            .invite_to_event("1718404200", "keeley@richmond.com", "Keeley")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invite_existing_attendee_skips_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(json!([
                {"email": "keeley@richmond.com", "responseStatus": "accepted"}
            ]))))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        gateway(&server)
            .invite_to_event("1718404200", "keeley@richmond.com", "Keeley")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decline_unknown_attendee_is_not_invited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(json!([]))))
            .mount(&server)
            .await;

        let result = gateway(&server)
            .decline_event("1718404200", "nate@richmond.com")
            .await;

        assert!(matches!(result, Err(GatewayError::NotInvited { .. })));
    }

    #[tokio::test]
    async fn test_create_event_posts_with_timezone() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(json!({
                "id": "1718404200",
                "start": {"timeZone": "America/New_York"},
                "status": "confirmed"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json(json!([]))))
            .expect(1)
            .mount(&server)
            .await;
        let start = Utc.with_ymd_and_hms(2024, 6, 14, 21, 30, 0).unwrap();
        let event = CalendarEvent::new("1718404200", start, start + ChronoDuration::hours(4));

        gateway(&server).create_event(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_existing_event_is_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {"code": 409, "message": "The requested identifier already exists."}
            })))
            .mount(&server)
            .await;
        let start = Utc.with_ymd_and_hms(2024, 6, 14, 21, 30, 0).unwrap();
        let event = CalendarEvent::new("1718404200", start, start + ChronoDuration::hours(4));

        let result = gateway(&server).create_event(&event).await;

        assert_eq!(
            result,
            Err(GatewayError::EventAlreadyExists("1718404200".to_string()))
        );
    }

    #[tokio::test]
    async fn test_list_between_sends_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("timeMin", "2024-06-01T00:00:00Z"))
            .and(query_param("timeMax", "2024-07-01T00:00:00Z"))
            .and(query_param("maxResults", "5"))
            .and(query_param("orderBy", "startTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [event_json(json!([]))]
            })))
            .mount(&server)
            .await;
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let events = gateway(&server)
            .list_events_between(start, start + ChronoDuration::days(30), 5)
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "1718404200");
    }

    #[tokio::test]
    async fn test_cancel_missing_event_is_event_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(EVENT_PATH))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let result = gateway(&server).cancel_event("1718404200").await;

        assert!(result.unwrap_err().is_event_not_found());
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(event_json(json!([])))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        let gateway = GoogleCalendarGateway::new(GoogleCalendarConfig {
            timeout: Duration::from_millis(50),
            ..gateway(&server).config
        })
        .unwrap();

        let result = gateway.get_event("1718404200").await;

        assert!(matches!(result, Err(GatewayError::Timeout { .. })));
    }

    #[test]
    fn test_calendar_id_is_escaped() {
        let gateway = GoogleCalendarGateway::new(GoogleCalendarConfig {
            api_url: DEFAULT_API_URL.to_string(),
            calendar_id: "pizza#friday@group.calendar.google.com".to_string(),
            access_token: String::new(),
            timezone: chrono_tz::America::New_York,
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let url = gateway.events_url(Some("1718404200")).unwrap();

        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/pizza%23friday@group.calendar.google.com/events/1718404200"
        );
    }

    #[test]
    fn test_read_access_token() {
        let dir = std::env::temp_dir().join(format!("rsvp-token-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("token.json");
        std::fs::write(
            &file,
            r#"{"access_token":"ya29.abc","token_type":"Bearer","expiry":"2024-06-14T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(
            GoogleCalendarConfig::read_access_token(&file).unwrap(),
            "ya29.abc"
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
