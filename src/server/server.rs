use bytes::Bytes;
use chrono::{NaiveDateTime, TimeZone};
use http_body_util::Full;
use hyper::{
    body::Incoming,
    header::{HeaderValue, CONTENT_TYPE},
    service::Service,
    Method, Request, Response, StatusCode,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use url_escape::decode;

use std::{collections::HashMap, future::Future, pin::Pin, str::FromStr, sync::Arc};

use crate::{error::GateError, gate::gate::StoreHoursGate};

use super::response::StatusPreview;

/// The status API.
///
/// Lets a web UI read the gate instead of reimplementing the store hours. Each
/// connection gets its own clone; the gate itself is shared.
#[derive(Clone)]
pub struct Server {
    gate: Arc<StoreHoursGate>,
}

impl Server {
    pub fn setup(gate: Arc<StoreHoursGate>) -> Self {
        Self { gate }
    }

    /// Parses the query parameters and returns a `hashmap` of key pair values
    /// Returns `None` if the parameters are malformed
    fn parse_params(text: &str) -> Option<HashMap<String, String>> {
        let mut map: HashMap<String, String> = HashMap::new();
        for pairs in text.split('&') {
            let mut iterator = pairs.split('=');
            map.insert(
                iterator.next()?.to_string(),
                decode(iterator.next()?).to_string(),
            );
        }
        Some(map)
    }

    /// Dispatches a request by method, path and raw query string.
    pub fn route(&self, method: &Method, path: &str, query: Option<&str>) -> Response<Full<Bytes>> {
        match (method, path) {
            (&Method::GET, "/api/status") => self.status(),
            (&Method::GET, "/api/status/at") => self.status_at(query),
            _ => Self::not_found(""),
        }
    }

    /// The /api/status API endpoint.
    ///
    /// Returns the live status, message, reopening time and permissions.
    /// Returns a 503 while the gate has not been initialized.
    fn status(&self) -> Response<Full<Bytes>> {
        match self.gate.snapshot() {
            Ok(snapshot) => Self::ok_data(snapshot),
            Err(err @ GateError::NotInitialized) => {
                Self::json_error(StatusCode::SERVICE_UNAVAILABLE, &err.to_string())
            }
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// The /api/status/at API endpoint.
    ///
    /// Takes `time` as a local `YYYY-MM-DDTHH:MM:SS` in the store's timezone and
    /// evaluates the schedule for it.
    fn status_at(&self, query: Option<&str>) -> Response<Full<Bytes>> {
        let Some(params) = query else {
            return Self::bad_request("Parameters not provided. Required time.");
        };

        let Some(map) = Self::parse_params(params) else {
            return Self::bad_request("Malformed Parameters.");
        };

        let Some(time) = map.get("time") else {
            return Self::bad_request("time not provided.");
        };

        let Ok(time) = NaiveDateTime::from_str(time) else {
            return Self::bad_request("Malformed Time");
        };

        let timezone = self.gate.now().timezone();
        let Some(time) = timezone.from_local_datetime(&time).earliest() else {
            return Self::bad_request("Time does not exist in the store timezone");
        };

        let schedule = self.gate.schedule();
        let status = schedule.compute_status(&time);
        let next_open_time = schedule.next_reopening(&time);
        Self::ok_data(StatusPreview::new(time, status, next_open_time))
    }

    /// Return a 200 OK response with the data provided.
    fn ok_data<T: Serialize>(body: T) -> Response<Full<Bytes>> {
        match serde_json::to_string(&body) {
            Ok(data) => Self::respond(StatusCode::OK, Bytes::from(data)),
            Err(err) => Self::server_error(&err.to_string()),
        }
    }

    /// Return a 500 Internal Server Error response with the message provided.
    fn server_error(message: &str) -> Response<Full<Bytes>> {
        error!(message, "status api error");
        Self::json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Return a 404 Not Found response with the message provided. The message here is optional.
    /// Leave it empty for no message.
    fn not_found(message: &str) -> Response<Full<Bytes>> {
        if message.is_empty() {
            return Self::respond(StatusCode::NOT_FOUND, Bytes::new());
        }
        Self::json_error(StatusCode::NOT_FOUND, message)
    }

    /// Return a 400 Bad Request response with the message provided.
    fn bad_request(message: &str) -> Response<Full<Bytes>> {
        Self::json_error(StatusCode::BAD_REQUEST, message)
    }

    fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
        let body = json!({ "error": message }).to_string();
        Self::respond(status, Bytes::from(body))
    }

    fn respond(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
        let has_body = !body.is_empty();
        let mut res = Response::new(Full::new(body));
        *res.status_mut() = status;
        if has_body {
            res.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        res
    }
}

impl Service<Request<Incoming>> for Server {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let res = self.route(req.method(), req.uri().path(), req.uri().query());
        Box::pin(async { Ok(res) })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};
    use chrono_tz::{America::Sao_Paulo, Tz};
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;
    use crate::{
        gate::config::GateConfig,
        timing::{clock::ManualClock, window::NightWindow},
    };

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        Sao_Paulo
            .with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .unwrap()
    }

    fn server(now: DateTime<Tz>, initialized: bool) -> Server {
        let clock = Arc::new(ManualClock::new(now));
        let config = GateConfig::new(NightWindow::LATE_NIGHT);
        let gate = Arc::new(StoreHoursGate::new(&config, clock).unwrap());
        if initialized {
            gate.init();
        }
        Server::setup(gate)
    }

    async fn json_body(res: Response<Full<Bytes>>) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_reports_live_gate() {
        let server = server(at(3, 20, 0), true);
        let res = server.route(&Method::GET, "/api/status", None);
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["status"], "sabbath_closed");
        assert_eq!(body["can_add_to_cart"], false);
        assert_eq!(body["can_checkout"], false);
        assert_eq!(body["message"]["title"], "🌅 Feliz Sábado!");
        assert_eq!(body["next_open_time"], "2025-01-04T18:00:00-03:00");
    }

    #[tokio::test]
    async fn status_before_init_is_unavailable() {
        let server = server(at(7, 12, 0), false);
        let res = server.route(&Method::GET, "/api/status", None);
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn status_at_previews_a_local_time() {
        let server = server(at(7, 12, 0), true);
        let res = server.route(
            &Method::GET,
            "/api/status/at",
            Some("time=2025-01-08T23%3A30%3A00"),
        );
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["status"], "night_closed");
        assert_eq!(body["next_open_time"], "2025-01-09T06:00:00-03:00");
    }

    #[tokio::test]
    async fn status_at_rejects_bad_input() {
        let server = server(at(7, 12, 0), true);
        for query in [None, Some("time"), Some("at=2025-01-08T23:30:00"), Some("time=tomorrow")] {
            let res = server.route(&Method::GET, "/api/status/at", query);
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let server = server(at(7, 12, 0), true);
        assert_eq!(
            server.route(&Method::GET, "/api/day", None).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            server.route(&Method::POST, "/api/status", None).status(),
            StatusCode::NOT_FOUND
        );
    }
}
