//! WebDriver session transport
//!
//! Thin HTTP layer over a chromedriver endpoint. Each booking attempt
//! owns exactly one session; nothing here is shared between attempts.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use super::wire;
use crate::calendar::{CalendarError, ElementHandle, Locator};

pub struct WdSession {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WdSession {
    /// Start a fresh headless browser session.
    pub async fn start(webdriver_url: &str) -> Result<Self, CalendarError> {
        let http = reqwest::Client::new();
        let body: Value = http
            .post(format!("{}/session", webdriver_url))
            .json(&wire::headless_chrome_capabilities())
            .send()
            .await?
            .json()
            .await?;

        if let Some(code) = wire::error_code(&body) {
            return Err(wire::classify_error(code, &wire::error_message(&body)));
        }
        let session_id = wire::parse_session_id(&body)?;
        info!("webdriver session {} started", session_id);

        Ok(Self {
            http,
            base_url: webdriver_url.trim_end_matches('/').to_string(),
            session_id,
        })
    }

    /// Issue one command against this session and unwrap the envelope.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, CalendarError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        debug!("{} {}", method, path);

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(&body);
        } else if method == Method::POST {
            // chromedriver insists on a JSON body for every POST
            request = request.json(&Value::Object(Default::default()));
        }

        let response: Value = request.send().await?.json().await?;
        if let Some(code) = wire::error_code(&response) {
            return Err(wire::classify_error(code, &wire::error_message(&response)));
        }
        Ok(response)
    }

    pub async fn navigate(&self, url: &str) -> Result<(), CalendarError> {
        self.execute(Method::POST, "/url", Some(wire::navigate_body(url)))
            .await?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<(), CalendarError> {
        self.execute(Method::POST, "/refresh", None).await?;
        Ok(())
    }

    pub async fn add_cookie(&self, name: &str, value: &str) -> Result<(), CalendarError> {
        self.execute(Method::POST, "/cookie", Some(wire::cookie_body(name, value)))
            .await?;
        Ok(())
    }

    pub async fn find_elements(
        &self,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, CalendarError> {
        let body = self
            .execute(
                Method::POST,
                "/elements",
                Some(wire::find_elements_body(locator)),
            )
            .await?;
        wire::parse_elements(&body)
    }

    /// Find by a raw CSS selector (login/navigation surfaces only).
    pub async fn find_by_css(&self, selector: &str) -> Result<Vec<ElementHandle>, CalendarError> {
        let body = self
            .execute(
                Method::POST,
                "/elements",
                Some(serde_json::json!({ "using": "css selector", "value": selector })),
            )
            .await?;
        wire::parse_elements(&body)
    }

    pub async fn click(&self, element: &ElementHandle) -> Result<(), CalendarError> {
        self.execute(
            Method::POST,
            &format!("/element/{}/click", element.id),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), CalendarError> {
        self.execute(
            Method::POST,
            &format!("/element/{}/value", element.id),
            Some(wire::send_keys_body(text)),
        )
        .await?;
        Ok(())
    }

    pub async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, CalendarError> {
        let body = self
            .execute(Method::GET, &format!("/element/{}/enabled", element.id), None)
            .await?;
        Ok(body.get("value").and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// `None` switches back to the top-level browsing context.
    pub async fn switch_to_frame(&self, index: Option<u16>) -> Result<(), CalendarError> {
        self.execute(Method::POST, "/frame", Some(wire::frame_body(index)))
            .await?;
        Ok(())
    }

    /// End the session. Errors are reported but the session is gone
    /// either way, so callers treat this as best-effort.
    pub async fn quit(&self) -> Result<(), CalendarError> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        self.http.delete(url).send().await?;
        info!("webdriver session {} closed", self.session_id);
        Ok(())
    }
}
