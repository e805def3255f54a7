//! WebDriver wire protocol helpers
//!
//! Request payload builders and response envelope parsing for the W3C
//! WebDriver JSON protocol as chromedriver speaks it.

use serde_json::{json, Value};

use crate::calendar::{CalendarError, ElementHandle, Locator};

/// W3C element identifier key inside element JSON objects.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Capabilities for a headless Chrome session.
pub fn headless_chrome_capabilities() -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"]
                }
            }
        }
    })
}

/// Locator strategy pair for a find-elements request.
pub fn strategy(locator: &Locator) -> (&'static str, String) {
    match locator {
        Locator::LinkText(text) => ("link text", text.clone()),
        Locator::Control(name) => ("css selector", format!("[name='{}']", name)),
    }
}

pub fn find_elements_body(locator: &Locator) -> Value {
    let (using, value) = strategy(locator);
    json!({ "using": using, "value": value })
}

pub fn send_keys_body(text: &str) -> Value {
    json!({ "text": text })
}

pub fn cookie_body(name: &str, value: &str) -> Value {
    json!({ "cookie": { "name": name, "value": value } })
}

/// `null` switches back to the top-level browsing context.
pub fn frame_body(index: Option<u16>) -> Value {
    match index {
        Some(i) => json!({ "id": i }),
        None => json!({ "id": null }),
    }
}

pub fn navigate_body(url: &str) -> Value {
    json!({ "url": url })
}

/// Extract the driver's error code from a response body, if any.
pub fn error_code(body: &Value) -> Option<&str> {
    body.get("value")?.get("error")?.as_str()
}

/// Map a driver error code onto the calendar error taxonomy.
pub fn classify_error(code: &str, message: &str) -> CalendarError {
    match code {
        "stale element reference" | "element not interactable" => CalendarError::Stale,
        "invalid session id" | "no such window" | "unknown error" => {
            CalendarError::SessionLost(format!("{}: {}", code, message))
        }
        _ => CalendarError::Protocol(format!("{}: {}", code, message)),
    }
}

pub fn error_message(body: &Value) -> String {
    body.get("value")
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("")
        .to_string()
}

/// Parse one element reference out of a find-elements response entry.
pub fn parse_element(entry: &Value) -> Option<ElementHandle> {
    entry
        .get(ELEMENT_KEY)
        .and_then(|id| id.as_str())
        .map(|id| ElementHandle { id: id.to_string() })
}

/// Parse the full find-elements response value into handles.
pub fn parse_elements(body: &Value) -> Result<Vec<ElementHandle>, CalendarError> {
    let entries = body
        .get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| CalendarError::Protocol("find response is not an array".to_string()))?;
    entries
        .iter()
        .map(|entry| {
            parse_element(entry).ok_or_else(|| {
                CalendarError::Protocol("element entry without W3C identifier".to_string())
            })
        })
        .collect()
}

pub fn parse_session_id(body: &Value) -> Result<String, CalendarError> {
    body.get("value")
        .and_then(|v| v.get("sessionId"))
        .and_then(|id| id.as_str())
        .map(|id| id.to_string())
        .ok_or_else(|| CalendarError::Protocol("new session response without sessionId".to_string()))
}
