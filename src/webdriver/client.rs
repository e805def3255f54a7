//! WebDriver-backed CalendarView
//!
//! Drives the club booking site: login with the club cookie, navigate to
//! the booking calendar, and expose the page to the pollers through the
//! CalendarView capability set.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::info;

use super::session::WdSession;
use crate::calendar::{
    CalendarError, CalendarView, ElementHandle, Locator, Presence, Scope,
};
use crate::config::Config;
use crate::redact;

/// How often element waits re-poll the page.
const ELEMENT_POLL: Duration = Duration::from_millis(250);

/// Selectors on the booking site's login and landing pages.
const USERNAME_FIELD: &str = "#username_field";
const PASSWORD_FIELD: &str = "#password_field";
const LOGIN_SUBMIT: &str = "#submit_auth";
const MAKE_BOOKING_BUTTON: &str = "#fdbox_makebooking .ah_segment_frm_btn";
const BOOKING_CONTINUE: &str = "[name='Submit']";

pub struct WebDriverCalendar {
    session: WdSession,
    login_url: String,
    club_id: String,
    web_timeout: Duration,
}

impl WebDriverCalendar {
    /// Open a fresh browser session against the configured driver.
    pub async fn connect(config: &Config) -> Result<Self, CalendarError> {
        let session = WdSession::start(&config.webdriver_url).await?;
        Ok(Self {
            session,
            login_url: config.login_url.clone(),
            club_id: config.club_id.clone(),
            web_timeout: Duration::from_secs(config.web_timeout_secs),
        })
    }

    /// Wait for a CSS-addressed element, used only during login/navigation.
    async fn wait_css(&self, selector: &str, timeout: Duration) -> Result<ElementHandle, CalendarError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(found) = self.session.find_by_css(selector).await?.into_iter().next() {
                return Ok(found);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CalendarError::Protocol(format!(
                    "element '{}' never appeared",
                    selector
                )));
            }
            sleep(ELEMENT_POLL).await;
        }
    }

    /// Log in and navigate to the booking calendar.
    ///
    /// The booking software serves many clubs from one host, so the club
    /// cookie must be set before the login page is reloaded.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), CalendarError> {
        info!("logging in as {}", redact::username(username));

        self.session.navigate(&self.login_url).await?;
        self.session.add_cookie("clubid", &self.club_id).await?;
        self.session.refresh().await?;

        let submit = self.wait_css(LOGIN_SUBMIT, self.web_timeout).await?;
        let user_field = self.wait_css(USERNAME_FIELD, self.web_timeout).await?;
        let pass_field = self.wait_css(PASSWORD_FIELD, self.web_timeout).await?;

        self.session.send_keys(&user_field, username).await?;
        self.session.send_keys(&pass_field, password).await?;
        self.session.click(&submit).await?;

        // If credentials were rejected the member landing page never loads.
        let booking = match self.wait_css(MAKE_BOOKING_BUTTON, self.web_timeout).await {
            Ok(found) => found,
            Err(CalendarError::Protocol(_)) => return Err(CalendarError::AuthRejected),
            Err(e) => return Err(e),
        };
        info!("logged in, opening the booking calendar");

        self.session.click(&booking).await?;
        let next = self.wait_css(BOOKING_CONTINUE, self.web_timeout).await?;
        self.session.click(&next).await?;
        Ok(())
    }

    /// Tear the browser session down; called on every exit path.
    pub async fn close(&self) -> Result<(), CalendarError> {
        self.session.quit().await
    }

}

#[async_trait]
impl CalendarView for WebDriverCalendar {
    async fn refresh(&self) -> Result<(), CalendarError> {
        self.session.refresh().await
    }

    async fn wait_for_presence(
        &self,
        target: &Locator,
        timeout: Duration,
    ) -> Result<Presence, CalendarError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !self.session.find_elements(target).await?.is_empty() {
                return Ok(Presence::Found);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(Presence::TimedOut);
            }
            sleep(ELEMENT_POLL).await;
        }
    }

    async fn wait_for_clickable(
        &self,
        target: &Locator,
        timeout: Duration,
    ) -> Result<Presence, CalendarError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            for element in self.session.find_elements(target).await? {
                if self.session.is_enabled(&element).await.unwrap_or(false) {
                    return Ok(Presence::Found);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(Presence::TimedOut);
            }
            sleep(ELEMENT_POLL).await;
        }
    }

    async fn find_all(&self, target: &Locator) -> Result<Vec<ElementHandle>, CalendarError> {
        self.session.find_elements(target).await
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), CalendarError> {
        self.session.click(element).await
    }

    async fn enter_scope(&self, scope: &Scope) -> Result<(), CalendarError> {
        match scope {
            Scope::Top => self.session.switch_to_frame(None).await,
            Scope::Frame(index) => self.session.switch_to_frame(Some(*index)).await,
        }
    }
}
