//! W3C WebDriver implementation of the CalendarView collaborator

mod client;
mod session;
mod wire;

pub use client::WebDriverCalendar;
pub use session::WdSession;
