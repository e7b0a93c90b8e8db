//! Headless Chrome rendering for JavaScript-built pages.

pub mod chrome;

pub use chrome::HeadlessChrome;
