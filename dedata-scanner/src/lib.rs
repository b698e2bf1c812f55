pub mod browser;
pub mod chromium;
pub mod error;
pub mod filter;
pub mod idle;
pub mod result;
pub mod session;

pub use browser::{BrowserInstance, BrowserLauncher, InterceptedRequest};
pub use chromium::{ChromiumLauncher, ChromiumOptions};
pub use error::ScanError;
pub use filter::{Decision, ResourceCategory, ResourceFilter};
pub use idle::IdleOptions;
pub use result::{CapturedSet, SiteCapture};
pub use session::{RequestGate, SessionInterceptor, SessionOptions};
