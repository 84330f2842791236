//! Per-section configuration components

pub mod certificates;
pub mod fetch;
pub mod lynx;
pub mod search;

pub use certificates::CertificatesConfig;
pub use fetch::FetchConfig;
pub use lynx::LynxConfig;
pub use search::SearchConfig;
