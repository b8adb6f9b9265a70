//! Network URL constants for the storefront SDK.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.storefront.example.com";

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";
