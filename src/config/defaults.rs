//! Default values for configuration

/// Default review service URL for local development
pub fn default_api_base_url() -> String {
    std::env::var("SERMON_REVIEW_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

/// Default request timeout in seconds
pub fn default_timeout_secs() -> u64 {
    30
}

/// Default timeout for slide analysis, which calls out to a language model
pub fn default_analysis_timeout_secs() -> u64 {
    180
}

/// Default user agent string
pub fn default_user_agent() -> String {
    format!("sermon-review/{}", env!("CARGO_PKG_VERSION"))
}

/// Default directory for downloaded presentations
pub fn default_download_dir() -> String {
    ".".to_string()
}
