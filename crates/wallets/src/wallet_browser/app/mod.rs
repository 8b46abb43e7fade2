pub(crate) mod contents {
    /// Replaced with the session token when the page is served.
    pub const SESSION_TOKEN_PLACEHOLDER: &str = "__SESSION_TOKEN__";

    pub const INDEX_HTML: &str = include_str!("index.html");
}
