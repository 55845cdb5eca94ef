//! Startup configuration — SPEC_FULL.md §A.3. Parsed once in `main`, no
//! config crate, matching the teacher's hand-rolled `PORT` env parsing in
//! its own server binary, generalized to the full env surface §6 names.

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// `development` relaxes SSRF host validation for webhook URLs so a
    /// local agent can point at `http://localhost:...` while testing.
    pub development: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "clawcombat.db".to_string());

        let development = std::env::var("NODE_ENV")
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        Self { port, database_path, development, cors_allowed_origins }
    }
}
