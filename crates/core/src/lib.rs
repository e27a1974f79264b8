pub mod domain;
pub mod drawdown;
pub mod ingest;
pub mod repository;
pub mod time;

pub use drawdown::detect;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_PRICES_DIR: &str = "prices";
    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub prices_dir: PathBuf,
        pub port: u16,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let prices_dir = lookup("PRICES_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICES_DIR));

            let port = match lookup("PORT") {
                Some(v) => v
                    .trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT must be a port number (got {v:?})"))?,
                None => DEFAULT_PORT,
            };

            Ok(Self {
                prices_dir,
                port,
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
            })
        }
    }

}
