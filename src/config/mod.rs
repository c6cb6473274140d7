use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

const ENV_PREFIX: &str = "CLIENTDB_";

fn default_port() -> u16 {
    5432
}

/// Connection parameters for the client database
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Database name
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    pub fn new(
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            user: user.into(),
            password: password.into(),
            host: host.into(),
            port: default_port(),
        }
    }

    /// Load configuration from `CLIENTDB_*` environment variables
    ///
    /// A `.env` file in the working directory is read first if it exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;

        Ok(config)
    }

    /// Parse configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars)?;
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Build driver connection options from these parameters
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
