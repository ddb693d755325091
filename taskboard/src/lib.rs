pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        /// Id of the signed-in user. Without it nobody is signed in.
        #[serde(default)]
        pub user_id: Option<String>,
        #[serde(default)]
        pub user_email: Option<String>,
        #[serde(default)]
        pub user_display_name: Option<String>,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::default())
        }

        fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment)
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

}
pub mod auth;
pub mod project;
pub mod repository;
pub mod store;
pub mod task;
pub mod timestamp;
pub mod view;
pub mod web;
