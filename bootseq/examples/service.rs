//! Boots a small service whose configuration comes from code, a properties
//! file and the environment.
//!
//! ```text
//! APP_CONFIG=service.properties APP_HTTP__PORT=9000 cargo run --example service
//! ```
//!
//! Every configuration problem is reported in one go; fix them all and run
//! again.

use bootseq::{
    ApplicationConfigurationError, Bootstrap, BoxError, Component, ConfigGroup, LifeCycleManager,
    LoggingConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct HttpConfig {
    host: String,
    port: u16,
    api_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            api_token: None,
        }
    }
}

impl ConfigGroup for HttpConfig {
    const PREFIX: &'static str = "http";
    const DESCRIPTIONS: &'static [(&'static str, &'static str)] = &[
        ("host", "Interface to bind"),
        ("port", "Port to listen on"),
        ("api_token", "Token required on admin routes"),
    ];
    const LEGACY: &'static [(&'static str, &'static str)] = &[("listen_port", "port")];
    const SENSITIVE: &'static [&'static str] = &["api_token"];

    fn validate(&self) -> Vec<String> {
        if self.port == 0 {
            vec!["port must be between 1 and 65535".to_owned()]
        } else {
            Vec::new()
        }
    }
}

struct Listener;

impl Component for Listener {
    fn name(&self) -> &str {
        "http-listener"
    }

    fn start(&mut self) -> Result<(), BoxError> {
        info!("listener started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        info!("listener stopped");
        Ok(())
    }
}

fn main() -> std::process::ExitCode {
    let mut bootstrap = Bootstrap::new()
        .with_group::<HttpConfig>()
        .set_optional_property("http.host", "0.0.0.0")
        .with_lifecycle_manager(LifeCycleManager::new().with_component(Listener));

    let mut injector = match bootstrap.initialize() {
        Ok(injector) => injector,
        Err(err) => {
            let problems = err.as_configuration().map_or(0, ApplicationConfigurationError::len);
            error!(problems, "{err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Some(http) = injector.configuration::<HttpConfig>() {
        info!(host = %http.host, port = http.port, "serving");
    }
    if let Some(logging) = injector.configuration::<LoggingConfig>() {
        info!(level = %logging.level, "log filter in effect");
    }
    if let Err(err) = injector.stop() {
        error!("{err}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
