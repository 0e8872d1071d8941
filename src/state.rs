use std::sync::Arc;

use super::{config::Config, error::StartupError, sheets::SheetsClient};

pub struct State {
    pub config: Config,
    pub sheets: SheetsClient,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, StartupError> {
        let sheets = SheetsClient::new(&config)?;

        Ok(Arc::new(Self { config, sheets }))
    }
}
