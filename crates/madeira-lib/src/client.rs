use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the blocking HTTP client shared by the remote helpers.
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("madeira-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}
