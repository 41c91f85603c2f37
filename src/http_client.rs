use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

pub const USER_AGENT: &str = "Mozilla/5.0";

pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build http client")
}
