use std::process::ExitCode;
use std::sync::Arc;

use cdn_purge::{InMemoryCacheStore, PurgeConfig, Service};
use cdn_purge_sdk::{CdnPurgeError, PURGE_ALL_PATH};
use clap::Args;

#[derive(Args)]
pub struct PurgeArgs {
    /// URL to purge; repeat for several. Scheme and host are ignored.
    #[arg(long = "url", value_name = "URL", required_unless_present = "all")]
    urls: Vec<String>,

    /// Purge everything on the endpoint
    #[arg(long, conflicts_with = "urls")]
    all: bool,
}

impl PurgeArgs {
    pub async fn run(&self, quiet: bool) -> anyhow::Result<ExitCode> {
        let config = PurgeConfig::from_env();
        if !config.is_complete() {
            tracing::warn!("AZURE_SUBSCRIPTION_ID, AZURE_RESOURCE_GROUP, AZURE_CDN_PROFILE or AZURE_CDN_ENDPOINT is not set");
        }
        if !config.has_credentials() {
            tracing::warn!("AZURE_CLIENT_ID, AZURE_CLIENT_SECRET or AZURE_TENANT_ID is not set");
        }

        let service = Service::new(Arc::new(config), Arc::new(InMemoryCacheStore::new()))?;
        let code = if self.execute(&service, quiet).await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
        Ok(code)
    }

    fn targets(&self) -> Vec<String> {
        if self.all {
            vec![PURGE_ALL_PATH.to_owned()]
        } else {
            self.urls.clone()
        }
    }

    /// Authenticate, then purge. Returns `true` on a 2xx purge response.
    async fn execute(&self, service: &Service, quiet: bool) -> bool {
        if let Err(err) = service.authenticate().await {
            report_failure("Authentication failed", &err);
            return false;
        }

        if !quiet {
            println!("Invalidating cache via POST request");
        }

        match service.purge_client().invalidate(&self.targets()).await {
            Ok(response) => {
                if !quiet {
                    println!("Done - status code {}", response.status);
                }
                true
            }
            Err(err) => {
                report_failure("An error occurred while purging caches", &err);
                false
            }
        }
    }
}

fn report_failure(title: &str, err: &CdnPurgeError) {
    eprintln!("{title}");
    match err.body() {
        Some(body) if !body.is_empty() => eprintln!("{body}"),
        _ => eprintln!("{err}"),
    }
}
