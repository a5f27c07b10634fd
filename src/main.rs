use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use landing_page_lib::config::Config;
use landing_page_lib::free_email::FreeDomainList;
use landing_page_lib::integrations::insightly::InsightlyClient;
use landing_page_lib::mail::SendmailMailer;
use landing_page_lib::templates::JsonTemplateStore;
use landing_page_lib::LandingPage;

/// Files a landing page form submission in the CRM and prints the redirect.
#[derive(Debug, Parser)]
#[command(name = "landing-page", version)]
struct Args {
    /// Config file (defaults to ./landing-page.json)
    #[arg(long, env = "LANDING_PAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Compose emails but don't send them
    #[arg(long)]
    debug: bool,

    /// Form fields as key=value
    #[arg(value_parser = parse_field, required = true)]
    fields: Vec<(String, String)>,
}

fn parse_field(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", arg))
}

const RETRY_PAGE: &str = "<html><head><title>Error</title></head><body>\n\
<p>Missing field(s): email, first_name, last_name, or form_name,<br>\n\
or the email address is not valid</p>\n\
<p>Press BACK and try again</p>\n\
</body></html>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let crm = InsightlyClient::with_timeout(
        &config.api_key,
        &config.api_url,
        config.request_timeout(),
    )?
    .with_dropbox(config.dropbox.clone());
    let templates = JsonTemplateStore::load(&config.templates_path)?;
    let free_domains = match &config.free_domains_path {
        Some(path) => FreeDomainList::load(path)
            .with_context(|| format!("Failed to read free domains from {}", path.display()))?,
        None => FreeDomainList::new(),
    };
    let mailer = SendmailMailer::new(&config.sendmail_path);

    let landing_page = LandingPage::new(
        Arc::new(crm),
        Arc::new(mailer),
        Arc::new(templates),
        Arc::new(free_domains),
    )
    .with_debug(config.debug || args.debug);

    match landing_page.process(args.fields).await {
        Ok(url) => {
            println!("Content-type: text/html");
            println!("Location: {}", url);
            println!();
            println!("Redirecting to: {}", url);
            Ok(())
        }
        Err(e) if e.is_missing_field() => {
            log::warn!("Rejected submission: {}", e);
            println!("Content-type: text/html");
            println!();
            println!("{}", RETRY_PAGE);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
