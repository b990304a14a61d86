use std::time::Duration;

use clap::Args;
use serde_json::json;

use crate::cli::{utils::{output_error, output_success}, OutputFormat};
use crate::config;
use crate::services::revalidate::fan_out;
use crate::services::{HttpRevalidator, InvalidationTarget};

#[derive(Args, Debug)]
pub struct RevalidateArgs {
    #[arg(long, help = "Public hostname, e.g. blog.vercel.pub or example.com")]
    pub host: String,

    #[arg(long, help = "Plan slug whose page should be rebuilt")]
    pub slug: String,

    #[arg(long, help = "Site key the page is rendered under (defaults to the subdomain part of --host)")]
    pub tenant: Option<String>,
}

pub async fn handle(args: RevalidateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let publishing = &config::config().publishing;
    let tenant = args
        .tenant
        .unwrap_or_else(|| tenant_for_host(&args.host, &publishing.root_domain));

    let target = InvalidationTarget {
        hostname: args.host.clone(),
        tenant_key: tenant,
        slug: Some(args.slug.clone()),
    };
    let revalidator = HttpRevalidator::new(publishing);
    let limit = Duration::from_millis(publishing.revalidate_timeout_ms);
    let warnings = fan_out(&revalidator, std::slice::from_ref(&target), limit).await;

    match warnings.first() {
        None => output_success(
            &output_format,
            &format!("Revalidated {}", args.host),
            Some(json!({ "host": target.hostname, "tenant": target.tenant_key, "slug": args.slug })),
        ),
        Some(warning) => {
            output_error(&output_format, &warning.message, Some("REVALIDATE_FAILED"))?;
            anyhow::bail!("revalidation of {} failed", warning.hostname)
        }
    }
}

/// `blog.vercel.pub` renders as `blog`; any other host is its own key
fn tenant_for_host(host: &str, root_domain: &str) -> String {
    host.strip_suffix(root_domain)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|sub| !sub.is_empty())
        .unwrap_or(host)
        .to_string()
}
