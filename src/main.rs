use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use translint::{AnalysisReport, Analyzer, AnalyzerConfig, batch};

const USAGE: &str = "usage: translint [--target LANG] [--render-js] [--pretty] URL [URL...]";

struct CliArgs {
    urls: Vec<String>,
    target: Option<String>,
    render_js: bool,
    pretty: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs {
        urls: Vec::new(),
        target: None,
        render_js: false,
        pretty: false,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--target" => {
                let Some(lang) = args.next() else {
                    bail!("--target requires a language code");
                };
                parsed.target = Some(lang);
            }
            "--render-js" => parsed.render_js = true,
            "--pretty" => parsed.pretty = true,
            "--help" | "-h" => bail!("{USAGE}"),
            other if other.starts_with('-') => bail!("unknown flag '{other}'\n{USAGE}"),
            url => parsed.urls.push(url.to_string()),
        }
    }
    if parsed.urls.is_empty() {
        bail!("{USAGE}");
    }
    Ok(parsed)
}

fn render(reports: &[AnalysisReport], pretty: bool) -> Result<String> {
    let rendered = if reports.len() == 1 {
        if pretty {
            serde_json::to_string_pretty(&reports[0])?
        } else {
            serde_json::to_string(&reports[0])?
        }
    } else if pretty {
        serde_json::to_string_pretty(reports)?
    } else {
        serde_json::to_string(reports)?
    };
    Ok(rendered)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::from(2));
        }
    };

    let mut config = AnalyzerConfig::from_env()?;
    if let Some(target) = args.target {
        config.target.language = target;
    }
    if args.render_js {
        config.target.render_js = true;
    }
    config.validate()?;

    let analyzer = Arc::new(Analyzer::new(config));

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling analysis");
            signal_token.cancel();
        }
    });

    let reports = batch::analyze_many(analyzer, &args.urls, &token).await;
    println!("{}", render(&reports, args.pretty)?);

    let failed = reports
        .iter()
        .any(|r| !r.success || r.has_high_severity());
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
