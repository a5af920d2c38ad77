use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    docportal::logging::init().context("init logging")?;

    let cli = docportal::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let content = cli.content.as_deref();
    let timeout_secs = cli.timeout_secs;
    let config = || {
        docportal::config::ContentConfig::from_env()?.with_overrides(content, timeout_secs)
    };

    match cli.command {
        docportal::cli::Command::Doc(args) => {
            docportal::docs::run_doc(&config()?, args)
                .await
                .context("doc")?;
        }
        docportal::cli::Command::Toc(args) => {
            docportal::toc::run(&config()?, args).await.context("toc")?;
        }
        docportal::cli::Command::Render(args) => {
            docportal::render::run(args).context("render")?;
        }
        docportal::cli::Command::Export(args) => {
            docportal::export::run(&config()?, args)
                .await
                .context("export")?;
        }
        docportal::cli::Command::Serve(args) => {
            docportal::app::serve(&config()?, args)
                .await
                .context("serve")?;
        }
    }

    Ok(())
}
