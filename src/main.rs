use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use nudge_agent::api::{self, AppState};
use nudge_agent::config::{DataConfig, NudgeConfig, ServerConfig};
use nudge_agent::data::{DataSource, FileDataSource};
use nudge_agent::generator::{GeneratorConfig, MessageGenerator, NudgeGenerator};
use nudge_agent::llm::{LlmConfig, create_provider};
use nudge_agent::output::save_nudges;
use nudge_agent::pipeline::processor::NudgeProcessor;
use nudge_agent::tone::{LlmEmotionModel, ToneClassifier, ToneInference};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "run".to_string());

    let nudge_config = NudgeConfig::from_env()?;
    let data_config = DataConfig::from_env();

    eprintln!("📬 Nudge Agent v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Thresholds: idle >= {} days, urgency > {}",
        nudge_config.min_idle_days, nudge_config.min_urgency
    );
    eprintln!("   CRM: {}", data_config.crm_path.display());
    eprintln!("   Emails: {}", data_config.email_path.display());

    // ── LLM collaborators ────────────────────────────────────────────────
    let (tone, generator): (Arc<dyn ToneInference>, Arc<dyn MessageGenerator>) =
        match LlmConfig::from_env()? {
            Some(llm_config) => {
                eprintln!("   Model: {} ({:?})", llm_config.model, llm_config.backend);
                let llm = create_provider(&llm_config)?;
                (
                    Arc::new(ToneClassifier::new(Arc::new(LlmEmotionModel::new(
                        llm.clone(),
                    )))),
                    Arc::new(NudgeGenerator::new(llm, GeneratorConfig::default())),
                )
            }
            None => {
                eprintln!("   Model: none (heuristic tone, template nudges)");
                (
                    Arc::new(ToneClassifier::heuristic_only()),
                    Arc::new(NudgeGenerator::template_only()),
                )
            }
        };

    let processor = Arc::new(NudgeProcessor::new(nudge_config, tone, generator));
    let source: Arc<dyn DataSource> = Arc::new(FileDataSource::from_config(&data_config));

    match command.as_str() {
        "run" => {
            let nudges = processor.process(source.as_ref(), Utc::now()).await;
            save_nudges(&data_config.output_path, &nudges)
                .await
                .with_context(|| {
                    format!("writing {}", data_config.output_path.display())
                })?;
            tracing::info!(
                count = nudges.len(),
                path = %data_config.output_path.display(),
                "Nudge run complete"
            );
            eprintln!(
                "   Generated {} nudges → {}",
                nudges.len(),
                data_config.output_path.display()
            );
        }
        "serve" => {
            let server_config = ServerConfig::from_env()?;
            let addr = server_config.bind_addr();
            let app = api::router(AppState { processor, source });

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            eprintln!("   API: http://{addr}/nudges");
            tracing::info!(addr = %addr, "Nudge API server started");
            axum::serve(listener, app).await?;
        }
        other => {
            anyhow::bail!("unknown command '{other}' (expected 'run' or 'serve')");
        }
    }

    Ok(())
}
