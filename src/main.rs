use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use voice_bank::Assistant;
use voice_bank::camera::{Camera, NoCamera, StillImageCamera};
use voice_bank::config::AssistantConfig;
use voice_bank::dashboard::ActionDispatcher;
use voice_bank::intent::IntentResolver;
use voice_bank::onboarding::InterviewRunner;
use voice_bank::speech::{ConsoleInput, ConsoleOutput, ContinuousListener, SpeechInput, Speaker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = AssistantConfig::from_env().context("Invalid configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit.
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "voice-bank.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    eprintln!("🏦 Voice Bank v{}", env!("CARGO_PKG_VERSION"));
    match &config.azure {
        Some(azure) => eprintln!("   Intent: Azure OpenAI ({})", azure.deployment),
        None => eprintln!("   Intent: local keyword rules"),
    }
    eprintln!("   Type what you would say and press Enter. Ctrl-C to exit.\n");

    let input: Arc<dyn SpeechInput> = Arc::new(ConsoleInput::stdin());
    let speaker = Speaker::new(Arc::new(ConsoleOutput::new()), config.speech.clone());
    let camera: Arc<dyn Camera> = match &config.photo_path {
        Some(path) => Arc::new(StillImageCamera::new(path)),
        None => Arc::new(NoCamera),
    };

    let mut assistant = build_assistant(&config, input.clone(), speaker.clone())
        .context("Failed to create assistant")?;

    if config.skip_onboarding {
        assistant.registration_skipped();
    } else {
        let runner = InterviewRunner::new(input, speaker, camera, config.interview.clone());
        let outcome = runner.run().await;
        if let Ok(record) = &outcome {
            match record.qr.to_json() {
                Ok(json) => println!("QR ({}): {json}", record.issued_at_display()),
                Err(e) => tracing::warn!(error = %e, "Failed to encode QR payload"),
            }
        }
        assistant.finish_onboarding(outcome);
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    assistant
        .run_until(shutdown, |view| println!("{view}"))
        .await
        .context("Listening failed")?;

    eprintln!("👋 Goodbye");
    Ok(())
}

/// Wire the resolver, dispatcher and listener from configuration.
fn build_assistant(
    config: &AssistantConfig,
    input: Arc<dyn SpeechInput>,
    speaker: Speaker,
) -> voice_bank::Result<Assistant> {
    let resolver = IntentResolver::from_config(config)?;
    let dispatcher = ActionDispatcher::new(speaker, config.dispatch.clone());
    let listener = ContinuousListener::new(input, config.listen.clone());
    Ok(Assistant::new(resolver, dispatcher, listener))
}
