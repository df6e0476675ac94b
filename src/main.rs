use std::sync::Arc;

use setly_flow::advisory::{self, AdvisoryCoordinator};
use setly_flow::cli::{self, ActiveFlow};
use setly_flow::config::{FlowConfig, FlowKind};
use setly_flow::flow::Theme;
use setly_flow::session::FlowSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = FlowConfig::from_env()?;

    let generator = advisory::generator_from_config(&config.advisory);
    let online = generator.has_provider();
    let coordinator = Arc::new(AdvisoryCoordinator::new(Arc::new(generator)));

    eprintln!("🧭 Setly flow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Flow: {:?}", config.flow);
    eprintln!("   Motion: {:?}", config.motion);
    if online {
        eprintln!("   Advisory: {}", config.advisory.model);
    } else {
        eprintln!("   Advisory: offline (set SETLY_OPENAI_API_KEY to enable)");
    }
    eprintln!("   Type `help` for commands, `quit` to exit.\n");

    // Print generated lines as they land; navigation never waits for them.
    let mut updates = coordinator.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let latest = updates.borrow_and_update().clone();
            if let Some(advisory) = latest {
                eprintln!("\n💬 {}\n", advisory.text);
            }
        }
    });

    let flow = match config.flow {
        FlowKind::Card => ActiveFlow::Card(FlowSession::new(&config, Some(coordinator))),
        FlowKind::Walkthrough => {
            eprintln!("   Where are you right now? (entry landed|housing|essentials|community)\n");
            ActiveFlow::Walkthrough(
                FlowSession::new(&config, Some(coordinator)).with_theme(Theme::Canvas),
            )
        }
    };

    cli::run(flow).await?;
    Ok(())
}
