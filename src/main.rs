use bike_demand::{
    config::AppConfig,
    features::FEATURE_SCHEMA,
    model::{ModelHandle, TorchEstimator},
    server::{self, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bike_demand=info,tower_http=info".into()),
        )
        .init();

    let cfg = AppConfig::from_env()?;

    // load() runs the warmup forward and shape check
    let mdl = TorchEstimator::load(&cfg.model_path, &cfg.meta_path)?;
    tracing::info!("warmup forward ok");
    tracing::info!("loaded model {}; feat_list[{}]: {:?}", cfg.model_path.display(), FEATURE_SCHEMA.len(), FEATURE_SCHEMA);

    let state = AppState::new(ModelHandle::new(mdl)).with_log_predictions(cfg.log_predictions);
    let app = server::router(state);

    let listener = cfg.listen().await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
