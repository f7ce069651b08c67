use thumbtier_api::{
    config::Config,
    tracing_config::{self, HoneycombConfig},
};

pub async fn run(mut config: Config) -> Result<(), eyre::Report> {
    let honeycomb = config.honeycomb_team.take().map(|team| HoneycombConfig {
        team,
        dataset: std::mem::take(&mut config.honeycomb_dataset),
    });

    let _tracing = tracing_config::configure("thumbtier", std::io::stdout, honeycomb)?;

    let server = thumbtier_api::run_server(config).await?;
    server.run().await?;
    Ok(())
}
