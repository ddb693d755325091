#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = taskboard::config::Config::from_env()?;
    taskboard::web::start_web_server(config).await
}
