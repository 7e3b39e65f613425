use clap::Parser;
use mockbird_engine::Registry;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Host to bind the api server
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the api server
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let registry = Registry::shared();
    let addr = format!("{}:{}", args.host, args.port);

    if let Err(err) = mockbird_server::serve(registry, &addr).await {
        tracing::error!("mockbird exited with failure: {err:?}");
        std::process::exit(1);
    }
}
