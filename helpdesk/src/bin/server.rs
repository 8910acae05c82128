use actix_web::{web, App, HttpServer};
use clap::Parser;
use common::config::Config;
use helpdesk::api::{self, Services};
use helpdesk::clock::{Clock, SystemClock};
use helpdesk::orders::OrderService;
use helpdesk::replies::ReplyService;
use helpdesk::seed::DemoDataGenerator;
use helpdesk::stats::StatisticsService;
use helpdesk::store::SqliteStore;
use helpdesk::tickets::TicketService;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "helpdesk/config/server.toml")]
    config: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_file(&args.config).map_err(|e| anyhow::anyhow!(e))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let store = SqliteStore::connect(&config.common.database_url).await?;
    store.initialize_schema().await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if config.seed.enabled {
        let mut generator = DemoDataGenerator::new(config.seed.seed);
        generator.populate_if_empty(&store, clock.now()).await?;
    }

    let services = web::Data::new(Services {
        orders: OrderService::new(store.clone(), clock.clone()),
        tickets: TicketService::new(store.clone(), clock.clone()),
        replies: ReplyService::new(store.clone(), clock.clone()),
        stats: StatisticsService::new(store.clone()),
    });

    info!("starting support desk server at {}", config.server.address);
    HttpServer::new(move || App::new().app_data(services.clone()).configure(api::routes))
        .bind(&config.server.address)?
        .run()
        .await?;

    Ok(())
}
