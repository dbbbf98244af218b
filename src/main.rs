mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use std::io;
use std::path::PathBuf;

use actix_web::{App, HttpServer, middleware::Logger, web};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use crate::config::Config;
use crate::services::ingredient_import::IngredientImporter;
use crate::services::media_store::LocalMediaStore;

#[derive(Parser, Debug)]
#[command(name = "foodgram", about = "Recipe sharing backend")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lance le serveur HTTP (par défaut)
    Serve,
    /// Importe le catalogue d'ingrédients depuis un fichier JSON
    ImportIngredients {
        /// Chemin du fichier (INGREDIENTS_PATH par défaut)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .map_err(io::Error::other)?;

    let args = Args::parse();
    let config = Config::from_env().map_err(io::Error::other)?;

    log::info!("🔌 Connecting to database...");
    let db = db::establish_connection(&config)
        .await
        .map_err(io::Error::other)?;
    db::sync_schema(&db).await.map_err(io::Error::other)?;
    log::info!("✅ Database connected!");

    match args.command.unwrap_or(Commands::Serve) {
        Commands::ImportIngredients { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(&config.ingredients_path));
            IngredientImporter::import_and_report(&db, &path).await;
            Ok(())
        }
        Commands::Serve => serve(config, db).await,
    }
}

async fn serve(config: Config, db: sea_orm::DatabaseConnection) -> io::Result<()> {
    let media = LocalMediaStore::new(&config.media_root, &config.media_url);
    tokio::fs::create_dir_all(media.root()).await?;

    let bind = (config.host.clone(), config.port);
    log::info!("🚀 Starting server on http://{}:{}", bind.0, bind.1);

    let db = web::Data::new(db);
    let media = web::Data::new(media);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let media_url = config.media_url.clone();
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(media.clone())
            .app_data(config.clone())
            .configure(routes::configure_routes)
            .configure(|cfg| routes::media::media_routes(cfg, &media_url))
    })
        .bind(bind)?
        .run()
        .await
}
