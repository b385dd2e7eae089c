use asset_server::startup::{
    build_cors, build_router, init_db, load_config, log_startup_info, prepare_content_dirs,
};
use asset_server::state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber;

use clap::{Arg, Command as ClapApp};

fn main() {
    let matches = ClapApp::new("Asset Server")
        .version("1.0")
        .about("Media asset server: metadata API, uploads, range-aware static delivery")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE.json")
                .help("Path to config JSON file (overrides search)")
                .num_args(1),
        )
        .get_matches();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        // reads RUST_LOG env
        tracing_subscriber::fmt::init();

        let config = match load_config(matches.get_one::<String>("config").map(|s| s.into())) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                std::process::exit(1);
            }
        };

        let pool = init_db(&config).await;

        let static_root = PathBuf::from(&config.static_root);
        prepare_content_dirs(&static_root);

        let state = Arc::new(AppState {
            pool,
            static_root,
            index_document: config.index_document().to_string(),
        });

        let cors = match build_cors(&config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("CORS configuration error: {}", e);
                std::process::exit(2);
            }
        };
        let app = build_router(state).layer(cors);

        log_startup_info(&config);

        let host = config.host.unwrap_or_else(|| "127.0.0.1".to_string());
        let port = config.port.unwrap_or(7077);
        let bind_addr = format!("{}:{}", host, port);

        axum::Server::bind(&bind_addr.parse().expect("Invalid bind address"))
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
}
