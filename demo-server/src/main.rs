use user_token_axum::{Config, init, user_token_router, user_token_router_no_trace};

mod server;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    server::init_tracing("demo_server");

    let config = Config::from_env()?;
    let service = init(config).await?;

    let port = match std::env::var("PORT") {
        Ok(value) => value.trim().parse()?,
        Err(_) => DEFAULT_PORT,
    };

    // HTTP_TRACE=false drops per-request spans for benchmarking
    let app = match std::env::var("HTTP_TRACE").as_deref() {
        Ok("false") | Ok("0") => user_token_router_no_trace(service.clone()),
        _ => user_token_router(service.clone()),
    };

    let served = server::serve(port, app).await;

    service.shutdown().await;
    tracing::info!("Server stopped");
    Ok(served?)
}
