//! `qa serve`: boot the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use qa_core::llm::mock::{MockLlmGenerator, MockLlmSummarizer};
use qa_serve::auth::{AllowAllAuthorizer, BearerTokenAuthorizer};
use qa_serve::app::{router, AppState};
use qa_store::Store;

use crate::keys::resolve_master_key;
use crate::provider::{resolve_provider, ProviderChoice};

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Path to the SQLite team-state database. Defaults to an in-memory store that is
    /// lost when the process exits.
    #[arg(long)]
    pub db: Option<std::path::PathBuf>,

    /// Require an `Authorization: Bearer <token>` header (any non-empty token is accepted
    /// as a caller id). Without this flag every request is treated as caller "local".
    #[arg(long)]
    pub require_bearer: bool,

    /// Browser provider backing `/v1/execute`
    #[arg(long, value_enum, default_value = "mock")]
    pub provider: ProviderChoice,

    /// API key for a real provider (ignored for `mock`)
    #[arg(long, env = "QA_PROVIDER_API_KEY")]
    pub api_key: Option<String>,
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let master_key = resolve_master_key();
    let store = match &args.db {
        Some(path) => Arc::new(Store::open(path, &master_key)?),
        None => Arc::new(Store::open_in_memory(&master_key)?),
    };

    let provider = resolve_provider(&args.provider, args.api_key.as_deref());
    let generator = Arc::new(MockLlmGenerator::single(
        "Generated test",
        "Exercise the primary flow described by the raw text.",
    ));
    let summarizer = Arc::new(MockLlmSummarizer { success: true });
    let authorizer: Arc<dyn qa_serve::auth::Authorizer> = if args.require_bearer {
        Arc::new(BearerTokenAuthorizer)
    } else {
        Arc::new(AllowAllAuthorizer)
    };

    let state = Arc::new(AppState::new(store, provider, generator, summarizer, authorizer));
    let addr: SocketAddr = args.addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "qa-serve listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
