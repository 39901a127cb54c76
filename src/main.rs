use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kube::ResourceExt;
use mesh_operator::controller::{self, ReadinessOptions, CONDITION_TYPE_READY};
use mesh_operator::crd::ServiceMeshControlPlane;
use mesh_operator::Error;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the operator
    Run(RunArgs),
    /// Show version information
    Version,
    /// Show the Ready condition of every control plane
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Namespace the operator (and the CNI daemon sets) run in
    #[arg(long, env = "OPERATOR_NAMESPACE", default_value = "default")]
    operator_namespace: String,

    /// Include the CNI daemon sets in readiness
    #[arg(long, env = "CNI_ENABLED")]
    cni_enabled: bool,

    /// Compute readiness without writing status (dry-run)
    #[arg(long, env = "SKIP_STATUS_UPDATE")]
    skip_status_update: bool,

    /// Address of the REST API and metrics server
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8080")]
    #[cfg_attr(not(feature = "rest-api"), allow(dead_code))]
    api_addr: SocketAddr,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Only show control planes in this namespace
    #[arg(long)]
    namespace: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    match args.command {
        Commands::Version => {
            println!("mesh-operator v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Info(info_args) => run_info(info_args).await,
        Commands::Run(run_args) => run_operator(run_args).await,
    }
}

async fn run_info(args: InfoArgs) -> Result<(), Error> {
    let client = kube::Client::try_default()
        .await
        .map_err(Error::KubeError)?;

    let api: kube::Api<ServiceMeshControlPlane> = match &args.namespace {
        Some(ns) => kube::Api::namespaced(client, ns),
        None => kube::Api::all(client),
    };
    let control_planes = api
        .list(&Default::default())
        .await
        .map_err(Error::KubeError)?;

    println!("Managed control planes: {}", control_planes.items.len());
    for smcp in &control_planes.items {
        let ready = smcp
            .status
            .as_ref()
            .and_then(|s| s.get_condition(CONDITION_TYPE_READY));
        println!(
            "  {}/{}\tReady={}\t{}",
            smcp.namespace().unwrap_or_default(),
            smcp.name_any(),
            ready.map(|c| c.status.as_str()).unwrap_or("Unknown"),
            ready.map(|c| c.message.as_str()).unwrap_or("")
        );
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

async fn run_operator(args: RunArgs) -> Result<(), Error> {
    init_tracing(args.log_json);

    info!("Starting mesh-operator v{}", env!("CARGO_PKG_VERSION"));

    let client = kube::Client::try_default()
        .await
        .map_err(Error::KubeError)?;

    info!("Connected to Kubernetes cluster");

    let options = ReadinessOptions {
        cni_enabled: args.cni_enabled,
        operator_namespace: args.operator_namespace.clone(),
        skip_status_update: args.skip_status_update,
    };
    info!(
        "Readiness options: cni_enabled={}, operator_namespace={}, skip_status_update={}",
        options.cni_enabled, options.operator_namespace, options.skip_status_update
    );

    let state = Arc::new(controller::ControllerState::new(client, options));

    #[cfg(feature = "rest-api")]
    {
        let api_state = state.clone();
        let addr = args.api_addr;
        tokio::spawn(async move {
            if let Err(e) = mesh_operator::rest_api::run_server(api_state, addr).await {
                tracing::error!("REST API server error: {:?}", e);
            }
        });
    }

    controller::run_controller(state).await
}
