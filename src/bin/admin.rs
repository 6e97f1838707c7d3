use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use pentopublic_admin::{
    auth::Session,
    catalog::CatalogFilter,
    config::AdminConfig,
    controller::{CatalogController, DashboardController},
    display::render_view,
    logging::init_tracing,
    models::BookId,
    services::{AdminError, HttpAdminService, ServiceResult},
    tabs::DashboardTab,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "PenToPublic admin dashboard client")]
struct Args {
    /// Tab to display after the command runs.
    #[arg(long, default_value = "dashboard")]
    tab: DashboardTab,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and print the dashboard.
    Show,
    /// Approve a pending book.
    Approve { id: BookId },
    /// Reject a pending book.
    Reject { id: BookId },
    /// Browse the reader catalog.
    Catalog {
        #[arg(long, default_value = "all")]
        filter: CatalogFilter,
        #[arg(long)]
        search: Option<String>,
    },
    /// Exchange credentials for a bearer token.
    Login {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let config = AdminConfig::from_env();

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, config: AdminConfig) -> ServiceResult<()> {
    let service = HttpAdminService::from_config(&config)?;
    info!(api = service.base(), "using admin api");

    match args.command.unwrap_or(Command::Show) {
        Command::Login { user, password } => {
            let resp = service.login(&user, &password).await?;
            let session = Session::from_login(&user, resp)?;
            println!("role: {}", session.role);
            println!("PENTOPUBLIC_TOKEN={}", session.token);
            Ok(())
        }
        Command::Catalog { filter, search } => {
            let mut catalog = CatalogController::new(service);
            catalog.set_filter(filter).await?;
            if let Some(query) = search {
                catalog.set_search(query);
            }
            let books = catalog.visible();
            println!("All Books ({})", books.len());
            for book in books {
                println!(
                    "#{} {} by {}",
                    book.id,
                    book.title,
                    book.author_name().unwrap_or("Unknown")
                );
            }
            Ok(())
        }
        command => {
            let token = config
                .token
                .as_deref()
                .ok_or_else(|| AdminError::Config("PENTOPUBLIC_TOKEN is not set".into()))?;
            Session::from_token(token)?.require_admin()?;

            let dashboard = DashboardController::new(service, &config);
            dashboard.load_all().await;
            let result = match command {
                Command::Approve { id } => dashboard.approve(id).await,
                Command::Reject { id } => dashboard.reject(id).await,
                _ => Ok(()),
            };
            dashboard.select_tab(args.tab);
            print!(
                "{}",
                render_view(&dashboard.view(), dashboard.notification().as_ref())
            );
            result
        }
    }
}
