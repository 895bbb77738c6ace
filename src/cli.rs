use std::path::PathBuf;

use anyhow::bail;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    client::ApiClient,
    clock::SystemClock,
    config::{DEFAULT_DETECT_API, DEFAULT_ORDERS_API, DEFAULT_TREES_API, DEFAULT_USER, Endpoints},
    expiry::{ExpiryMode, PeriodEnd},
    listing::TreeListing,
    orders::{ExecuteStatus, OrderDraft, OrderType, Session},
    render,
    submission::{OrderSubmissionFlow, SubmissionState},
    trees::StatusFilter,
    upload::{
        FilePreviewController, MAX_UPLOAD_BYTES, PreviewRegistry, SelectedFile, TreeDraft,
        submit_tree_photo,
    },
};

/// Admin console for the Greenmin tree inventory and order desk
#[derive(Parser)]
#[command(name = "greenmin", version)]
pub struct Cli {
    #[command(flatten)]
    pub api: ApiArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ApiArgs {
    /// Trees API base URL
    #[arg(long, env = "GREENMIN_TREES_API", default_value = DEFAULT_TREES_API, global = true)]
    pub trees_api: String,

    /// Orders API URL
    #[arg(long, env = "GREENMIN_ORDERS_API", default_value = DEFAULT_ORDERS_API, global = true)]
    pub orders_api: String,

    /// Image-detection API URL
    #[arg(long, env = "GREENMIN_DETECT_API", default_value = DEFAULT_DETECT_API, global = true)]
    pub detect_api: String,
}

impl ApiArgs {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.trees_api, &self.orders_api, &self.detect_api)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Buy and sell orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Browse tree records
    #[command(subcommand)]
    Trees(TreesCommand),

    /// Add a tree record
    #[command(subcommand)]
    Tree(TreeCommand),
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Place a new order
    Place(PlaceArgs),
}

#[derive(Args)]
pub struct PlaceArgs {
    /// buy or sell
    #[arg(long, default_value = "buy")]
    pub side: OrderType,

    /// Max price, sent as typed
    #[arg(long, default_value = "")]
    pub max_price: String,

    /// Min price, sent as typed
    #[arg(long, default_value = "")]
    pub min_price: String,

    #[arg(long, default_value = "")]
    pub quantity: String,

    /// single or multiple
    #[arg(long)]
    pub execute: Option<ExecuteStatus>,

    /// today, never or period
    #[arg(long, default_value = "today")]
    pub expiry: ExpiryMode,

    /// First day of a period (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of a period (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Cut the last period day at its start or its end
    #[arg(long, default_value = "start")]
    pub period_end: PeriodEnd,

    /// Acting user recorded on the order
    #[arg(long, env = "GREENMIN_USER", default_value = DEFAULT_USER)]
    pub user: String,

    /// Print the payload instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl PlaceArgs {
    fn draft(&self) -> OrderDraft {
        OrderDraft {
            order_type: self.side,
            price_min: self.min_price.clone(),
            price_max: self.max_price.clone(),
            quantity: self.quantity.clone(),
            execute_status: self.execute,
            expiry_mode: self.expiry,
            period_from: self.from,
            period_to: self.to,
        }
    }
}

#[derive(Subcommand)]
pub enum TreesCommand {
    /// List trees, optionally for one status tab
    List {
        /// all, pending, approved or processed
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
}

#[derive(Subcommand)]
pub enum TreeCommand {
    /// Validate a new tree and send its photo for detection
    Add(AddTreeArgs),
}

#[derive(Args)]
pub struct AddTreeArgs {
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub species: String,

    /// Latitude, Longitude
    #[arg(long, default_value = "")]
    pub location: String,

    /// Photo or document to upload (image/*, .pdf, .doc, .docx)
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// Upload size limit in bytes
    #[arg(long, default_value_t = MAX_UPLOAD_BYTES)]
    pub max_bytes: u64,
}

async fn handle_place(client: ApiClient, args: PlaceArgs) -> anyhow::Result<()> {
    let mut flow = OrderSubmissionFlow::new(client, SystemClock, Session::new(&args.user))
        .with_period_end(args.period_end);
    *flow.draft_mut() = args.draft();

    if args.dry_run {
        let (_, payload) = flow.preview();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match flow.submit().await {
        SubmissionState::Failure(f) => bail!("{}", f.message()),
        state => {
            if let Some(line) = render::submission(state) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

async fn handle_list(client: ApiClient, status: StatusFilter) -> anyhow::Result<()> {
    let listing = TreeListing::new(client);
    println!("{}", render::tabs(status));
    let view = listing.load(status).await.unwrap_or_else(|| listing.view());
    if let Some(message) = view.error() {
        bail!("{}", message);
    }
    println!("{}", render::listing(&view));
    Ok(())
}

async fn handle_add_tree(client: ApiClient, args: AddTreeArgs) -> anyhow::Result<()> {
    let registry = PreviewRegistry::new();
    let mut selection = FilePreviewController::new(registry);
    if let Some(path) = &args.photo {
        selection.select(vec![SelectedFile::from_path(path).await?]);
        print!("{}", render::selection(&selection));
    }

    let draft = TreeDraft {
        name: args.name,
        species: args.species,
        location: args.location,
    };
    let detected = submit_tree_photo(&client, &draft, &selection, args.max_bytes).await?;
    println!("{}", serde_json::to_string_pretty(&detected)?);
    Ok(())
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.api.endpoints());
    match cli.command {
        Commands::Order(OrderCommand::Place(args)) => handle_place(client, args).await,
        Commands::Trees(TreesCommand::List { status }) => handle_list(client, status).await,
        Commands::Tree(TreeCommand::Add(args)) => handle_add_tree(client, args).await,
    }
}
