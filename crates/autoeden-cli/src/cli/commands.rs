use autoeden_sdk::types::VehicleStatus;
use clap::Subcommand;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Main CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse and manage vehicle listings
    Vehicles {
        #[command(subcommand)]
        action: VehicleAction,
    },

    /// Administrator actions
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Place and review bids
    Bid {
        #[command(subcommand)]
        action: BidAction,
    },

    /// Read and manage notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },

    /// Talk to the marketplace assistant
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Request and download quotes
    Quote {
        #[command(subcommand)]
        action: QuoteAction,
    },

    /// Saved vehicle searches
    Searches {
        #[command(subcommand)]
        action: SearchAction,
    },

    /// Marketplace statistics
    Stats,

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum VehicleAction {
    /// All vehicles visible to you
    List,

    /// Vehicles you own
    Mine,

    /// Verified marketplace listings
    Market {
        #[command(flatten)]
        filters: MarketFilters,
    },

    /// Submissions waiting for review
    Pending,

    /// Bids and verification progress for one vehicle
    Show { id: u64 },

    /// Remove a listing
    Delete {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Toggle whether a listing is shown in the marketplace
    Hide { id: u64 },
}

/// Marketplace filters
#[derive(clap::Args, Debug, Default)]
pub struct MarketFilters {
    #[arg(long)]
    pub make: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub min_year: Option<u32>,

    #[arg(long)]
    pub max_year: Option<u32>,

    #[arg(long)]
    pub max_price: Option<Decimal>,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Review queue and listing totals
    Dashboard,

    /// Record a verification decision
    Verify {
        id: u64,

        /// pending, digitally_verified, physically_verified or rejected
        #[arg(long)]
        status: VehicleStatus,

        /// Required when rejecting
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BidAction {
    /// Bid on a vehicle
    Place {
        vehicle_id: u64,

        amount: Decimal,

        #[arg(long)]
        message: Option<String>,
    },

    /// Bids you have placed
    Mine,
}

#[derive(Subcommand, Debug)]
pub enum NotificationAction {
    List {
        /// Page to load
        #[arg(long)]
        page: Option<u32>,
    },

    /// Number of unread notifications
    Count,

    /// Mark one notification read
    Read { id: u64 },

    /// Mark every notification read
    ReadAll,

    Delete { id: u64 },

    /// Remove all read notifications
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum AiAction {
    /// Whether the assistant is enabled
    Status,

    Chat { message: String },

    /// Ask about one vehicle
    Ask { vehicle_id: u64, question: String },
}

#[derive(Subcommand, Debug)]
pub enum QuoteAction {
    /// Request a shipping and import quote
    Request {
        vehicle_id: u64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        country: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        note: Option<String>,
    },

    /// Save the quote PDF
    Download {
        quote_id: u64,

        /// Output file (defaults to AutoEden_Quote_<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SearchAction {
    List,
    Delete { id: u64 },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },
}
