use backoffice_state::ChartPeriod;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "backoffice")]
#[command(about = "Admin console for the backoffice api", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse and moderate users
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Browse and publish announcements
    Announcements {
        #[command(subcommand)]
        command: AnnouncementsCommand,
    },
    /// Browse QR codes
    Qr {
        #[command(subcommand)]
        command: QrCommand,
    },
    /// Browse artists
    Artists {
        #[command(subcommand)]
        command: ArtistsCommand,
    },
    /// Browse the point modification ledger
    Points {
        #[command(subcommand)]
        command: PointsCommand,
    },
    /// Browse anniversary reward policies
    Rewards {
        #[command(subcommand)]
        command: RewardsCommand,
    },
    /// Browse chart rankings
    Charts {
        #[command(subcommand)]
        command: ChartsCommand,
    },
    /// Upload a file and print its object key
    Upload {
        file: PathBuf,

        #[arg(short, long)]
        collection: String,
    },
    /// Show the deployed console version
    Version {
        /// Keep polling until a newer build is deployed
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Page to load. Defaults to the last page viewed
    #[arg(short, long)]
    pub page: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(short, long)]
        search: Option<String>,

        /// Only show banned users
        #[arg(long)]
        banned: bool,
    },
    Ban {
        user_id: String,

        #[arg(short, long)]
        reason: String,
    },
    Unban {
        user_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AnnouncementsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long)]
        pinned: bool,
    },
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        body: String,

        /// Image uploaded before the announcement is created
        #[arg(short, long)]
        image: Option<PathBuf>,

        #[arg(long)]
        pinned: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum QrCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(short, long)]
        campaign: Option<String>,

        #[arg(long)]
        active: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ArtistsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PointsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(short, long)]
        user: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RewardsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long)]
        active: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChartsCommand {
    List {
        #[command(flatten)]
        page: PageArgs,

        #[arg(long, value_enum, default_value_t = PeriodArg::Weekly)]
        period: PeriodArg,

        #[arg(long)]
        artist: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<PeriodArg> for ChartPeriod {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Daily => ChartPeriod::Daily,
            PeriodArg::Weekly => ChartPeriod::Weekly,
            PeriodArg::Monthly => ChartPeriod::Monthly,
        }
    }
}
