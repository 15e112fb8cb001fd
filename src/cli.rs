use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jdcli", version, about = "JDownloader CLI tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Debugging flag
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Login into account and save credentials into config file
    Login(LoginArgs),

    /// Manages devices
    Device {
        #[command(subcommand)]
        command: DeviceCommand,
    },

    /// Manages downloads
    Download {
        #[command(subcommand)]
        command: DownloadCommand,
    },

    /// Interacts with links collector
    Links {
        #[command(subcommand)]
        command: LinksCommand,
    },

    /// Show build information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Device to use when --device is not given
    #[arg(long)]
    pub device: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct DeviceArgs {
    /// Device name to use for this operation
    #[arg(long)]
    pub device: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub target: DeviceArgs,

    /// JSON output flag
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    /// List all devices
    List {
        /// JSON output flag
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DownloadCommand {
    /// Manages download links
    Link {
        #[command(subcommand)]
        command: LinkCommand,
    },

    /// Manages download packages
    Package {
        #[command(subcommand)]
        command: PackageCommand,
    },

    /// Show downloader status
    Status(DeviceArgs),

    /// Clean completed downloads
    Clean(DeviceArgs),

    /// Pauses download
    Pause(PauseArgs),

    /// Stops download
    Stop(DeviceArgs),

    /// Starts download
    Start(DeviceArgs),
}

#[derive(Args, Debug, Default)]
pub struct PauseArgs {
    #[command(flatten)]
    pub target: DeviceArgs,

    /// Resume a paused download instead
    #[arg(long)]
    pub resume: bool,
}

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    /// List downloads
    List(ListArgs),

    /// Remove one or more links
    Rm(RmArgs),
}

#[derive(Args, Debug, Default)]
pub struct RmArgs {
    #[command(flatten)]
    pub target: DeviceArgs,

    /// Link identifier. Can be specified multiple times
    #[arg(long = "id")]
    pub ids: Vec<i64>,
}

#[derive(Subcommand, Debug)]
pub enum PackageCommand {
    /// List download packages
    List(ListArgs),
}

#[derive(Subcommand, Debug)]
pub enum LinksCommand {
    /// Add one or more links to LinkCollector
    Add(AddArgs),

    /// List all links in LinkGrabber
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: DeviceArgs,

    /// Link to add. Can be specified multiple times
    #[arg(long = "link")]
    pub links: Vec<String>,

    /// Path to file which contains URL on each line. Lines starting with ';' will be ignored
    #[arg(long)]
    pub from_file: Option<PathBuf>,

    /// Name of download package
    #[arg(long)]
    pub package_name: Option<String>,

    /// Directory where to download files
    #[arg(long)]
    pub download_dir: Option<String>,

    /// Start downloading immediately
    #[arg(long)]
    pub auto_start: bool,
}
