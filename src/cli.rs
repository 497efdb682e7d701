use clap::Parser;
use std::path::PathBuf;

use krsite_dl::batch::Input;
use krsite_dl::config::Config;
use krsite_dl::director::GroupingMode;

#[derive(Parser, Debug)]
#[command(name = "krsite-dl")]
#[command(about = "Download images from Korean news and magazine posts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Post URL to download
    pub url: Option<String>,

    /// File of post URLs, one per line (may be repeated)
    #[arg(short = 'a', value_name = "FILE")]
    pub batch: Vec<PathBuf>,

    /// File of direct image URLs, downloaded without extraction (may be repeated)
    #[arg(long = "ai", value_name = "FILE")]
    pub image_batch: Vec<PathBuf>,

    /// Root directory for downloads
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Keep characters Windows rejects in file and folder names
    #[arg(long)]
    pub no_windows_filenames: bool,

    /// Put post folders directly under the destination
    #[arg(long)]
    pub flat: bool,

    /// Configuration file (defaults to $KRSITE_DL_CONFIG or config/krsite-dl.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Concurrent image downloads per post
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Inputs in command-line order: the URL, then post lists, then image lists
    pub fn inputs(&self) -> Vec<Input> {
        let mut inputs = Vec::new();
        if let Some(url) = &self.url {
            inputs.push(Input::Url(url.clone()));
        }
        inputs.extend(self.batch.iter().cloned().map(Input::PostList));
        inputs.extend(self.image_batch.iter().cloned().map(Input::ImageList));
        inputs
    }

    /// Flags win over file and environment settings
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(destination) = &self.destination {
            config.download.destination = destination.clone();
        }
        if let Some(workers) = self.workers {
            config.download.workers = workers;
        }
        if self.flat {
            config.download.grouping = GroupingMode::Flat;
        }
        if self.no_windows_filenames {
            config.naming.windows_safe = false;
        }
    }
}
