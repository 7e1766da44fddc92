use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docindex")]
#[command(about = "Serve generated documentation search indexes over MCP", long_about = None)]
pub struct Cli {
    /// Generated `search/` directory to load at startup
    pub search_dir: Option<PathBuf>,

    /// Config file (default: ./docindex.toml, then the user config dir)
    #[arg(short, long, env = "DOCINDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the default result cap
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Don't read or write snapshots
    #[arg(long)]
    pub no_cache: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies flags on top of file and environment settings.
    pub fn apply(&self, settings: &mut crate::config::Settings) {
        if let Some(dir) = &self.search_dir {
            settings.search_dir = Some(dir.clone());
        }
        if let Some(max) = self.max_results {
            settings.max_results = max;
        }
        if self.no_cache {
            settings.cache.enabled = false;
        }
    }
}
