use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Generate a sample PDF document", long_about = None)]
pub struct Cli {
    /// Where to write the document
    pub output: PathBuf,

    /// Number of pages to generate
    #[arg(long, default_value_t = 5)]
    pub pages: usize,

    /// Use compressed cross-reference and object streams instead of
    /// the classic table
    #[arg(long)]
    pub packed: bool,

    /// Add a bookmark per page
    #[arg(long)]
    pub bookmarks: bool,

    /// Document title for the information dictionary
    #[arg(long)]
    pub title: Option<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
