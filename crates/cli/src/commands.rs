use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a migration and wait for it to finish.
    Run {
        #[arg(long, help = "Customer TSV export path")]
        customer_file: PathBuf,

        #[arg(long, help = "Company TSV export path")]
        company_file: PathBuf,

        #[arg(long, help = "Target store directory")]
        store: PathBuf,

        #[arg(long, help = "Domain selector, e.g. 'customer' or 'customer,company'")]
        targets: Option<String>,

        #[arg(long, help = "Update existing rows by natural key instead of appending")]
        upsert: bool,

        #[arg(long, help = "Mask contact fields before writing")]
        mask: bool,

        #[arg(long, default_value_t = 100, help = "Records per transactional chunk")]
        chunk_size: usize,

        #[arg(long, default_value_t = 10, help = "Tolerated skips before a step fails")]
        skip_limit: u64,

        #[arg(long, help = "Directory for the statistics report CSV")]
        report_dir: Option<PathBuf>,
    },

    /// Check the source files and count their rows without writing anything.
    Preflight {
        #[arg(long, help = "Customer TSV export path")]
        customer_file: PathBuf,

        #[arg(long, help = "Company TSV export path")]
        company_file: PathBuf,

        #[arg(long, help = "Domain selector, e.g. 'customer' or 'customer,company'")]
        targets: Option<String>,
    },
}
