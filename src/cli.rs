use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify email files as phishing or legitimate
    Scan {
        /// Email files (.eml) to classify
        #[clap(required = true)]
        files: Vec<String>,

        /// Print results as pretty JSON instead of one line per email
        #[clap(long, default_value = "false")]
        json: bool,

        /// Path for the JSON results file
        #[clap(short, long)]
        output: Option<String>,

        /// Number of nearest neighbors used for voting
        #[clap(short = 'k', long)]
        neighbors: Option<usize>,
    },

    /// Leave-one-out evaluation over the labeled example set
    Evaluate {},

    /// List the configured labeled examples
    Examples {},
}
