use std::error::Error;

use clap::Parser;
use env_logger::Env;

use kds::hash_index::DEFAULT_BITS;
use kds::{Config, Suite};

#[derive(Parser, Debug)]
#[command(
    name = "kds",
    about = "Build, walk and tear down five index structures over a list of integers."
)]
struct Args {
    /// Integers separated by single spaces, e.g. "3 1 2".
    #[arg(long = "int-str", allow_hyphen_values = true, conflicts_with = "ints")]
    int_str: Option<String>,

    /// Integers given as separate arguments.
    #[arg(allow_negative_numbers = true)]
    ints: Vec<String>,

    /// Number of hash bucket bits.
    #[arg(long, default_value_t = DEFAULT_BITS)]
    hash_bits: u32,

    /// Maximum number of live allocations per structure.
    #[arg(long)]
    alloc_limit: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let int_str = args.int_str.unwrap_or_else(|| args.ints.join(" "));
    let config = Config::new(int_str)
        .with_hash_bits(args.hash_bits)
        .with_alloc_limit(args.alloc_limit);

    let mut suite = Suite::new(config)?;
    suite.init();
    suite.exit();
    Ok(())
}
