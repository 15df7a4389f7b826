use anyhow::Result;
use clap::Parser;
use inviter::{Inviter, InviterConfig};

#[derive(Parser, Debug)]
#[command(name = "inviter")]
#[command(about = "List the customers within 100km of the Intercom Dublin Office, ordered by user_id.", long_about = None)]
struct Cli {
    /// Path to text file of json formatted customers, one per line
    #[arg(short, long)]
    customers: String,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    let inviter = Inviter::new(InviterConfig::default());
    let invitees = inviter.customers_to_invite(&cli.customers)?;

    let config = inviter.config();
    println!(
        "The following users are within {}km of the {} (ordered by user_id):",
        config.threshold_km, config.office_name
    );
    for invitee in &invitees {
        println!(" {}", invitee);
    }

    Ok(())
}
