use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "Chess Value Table Client")]
#[clap(about = "Learns chess position values through self-play", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    SelfPlay(SelfPlayCommand),
    Inspect(InspectCommand),
}

#[derive(Args)]
pub struct SelfPlayCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,
}

#[derive(Args)]
#[clap(about = "Summarizes the position table without modifying it.", long_about = None)]
pub struct InspectCommand {
    #[clap(short, long, default_value_t = String::from("client.conf"))]
    pub config: String,

    /// Number of most visited positions to list.
    #[clap(short, long, default_value_t = 10)]
    pub top: usize,
}
