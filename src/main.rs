use clap::Parser;

mod app;
mod audio;
mod config;
mod library;
mod playlist;
mod runtime;
mod transport;
mod ui;

fn main() -> anyhow::Result<()> {
    let cli = runtime::Cli::parse();
    runtime::run(cli)
}
