// Engagement predictor - main.rs
// Loads configuration and artifacts, then runs the requested command

use engagement_predictor::cli::{bootstrap, dispatch};

fn main() -> anyhow::Result<()> {
    let (cli, config) = bootstrap()?;
    dispatch(cli, config)
}
