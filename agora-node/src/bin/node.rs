use clap::Parser;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().map_err(|err| anyhow::anyhow!(err))?;

    let cli = agora_node::config::Cli::parse();
    let settings = agora_node::Settings::load(&cli)?;
    let mut node = agora_node::Node::new(settings)?;
    node.run()?;
    Ok(())
}
