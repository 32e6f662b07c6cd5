use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Logging stays off unless `--verbose` is given; block decisions are
/// logged at debug level.
pub fn init(verbose: bool) -> Result<()> {
    if !verbose {
        return Ok(());
    }
    let _ = fmt()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
