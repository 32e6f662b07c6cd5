use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "po-translator-rust",
    version,
    about = "Translate gettext catalogs using LLM tool calls"
)]
struct Cli {
    /// Target language, also the locale directory name (fr, pt_BR, zh_Hans)
    #[arg(short = 'l', long = "lang")]
    lang: String,

    /// Model name or provider:model (e.g. openai:MODEL_ID)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// API key (overrides environment variables)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Formality/style key (from settings [formally])
    #[arg(short = 'f', long = "formal", default_value = "formal")]
    formal: String,

    /// Source language (ISO 639-1/2/3). Use "auto" to detect.
    #[arg(short = 'L', long = "source-lang")]
    source_lang: Option<String>,

    /// Locale root holding <lang>/LC_MESSAGES (repeatable, overrides settings)
    #[arg(short = 'p', long = "locale-path")]
    locale_paths: Vec<String>,

    /// Catalog file name (default: django.po)
    #[arg(short = 'c', long = "catalog")]
    catalog: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Copy each catalog into the backup store before overwriting it
    #[arg(long = "backup")]
    backup: bool,

    /// Put the newest backup of each catalog back instead of translating
    #[arg(long = "restore", conflicts_with_all = ["backup", "dry_run"])]
    restore: bool,

    /// Print the translated catalogs instead of writing them
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    po_translator_rust::logging::init(cli.verbose)?;

    let output = po_translator_rust::run(po_translator_rust::Config {
        lang: cli.lang,
        model: cli.model,
        key: cli.key,
        formal: cli.formal,
        source_lang: cli.source_lang,
        locale_paths: cli.locale_paths,
        catalog: cli.catalog,
        settings_path: cli.read_settings,
        backup: cli.backup,
        restore: cli.restore,
        dry_run: cli.dry_run,
    })
    .await?;

    println!("{}", output);
    Ok(())
}
