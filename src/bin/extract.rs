use anyhow::{Context, Result};
use ixbrl_classic::attr::find_node_attr_non_empty;
use ixbrl_classic::discovery::TaxonomyCache;
use ixbrl_classic::{hydrate_bytes, Config, Document};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;
use url::Url;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "ixbrl-extract",
    about = "Extract the classic XBRL instance embedded in an inline XBRL document"
)]
struct Opt {
    /// Inline XBRL document (.htm/.xhtml)
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Output file, stdout when omitted
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Indent the output document
    #[structopt(long)]
    indent: bool,

    /// Treat the input as a classic instance and print the hydrated model as JSON
    #[structopt(long)]
    hydrate: bool,

    /// Filing URL the schema refs are relative to; fetches each referenced
    /// schema and its imports into the taxonomy dir
    #[structopt(long, parse(try_from_str = Url::parse))]
    discover: Option<Url>,
}

/// Fetches the schemas named by `hrefs` and everything they import.
async fn discover_schemas(config: &Config, base: &Url, hrefs: &[String]) -> Result<()> {
    let discovery = config.discovery(Arc::new(TaxonomyCache::new()));
    for href in hrefs {
        let url = base.join(href)?;
        let schema = match discovery.discover(url.as_str()).await {
            Ok(schema) => schema,
            Err(e) => {
                log::warn!("Failed to discover {}: {}", url, e);
                continue;
            }
        };
        let imports = discovery.discover_imports(&url, &schema).await?;
        log::info!("Discovered {} with {} imports", url, imports.len());
    }
    log::info!(
        "Taxonomy cache holds {} files under {:?}",
        discovery.cache().len(),
        config.taxonomy_dir
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let opt = Opt::from_args();
    let config = Config::from_env()?;

    if !opt.input.exists() {
        eprintln!("Input file does not exist: {:?}", opt.input);
        std::process::exit(1);
    }

    let raw = std::fs::read(&opt.input)
        .with_context(|| format!("Failed to read {:?}", opt.input))?;

    let bytes = if opt.hydrate {
        let file_name = opt
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let instance = hydrate_bytes(&raw, &file_name)?;
        if let Some(base) = &opt.discover {
            let file = ixbrl_classic::decode_instance_file(&raw)?;
            let hrefs: Vec<String> = file.schema_hrefs().into_iter().map(str::to_string).collect();
            discover_schemas(&config, base, &hrefs).await?;
        }
        log::info!(
            "Hydrated {} contexts, {} units, {} facts",
            instance.contexts.len(),
            instance.units.len(),
            instance.facts.len()
        );
        serde_json::to_vec_pretty(&instance)?
    } else {
        let mut options = config.convert_options();
        options.indent |= opt.indent;

        let text = ixbrl_classic::source::decode_utf8(&raw)?;
        let doc = ixbrl_classic::source::parse_document(text)?;
        let document = Document::decode(&doc)?;
        if let Some(base) = &opt.discover {
            let hrefs: Vec<String> = document
                .schema_refs
                .iter()
                .filter_map(|n| find_node_attr_non_empty(*n, "href"))
                .map(str::to_string)
                .collect();
            discover_schemas(&config, base, &hrefs).await?;
        }
        log::info!(
            "Found {} numeric and {} non-numeric facts, {} contexts, {} units",
            document.non_fractions.len(),
            document.non_numerics.len(),
            document.contexts.len(),
            document.units.len()
        );
        document.convert(&options)?
    };

    match opt.output {
        Some(path) => {
            std::fs::write(&path, &bytes).with_context(|| format!("Failed to write {:?}", path))?;
            log::info!("Wrote {} bytes to {:?}", bytes.len(), path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
