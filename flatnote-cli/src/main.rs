//! `flatnote` — export an attribute-tagged block store as a static-site
//! source tree.
//!
//! Reads a block snapshot, flattens every document under the chosen root
//! document into anchored Markdown, writes the `docs/` tree plus the site
//! generator config, and optionally copies the asset files the documents
//! reference. Point a `MkDocs` build at the output directory afterwards.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use flatnote_convert::{Flattener, Options};
use flatnote_store::{Block, SnapshotStore};

mod assets;
mod site;

/// Export a block-store snapshot as static-site sources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Block snapshot file (JSON)
    #[arg(long)]
    snapshot: PathBuf,

    /// Root document of the site, by title or id
    #[arg(long)]
    root: String,

    /// Output directory for the generated site sources
    #[arg(long, default_value = "site")]
    out: PathBuf,

    /// Percentage points added to resized images' container widths
    #[arg(long, default_value_t = 20.0)]
    image_width_adjust: f64,

    /// Directory holding the store's asset files; enables asset copying
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Site name for the generated config (defaults to the root title)
    #[arg(long)]
    site_name: Option<String>,

    /// Copyright line for the generated config
    #[arg(long, default_value = "")]
    copyright: String,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    run(&Args::parse())
}

#[tracing::instrument(skip_all)]
fn run(args: &Args) -> Result<()> {
    let store = SnapshotStore::from_path(&args.snapshot)
        .with_context(|| format!("loading snapshot {}", args.snapshot.display()))?;

    let root: Block = store
        .documents()
        .into_iter()
        .find(|d| d.id == args.root || d.title == args.root)
        .cloned()
        .with_context(|| format!("root document '{}' not found in snapshot", args.root))?;
    tracing::info!(root = %root.title, id = %root.id, "exporting site");

    let subtree_prefix = format!("{}/", root.path);
    let docs: Vec<Block> = store
        .documents()
        .into_iter()
        .filter(|d| d.path == root.path || d.path.starts_with(&subtree_prefix))
        .cloned()
        .collect();

    let options = Options::builder()
        .image_width_adjust(args.image_width_adjust)
        .root_document(root.title.clone())
        .build();

    // Documents are independent of one another: convert them in parallel,
    // one flattener (and one buffer) per document.
    let results: Vec<(Block, Result<String, flatnote_convert::Error>)> = docs
        .par_iter()
        .map(|doc| {
            let flattener = Flattener::new(&store, options.clone());
            (doc.clone(), flattener.flatten_document(doc))
        })
        .collect();

    let docs_dir = args.out.join("docs");
    fs::create_dir_all(&docs_dir)?;

    let mut failed = 0_usize;
    for (doc, result) in &results {
        match result {
            Ok(markdown) => {
                let path = docs_dir.join(site::output_rel_path(&root, doc));
                let doc_dir = path.parent().map(PathBuf::from).unwrap_or_default();
                fs::create_dir_all(&doc_dir)?;
                fs::write(&path, markdown)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(doc = %doc.title, path = %path.display(), "document written");
                if let Some(assets_root) = &args.assets_dir {
                    let copied = assets::copy_referenced(markdown, assets_root, &doc_dir)?;
                    if copied > 0 {
                        tracing::info!(doc = %doc.title, copied, "assets copied");
                    }
                }
            }
            Err(error) => {
                tracing::error!(doc = %doc.title, %error, "conversion failed");
                failed += 1;
            }
        }
    }

    let site_name = args.site_name.as_deref().unwrap_or(&root.title);
    let doc_refs: Vec<&Block> = docs.iter().collect();
    let config = site::render_config(site_name, &args.copyright, &root, &doc_refs)?;
    fs::write(args.out.join("mkdocs.yml"), config)?;

    if failed > 0 {
        bail!("{failed} of {} documents failed to convert", results.len());
    }
    tracing::info!(
        documents = results.len(),
        out = %args.out.display(),
        "site sources generated"
    );
    Ok(())
}
