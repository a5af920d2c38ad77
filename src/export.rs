use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::ExportArgs;
use crate::config::ContentConfig;
use crate::docs::DocsService;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub exported: Vec<String>,
    pub skipped: Vec<String>,
}

pub async fn run(config: &ContentConfig, args: ExportArgs) -> anyhow::Result<()> {
    let service = DocsService::new(config.build_source().context("build content source")?);
    let summary = export_site(&service, Path::new(&args.out), args.force).await?;

    println!(
        "exported {} docs to {}",
        summary.exported.len(),
        args.out
    );
    for slug in &summary.skipped {
        println!("skipped (not found): {slug}");
    }
    Ok(())
}

/// Writes every manifest doc as `docs/{slug}.html` and `docs/{slug}.json`,
/// plus `toc.json` and `paths.json`, under `out`.
pub async fn export_site(
    service: &DocsService,
    out: &Path,
    force: bool,
) -> anyhow::Result<ExportSummary> {
    if out.exists() && !force {
        anyhow::bail!("export output already exists: {}", out.display());
    }

    let toc = service
        .table_of_contents()
        .await
        .context("build table of contents")?;
    let paths = service.static_doc_paths().await.context("collect doc paths")?;

    std::fs::create_dir_all(out.join("docs"))
        .with_context(|| format!("create export output dir: {}", out.display()))?;

    let mut summary = ExportSummary::default();
    for path in &paths {
        let slug = path.document.as_str();
        let Some(doc) = service
            .get_doc_by_slug(slug)
            .await
            .with_context(|| format!("export doc {slug}"))?
        else {
            tracing::warn!(slug, "manifest doc not found; skipping");
            summary.skipped.push(slug.to_owned());
            continue;
        };

        let base = doc_base_path(out, &path.segments);
        if let Some(parent) = base.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        write_file(&base.with_extension("html"), doc.content.as_bytes(), force)?;
        let json = serde_json::to_vec_pretty(&doc).context("serialize document")?;
        write_file(&base.with_extension("json"), &json, force)?;

        tracing::info!(slug, "exported doc");
        summary.exported.push(slug.to_owned());
    }

    let toc_json = serde_json::to_vec_pretty(&toc).context("serialize toc")?;
    write_file(&out.join("toc.json"), &toc_json, force)?;
    let paths_json = serde_json::to_vec_pretty(&paths).context("serialize doc paths")?;
    write_file(&out.join("paths.json"), &paths_json, force)?;

    Ok(summary)
}

fn doc_base_path(out: &Path, segments: &[String]) -> PathBuf {
    let mut path = out.join("docs");
    for segment in segments {
        path.push(segment);
    }
    path
}

fn write_file(path: &Path, contents: &[u8], force: bool) -> anyhow::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("open output: {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("write output: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush output: {}", path.display()))?;
    Ok(())
}
