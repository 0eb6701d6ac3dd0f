use std::time::Instant;

use anyhow::{Context, Result};
use deid_core::{Dataset, Lattice, SearchSettings, anonymize};
use deid_ingest::{HierarchyConfig, into_dataset, load_config, read_table, write_table};
use tracing::{Level, debug, info, info_span, trace};

use deid_cli::logging::redact_value;

use crate::cli::{AnonymizeArgs, LatticeArgs, SearchArgs};
use crate::progress::SearchProgress;
use crate::types::{AnonymizeResult, ColumnSummary, LatticeResult};

/// Loaded input ready for a search.
struct Prepared {
    headers: Vec<String>,
    dataset: Dataset,
    settings: SearchSettings,
}

pub fn run_anonymize(args: &AnonymizeArgs) -> Result<AnonymizeResult> {
    let input = &args.search.input;
    let run_span = info_span!("anonymize", input = %input.display());
    let _run_guard = run_span.enter();

    // =========================================================================
    // Stage 1: Load - read the table and build generalizers
    // =========================================================================
    let Prepared {
        headers,
        dataset,
        settings,
    } = prepare(&args.search)?;

    // =========================================================================
    // Stage 2: Search - tag the lattice and pick the lowest-loss node
    // =========================================================================
    let search_start = Instant::now();
    let mut progress = SearchProgress::new(args.search.no_progress);
    let outcome = info_span!("search", k = settings.k)
        .in_scope(|| anonymize(&dataset, &settings, &mut progress));
    progress.finish();
    let outcome = outcome.with_context(|| format!("search {}", input.display()))?;
    info!(
        node = %outcome.node,
        evaluations = outcome.stats.evaluations,
        duration_ms = search_start.elapsed().as_millis(),
        "search complete"
    );

    // =========================================================================
    // Stage 3: Release - generalize rows and write the output
    // =========================================================================
    let release = dataset
        .anonymize(&outcome.node, settings.k, args.keep_suppressed)
        .context("generalize rows")?;
    if tracing::enabled!(Level::TRACE) {
        for row in release.rows.iter().take(5) {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            trace!(row = %redact_value(&cells.join(", ")), "released row");
        }
    }
    let output = if args.dry_run {
        info!("dry run, skipping output");
        None
    } else {
        write_table(&args.output, &headers, &release.rows)
            .with_context(|| format!("write {}", args.output.display()))?;
        info!(
            output = %args.output.display(),
            rows = release.rows.len(),
            "wrote anonymized table"
        );
        Some(args.output.clone())
    };

    let columns = dataset
        .attributes()
        .iter()
        .enumerate()
        .map(|(index, attribute)| ColumnSummary {
            name: attribute.name.clone(),
            generalizer: attribute.generalizer.kind(),
            level: outcome.node[index],
            top_level: attribute.generalizer.top_level(),
        })
        .collect();

    Ok(AnonymizeResult {
        input: input.clone(),
        output,
        settings,
        node: outcome.node,
        columns,
        total_rows: release.total_rows,
        released_rows: release.rows.len(),
        suppressed_rows: release.suppressed_rows,
        equivalence_classes: release.equivalence_classes,
        suppression_rate: release.suppression_rate(),
        stats: outcome.stats,
    })
}

pub fn run_lattice(args: &LatticeArgs) -> Result<LatticeResult> {
    let input = &args.search.input;
    let run_span = info_span!("lattice", input = %input.display());
    let _run_guard = run_span.enter();

    let Prepared {
        headers,
        dataset,
        settings,
    } = prepare(&args.search)?;
    if dataset.is_empty() {
        anyhow::bail!("{} has no rows", input.display());
    }

    let mut lattice = Lattice::new(dataset.max_node()).with_propagation(settings.propagation);
    let mut progress = SearchProgress::new(args.search.no_progress);
    let stats = lattice.search(&dataset, &settings, &dataset.min_node(), &mut progress);
    progress.finish();
    let stats = stats.with_context(|| format!("search {}", input.display()))?;
    let selected = lattice.select_lowest_loss();
    debug!(
        tagged = stats.nodes_tagged,
        total = stats.nodes_total,
        selected = ?selected.as_ref().map(ToString::to_string),
        "lattice tagged"
    );

    Ok(LatticeResult {
        headers,
        settings,
        lattice,
        selected,
        stats,
        max_level: args.max_level,
    })
}

/// Loads the table and hierarchy file, then resolves search settings with
/// flag > file > default precedence.
fn prepare(args: &SearchArgs) -> Result<Prepared> {
    let load_span = info_span!("load", input = %args.input.display());
    let _load_guard = load_span.enter();
    let load_start = Instant::now();

    let mut config = match &args.hierarchy {
        Some(path) => {
            load_config(path).with_context(|| format!("load hierarchy {}", path.display()))?
        }
        None => HierarchyConfig::default(),
    };
    if let Some(levels) = args.interval_levels {
        config.interval_levels = levels;
    }
    let settings = resolve_settings(args, &config);
    settings.validate().context("search settings")?;

    let table =
        read_table(&args.input).with_context(|| format!("read {}", args.input.display()))?;
    let (headers, dataset) = into_dataset(table, &config)
        .with_context(|| format!("build generalizers for {}", args.input.display()))?;
    info!(
        rows = dataset.len(),
        columns = headers.len(),
        duration_ms = load_start.elapsed().as_millis(),
        "loaded table"
    );
    Ok(Prepared {
        headers,
        dataset,
        settings,
    })
}

fn resolve_settings(args: &SearchArgs, config: &HierarchyConfig) -> SearchSettings {
    let mut settings = config.search.unwrap_or_default();
    if let Some(k) = args.k {
        settings.k = k;
    }
    if let Some(rate) = args.max_suppression {
        settings.max_suppression_rate = rate;
    }
    if let Some(propagation) = args.propagation {
        settings.propagation = propagation.into();
    }
    settings
}
