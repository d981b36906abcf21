//! Round-management commands: the balancer, imports, and the result
//! export, all working against the shared state file.

use std::collections::HashMap;
use std::sync::Arc;

use awards_review::config::AppConfig;
use awards_review::error::AppError;
use awards_review::workflows::catalog::{EntryImporter, ReviewerId, ReviewerImporter};
use awards_review::workflows::review::report::export::export_directory;
use awards_review::workflows::review::{CatalogRepository, ReviewService, ReviewServiceError};

use crate::cli::{AssignArgs, ExportArgs, ImportEntriesArgs, ImportReviewersArgs};
use crate::infra::MemoryStore;

fn build_service(
    store: &MemoryStore,
) -> Result<ReviewService<MemoryStore, MemoryStore>, AppError> {
    let config = AppConfig::load()?;
    Ok(ReviewService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        config.review,
    ))
}

pub(crate) fn run_assign(args: AssignArgs) -> Result<(), AppError> {
    let store = MemoryStore::load(Some(args.state.as_path()))?;
    let service = build_service(&store)?;

    let run = service.run_assignment(args.reviews, args.commit)?;

    if run.committed {
        println!("===== Committing =====");
    } else {
        println!("===== DRY RUN =====");
    }
    println!(
        "There are {} reviewers in the system and {} entries",
        run.plan.reviewer_count, run.plan.entry_count
    );
    println!(
        "Assigning {} reviews per entry, fair-share cap {} (~{:.1} ballots per reviewer)",
        run.plan.reviews_per_entry,
        run.plan.fair_share_cap,
        run.plan.average_load()
    );

    let names: HashMap<ReviewerId, String> = store
        .reviewers()
        .map_err(ReviewServiceError::from)?
        .into_iter()
        .map(|reviewer| (reviewer.id, reviewer.display_name()))
        .collect();
    for load in &run.plan.reviewer_load {
        let name = names
            .get(&load.reviewer_id)
            .cloned()
            .unwrap_or_else(|| format!("reviewer #{}", load.reviewer_id.0));
        println!("  {name}: {} ballots", load.ballots);
    }

    if run.committed {
        store.save(&args.state)?;
        println!(
            "Wrote {} ballots to {}",
            run.plan.ballots.len(),
            args.state.display()
        );
    }
    Ok(())
}

pub(crate) fn run_import_entries(args: ImportEntriesArgs) -> Result<(), AppError> {
    let store = MemoryStore::load(Some(args.state.as_path()))?;
    let service = build_service(&store)?;

    let batch = EntryImporter::from_path(&args.file)?;
    let categories = batch.categories.len();
    let count = service.replace_catalog(batch)?;

    store.save(&args.state)?;
    println!(
        "Imported {count} entries across {categories} categories into {}",
        args.state.display()
    );
    println!("Existing ballots were cleared; run `assign --commit` to start the round.");
    Ok(())
}

pub(crate) fn run_import_reviewers(args: ImportReviewersArgs) -> Result<(), AppError> {
    let store = MemoryStore::load(Some(args.state.as_path()))?;
    let service = build_service(&store)?;

    let records = ReviewerImporter::from_path(&args.file)?;
    let outcome = service.provision_reviewers(records)?;

    store.save(&args.state)?;
    println!(
        "Provisioned {} reviewer(s), skipped {} already in the pool",
        outcome.created, outcome.skipped
    );
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let store = MemoryStore::load(Some(args.state.as_path()))?;
    let service = build_service(&store)?;

    let sheets = service.export_sheets()?;
    let paths = export_directory(&sheets, &args.out)?;

    for (sheet, path) in sheets.iter().zip(&paths) {
        println!(
            "{}: {} completed rating(s) -> {}",
            sheet.category,
            sheet.rows.len(),
            path.display()
        );
    }
    if sheets.is_empty() {
        println!("No categories in the round state; nothing to export.");
    }
    Ok(())
}
