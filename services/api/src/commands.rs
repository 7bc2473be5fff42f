use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use sri_toolkit::config::AppConfig;
use sri_toolkit::error::AppError;
use sri_toolkit::reference::ReferenceCatalog;
use sri_toolkit::scoring::{
    BuildingConfiguration, SriCalculator, SriReport, UpgradeExplorer, UpgradeOutcome,
};

use crate::infra::load_catalog;

#[derive(Args, Debug, Default)]
pub(crate) struct ReferenceArgs {
    /// Directory holding levels.csv, domain_weights.csv and services.csv.
    /// Falls back to SRI_REFERENCE_DIR, then to the bundled sample.
    #[arg(long)]
    pub(crate) reference_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file with building_type, zone, domains and levels
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct UpgradeArgs {
    /// JSON file with building_type, zone, domains and levels
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Total SRI the upgrades must reach
    #[arg(long)]
    pub(crate) target: f64,
    /// Maximum number of single-level upgrades to try (defaults to SRI_UPGRADE_MAX_DEPTH)
    #[arg(long)]
    pub(crate) max_depth: Option<usize>,
    /// Print the outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let calculator = calculator(&config, args.reference)?;
    let building = read_configuration(&args.input)?;

    let report = calculator.calculate(&building)?;
    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        render_report(&building, &report);
    }
    Ok(())
}

pub(crate) fn run_upgrade(args: UpgradeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let max_depth = args.max_depth.unwrap_or(config.upgrade.max_depth);
    let calculator = calculator(&config, args.reference)?;
    let building = read_configuration(&args.input)?;

    let outcome = UpgradeExplorer::new(calculator)
        .with_max_depth(max_depth)
        .find_upgrade(&building, args.target)?;
    if args.json {
        println!("{}", to_json(&outcome)?);
    } else {
        render_outcome(&outcome);
    }
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let dir = args.reference.reference_dir.or(config.reference.data_dir);
    let catalog = load_catalog(dir.as_deref())?;

    println!("Reference catalog ({} level rows)", catalog.level_count());
    for domain in catalog.summary() {
        println!("\n{} ({} weight rows)", domain.domain, domain.weight_rows);
        for service in domain.services {
            println!(
                "  {:<8} levels 0-{}  {}",
                service.code, service.max_level, service.description
            );
        }
    }
    Ok(())
}

fn calculator(
    config: &AppConfig,
    reference: ReferenceArgs,
) -> Result<SriCalculator<ReferenceCatalog>, AppError> {
    let dir = reference
        .reference_dir
        .or_else(|| config.reference.data_dir.clone());
    let catalog = load_catalog(dir.as_deref())?;
    Ok(SriCalculator::new(Arc::new(catalog)))
}

pub(crate) fn read_configuration(path: &Path) -> Result<BuildingConfiguration, AppError> {
    let raw = fs::read_to_string(path)?;
    let building = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    Ok(building)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value).map_err(std::io::Error::from)?)
}

fn render_report(building: &BuildingConfiguration, report: &SriReport) {
    println!(
        "Smart Readiness Indicator: {} / {}",
        building.building_type, building.zone
    );
    println!("Total SRI: {:.2}%", report.total_sri);

    println!("\nKey functionalities");
    for (functionality, score) in &report.srf_scores {
        println!("  {:<34} {:>6.2}", functionality.label(), score);
    }

    println!("\nImpact criteria");
    for (criterion, score) in &report.sr_impact_criteria {
        println!("  {:<38} {:>6.2}", criterion.label(), score);
    }

    if report.sr_domains.is_empty() {
        println!("\nDomains: none selected");
    } else {
        println!("\nDomains");
        for (domain, score) in &report.sr_domains {
            println!("  {:<28} {:>6.2}", domain, score);
        }
    }
}

fn render_outcome(outcome: &UpgradeOutcome) {
    match outcome {
        UpgradeOutcome::Found(plan) => {
            println!(
                "Upgrade found: {:.2} -> {:.2} in {} step(s)",
                plan.original_score,
                plan.new_score,
                plan.steps.len()
            );
            for step in &plan.steps {
                println!(
                    "  {:<8} level {} -> {}  (total {:.2})",
                    step.service, step.from_level, step.to_level, step.total_sri
                );
            }
            println!("\nIndividual increases");
            for (service, increase) in &plan.individual_increases {
                println!("  {:<8} {:>+6.2}", service, increase);
            }
        }
        UpgradeOutcome::NotFound {
            current_score,
            target_score,
            steps_explored,
        } => {
            println!(
                "No upgrades found: {current_score:.2} cannot reach {target_score:.2} \
                 ({steps_explored} step(s) explored)"
            );
        }
    }
}
