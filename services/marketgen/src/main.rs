use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use marketgen_core::GeneratorConfig;
use marketgen_generator::{verify_output, GenerationPipeline, GenerationSummary};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { settings } => {
            let config = settings.resolve()?;
            run_generate(config)
        }
        Commands::Verify { settings } => {
            let config = settings.resolve()?;
            run_verify(&config)
        }
    }
}

fn run_generate(config: GeneratorConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n--- Starting Product Generation ---");
    println!(
        "Total products to generate: {} ({} files x {} each)",
        config.total_products(),
        config.split_parts,
        config.products_per_file
    );
    println!("Using {} worker threads...", config.worker_count());

    let pb = ProgressBar::new(config.total_products());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, eta {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let result = GenerationPipeline::new(config).run(&pb);
    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            if summary.report.excluded.is_empty() {
                Ok(())
            } else {
                Err(format!(
                    "{} partition(s) failed; catalog counts exclude partitions {:?}",
                    summary.report.excluded.len(),
                    summary.report.excluded
                )
                .into())
            }
        }
        Err(e) => {
            eprintln!("\n❌ Generation failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(summary: &GenerationSummary) {
    println!("\n--- Generation Complete ---");
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(tally) => println!(
                "File {} saved to: {} ({} products in {:.2}s)",
                outcome.spec.partition,
                outcome.artifact.display(),
                tally.records,
                outcome.elapsed.as_secs_f64()
            ),
            Err(e) => println!(
                "File {} FAILED after {:.2}s: {}",
                outcome.spec.partition,
                outcome.elapsed.as_secs_f64(),
                e
            ),
        }
    }

    println!("\nCategories: {}", summary.categories_path.display());
    println!("Vendors:    {}", summary.vendors_path.display());
    println!("Manifest:   {}", summary.manifest_path.display());
    println!("Base seed:  {}", summary.base_seed);

    let report = &summary.report;
    println!(
        "\nCatalog counts: {} records from partitions {:?}",
        report.records, report.contributing
    );
    if !report.excluded.is_empty() {
        println!(
            "⚠️  Excluded partitions {:?}: their records are missing from catalog counts",
            report.excluded
        );
    }
    if !report.unmatched_category_ids.is_empty() || !report.unmatched_vendor_ids.is_empty() {
        println!(
            "⚠️  Unmatched ids: categories {:?}, vendors {:?}",
            report.unmatched_category_ids, report.unmatched_vendor_ids
        );
    }

    println!(
        "\nTotal execution time: {:.2} seconds ({:.0} products/sec)",
        summary.elapsed.as_secs_f64(),
        summary.throughput()
    );
}

fn run_verify(config: &GeneratorConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Verifying {}...", config.output_dir.display());
    info!(split_parts = config.split_parts, "Starting verification");

    let report = verify_output(config)?;

    if report.is_valid() {
        println!("✅ Output is valid!");
        println!("  Partitions: {:?}", report.partitions_checked);
        println!("  Records: {}", report.records);
        Ok(())
    } else {
        println!("❌ Verification failed!");
        for error in &report.errors {
            println!("  - {}", error);
        }
        Err(format!("{} verification error(s)", report.errors.len()).into())
    }
}

/// Initialize logging
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();
}
