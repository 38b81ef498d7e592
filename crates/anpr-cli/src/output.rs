//! Output formatting module

use anpr_infra::assets::{AssetPaths, StageReport};
use anpr_types::{AlprResults, OutputFormat, Result};
use chrono::DateTime;

pub fn output_results(output_format: OutputFormat, results: &AlprResults) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(results)?;
        println!("{}", content);
        return Ok(());
    }

    // Table format
    println!("\nRecognition Result");
    println!("==================");
    if let Some(captured) = DateTime::from_timestamp_millis(results.epoch_time as i64) {
        println!("Captured:        {}", captured.format("%Y-%m-%d %H:%M:%S%.3f UTC"));
    }
    println!("Image size:      {}x{}", results.img_width, results.img_height);
    println!("Processing time: {:.1} ms", results.total_processing_time_ms);
    for roi in &results.regions_of_interest {
        println!("Region:          {}", roi);
    }
    println!("Plates found:    {}", results.plates.len());

    for plate in &results.plates {
        println!(
            "\n#{} {} ({:.1}%){}",
            plate.plate_index,
            plate.best_plate.characters,
            plate.best_plate.overall_confidence,
            if plate.best_plate.matches_template {
                " [template]"
            } else {
                ""
            }
        );
        if !plate.region.is_empty() {
            println!("  Region:     {} ({:.0}%)", plate.region, plate.region_confidence);
        }
        for (rank, candidate) in plate.top_n_plates.iter().enumerate().skip(1) {
            println!(
                "  {:>2}. {:<12} {:.1}%",
                rank + 1,
                candidate.characters,
                candidate.overall_confidence
            );
        }
    }

    Ok(())
}

pub fn output_stage_report(report: &StageReport, paths: &AssetPaths) {
    println!("{}", report.display());
    println!();
    println!("Config file:     {}", paths.config_file.display());
    println!("Runtime data:    {}", paths.runtime_dir.display());
    println!("Fallback image:  {}", paths.fallback_image.display());
}
