use anyhow::Context;

use vendcrawl_core::AppConfig;
use vendcrawl_export::{write_menu_csv, write_summary_csv};
use vendcrawl_progress::ProgressStore;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = ProgressStore::new(&config.data_dir)?;
    let accumulator = store.load();

    if accumulator.collected.is_empty() {
        println!("no collected records to export");
        return Ok(());
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("creating output directory {}", config.output_dir.display())
    })?;
    for (region, records) in &accumulator.collected {
        let summary = write_summary_csv(&config.output_dir, region, records)?;
        let menu = write_menu_csv(&config.output_dir, region, records)?;
        println!(
            "{region}: {} records -> {}, {}",
            records.len(),
            summary.display(),
            menu.display()
        );
    }
    Ok(())
}
