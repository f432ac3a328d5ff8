use vendcrawl_core::{load_regions, AppConfig};
use vendcrawl_progress::ProgressStore;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let regions = load_regions(&config.regions_path)?;
    let store = ProgressStore::new(&config.data_dir)?;
    let accumulator = store.load();
    let progress = &accumulator.progress;

    for region in &regions.regions {
        let state = if progress.is_region_completed(&region.slug) {
            "completed".to_string()
        } else if progress.cursor.region.as_deref() == Some(region.slug.as_str()) {
            let cursor = &progress.cursor;
            if cursor.total_pages == 0 {
                "determining page count".to_string()
            } else if cursor.all_pages_completed() {
                "finalizing".to_string()
            } else {
                format!(
                    "in progress (page {}/{}, entity {}/{})",
                    cursor.page, cursor.total_pages, cursor.entity_ordinal, cursor.total_entities
                )
            }
        } else {
            "not started".to_string()
        };
        println!(
            "{:<24} {:>5} records  {state}",
            region.slug,
            accumulator.records_for(&region.slug).len()
        );
    }

    if let Some(last_updated) = progress.last_updated {
        println!("last checkpoint: {last_updated}");
    }
    Ok(())
}
