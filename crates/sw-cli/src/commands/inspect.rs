use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use sw_core::{RegionContent, TileObject, WorldSnapshot};

/// Tile counts by object tag, in `TileObject` declaration order.
#[derive(Debug, Default, Clone, Copy)]
struct TileCounts {
    floor: usize,
    wall: usize,
    rubble: usize,
    water: usize,
}

impl TileCounts {
    fn of(region: &RegionContent) -> Self {
        let mut counts = Self::default();
        for tile in region.tiles.values() {
            match tile.object {
                TileObject::Floor => counts.floor += 1,
                TileObject::Wall => counts.wall += 1,
                TileObject::Rubble => counts.rubble += 1,
                TileObject::Water => counts.water += 1,
            }
        }
        counts
    }

    fn add(&mut self, other: Self) {
        self.floor += other.floor;
        self.wall += other.wall;
        self.rubble += other.rubble;
        self.water += other.water;
    }
}

/// Print a summary of the snapshot at `path`.
pub fn run(path: &Path, list_regions: bool, json: bool) -> Result<(), String> {
    let snapshot = WorldSnapshot::load(path)
        .map_err(|e| format!("cannot read snapshot {}: {e}", path.display()))?;

    let mut totals = TileCounts::default();
    for (_, region) in &snapshot.regions {
        totals.add(TileCounts::of(region));
    }

    if json {
        let summary = serde_json::json!({
            "path": path.display().to_string(),
            "schema_version": snapshot.schema_version,
            "tick": snapshot.tick,
            "saved_at": snapshot.saved_at.to_rfc3339(),
            "regions": snapshot.region_count(),
            "tiles": {
                "total": snapshot.tile_count(),
                "floor": totals.floor,
                "wall": totals.wall,
                "rubble": totals.rubble,
                "water": totals.water,
            },
            "occupants": snapshot.occupant_count(),
        });
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("cannot render summary: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    println!(
        "  {} {}",
        "Snapshot".bold(),
        format!("({})", path.display()).dimmed()
    );
    println!(
        "  Tick {} saved at {}",
        snapshot.tick,
        snapshot.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Regions".to_string(), snapshot.region_count().to_string()]);
    table.add_row(vec!["Tiles".to_string(), snapshot.tile_count().to_string()]);
    table.add_row(vec!["Floor".to_string(), totals.floor.to_string()]);
    table.add_row(vec!["Wall".to_string(), totals.wall.to_string()]);
    table.add_row(vec!["Rubble".to_string(), totals.rubble.to_string()]);
    table.add_row(vec!["Water".to_string(), totals.water.to_string()]);
    table.add_row(vec![
        "Occupants".to_string(),
        snapshot.occupant_count().to_string(),
    ]);
    println!("{table}");

    if list_regions {
        println!();
        println!("  {}", "Regions".bold().underline());
        println!();

        let mut regions = Table::new();
        regions.set_content_arrangement(ContentArrangement::Dynamic);
        regions.set_header(vec!["Region", "Tiles", "Walkable", "Occupants"]);
        for (coord, region) in &snapshot.regions {
            regions.add_row(vec![
                coord.to_string(),
                region.tiles.len().to_string(),
                region.walkable_tiles().len().to_string(),
                region.occupants.len().to_string(),
            ]);
        }
        if snapshot.regions.is_empty() {
            println!("  {}", "(no regions)".dimmed());
        } else {
            println!("{regions}");
        }
    }

    Ok(())
}
