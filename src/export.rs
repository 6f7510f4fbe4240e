//! Data export for analysis in external tools.

use crate::error::Result;
use crate::metrics::{Metrics, ProximityZone};
use crate::world::World;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export system for saving simulation data
pub struct ExportSystem;

impl ExportSystem {
    /// Visit-density heat map: one CSV row per grid row `y`, one column per `x`
    pub fn export_visit_density_csv<P: AsRef<Path>>(
        metrics: &Metrics,
        width: usize,
        height: usize,
        path: P,
    ) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        for row in metrics.density_matrix(width, height) {
            let line: Vec<String> = row.iter().map(u64::to_string).collect();
            writeln!(file, "{}", line.join(","))?;
        }

        file.flush()?;
        Ok(())
    }

    /// Per-tick proximity-zone and collision totals
    pub fn export_intruders_csv<P: AsRef<Path>>(metrics: &Metrics, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        let zones: Vec<&str> = ProximityZone::ALL.iter().map(|z| z.name()).collect();
        writeln!(file, "tick,{},collisions", zones.join(","))?;

        let intimate = metrics.zone_history(ProximityZone::Intimate);
        let personal = metrics.zone_history(ProximityZone::Personal);
        let social = metrics.zone_history(ProximityZone::Social);
        let collisions = metrics.collision_history();

        for tick in 0..metrics.ticks_recorded() {
            writeln!(
                file,
                "{},{},{},{},{}",
                tick + 1,
                intimate.get(tick).copied().unwrap_or(0),
                personal.get(tick).copied().unwrap_or(0),
                social.get(tick).copied().unwrap_or(0),
                collisions[tick],
            )?;
        }

        file.flush()?;
        Ok(())
    }

    /// Export world snapshot to JSON
    pub fn export_snapshot_json<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
        let json = world.snapshot().to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Write every export into `dir`
    pub fn export_all<P: AsRef<Path>>(world: &World, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        Self::export_visit_density_csv(
            &world.metrics,
            world.grid.width(),
            world.grid.height(),
            dir.join("visit_density.csv"),
        )?;
        Self::export_intruders_csv(&world.metrics, dir.join("intruders.csv"))?;
        Self::export_snapshot_json(world, dir.join("snapshot.json"))?;

        world.stats.save_json(dir.join("stats.json"))?;
        world.stats_history.save(dir.join("stats_history.json"))?;

        log::info!("Exported metrics to {:?}", dir);
        Ok(())
    }
}
