mod app;
mod domain;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::SimulationConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Snapshot JSON with entities, relationships and links.
    #[arg(long, default_value = "demos/realm.json")]
    snapshot: PathBuf,

    /// Rest length of every edge spring, in simulation units.
    #[arg(long, default_value_t = 120.0)]
    link_distance: f32,

    /// Node charge; negative values repel.
    #[arg(long, default_value_t = -300.0, allow_negative_numbers = true)]
    charge: f32,

    /// Collision radius around each node.
    #[arg(long, default_value_t = 30.0)]
    collision_radius: f32,

    /// Entity id to select on startup.
    #[arg(long)]
    selected: Option<String>,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            link_distance: self.link_distance,
            charge: self.charge,
            collision_radius: self.collision_radius,
            ..SimulationConfig::default()
        }
        .sanitized()
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.simulation_config();
    tracing::debug!(?config, snapshot = %args.snapshot.display(), "starting");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Constellation",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ConstellationApp::new(
                cc,
                args.snapshot.clone(),
                config,
                args.selected.clone(),
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_feed_the_simulation_config() {
        let args = Args::try_parse_from([
            "constellation",
            "--link-distance",
            "80",
            "--charge",
            "-150",
            "--selected",
            "aria",
        ])
        .unwrap();

        let config = args.simulation_config();
        assert_eq!(config.link_distance, 80.0);
        assert_eq!(config.charge, -150.0);
        assert_eq!(config.collision_radius, 30.0);
        assert_eq!(args.selected.as_deref(), Some("aria"));
        assert_eq!(args.snapshot, PathBuf::from("demos/realm.json"));
    }

    #[test]
    fn positive_charge_is_forced_to_repel() {
        let args = Args::try_parse_from(["constellation", "--charge", "200"]).unwrap();
        assert_eq!(args.simulation_config().charge, -200.0);
    }
}
