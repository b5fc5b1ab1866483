use aoimap::{run_aoimap, AoiMapConfig};

fn main() -> eframe::Result<()> {
    run_aoimap(AoiMapConfig::default())
}
