//! Resolve peak names and print the sample grid corners, without any
//! network access.
//!
//! Run with: cargo run --example resolve -- "Shisha Pangma" 5

use peakgrid::{GridConfig, PeakCatalog, PeakGridError, SampleGrid};
use std::env;

fn main() -> Result<(), PeakGridError> {
    let mut args = env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Everest".to_string());
    let size = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let catalog = PeakCatalog::eight_thousanders();
    let peak = catalog.resolve(&name)?;
    println!("{} -> {} ({} m)", name, peak.name, peak.height_m);

    let grid = SampleGrid::around(peak, &GridConfig::default().with_size(size))?;
    let last = grid.size() - 1;

    println!("{:-<50}", "");
    for (label, row, col) in [
        ("South-west", 0, 0),
        ("South-east", 0, last),
        ("North-west", last, 0),
        ("North-east", last, last),
    ] {
        let p = grid.get(row, col);
        println!("{:<12} {:>10.5}, {:>10.5}", label, p.lat, p.lon);
    }

    if size % 2 == 1 {
        let center = grid.get(size / 2, size / 2);
        println!("{:<12} {:>10.5}, {:>10.5}", "Center", center.lat, center.lon);
    }

    Ok(())
}
