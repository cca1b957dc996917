use anyhow::Result;
use peakgrid::PeakCatalog;
use serde::Serialize;

#[derive(Serialize)]
struct PeakEntry<'a> {
    name: &'a str,
    height_m: u32,
    latitude: f64,
    longitude: f64,
    aliases: Vec<&'a str>,
}

pub fn run(catalog: &PeakCatalog, json: bool) -> Result<()> {
    let mut peaks: Vec<_> = catalog.peaks().iter().collect();
    // Highest first
    peaks.sort_by(|a, b| b.height_m.cmp(&a.height_m));

    if json {
        let entries: Vec<_> = peaks
            .iter()
            .map(|p| PeakEntry {
                name: &p.name,
                height_m: p.height_m,
                latitude: p.latitude,
                longitude: p.longitude,
                aliases: catalog.aliases_of(&p.name).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<16} {:>7} {:>9} {:>9}  ALIASES",
        "PEAK", "HEIGHT", "LAT", "LON"
    );
    println!("{}", "-".repeat(64));

    for peak in &peaks {
        let aliases: Vec<_> = catalog.aliases_of(&peak.name).collect();
        println!(
            "{:<16} {:>5} m {:>9.4} {:>9.4}  {}",
            peak.name,
            peak.height_m,
            peak.latitude,
            peak.longitude,
            aliases.join(", ")
        );
    }

    println!("{}", "-".repeat(64));
    println!("{} peaks", peaks.len());
    Ok(())
}
