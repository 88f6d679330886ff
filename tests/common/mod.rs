#![allow(dead_code)]

use std::io::Error;
use std::path::Path;

pub const FARM_NEAR: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";
pub const FARM_FAR: &str = "5b1d3a9e-2c4f-4e8a-9b7d-6f0e1c2a3b4d";
pub const FARMER: &str = "0b6a1d2e-6f47-4c36-9d6b-0f1c6f0a2b11";

/// Two farms: one 30 km from the factory, one 80 km away.
pub fn write_farms_csv(path: &Path) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["id", "farmer_id", "name", "distance_to_factory_km"])?;
    wtr.write_record([FARM_NEAR, FARMER, "Fazenda Perto", "30"])?;
    wtr.write_record([FARM_FAR, FARMER, "Fazenda Longe", "80"])?;
    wtr.flush()?;
    Ok(())
}

/// Writes one row per `(farm, date, liters)` entry, leaving ids blank.
pub fn write_productions_csv(path: &Path, rows: &[(&str, &str, &str)]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["id", "farm_id", "date", "volume_liters"])?;
    for &(farm, date, liters) in rows {
        wtr.write_record(["", farm, date, liters])?;
    }
    wtr.flush()?;
    Ok(())
}

/// March 2024 for the near farm (5,000 L) and September 2024 for the far farm
/// (15,000 L), spread over several days.
pub fn write_default_productions_csv(path: &Path) -> Result<(), Error> {
    write_productions_csv(
        path,
        &[
            (FARM_NEAR, "2024-03-01", "2000"),
            (FARM_NEAR, "2024-03-15", "1500"),
            (FARM_NEAR, "2024-03-31", "1500"),
            (FARM_NEAR, "2024-04-01", "700"),
            (FARM_FAR, "2024-09-01", "5000"),
            (FARM_FAR, "2024-09-30T23:00:00Z", "10000"),
        ],
    )
}
