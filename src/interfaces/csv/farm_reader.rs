use crate::domain::farm::Farm;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads farms from a CSV source with the header
/// `id, farmer_id, name, distance_to_factory_km`.
pub struct FarmReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> FarmReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn farms(self) -> impl Iterator<Item = Result<Farm>> {
        self.reader.into_deserialize::<Farm>().map(|row| {
            let farm = row.map_err(PaymentError::from)?;
            farm.validate()?;
            Ok(farm)
        })
    }
}
