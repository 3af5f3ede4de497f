use super::schema::{CategoryVocabulary, FeatureSchema};
use super::{CategoricalColumn, EncodedFrame, NUMERIC_COLUMNS};
use crate::models::CarAttributes;
use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};

/// One-hot encoder with a dropped reference category per column
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    categorical: Vec<CategoricalColumn>,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new(CategoricalColumn::ALL.to_vec())
    }
}

impl OneHotEncoder {
    pub fn new(categorical: Vec<CategoricalColumn>) -> Self {
        Self { categorical }
    }

    /// Encode `rows`, deriving the indicator columns from the values
    /// observed in this call.
    ///
    /// Distinct values are sorted and the first one is the reference
    /// category, which gets no column. The returned schema describes the
    /// frame's columns exactly and can be stored alongside a model.
    pub fn encode(&self, rows: &[CarAttributes]) -> (EncodedFrame, FeatureSchema) {
        let vocabularies: Vec<CategoryVocabulary> = self
            .categorical
            .iter()
            .map(|&column| {
                let values: BTreeSet<&str> = rows.iter().map(|r| column.value_of(r)).collect();
                CategoryVocabulary::new(column, values.into_iter().map(str::to_string).collect())
            })
            .collect();
        let schema = FeatureSchema::from_vocabularies(vocabularies);

        let index: HashMap<&str, usize> = schema
            .names()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();

        let mut values = Array2::<f64>::zeros((rows.len(), schema.len()));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.numeric_values().into_iter().enumerate() {
                values[[i, j]] = v;
            }
            for &column in &self.categorical {
                let name = column.indicator_name(column.value_of(row));
                // The reference category has no column
                if let Some(&j) = index.get(name.as_str()) {
                    values[[i, j]] = 1.0;
                }
            }
        }

        let columns = schema.names().map(str::to_string).collect();
        let frame = EncodedFrame { columns, values };
        debug_assert_eq!(frame.n_cols(), NUMERIC_COLUMNS.len() + schema.indicator_count());
        (frame, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, Gearbox};

    fn car(brand: &str, model: &str, mileage: f64) -> CarAttributes {
        CarAttributes {
            brand: brand.to_string(),
            model: model.to_string(),
            year: 2018,
            horsepower: 90.0,
            f_horsepower: 5.0,
            mileage,
            nb_doors: 5,
            nb_seats: 5,
            gearbox: Gearbox::Manual,
            fuel_type: FuelType::Diesel,
        }
    }

    #[test]
    fn test_column_count_drops_one_reference_per_column() {
        let rows = vec![
            car("Renault", "Clio", 50_000.0),
            car("Renault", "Megane", 60_000.0),
            car("Peugeot", "208", 30_000.0),
            car("Citroen", "C3", 40_000.0),
        ];
        let (frame, _) = OneHotEncoder::default().encode(&rows);

        assert_eq!(frame.n_rows(), 4);
        // 8 numeric + (3 brands - 1) + (4 models - 1)
        assert_eq!(frame.n_cols(), 8 + 2 + 3);
    }

    #[test]
    fn test_reference_is_first_sorted_value() {
        let rows = vec![car("Renault", "Clio", 1.0), car("Peugeot", "208", 2.0)];
        let (frame, schema) = OneHotEncoder::default().encode(&rows);

        let brand_vocab = schema.vocabulary(CategoricalColumn::Brand).unwrap();
        assert_eq!(brand_vocab.reference(), Some("Peugeot"));
        assert!(frame.column_index("brand_Peugeot").is_none());

        let renault = frame.column_index("brand_Renault").unwrap();
        assert_eq!(frame.values()[[0, renault]], 1.0);
        assert_eq!(frame.values()[[1, renault]], 0.0);
    }

    #[test]
    fn test_numeric_block_comes_first() {
        let rows = vec![car("Renault", "Clio", 50_000.0)];
        let (frame, _) = OneHotEncoder::default().encode(&rows);

        assert_eq!(&frame.columns()[..8], &NUMERIC_COLUMNS.map(str::to_string));
        assert_eq!(frame.values()[[0, 3]], 50_000.0);
        assert_eq!(frame.values()[[0, 7]], 2.0);
    }

    #[test]
    fn test_single_row_has_no_indicators() {
        let (frame, schema) = OneHotEncoder::default().encode(&[car("Renault", "Clio", 1.0)]);
        assert_eq!(frame.n_cols(), 8);
        assert_eq!(schema.indicator_count(), 0);
    }
}
