use super::{CategoricalColumn, EncodedFrame, NUMERIC_COLUMNS};
use crate::models::CarAttributes;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of an encoded feature column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Numeric,
    Indicator {
        column: CategoricalColumn,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FeatureKind,
}

/// Sorted distinct values of one categorical column; the first is the reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub column: CategoricalColumn,
    values: Vec<String>,
}

impl CategoryVocabulary {
    pub fn new(column: CategoricalColumn, mut values: Vec<String>) -> Self {
        values.sort();
        values.dedup();
        Self { column, values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn reference(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values
            .binary_search_by(|v| v.as_str().cmp(value))
            .is_ok()
    }

    /// Values that get an indicator column
    pub fn indicator_values(&self) -> &[String] {
        self.values.get(1..).unwrap_or(&[])
    }
}

/// Ordered feature columns a model was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
    vocabularies: Vec<CategoryVocabulary>,
}

impl FeatureSchema {
    /// Numeric block followed by one indicator block per vocabulary
    pub fn from_vocabularies(vocabularies: Vec<CategoryVocabulary>) -> Self {
        let mut columns: Vec<FeatureColumn> = NUMERIC_COLUMNS
            .iter()
            .map(|name| FeatureColumn {
                name: name.to_string(),
                kind: FeatureKind::Numeric,
            })
            .collect();

        for vocab in &vocabularies {
            for value in vocab.indicator_values() {
                columns.push(FeatureColumn {
                    name: vocab.column.indicator_name(value),
                    kind: FeatureKind::Indicator {
                        column: vocab.column,
                        value: value.clone(),
                    },
                });
            }
        }

        Self {
            columns,
            vocabularies,
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn indicator_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| matches!(c.kind, FeatureKind::Indicator { .. }))
            .count()
    }

    pub fn vocabulary(&self, column: CategoricalColumn) -> Option<&CategoryVocabulary> {
        self.vocabularies.iter().find(|v| v.column == column)
    }

    /// Categorical values of `attributes` that the training data never contained
    pub fn unseen_categories(&self, attributes: &CarAttributes) -> Vec<(CategoricalColumn, String)> {
        self.vocabularies
            .iter()
            .filter_map(|vocab| {
                let value = vocab.column.value_of(attributes);
                (!vocab.contains(value)).then(|| (vocab.column, value.to_string()))
            })
            .collect()
    }

    /// Encode one listing, looking each category up in the training vocabulary.
    ///
    /// Only the row's own non-reference categories produce indicator
    /// columns; pass the result through [`reconcile`] to obtain the full
    /// schema width.
    pub fn encode_row(&self, attributes: &CarAttributes) -> EncodedFrame {
        let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut values: Vec<f64> = attributes.numeric_values().to_vec();

        for vocab in &self.vocabularies {
            let value = vocab.column.value_of(attributes);
            if vocab.contains(value) && vocab.reference() != Some(value) {
                columns.push(vocab.column.indicator_name(value));
                values.push(1.0);
            }
        }

        let width = columns.len();
        EncodedFrame {
            columns,
            values: Array2::from_shape_vec((1, width), values)
                .unwrap_or_else(|_| Array2::zeros((1, width))),
        }
    }
}

/// Result of aligning a frame with a schema
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub frame: EncodedFrame,
    /// Schema columns the input lacked, filled with zero
    pub added: Vec<String>,
    /// Input columns unknown to the schema, discarded
    pub dropped: Vec<String>,
}

/// Re-express `frame` with exactly the schema's columns, in schema order.
///
/// Columns the schema expects but the frame lacks are added as zeros;
/// columns the schema does not know are dropped.
pub fn reconcile(frame: &EncodedFrame, schema: &FeatureSchema) -> Reconciled {
    let present: HashMap<&str, usize> = frame
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut values = Array2::<f64>::zeros((frame.n_rows(), schema.len()));
    let mut added = Vec::new();

    for (j, name) in schema.names().enumerate() {
        match present.get(name) {
            Some(&src) => values.column_mut(j).assign(&frame.values().column(src)),
            None => added.push(name.to_string()),
        }
    }

    let dropped = frame
        .columns()
        .iter()
        .filter(|c| !schema.names().any(|n| n == c.as_str()))
        .cloned()
        .collect();

    Reconciled {
        frame: EncodedFrame {
            columns: schema.names().map(str::to_string).collect(),
            values,
        },
        added,
        dropped,
    }
}
