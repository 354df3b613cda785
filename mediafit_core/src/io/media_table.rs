//! Module for reading experimentally measured media tables from CSV
//!
//! The table has one row per measured nutrient, with the columns
//! `metabolite, concentration_g_l, concentration_mm, reaction_id, lower_bound, upper_bound`.
//! Only the exchange reaction id and the lower bound (the measured uptake) are used to
//! constrain the model, the remaining columns are kept for reporting.
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// A row of the media table as written in the CSV file
#[derive(Debug, Deserialize)]
struct MediaRecord {
    #[serde(default, alias = "Metabolite", alias = "name")]
    metabolite: Option<String>,
    #[serde(default, alias = "g/L")]
    concentration_g_l: Option<f64>,
    #[serde(default, alias = "mM")]
    concentration_mm: Option<f64>,
    #[serde(default, alias = "reaction", alias = "Reaction")]
    reaction_id: Option<String>,
    #[serde(default, alias = "LB", alias = "lb")]
    lower_bound: Option<f64>,
    #[serde(default, alias = "UB", alias = "ub")]
    upper_bound: Option<f64>,
}

/// A measured nutrient of the media table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaEntry {
    /// Name of the measured metabolite
    pub metabolite: Option<String>,
    /// Mass concentration (g/L)
    pub concentration_g_l: Option<f64>,
    /// Molar concentration (mM)
    pub concentration_mm: Option<f64>,
    /// Measured uptake magnitude (mmol/gDW/h), always non-negative
    pub uptake: f64,
}

/// Measured media, keyed by exchange reaction id in the order the rows were read
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MediaTable {
    entries: IndexMap<String, MediaEntry>,
}

/// Media entries split by whether their reaction id is an exchange reaction of a model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchedMedia {
    /// Uptake magnitude for every entry which matches an exchange reaction
    pub uptakes: IndexMap<String, f64>,
    /// Reaction ids that don't match an exchange reaction of the model
    pub unmatched: Vec<String>,
}

impl MediaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table directly from (reaction id, uptake) pairs
    pub fn from_uptakes<I, S>(uptakes: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = MediaTable::new();
        for (id, uptake) in uptakes {
            table.insert(
                id.into(),
                MediaEntry {
                    metabolite: None,
                    concentration_g_l: None,
                    concentration_mm: None,
                    uptake: uptake.abs(),
                },
            );
        }
        table
    }

    /// Read a media table from a CSV file
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<MediaTable, MediaTableError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Read a media table from any CSV source
    pub fn from_reader<R: Read>(source: R) -> Result<MediaTable, MediaTableError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<MediaTable, MediaTableError> {
        let mut table = MediaTable::new();
        for (row, record) in reader.deserialize::<MediaRecord>().enumerate() {
            let record = record?;
            let reaction_id = match record.reaction_id.filter(|id| !id.is_empty()) {
                Some(id) => id,
                None => {
                    warn!(
                        "Media table row {} ({}) has no exchange reaction, skipping",
                        row + 1,
                        record.metabolite.as_deref().unwrap_or("unnamed")
                    );
                    continue;
                }
            };
            let lower_bound = match record.lower_bound {
                Some(lb) if lb.is_finite() => lb,
                _ => {
                    warn!(
                        "Media table row {} ({}) has no measured uptake, skipping",
                        row + 1,
                        reaction_id
                    );
                    continue;
                }
            };
            if let Some(ub) = record.upper_bound {
                log::debug!("Ignoring upper bound {} for {}", ub, reaction_id);
            }
            let entry = MediaEntry {
                metabolite: record.metabolite,
                concentration_g_l: record.concentration_g_l,
                concentration_mm: record.concentration_mm,
                uptake: lower_bound.abs(),
            };
            if table.insert(reaction_id.clone(), entry).is_some() {
                warn!(
                    "{} appears more than once in the media table, keeping the last row",
                    reaction_id
                );
            }
        }
        Ok(table)
    }

    /// Insert an entry, returning the entry it replaced
    pub fn insert(&mut self, reaction_id: String, entry: MediaEntry) -> Option<MediaEntry> {
        self.entries.insert(reaction_id, entry)
    }

    pub fn get(&self, reaction_id: &str) -> Option<&MediaEntry> {
        self.entries.get(reaction_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MediaEntry)> {
        self.entries.iter()
    }

    /// Reaction id to measured uptake magnitude, for every entry
    pub fn uptakes(&self) -> IndexMap<String, f64> {
        self.entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.uptake))
            .collect()
    }

    /// Split the entries into those naming one of `exchange_ids` and those that don't
    pub fn match_against(&self, exchange_ids: &[String]) -> MatchedMedia {
        let mut matched = MatchedMedia::default();
        for (id, entry) in &self.entries {
            if exchange_ids.contains(id) {
                matched.uptakes.insert(id.clone(), entry.uptake);
            } else {
                warn!(
                    "Media reaction {} is not an exchange reaction of the model, ignoring it",
                    id
                );
                matched.unmatched.push(id.clone());
            }
        }
        matched
    }
}

/// Errors raised while reading a media table
#[derive(Error, Debug)]
pub enum MediaTableError {
    /// The CSV could not be read or a row could not be parsed
    #[error("Unable to read media table: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::Model;
    use std::path::PathBuf;

    #[test]
    fn read_csv() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("media")
            .join("toy_media.csv");
        let table = MediaTable::read_csv(path).unwrap();
        // The row without a reaction id is skipped
        assert_eq!(table.len(), 3);
        let glucose = table.get("EX_glc__D_e").unwrap();
        assert_eq!(glucose.metabolite.as_deref(), Some("D-Glucose"));
        assert!((glucose.uptake - 2.).abs() < 1e-25);
        assert_eq!(glucose.concentration_mm, Some(2.0));
        let (first, _) = table.iter().next().unwrap();
        assert_eq!(first, "EX_glc__D_e");
    }

    #[test]
    fn uptake_is_magnitude() {
        let data = "\
metabolite,concentration_g_l,concentration_mm,reaction_id,lower_bound,upper_bound
Glucose,1.0,5.5,EX_glc__D_e,-3.5,1000
Acetate,0.1,1.0,EX_ac_e,0.25,1000
";
        let table = MediaTable::from_reader(data.as_bytes()).unwrap();
        let uptakes = table.uptakes();
        assert!((uptakes["EX_glc__D_e"] - 3.5).abs() < 1e-25);
        assert!((uptakes["EX_ac_e"] - 0.25).abs() < 1e-25);
    }

    #[test]
    fn skips_incomplete_rows() {
        let data = "\
metabolite,concentration_g_l,concentration_mm,reaction_id,lower_bound,upper_bound
Glucose,1.0,5.5,EX_glc__D_e,,1000
Salt,1.0,,,-1,
Acetate,,,EX_ac_e,-1,
";
        let table = MediaTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("EX_ac_e").is_some());
    }

    #[test]
    fn duplicate_keeps_last() {
        let data = "\
metabolite,concentration_g_l,concentration_mm,reaction_id,lower_bound,upper_bound
Glucose,1.0,5.5,EX_glc__D_e,-1,1000
Glucose,1.0,5.5,EX_glc__D_e,-4,1000
";
        let table = MediaTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert!((table.get("EX_glc__D_e").unwrap().uptake - 4.).abs() < 1e-25);
    }

    #[test]
    fn bad_number() {
        let data = "\
metabolite,concentration_g_l,concentration_mm,reaction_id,lower_bound,upper_bound
Glucose,1.0,5.5,EX_glc__D_e,lots,1000
";
        assert!(MediaTable::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn from_uptakes() {
        let table = MediaTable::from_uptakes([("EX_a", -1.5), ("EX_b", 2.)]);
        assert_eq!(table.len(), 2);
        assert!((table.get("EX_a").unwrap().uptake - 1.5).abs() < 1e-25);
        assert!(MediaTable::new().is_empty());
    }

    #[test]
    fn match_against() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("test_models")
            .join("toy_network.json");
        let model = Model::read_json(path).unwrap();
        let table = MediaTable::from_uptakes([
            ("EX_glc__D_e", 2.),
            ("EX_vitX_e", 0.01),
            ("GLCt", 1.),
        ]);
        let matched = table.match_against(&model.exchange_ids());
        assert_eq!(matched.uptakes.len(), 1);
        assert!((matched.uptakes["EX_glc__D_e"] - 2.).abs() < 1e-25);
        assert_eq!(matched.unmatched, vec!["EX_vitX_e", "GLCt"]);
    }
}
