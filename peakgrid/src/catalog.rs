//! Peak catalog and name resolution.
//!
//! This module holds the built-in table of the fourteen eight-thousanders and
//! resolves free-text peak names against it.
//!
//! # Matching Rules
//!
//! Input is normalized with [`normalize_name`] (trimmed, lowercased, inner
//! whitespace collapsed to single spaces) and compared against:
//!
//! 1. the canonical peak names, then
//! 2. the alias table (alternate spellings and local names).
//!
//! A canonical name always wins over an alias that normalizes to the same
//! string.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{PeakGridError, Result};

/// A named summit with known coordinates and height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakRecord {
    /// Canonical name (e.g., "Kangchenjunga").
    pub name: String,
    /// Summit latitude in decimal degrees.
    pub latitude: f64,
    /// Summit longitude in decimal degrees.
    pub longitude: f64,
    /// Official height in meters.
    pub height_m: u32,
}

impl PeakRecord {
    /// Create a new peak record.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, height_m: u32) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            height_m,
        }
    }
}

/// Errors raised when building a [`PeakCatalog`] from custom tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// Two peaks normalize to the same name.
    #[error("Duplicate peak name: {name}")]
    DuplicatePeak { name: String },

    /// An alias points at a peak that is not in the catalog.
    #[error("Alias '{alias}' refers to unknown peak '{target}'")]
    DanglingAlias { alias: String, target: String },

    /// One alias spelling points at two different peaks.
    #[error("Alias '{alias}' refers to both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    /// Coordinates outside the valid latitude/longitude range.
    #[error("Peak '{name}' has invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { name: String, lat: f64, lon: f64 },
}

/// The fourteen mountains above 8000 m: (name, lat, lon, height).
const EIGHT_THOUSANDERS: [(&str, f64, f64, u32); 14] = [
    ("Everest", 27.9881, 86.9250, 8848),
    ("K2", 35.8814, 76.5133, 8611),
    ("Kangchenjunga", 27.7025, 88.1475, 8586),
    ("Lhotse", 27.9617, 86.9336, 8516),
    ("Makalu", 27.8897, 87.0886, 8485),
    ("Cho Oyu", 28.0944, 86.6608, 8188),
    ("Dhaulagiri", 28.6967, 83.4953, 8167),
    ("Manaslu", 28.5497, 84.5594, 8163),
    ("Nanga Parbat", 35.2375, 74.5892, 8126),
    ("Annapurna", 28.5956, 83.8203, 8091),
    ("Gasherbrum I", 35.7247, 76.6958, 8080),
    ("Broad Peak", 35.8106, 76.5681, 8051),
    ("Gasherbrum II", 35.7581, 76.6531, 8035),
    ("Shishapangma", 28.3531, 85.7786, 8027),
];

/// Alternate spellings and local names: (alias, canonical name).
const EIGHT_THOUSANDER_ALIASES: [(&str, &str); 18] = [
    ("Kanchenjunga", "Kangchenjunga"),
    ("Kanchenjanga", "Kangchenjunga"),
    ("Shisha Pangma", "Shishapangma"),
    ("Xixabangma", "Shishapangma"),
    ("Gasherbrum 1", "Gasherbrum I"),
    ("Gasherbrum 2", "Gasherbrum II"),
    ("Hidden Peak", "Gasherbrum I"),
    ("K5", "Gasherbrum I"),
    ("K4", "Gasherbrum II"),
    ("Sagarmatha", "Everest"),
    ("Chomolungma", "Everest"),
    ("Mount Everest", "Everest"),
    ("Mount Godwin-Austen", "K2"),
    ("Chhogori", "K2"),
    ("Diamir", "Nanga Parbat"),
    ("Annapurna I", "Annapurna"),
    ("Cho-Oyu", "Cho Oyu"),
    ("Broad-Peak", "Broad Peak"),
];

/// Normalize a peak name for matching.
///
/// Trims, lowercases and collapses every run of inner whitespace into a
/// single space.
///
/// # Examples
///
/// ```
/// use peakgrid::catalog::normalize_name;
///
/// assert_eq!(normalize_name("  Cho   OYU "), "cho oyu");
/// assert_eq!(normalize_name("k2"), "k2");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lookup table of peaks and aliases.
///
/// Built once at startup and passed by reference to whoever needs to
/// resolve names.
///
/// # Example
///
/// ```
/// use peakgrid::PeakCatalog;
///
/// let catalog = PeakCatalog::eight_thousanders();
/// let peak = catalog.resolve("kanchenjanga")?;
/// assert_eq!(peak.name, "Kangchenjunga");
/// # Ok::<(), peakgrid::PeakGridError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PeakCatalog {
    /// Peaks in table order.
    peaks: Vec<PeakRecord>,
    /// Normalized canonical name -> index into `peaks`.
    by_name: HashMap<String, usize>,
    /// Normalized alias -> index into `peaks`.
    by_alias: HashMap<String, usize>,
    /// Aliases as given, in table order, with their canonical names.
    aliases: Vec<(String, String)>,
}

impl PeakCatalog {
    /// Build a catalog from custom tables.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicatePeak`] if two canonical names normalize to
    ///   the same string
    /// - [`CatalogError::DanglingAlias`] if an alias targets a missing peak
    /// - [`CatalogError::DuplicateAlias`] if one alias spelling targets two
    ///   different peaks
    /// - [`CatalogError::InvalidCoordinates`] for out-of-range coordinates
    pub fn new<A, C>(
        peaks: Vec<PeakRecord>,
        aliases: impl IntoIterator<Item = (A, C)>,
    ) -> std::result::Result<Self, CatalogError>
    where
        A: Into<String>,
        C: AsRef<str>,
    {
        let mut by_name = HashMap::with_capacity(peaks.len());
        for (i, peak) in peaks.iter().enumerate() {
            if !(-90.0..=90.0).contains(&peak.latitude)
                || !(-180.0..=180.0).contains(&peak.longitude)
            {
                return Err(CatalogError::InvalidCoordinates {
                    name: peak.name.clone(),
                    lat: peak.latitude,
                    lon: peak.longitude,
                });
            }
            if by_name.insert(normalize_name(&peak.name), i).is_some() {
                return Err(CatalogError::DuplicatePeak {
                    name: peak.name.clone(),
                });
            }
        }

        let mut by_alias = HashMap::new();
        let mut alias_list = Vec::new();
        for (alias, target) in aliases {
            let alias = alias.into();
            let index = by_name
                .get(&normalize_name(target.as_ref()))
                .copied()
                .ok_or_else(|| CatalogError::DanglingAlias {
                    alias: alias.clone(),
                    target: target.as_ref().to_string(),
                })?;
            if let Some(previous) = by_alias.insert(normalize_name(&alias), index) {
                if previous != index {
                    return Err(CatalogError::DuplicateAlias {
                        alias,
                        first: peaks[previous].name.clone(),
                        second: peaks[index].name.clone(),
                    });
                }
            }
            alias_list.push((alias, peaks[index].name.clone()));
        }

        Ok(Self {
            peaks,
            by_name,
            by_alias,
            aliases: alias_list,
        })
    }

    /// The built-in catalog of the fourteen eight-thousanders.
    pub fn eight_thousanders() -> Self {
        let peaks = EIGHT_THOUSANDERS
            .iter()
            .map(|&(name, lat, lon, height)| PeakRecord::new(name, lat, lon, height))
            .collect();

        // The static tables are checked by the unit tests below.
        match Self::new(peaks, EIGHT_THOUSANDER_ALIASES) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in peak table is inconsistent: {e}"),
        }
    }

    /// Resolve a free-text peak name.
    ///
    /// # Errors
    ///
    /// Returns [`PeakGridError::PeakNotFound`] carrying the list of canonical
    /// names when nothing matches.
    pub fn resolve(&self, name: &str) -> Result<&PeakRecord> {
        let key = normalize_name(name);

        self.by_name
            .get(&key)
            .or_else(|| self.by_alias.get(&key))
            .map(|&i| &self.peaks[i])
            .ok_or_else(|| PeakGridError::PeakNotFound {
                name: name.trim().to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Canonical names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.peaks.iter().map(|p| p.name.as_str())
    }

    /// All peaks in table order.
    pub fn peaks(&self) -> &[PeakRecord] {
        &self.peaks
    }

    /// Aliases that resolve to the given canonical name, in table order.
    pub fn aliases_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, target)| target == canonical)
            .map(|(alias, _)| alias.as_str())
    }

    /// Number of peaks.
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Whether the catalog has no peaks.
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

impl Default for PeakCatalog {
    fn default() -> Self {
        Self::eight_thousanders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Everest"), "everest");
        assert_eq!(normalize_name("  nanga   PARBAT\t"), "nanga parbat");
        assert_eq!(normalize_name("Gasherbrum\nII"), "gasherbrum ii");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_builtin_table_is_consistent() {
        let peaks: Vec<_> = EIGHT_THOUSANDERS
            .iter()
            .map(|&(name, lat, lon, height)| PeakRecord::new(name, lat, lon, height))
            .collect();
        assert!(PeakCatalog::new(peaks, EIGHT_THOUSANDER_ALIASES).is_ok());

        let catalog = PeakCatalog::eight_thousanders();
        assert_eq!(catalog.len(), 14);
        assert!(catalog.peaks().iter().all(|p| p.height_m > 8000));
    }

    #[test]
    fn test_resolve_every_canonical_name() {
        let catalog = PeakCatalog::eight_thousanders();
        for &(name, lat, lon, height) in &EIGHT_THOUSANDERS {
            let peak = catalog.resolve(name).unwrap();
            assert_eq!(peak.name, name);
            assert_eq!(peak.latitude, lat);
            assert_eq!(peak.longitude, lon);
            assert_eq!(peak.height_m, height);

            // Case and spacing variations
            let shouted = format!("  {}  ", name.to_uppercase().replace(' ', "   "));
            assert_eq!(catalog.resolve(&shouted).unwrap().name, name);
        }
    }

    #[test]
    fn test_resolve_every_alias() {
        let catalog = PeakCatalog::eight_thousanders();
        for &(alias, target) in &EIGHT_THOUSANDER_ALIASES {
            assert_eq!(catalog.resolve(alias).unwrap().name, target, "{alias}");
            assert_eq!(
                catalog.resolve(&alias.to_lowercase()).unwrap().name,
                target,
                "{alias}"
            );
        }
    }

    #[test]
    fn test_resolve_known_examples() {
        let catalog = PeakCatalog::eight_thousanders();

        let peak = catalog.resolve("Kanchenjanga").unwrap();
        assert_eq!(peak.name, "Kangchenjunga");
        assert_eq!(peak.height_m, 8586);

        let peak = catalog.resolve("K2").unwrap();
        assert_eq!(peak.name, "K2");
        assert_eq!(peak.height_m, 8611);

        let peak = catalog.resolve("k2").unwrap();
        assert_eq!(peak.height_m, 8611);

        let peak = catalog.resolve("shisha   pangma").unwrap();
        assert_eq!(peak.name, "Shishapangma");

        let peak = catalog.resolve("gasherbrum 2").unwrap();
        assert_eq!(peak.name, "Gasherbrum II");
    }

    #[test]
    fn test_resolve_unknown_name() {
        let catalog = PeakCatalog::eight_thousanders();

        for name in ["Mont Blanc", "", "   ", "Everest2", "K", "Gasherbrum", "Kangchen"] {
            let err = catalog.resolve(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
            match err {
                PeakGridError::PeakNotFound { available, .. } => {
                    assert_eq!(available.len(), 14);
                    assert_eq!(available[0], "Everest");
                    assert_eq!(available[13], "Shishapangma");
                }
                other => panic!("Expected PeakNotFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_canonical_name_beats_alias() {
        let peaks = vec![
            PeakRecord::new("Alpha", 10.0, 10.0, 1000),
            PeakRecord::new("Beta", 20.0, 20.0, 2000),
        ];
        // "alpha" as an alias for Beta must not shadow the canonical Alpha
        let catalog = PeakCatalog::new(peaks, [("ALPHA", "Beta"), ("Bee", "Beta")]).unwrap();

        assert_eq!(catalog.resolve("alpha").unwrap().name, "Alpha");
        assert_eq!(catalog.resolve("bee").unwrap().name, "Beta");
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let peaks = vec![
            PeakRecord::new("Alpha", 10.0, 10.0, 1000),
            PeakRecord::new("  ALPHA ", 20.0, 20.0, 2000),
        ];
        let err = PeakCatalog::new(peaks, Vec::<(String, String)>::new()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicatePeak { .. }));
    }

    #[test]
    fn test_catalog_rejects_dangling_alias() {
        let peaks = vec![PeakRecord::new("Alpha", 10.0, 10.0, 1000)];
        let err = PeakCatalog::new(peaks, [("Gamma", "Delta")]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DanglingAlias {
                alias: "Gamma".to_string(),
                target: "Delta".to_string(),
            }
        );
    }

    #[test]
    fn test_catalog_rejects_conflicting_alias() {
        let peaks = vec![
            PeakRecord::new("Alpha", 10.0, 10.0, 1000),
            PeakRecord::new("Beta", 20.0, 20.0, 2000),
        ];
        let err = PeakCatalog::new(peaks, [("Twin", "Alpha"), ("  TWIN ", "Beta")]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateAlias {
                alias: "  TWIN ".to_string(),
                first: "Alpha".to_string(),
                second: "Beta".to_string(),
            }
        );
    }

    #[test]
    fn test_catalog_allows_repeated_alias_for_same_peak() {
        let peaks = vec![PeakRecord::new("Alpha", 10.0, 10.0, 1000)];
        let catalog = PeakCatalog::new(peaks, [("Twin", "Alpha"), ("twin", "alpha")]).unwrap();
        assert_eq!(catalog.resolve("TWIN").unwrap().name, "Alpha");
    }

    #[test]
    fn test_catalog_rejects_bad_coordinates() {
        let peaks = vec![PeakRecord::new("Nowhere", 91.0, 0.0, 1)];
        let err = PeakCatalog::new(peaks, Vec::<(String, String)>::new()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_aliases_of() {
        let catalog = PeakCatalog::eight_thousanders();
        let everest: Vec<_> = catalog.aliases_of("Everest").collect();
        assert_eq!(everest, vec!["Sagarmatha", "Chomolungma", "Mount Everest"]);

        assert_eq!(catalog.aliases_of("Lhotse").count(), 0);
    }
}
