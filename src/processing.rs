use crate::types::{EducationRecord, RegionFeature};
use std::collections::HashMap;
use tracing::info;

/// FIPS code → education record. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinIndex {
    records: HashMap<u32, EducationRecord>,
}

impl JoinIndex {
    /// Later records replace earlier ones with the same FIPS code.
    pub fn build(records: &[EducationRecord]) -> Self {
        let records = records
            .iter()
            .map(|r| (r.fips, r.clone()))
            .collect::<HashMap<_, _>>();
        Self { records }
    }

    pub fn get(&self, fips: u32) -> Option<&EducationRecord> {
        self.records.get(&fips)
    }

    /// Attainment percent for a region, 0 when the region has no record.
    pub fn attainment(&self, fips: u32) -> f64 {
        self.get(fips).map_or(0.0, |r| r.bachelors_or_higher)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How well the boundaries and the records line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinStats {
    pub matched: usize,
    pub unmatched: usize,
}

pub fn join_stats(features: &[RegionFeature], index: &JoinIndex) -> JoinStats {
    let matched = features.iter().filter(|f| index.get(f.id).is_some()).count();
    let stats = JoinStats { matched, unmatched: features.len() - matched };
    info!(
        matched = stats.matched,
        unmatched = stats.unmatched,
        records = index.len(),
        "Joined education records to regions"
    );
    stats
}
