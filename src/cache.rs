use std::collections::HashMap;
use std::fmt::Write;

use crate::models::{GpaCalculation, YearlyRecord};

/// Memoized cumulative results keyed by a snapshot of the inputs that affect
/// them. The owner clears it whenever the records change.
#[derive(Debug, Default, Clone)]
pub struct CalculationCache {
    entries: HashMap<String, GpaCalculation>,
}

impl CalculationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&GpaCalculation> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, calculation: GpaCalculation) {
        self.entries.insert(key, calculation);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every field the aggregators read: year, subject id, type, level, credits
/// and final grade. Floats are keyed by bit pattern.
pub fn snapshot_key(records: &[YearlyRecord]) -> String {
    let mut key = String::new();

    for record in records {
        let _ = write!(key, "{}[", record.year);
        for grade in &record.subjects {
            let subject = &grade.subject;
            let _ = write!(
                key,
                "{}|{:?}|{:?}|{:x}|{:x};",
                subject.id,
                subject.subject_type,
                subject.level,
                subject.credits.to_bits(),
                grade.final_grade.to_bits()
            );
        }
        key.push(']');
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_records;
    use crate::gpa::calculate_cumulative_gpa;
    use crate::models::SubjectLevel;

    #[test]
    fn key_tracks_every_aggregated_field() {
        let records = default_records(3);
        let base = snapshot_key(&records);
        assert_eq!(base, snapshot_key(&records.clone()));

        let mut graded = records.clone();
        graded[0].subjects[0].grades[0] = Some(8.0);
        graded[0].subjects[0].recompute();
        assert_ne!(base, snapshot_key(&graded));

        let mut leveled = records.clone();
        leveled[1].subjects[2].subject.level = SubjectLevel::Honors;
        assert_ne!(base, snapshot_key(&leveled));

        let mut credited = records;
        credited[2].subjects[0].subject.credits = 2.0;
        assert_ne!(base, snapshot_key(&credited));
    }

    #[test]
    fn stores_and_clears_entries() {
        let records = default_records(1);
        let key = snapshot_key(&records);
        let mut cache = CalculationCache::new();
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), calculate_cumulative_gpa(&records));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}
