//! Long-term memory consolidation into crystals.
//!
//! Repeated memories about the same thing crystallize: once enough
//! occurrences with enough combined salience accumulate for a
//! `(kind, subject)` group, the group becomes a crystal. Crystals are
//! immune to ordinary decay; repeats reinforce the existing crystal
//! instead of duplicating it, and the weakest crystal is pruned when
//! the cap is exceeded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::memory::{MemoryBuffer, MemoryKind, MemorySubject};

/// Tuning for the crystallizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrystallizerConfig {
    /// Occurrences required before a group crystallizes.
    pub min_occurrences: usize,
    /// Combined salience required before a group crystallizes.
    pub min_strength: f32,
    /// Maximum number of crystals retained.
    pub max_crystals: usize,
    /// Seconds between consolidation passes.
    pub cadence: f64,
}

impl Default for CrystallizerConfig {
    fn default() -> Self {
        CrystallizerConfig {
            min_occurrences: 3,
            min_strength: 0.9,
            max_crystals: 32,
            cadence: 10.0,
        }
    }
}

/// A consolidated long-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryCrystal {
    /// Kind shared by the source memories.
    pub kind: MemoryKind,
    /// Subject shared by the source memories.
    pub subject: MemorySubject,
    /// Weighted-average salience of everything consolidated so far.
    pub strength: f32,
    /// Number of source memories consolidated.
    pub count: usize,
    /// World time of the first consolidation.
    pub first_seen: f64,
    /// World time of the latest reinforcement.
    pub last_reinforced: f64,
}

/// Pattern extractor turning repeated memories into crystals.
///
/// Each pass only considers memories formed since the previous pass, so
/// a long-lived buffer entry is consolidated once, not on every pass.
///
/// # Examples
///
/// ```
/// use vivarium::memory::{
///     Memory, MemoryBuffer, MemoryContent, MemoryCrystallizer, MemoryKind, MemorySubject,
/// };
///
/// let mut buffer = MemoryBuffer::new(10);
/// for t in 0..4 {
///     buffer.add(Memory::new(
///         t as f64,
///         MemoryKind::Interaction,
///         MemorySubject::World,
///         MemoryContent::default(),
///         0.5,
///     ));
/// }
/// let mut crystallizer = MemoryCrystallizer::default();
/// crystallizer.consolidate(&buffer, 5.0);
/// assert_eq!(crystallizer.crystals().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryCrystallizer {
    config: CrystallizerConfig,
    crystals: Vec<MemoryCrystal>,
    last_run: Option<f64>,
}

impl MemoryCrystallizer {
    /// Creates a crystallizer with the given config.
    #[must_use]
    pub fn new(config: CrystallizerConfig) -> Self {
        MemoryCrystallizer {
            config,
            crystals: Vec::new(),
            last_run: None,
        }
    }

    /// Returns the crystals, strongest-first ordering is not guaranteed.
    #[must_use]
    pub fn crystals(&self) -> &[MemoryCrystal] {
        &self.crystals
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CrystallizerConfig {
        &self.config
    }

    /// Returns true when the cadence has elapsed since the last pass.
    #[must_use]
    pub fn due(&self, now: f64) -> bool {
        self.last_run
            .map_or(true, |last| now - last >= self.config.cadence)
    }

    /// Looks up a crystal for a group.
    #[must_use]
    pub fn crystal_for(&self, kind: &MemoryKind, subject: &MemorySubject) -> Option<&MemoryCrystal> {
        self.crystals
            .iter()
            .find(|c| &c.kind == kind && &c.subject == subject)
    }

    /// Runs a consolidation pass over the buffer.
    ///
    /// Groups unconsolidated memories by `(kind, subject)`; groups that
    /// clear both thresholds create or reinforce a crystal. Returns the
    /// number of crystals created or reinforced.
    pub fn consolidate(&mut self, buffer: &MemoryBuffer, now: f64) -> usize {
        let horizon = self.last_run.unwrap_or(f64::NEG_INFINITY);
        self.last_run = Some(now);

        let mut groups: BTreeMap<(MemoryKind, MemorySubject), (usize, f32)> = BTreeMap::new();
        for memory in buffer.iter().filter(|m| m.timestamp >= horizon) {
            let entry = groups
                .entry((memory.kind.clone(), memory.subject.clone()))
                .or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += memory.salience;
        }

        let mut touched = 0;
        for ((kind, subject), (count, sum)) in groups {
            if count < self.config.min_occurrences || sum < self.config.min_strength {
                continue;
            }
            let avg = sum / count as f32;
            match self
                .crystals
                .iter_mut()
                .find(|c| c.kind == kind && c.subject == subject)
            {
                Some(crystal) => {
                    let total = crystal.count + count;
                    crystal.strength = (crystal.strength * crystal.count as f32
                        + avg * count as f32)
                        / total as f32;
                    crystal.count = total;
                    crystal.last_reinforced = now;
                }
                None => {
                    self.crystals.push(MemoryCrystal {
                        kind,
                        subject,
                        strength: avg,
                        count,
                        first_seen: now,
                        last_reinforced: now,
                    });
                }
            }
            touched += 1;
        }

        while self.crystals.len() > self.config.max_crystals {
            if let Some(weakest) = self
                .crystals
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    a.1.strength
                        .partial_cmp(&b.1.strength)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
            {
                self.crystals.remove(weakest);
            }
        }

        touched
    }
}

impl Default for MemoryCrystallizer {
    fn default() -> Self {
        MemoryCrystallizer::new(CrystallizerConfig::default())
    }
}
