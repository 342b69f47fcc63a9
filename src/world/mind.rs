//! Population analytics and emergent pattern detection.
//!
//! The world mind recomputes on a coarse cadence rather than every
//! tick. Statistics are plain aggregates; patterns are tagged records
//! over subsets of the population: spatial clustering, velocity
//! synchronization, stillness, and the collective emotional tone.

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionalState;
use crate::entity::Entity;
use crate::types::EntityId;

/// Aggregate statistics over the population.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldStats {
    pub entity_count: usize,
    pub avg_age: f64,
    pub avg_energy: f32,
    pub avg_entropy: f32,
    pub total_memories: usize,
    pub total_crystals: usize,
    /// Total interaction count across every relationship.
    pub total_experiences: u64,
    pub avg_valence: f32,
    pub avg_arousal: f32,
    pub avg_dominance: f32,
}

/// Kind of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Clustering,
    Synchronization,
    Stillness,
    CollectiveEmotion,
}

/// One detected emergent pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// What was detected.
    pub kind: PatternKind,
    /// Entities involved.
    pub entities: Vec<EntityId>,
    /// Pattern strength, 0 to 1.
    pub strength: f32,
    /// Kind-specific payload (e.g. the mean PAD for collective
    /// emotion).
    pub data: serde_json::Value,
}

/// Detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternThresholds {
    /// Neighbor distance for clustering, in pixels.
    pub cluster_radius: f32,
    /// Minimum cluster size.
    pub cluster_min_size: usize,
    /// Minimum circular concentration of headings for
    /// synchronization (mean resultant length).
    pub sync_concentration: f32,
    /// Speed below which an entity counts as still, pixels per second.
    pub stillness_speed: f32,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        PatternThresholds {
            cluster_radius: 100.0,
            cluster_min_size: 3,
            sync_concentration: 0.85,
            stillness_speed: 2.0,
        }
    }
}

/// The analytics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMind {
    interval: f64,
    last_update: Option<f64>,
    thresholds: PatternThresholds,
    stats: WorldStats,
    patterns: Vec<Pattern>,
}

impl WorldMind {
    /// Creates a world mind with the given recomputation interval in
    /// seconds.
    #[must_use]
    pub fn new(interval: f64) -> Self {
        WorldMind {
            interval,
            last_update: None,
            thresholds: PatternThresholds::default(),
            stats: WorldStats::default(),
            patterns: Vec::new(),
        }
    }

    /// The latest statistics.
    #[must_use]
    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// The latest detected patterns.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// The detection thresholds.
    #[must_use]
    pub fn thresholds(&self) -> &PatternThresholds {
        &self.thresholds
    }

    /// Returns true when a recomputation is due.
    #[must_use]
    pub fn due(&self, now: f64) -> bool {
        self.last_update
            .map_or(true, |last| now - last >= self.interval)
    }

    /// Recomputes stats and patterns.
    pub fn run(&mut self, entities: &[Entity], now: f64) {
        self.last_update = Some(now);
        self.stats = calculate_stats(entities);
        self.patterns = detect_patterns(entities, &self.thresholds);
    }
}

/// Computes aggregate statistics over a population.
#[must_use]
pub fn calculate_stats(entities: &[Entity]) -> WorldStats {
    let count = entities.len();
    if count == 0 {
        return WorldStats::default();
    }
    let mut stats = WorldStats {
        entity_count: count,
        ..WorldStats::default()
    };
    let mut emotional = 0usize;
    for entity in entities {
        stats.avg_age += entity.age();
        stats.avg_energy += entity.energy;
        stats.avg_entropy += entity.entropy;
        if let Some(buffer) = entity.memory() {
            stats.total_memories += buffer.len();
        }
        if let Some(crystallizer) = entity.crystallizer() {
            stats.total_crystals += crystallizer.crystals().len();
        }
        if let Some(relationships) = entity.relationships() {
            stats.total_experiences += relationships
                .values()
                .map(|r| r.interaction_count)
                .sum::<u64>();
        }
        if let Some(emotion) = entity.emotion() {
            stats.avg_valence += emotion.valence;
            stats.avg_arousal += emotion.arousal;
            stats.avg_dominance += emotion.dominance;
            emotional += 1;
        }
    }
    stats.avg_age /= count as f64;
    stats.avg_energy /= count as f32;
    stats.avg_entropy /= count as f32;
    if emotional > 0 {
        stats.avg_valence /= emotional as f32;
        stats.avg_arousal /= emotional as f32;
        stats.avg_dominance /= emotional as f32;
    }
    stats
}

/// Detects emergent patterns over a population.
#[must_use]
pub fn detect_patterns(entities: &[Entity], thresholds: &PatternThresholds) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    patterns.extend(detect_clusters(entities, thresholds));
    patterns.extend(detect_synchronization(entities, thresholds));
    patterns.extend(detect_stillness(entities, thresholds));
    patterns.extend(detect_collective_emotion(entities));
    patterns
}

fn detect_clusters(entities: &[Entity], thresholds: &PatternThresholds) -> Vec<Pattern> {
    let n = entities.len();
    let mut visited = vec![false; n];
    let mut patterns = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        // Flood fill over the proximity graph.
        let mut members = vec![start];
        visited[start] = true;
        let mut cursor = 0;
        while cursor < members.len() {
            let current = members[cursor];
            cursor += 1;
            for other in 0..n {
                if !visited[other]
                    && entities[current].pos.distance_to(entities[other].pos)
                        < thresholds.cluster_radius
                {
                    visited[other] = true;
                    members.push(other);
                }
            }
        }
        if members.len() < thresholds.cluster_min_size {
            continue;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for (a, &i) in members.iter().enumerate() {
            for &j in members.iter().skip(a + 1) {
                total += entities[i].pos.distance_to(entities[j].pos);
                pairs += 1;
            }
        }
        let mean = total / pairs as f32;
        if mean < thresholds.cluster_radius {
            patterns.push(Pattern {
                kind: PatternKind::Clustering,
                entities: members.iter().map(|&i| entities[i].id().clone()).collect(),
                strength: (1.0 - mean / thresholds.cluster_radius).clamp(0.0, 1.0),
                data: serde_json::json!({ "mean_distance": mean }),
            });
        }
    }
    patterns
}

fn detect_synchronization(entities: &[Entity], thresholds: &PatternThresholds) -> Vec<Pattern> {
    let movers: Vec<&Entity> = entities
        .iter()
        .filter(|e| e.vel.length() > thresholds.stillness_speed)
        .collect();
    if movers.len() < 2 {
        return Vec::new();
    }
    // Mean resultant length of the heading distribution: 1 when all
    // headings agree, 0 when they cancel out.
    let (mut sx, mut sy) = (0.0f32, 0.0f32);
    for entity in &movers {
        let unit = entity.vel.normalized();
        sx += unit.x;
        sy += unit.y;
    }
    let concentration = (sx * sx + sy * sy).sqrt() / movers.len() as f32;
    if concentration < thresholds.sync_concentration {
        return Vec::new();
    }
    vec![Pattern {
        kind: PatternKind::Synchronization,
        entities: movers.iter().map(|e| e.id().clone()).collect(),
        strength: concentration.clamp(0.0, 1.0),
        data: serde_json::json!({ "concentration": concentration }),
    }]
}

fn detect_stillness(entities: &[Entity], thresholds: &PatternThresholds) -> Vec<Pattern> {
    if entities.is_empty() {
        return Vec::new();
    }
    let avg_speed: f32 =
        entities.iter().map(|e| e.vel.length()).sum::<f32>() / entities.len() as f32;
    if avg_speed >= thresholds.stillness_speed {
        return Vec::new();
    }
    vec![Pattern {
        kind: PatternKind::Stillness,
        entities: entities.iter().map(|e| e.id().clone()).collect(),
        strength: (1.0 - avg_speed / thresholds.stillness_speed).clamp(0.0, 1.0),
        data: serde_json::json!({ "avg_speed": avg_speed }),
    }]
}

fn detect_collective_emotion(entities: &[Entity]) -> Vec<Pattern> {
    let emotional: Vec<(&EntityId, &EmotionalState)> = entities
        .iter()
        .filter_map(|e| e.emotion().map(|emotion| (e.id(), emotion)))
        .collect();
    if emotional.len() < 2 {
        return Vec::new();
    }
    let n = emotional.len() as f32;
    let mean = EmotionalState::new(
        emotional.iter().map(|(_, e)| e.valence).sum::<f32>() / n,
        emotional.iter().map(|(_, e)| e.arousal).sum::<f32>() / n,
        emotional.iter().map(|(_, e)| e.dominance).sum::<f32>() / n,
    );
    let spread =
        emotional.iter().map(|(_, e)| e.distance(&mean)).sum::<f32>() / n;
    vec![Pattern {
        kind: PatternKind::CollectiveEmotion,
        entities: emotional.iter().map(|(id, _)| (*id).clone()).collect(),
        strength: (1.0 - spread).clamp(0.0, 1.0),
        data: serde_json::json!({
            "valence": mean.valence,
            "arousal": mean.arousal,
            "dominance": mean.dominance,
        }),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityBuilder;
    use crate::math::Vec2;
    use crate::types::MaterialId;
    use crate::world::material::MaterialSpec;

    fn entity_at(id: &str, x: f32, y: f32) -> Entity {
        EntityBuilder::new()
            .id(EntityId::new(id).unwrap())
            .material(MaterialSpec::new(
                MaterialId::new("mat.test").unwrap(),
                "Test",
            ))
            .position(x, y)
            .build()
            .unwrap()
    }

    #[test]
    fn stats_on_empty_population() {
        let stats = calculate_stats(&[]);
        assert_eq!(stats.entity_count, 0);
        assert_eq!(stats.avg_valence, 0.0);
    }

    #[test]
    fn stats_average_emotion_over_emotional_entities_only() {
        let mut a = entity_at("a", 0.0, 0.0);
        a.emotion_mut().unwrap().valence = 0.8;
        let mut b = entity_at("b", 10.0, 0.0);
        b.disable(crate::entity::Feature::Emotion);

        let stats = calculate_stats(&[a, b]);
        assert_eq!(stats.entity_count, 2);
        assert!((stats.avg_valence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn clustering_detected_for_tight_group() {
        let entities = vec![
            entity_at("a", 0.0, 0.0),
            entity_at("b", 20.0, 0.0),
            entity_at("c", 0.0, 20.0),
            entity_at("far", 700.0, 500.0),
        ];
        let patterns = detect_clusters(&entities, &PatternThresholds::default());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::Clustering);
        assert_eq!(patterns[0].entities.len(), 3);
        assert!(patterns[0].strength > 0.5);
    }

    #[test]
    fn no_cluster_below_min_size() {
        let entities = vec![entity_at("a", 0.0, 0.0), entity_at("b", 10.0, 0.0)];
        assert!(detect_clusters(&entities, &PatternThresholds::default()).is_empty());
    }

    #[test]
    fn synchronization_detected_for_aligned_headings() {
        let mut entities = vec![
            entity_at("a", 0.0, 0.0),
            entity_at("b", 300.0, 0.0),
            entity_at("c", 0.0, 300.0),
        ];
        for e in &mut entities {
            e.vel = Vec2::new(10.0, 1.0);
        }
        let patterns = detect_synchronization(&entities, &PatternThresholds::default());
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].strength > 0.9);
    }

    #[test]
    fn opposed_headings_are_not_synchronized() {
        let mut entities = vec![entity_at("a", 0.0, 0.0), entity_at("b", 100.0, 0.0)];
        entities[0].vel = Vec2::new(10.0, 0.0);
        entities[1].vel = Vec2::new(-10.0, 0.0);
        assert!(detect_synchronization(&entities, &PatternThresholds::default()).is_empty());
    }

    #[test]
    fn stillness_detected_when_population_rests() {
        let entities = vec![entity_at("a", 0.0, 0.0), entity_at("b", 400.0, 0.0)];
        let patterns = detect_stillness(&entities, &PatternThresholds::default());
        assert_eq!(patterns.len(), 1);
        assert!((patterns[0].strength - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collective_emotion_carries_mean_pad() {
        let mut a = entity_at("a", 0.0, 0.0);
        a.emotion_mut().unwrap().valence = 1.0;
        let mut b = entity_at("b", 10.0, 0.0);
        b.emotion_mut().unwrap().valence = 0.0;

        let patterns = detect_collective_emotion(&[a, b]);
        assert_eq!(patterns.len(), 1);
        let mean_valence = patterns[0].data["valence"].as_f64().unwrap();
        assert!((mean_valence - 0.5).abs() < 1e-5);
    }

    #[test]
    fn due_respects_interval() {
        let mut mind = WorldMind::new(1.0);
        assert!(mind.due(0.0));
        mind.run(&[], 0.0);
        assert!(!mind.due(0.5));
        assert!(mind.due(1.0));
    }
}
