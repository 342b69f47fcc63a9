//! Trust tables and share-policy gates.
//!
//! Separate from relationship trust: this is the gatekeeping layer the
//! world consults before replicating state between entities. Each owner
//! has a table of per-target trust plus a policy per shareable
//! category. `should_share` answers the only question that matters at a
//! sync point: may this category flow to that target?

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Default threshold a target must clear under a `Trust` policy.
pub const DEFAULT_TRUST_THRESHOLD: f32 = 0.6;

/// Trust assigned to targets the owner has no opinion about.
pub const DEFAULT_TRUST_BASELINE: f32 = 0.5;

/// Category of state that can be shared with peers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShareCategory {
    Emotion,
    Memory,
    Intent,
    Relationship,
    Position,
}

/// Gate applied to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePolicy {
    /// Always shared.
    Public,
    /// Shared when trust toward the target clears the threshold.
    Trust,
    /// Never shared.
    Private,
}

/// One owner's trust table and policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustTable {
    trusts: BTreeMap<EntityId, f32>,
    policies: BTreeMap<ShareCategory, SharePolicy>,
}

impl TrustTable {
    /// Creates a table with the default policies: emotion and position
    /// public, everything else trust-gated.
    #[must_use]
    pub fn new() -> Self {
        let mut policies = BTreeMap::new();
        policies.insert(ShareCategory::Emotion, SharePolicy::Public);
        policies.insert(ShareCategory::Position, SharePolicy::Public);
        policies.insert(ShareCategory::Memory, SharePolicy::Trust);
        policies.insert(ShareCategory::Intent, SharePolicy::Trust);
        policies.insert(ShareCategory::Relationship, SharePolicy::Trust);
        TrustTable {
            trusts: BTreeMap::new(),
            policies,
        }
    }

    /// Returns trust toward a target, or the baseline when unknown.
    #[must_use]
    pub fn trust(&self, target: &EntityId) -> f32 {
        self.trusts
            .get(target)
            .copied()
            .unwrap_or(DEFAULT_TRUST_BASELINE)
    }

    /// Sets trust toward a target, clamped to `[0, 1]`.
    pub fn set_trust(&mut self, target: EntityId, trust: f32) {
        let trust = if trust.is_nan() {
            DEFAULT_TRUST_BASELINE
        } else {
            trust.clamp(0.0, 1.0)
        };
        self.trusts.insert(target, trust);
    }

    /// Adjusts trust toward a target by a delta, clamped.
    pub fn update_trust(&mut self, target: &EntityId, delta: f32) {
        let current = self.trust(target);
        self.set_trust(target.clone(), current + delta);
    }

    /// Returns the policy for a category.
    #[must_use]
    pub fn policy(&self, category: ShareCategory) -> SharePolicy {
        self.policies
            .get(&category)
            .copied()
            .unwrap_or(SharePolicy::Trust)
    }

    /// Sets the policy for a category.
    pub fn set_policy(&mut self, category: ShareCategory, policy: SharePolicy) {
        self.policies.insert(category, policy);
    }

    /// Iterates known targets and their trust.
    pub fn trusts(&self) -> impl Iterator<Item = (&EntityId, f32)> {
        self.trusts.iter().map(|(id, t)| (id, *t))
    }

    /// Removes a target from the table.
    pub fn forget_target(&mut self, target: &EntityId) {
        self.trusts.remove(target);
    }
}

impl Default for TrustTable {
    fn default() -> Self {
        TrustTable::new()
    }
}

/// World-owned registry of trust tables, keyed by owner id.
///
/// # Examples
///
/// ```
/// use vivarium::relationship::{ShareCategory, SharePolicy, TrustSystem};
/// use vivarium::types::EntityId;
///
/// let a = EntityId::new("a").unwrap();
/// let b = EntityId::new("b").unwrap();
/// let mut trust = TrustSystem::new(0.6);
///
/// trust.table_mut(&a).set_trust(b.clone(), 0.8);
/// assert!(trust.should_share(&a, ShareCategory::Memory, &b));
///
/// trust.table_mut(&a).set_policy(ShareCategory::Memory, SharePolicy::Private);
/// assert!(!trust.should_share(&a, ShareCategory::Memory, &b));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSystem {
    tables: BTreeMap<EntityId, TrustTable>,
    threshold: f32,
    baseline: f32,
}

impl TrustSystem {
    /// Creates a system with the given trust threshold.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        TrustSystem {
            tables: BTreeMap::new(),
            threshold: threshold.clamp(0.0, 1.0),
            baseline: DEFAULT_TRUST_BASELINE,
        }
    }

    /// Returns the share threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns the owner's table, if one exists.
    #[must_use]
    pub fn table(&self, owner: &EntityId) -> Option<&TrustTable> {
        self.tables.get(owner)
    }

    /// Returns the owner's table, creating a default one on first use.
    pub fn table_mut(&mut self, owner: &EntityId) -> &mut TrustTable {
        self.tables.entry(owner.clone()).or_default()
    }

    /// Trust of `owner` toward `target` (baseline when unknown).
    #[must_use]
    pub fn trust_between(&self, owner: &EntityId, target: &EntityId) -> f32 {
        self.tables
            .get(owner)
            .map_or(self.baseline, |t| t.trust(target))
    }

    /// Whether `owner` shares `category` state with `target`.
    #[must_use]
    pub fn should_share(
        &self,
        owner: &EntityId,
        category: ShareCategory,
        target: &EntityId,
    ) -> bool {
        let policy = self
            .tables
            .get(owner)
            .map_or(SharePolicy::Trust, |t| t.policy(category));
        match policy {
            SharePolicy::Public => true,
            SharePolicy::Private => false,
            SharePolicy::Trust => self.trust_between(owner, target) >= self.threshold,
        }
    }

    /// Moves every recorded trust toward the baseline at `rate` per
    /// second.
    pub fn decay_trust(&mut self, dt: f64, rate: f32) {
        let step = (rate * dt as f32).clamp(0.0, 1.0);
        if step <= 0.0 {
            return;
        }
        for table in self.tables.values_mut() {
            for trust in table.trusts.values_mut() {
                *trust += (self.baseline - *trust) * step;
            }
        }
    }

    /// Drops every reference to a removed entity: its own table and
    /// its entries in other tables.
    pub fn forget_entity(&mut self, id: &EntityId) {
        self.tables.remove(id);
        for table in self.tables.values_mut() {
            table.forget_target(id);
        }
    }

    /// Iterates (owner, table) pairs in key order.
    pub fn tables(&self) -> impl Iterator<Item = (&EntityId, &TrustTable)> {
        self.tables.iter()
    }

    /// Replaces an owner's table wholesale (restore path).
    pub fn insert_table(&mut self, owner: EntityId, table: TrustTable) {
        self.tables.insert(owner, table);
    }
}

impl Default for TrustSystem {
    fn default() -> Self {
        TrustSystem::new(DEFAULT_TRUST_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (EntityId, EntityId) {
        (EntityId::new("a").unwrap(), EntityId::new("b").unwrap())
    }

    #[test]
    fn public_always_shares() {
        let (a, b) = ids();
        let mut system = TrustSystem::default();
        system.table_mut(&a).set_policy(ShareCategory::Memory, SharePolicy::Public);
        system.table_mut(&a).set_trust(b.clone(), 0.0);
        assert!(system.should_share(&a, ShareCategory::Memory, &b));
    }

    #[test]
    fn private_never_shares() {
        let (a, b) = ids();
        let mut system = TrustSystem::default();
        system.table_mut(&a).set_policy(ShareCategory::Memory, SharePolicy::Private);
        system.table_mut(&a).set_trust(b.clone(), 1.0);
        assert!(!system.should_share(&a, ShareCategory::Memory, &b));
    }

    #[test]
    fn trust_policy_gates_on_threshold() {
        let (a, b) = ids();
        let mut system = TrustSystem::new(0.6);
        system.table_mut(&a).set_trust(b.clone(), 0.5);
        assert!(!system.should_share(&a, ShareCategory::Memory, &b));
        system.table_mut(&a).set_trust(b.clone(), 0.6);
        assert!(system.should_share(&a, ShareCategory::Memory, &b));
    }

    #[test]
    fn unknown_target_uses_baseline() {
        let (a, b) = ids();
        let system = TrustSystem::new(0.6);
        assert!((system.trust_between(&a, &b) - 0.5).abs() < f32::EPSILON);
        assert!(!system.should_share(&a, ShareCategory::Memory, &b));
    }

    #[test]
    fn default_policies() {
        let table = TrustTable::new();
        assert_eq!(table.policy(ShareCategory::Emotion), SharePolicy::Public);
        assert_eq!(table.policy(ShareCategory::Position), SharePolicy::Public);
        assert_eq!(table.policy(ShareCategory::Memory), SharePolicy::Trust);
        assert_eq!(table.policy(ShareCategory::Intent), SharePolicy::Trust);
    }

    #[test]
    fn update_trust_clamps() {
        let (a, b) = ids();
        let mut system = TrustSystem::default();
        system.table_mut(&a).update_trust(&b, 5.0);
        assert_eq!(system.trust_between(&a, &b), 1.0);
        system.table_mut(&a).update_trust(&b, -5.0);
        assert_eq!(system.trust_between(&a, &b), 0.0);
    }

    #[test]
    fn nan_trust_becomes_baseline() {
        let (a, b) = ids();
        let mut system = TrustSystem::default();
        system.table_mut(&a).set_trust(b.clone(), f32::NAN);
        assert!((system.trust_between(&a, &b) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_moves_toward_baseline_from_both_sides() {
        let (a, b) = ids();
        let c = EntityId::new("c").unwrap();
        let mut system = TrustSystem::default();
        system.table_mut(&a).set_trust(b.clone(), 1.0);
        system.table_mut(&a).set_trust(c.clone(), 0.0);

        system.decay_trust(1.0, 0.5);
        let high = system.trust_between(&a, &b);
        let low = system.trust_between(&a, &c);
        assert!(high < 1.0 && high > 0.5);
        assert!(low > 0.0 && low < 0.5);
    }

    #[test]
    fn forget_entity_scrubs_all_references() {
        let (a, b) = ids();
        let mut system = TrustSystem::default();
        system.table_mut(&a).set_trust(b.clone(), 0.9);
        system.table_mut(&b).set_trust(a.clone(), 0.9);

        system.forget_entity(&b);
        assert!(system.table(&b).is_none());
        assert!((system.trust_between(&a, &b) - 0.5).abs() < f32::EPSILON);
    }
}
