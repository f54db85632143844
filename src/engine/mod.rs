//! Genetic engine: the pure computational core
//!
//! Profile initialization, breeding (weighted inheritance + mutation +
//! synergy detection) and scoring. The engine holds only immutable
//! configuration; every random decision is drawn from the `RandomSource`
//! passed in, so calls on unrelated profiles can run in parallel.

mod random;
mod scoring;

pub use random::{shuffle_with, RandomSource, RngSource, SequenceSource};
pub use scoring::{compatibility, genetic_fitness, predict_offspring_fitness};

use crate::genome::{
    detect_synergies, GeneticProfile, LegendaryTrait, LegendaryTraitCatalog, MutationRecord,
    MutationTable, MutationType, SwarmPerformance, Synergy, Trait, TraitSubset, TraitVector,
    DEFAULT_MAX_BREEDING,
};
use chrono::Utc;
use uuid::Uuid;

pub const INITIAL_MUTATION_RATE: f64 = 5.0;
pub const BASELINE_TRAIT_VALUE: f64 = 50.0;
pub const BASELINE_JITTER: f64 = 10.0;
pub const INHERITANCE_JITTER: f64 = 5.0;

/// Inheritance weight of the dominant parent's value
const DOMINANT_WEIGHT: f64 = 0.7;

/// Genes produced by initialization, before they are bound to a swarm
#[derive(Debug, Clone, PartialEq)]
pub struct Genes {
    pub traits: TraitVector,
    pub dominant: TraitSubset,
    pub recessive: TraitSubset,
    pub mutation_rate: f64,
    pub generation: u32,
}

/// Everything a breeding produces
#[derive(Debug, Clone)]
pub struct BreedOutcome {
    pub offspring: GeneticProfile,
    pub mutations: Vec<MutationRecord>,
    pub legendary_traits: Vec<LegendaryTrait>,
}

/// Mutation rate for a child: 5 + 0.5·generation + 3·|generation gap|
pub fn offspring_mutation_rate(new_generation: u32, generation_gap: u32) -> f64 {
    INITIAL_MUTATION_RATE + 0.5 * new_generation as f64 + 3.0 * generation_gap as f64
}

#[derive(Debug, Clone, Default)]
pub struct GeneticEngine {
    mutation_table: MutationTable,
    catalog: LegendaryTraitCatalog,
    max_breeding: Option<u32>,
}

impl GeneticEngine {
    pub fn new(mutation_table: MutationTable) -> Self {
        Self {
            mutation_table,
            catalog: LegendaryTraitCatalog,
            max_breeding: None,
        }
    }

    /// Breeding capacity stamped on newly created profiles
    pub fn with_max_breeding(mut self, max_breeding: u32) -> Self {
        self.max_breeding = Some(max_breeding);
        self
    }

    pub fn mutation_table(&self) -> &MutationTable {
        &self.mutation_table
    }

    pub fn catalog(&self) -> &LegendaryTraitCatalog {
        &self.catalog
    }

    fn max_breeding(&self) -> u32 {
        self.max_breeding.unwrap_or(DEFAULT_MAX_BREEDING)
    }

    /// Baseline genes: given values where supplied, else 50 ± 10
    pub fn initialize_genes<R: RandomSource + ?Sized>(
        &self,
        baseline: Option<&TraitSubset>,
        rng: &mut R,
    ) -> Genes {
        let traits = TraitVector::from_fn(|t| match baseline.and_then(|b| b.get(&t)) {
            Some(&value) => value,
            None => BASELINE_TRAIT_VALUE + rng.uniform(-BASELINE_JITTER, BASELINE_JITTER),
        });
        let dominant = random_subset(&traits, rng);
        let recessive = random_subset(&traits, rng);
        Genes {
            traits,
            dominant,
            recessive,
            mutation_rate: INITIAL_MUTATION_RATE,
            generation: 1,
        }
    }

    /// A complete first-generation profile for a swarm
    pub fn initialize_profile<R: RandomSource + ?Sized>(
        &self,
        swarm_id: impl Into<String>,
        owner_id: impl Into<String>,
        baseline: Option<&TraitSubset>,
        performance: SwarmPerformance,
        rng: &mut R,
    ) -> GeneticProfile {
        let genes = self.initialize_genes(baseline, rng);
        GeneticProfile {
            swarm_id: swarm_id.into(),
            owner_id: owner_id.into(),
            genetic_fitness: genetic_fitness(&genes.traits, performance),
            synergies: detect_synergies(&genes.traits),
            traits: genes.traits,
            dominant: genes.dominant,
            recessive: genes.recessive,
            mutation_rate: genes.mutation_rate,
            generation: genes.generation,
            parent_ids: Vec::new(),
            legendary_traits: Vec::new(),
            breeding_count: 0,
            max_breeding: self.max_breeding(),
            last_bred_at: None,
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// Produce an offspring from two parent snapshots. Parents are never modified.
    pub fn breed<R: RandomSource + ?Sized>(
        &self,
        parent1: &GeneticProfile,
        parent2: &GeneticProfile,
        rng: &mut R,
    ) -> BreedOutcome {
        let new_generation = parent1.generation.max(parent2.generation) + 1;
        let gap = parent1.generation.abs_diff(parent2.generation);
        let mutation_rate = offspring_mutation_rate(new_generation, gap);

        let mut traits = TraitVector::default();
        let mut mutations = Vec::new();
        let mut legendary_traits = Vec::new();

        for t in Trait::ALL {
            let v1 = parent1.traits.get(t);
            let v2 = parent2.traits.get(t);
            let inherited = match (parent1.is_dominant(t), parent2.is_dominant(t)) {
                (true, false) => DOMINANT_WEIGHT * v1 + (1.0 - DOMINANT_WEIGHT) * v2,
                (false, true) => DOMINANT_WEIGHT * v2 + (1.0 - DOMINANT_WEIGHT) * v1,
                _ => 0.5 * (v1 + v2),
            };
            traits.set(t, inherited + rng.uniform(-INHERITANCE_JITTER, INHERITANCE_JITTER));

            if rng.chance_percent(mutation_rate) {
                let mutation = self.mutation_table.roll(t, rng);
                traits.adjust(t, mutation.effect_value);
                if mutation.mutation_type == MutationType::Legendary {
                    legendary_traits.push(self.catalog.draw(rng));
                }
                mutations.push(mutation);
            }
        }

        let dominant = inherit_dominance(parent1, parent2, &traits, rng);
        let recessive = inherit_recessive(parent1, parent2, rng);
        let synergies: Vec<Synergy> = detect_synergies(&traits);

        let offspring = GeneticProfile {
            swarm_id: Uuid::new_v4().to_string(),
            owner_id: parent1.owner_id.clone(),
            genetic_fitness: genetic_fitness(&traits, SwarmPerformance::default()),
            traits,
            dominant,
            recessive,
            mutation_rate,
            generation: new_generation,
            parent_ids: vec![parent1.swarm_id.clone(), parent2.swarm_id.clone()],
            legendary_traits: legendary_traits.clone(),
            synergies,
            breeding_count: 0,
            max_breeding: self.max_breeding(),
            last_bred_at: None,
            version: 0,
            created_at: Utc::now(),
        };

        BreedOutcome {
            offspring,
            mutations,
            legendary_traits,
        }
    }

    pub fn fitness(&self, traits: &TraitVector, performance: SwarmPerformance) -> f64 {
        genetic_fitness(traits, performance)
    }

    pub fn compatibility(&self, parent1: &GeneticProfile, parent2: &GeneticProfile) -> f64 {
        compatibility(parent1, parent2)
    }

    pub fn predict_offspring_fitness<R: RandomSource + ?Sized>(
        &self,
        parent1_fitness: f64,
        parent2_fitness: f64,
        compatibility: f64,
        rng: &mut R,
    ) -> f64 {
        predict_offspring_fitness(parent1_fitness, parent2_fitness, compatibility, rng)
    }
}

/// 4–7 traits chosen after shuffling the canonical order
fn random_subset<R: RandomSource + ?Sized>(traits: &TraitVector, rng: &mut R) -> TraitSubset {
    let count = 4 + rng.index(4);
    let mut keys = Trait::ALL;
    shuffle_with(rng, &mut keys);
    keys.iter().take(count).map(|&t| (t, traits.get(t))).collect()
}

fn inherit_dominance<R: RandomSource + ?Sized>(
    parent1: &GeneticProfile,
    parent2: &GeneticProfile,
    traits: &TraitVector,
    rng: &mut R,
) -> TraitSubset {
    let mut dominant = TraitSubset::new();
    for t in Trait::ALL {
        let threshold = match (parent1.is_dominant(t), parent2.is_dominant(t)) {
            (true, true) => 0.5,
            (true, false) | (false, true) => 0.25,
            (false, false) => 0.7,
        };
        if rng.next_f64() > threshold {
            dominant.insert(t, traits.get(t));
        }
    }
    dominant
}

/// Union of both recessive subsets (parent2 wins on overlap), then keep 2–5 at random
fn inherit_recessive<R: RandomSource + ?Sized>(
    parent1: &GeneticProfile,
    parent2: &GeneticProfile,
    rng: &mut R,
) -> TraitSubset {
    let mut pool = parent1.recessive.clone();
    pool.extend(parent2.recessive.iter().map(|(&t, &v)| (t, v)));

    let count = 2 + rng.index(4);
    let mut keys: Vec<Trait> = pool.keys().copied().collect();
    shuffle_with(rng, &mut keys);
    keys.into_iter()
        .take(count)
        .filter_map(|t| pool.get(&t).map(|&v| (t, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(id: &str, value: f64, generation: u32) -> GeneticProfile {
        let engine = GeneticEngine::default();
        let mut rng = RngSource::seeded(id.len() as u64 + generation as u64);
        let mut p = engine.initialize_profile(id, "owner", None, SwarmPerformance::default(), &mut rng);
        p.traits = TraitVector::uniform(value);
        p.generation = generation;
        p
    }

    #[test]
    fn test_initialize_genes_bounds() {
        let engine = GeneticEngine::default();
        let mut rng = RngSource::seeded(42);
        for _ in 0..100 {
            let genes = engine.initialize_genes(None, &mut rng);
            assert!(genes.traits.iter().all(|(_, v)| (40.0..=60.0).contains(&v)));
            assert!((4..=7).contains(&genes.dominant.len()));
            assert!((4..=7).contains(&genes.recessive.len()));
            assert_eq!(genes.mutation_rate, 5.0);
            assert_eq!(genes.generation, 1);
        }
    }

    #[test]
    fn test_initialize_with_baseline() {
        let engine = GeneticEngine::default();
        let baseline = TraitSubset::from([(Trait::Speed, 150.0), (Trait::Patience, 12.0)]);
        let genes = engine.initialize_genes(Some(&baseline), &mut RngSource::seeded(1));
        assert_eq!(genes.traits.get(Trait::Speed), 100.0);
        assert_eq!(genes.traits.get(Trait::Patience), 12.0);
        for (t, v) in genes.dominant.iter() {
            assert_eq!(*v, genes.traits.get(*t));
        }
    }

    #[test]
    fn test_initialize_profile_defaults() {
        let engine = GeneticEngine::default().with_max_breeding(3);
        let perf = SwarmPerformance { win_rate: 50.0, total_profit: 0.0 };
        let p = engine.initialize_profile("s", "o", None, perf, &mut RngSource::seeded(9));
        assert_eq!(p.max_breeding, 3);
        assert_eq!(p.breeding_count, 0);
        assert!(p.genetic_fitness > 20.0);
        assert!(p.parent_ids.is_empty());
    }

    #[test]
    fn test_breed_without_mutation() {
        let engine = GeneticEngine::default();
        let p1 = parent("p1", 50.0, 1);
        let p2 = parent("p2", 50.0, 1);
        // every draw 0.99: jitter +4.9, mutation roll 99 never below 6
        let outcome = engine.breed(&p1, &p2, &mut SequenceSource::constant(0.99));

        let child = &outcome.offspring;
        assert_eq!(child.generation, 2);
        assert_eq!(child.mutation_rate, 6.0);
        assert!(outcome.mutations.is_empty());
        assert!(outcome.legendary_traits.is_empty());
        assert!(child.traits.iter().all(|(_, v)| (45.0..=55.0).contains(&v)));
        assert_eq!(child.parent_ids, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(child.breeding_count, 0);
        // 0.99 clears every dominance threshold
        assert_eq!(child.dominant.len(), 12);
    }

    #[test]
    fn test_dominant_weighting() {
        let engine = GeneticEngine::default();
        let mut p1 = parent("p1", 80.0, 1);
        let mut p2 = parent("p2", 20.0, 1);
        p1.dominant = TraitSubset::from([(Trait::Speed, 80.0)]);
        p2.dominant = TraitSubset::from([(Trait::Patience, 20.0)]);
        // 0.5 → zero jitter; mutation roll 50 ≥ 6
        let outcome = engine.breed(&p1, &p2, &mut SequenceSource::constant(0.5));
        let t = &outcome.offspring.traits;
        assert!((t.get(Trait::Speed) - 62.0).abs() < 1e-9);
        assert!((t.get(Trait::Patience) - 38.0).abs() < 1e-9);
        assert!((t.get(Trait::Creativity) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_mutation_rate_with_gap() {
        let engine = GeneticEngine::default();
        let p1 = parent("p1", 50.0, 2);
        let p2 = parent("p2", 50.0, 5);
        let outcome = engine.breed(&p1, &p2, &mut RngSource::seeded(3));
        assert_eq!(outcome.offspring.generation, 6);
        // 5 + 3 + 9
        assert_eq!(outcome.offspring.mutation_rate, 17.0);
    }

    #[test]
    fn test_legendary_mutation_awards_trait() {
        let engine = GeneticEngine::default();
        let p1 = parent("p1", 50.0, 1);
        let p2 = parent("p2", 50.0, 1);
        // jitter draw 0.5, mutation check 0.0 (< 6%), type roll 0.0 (legendary), catalog draw 0.0
        let outcome = engine.breed(&p1, &p2, &mut SequenceSource::new(vec![0.5, 0.0, 0.0, 0.0]));
        assert_eq!(outcome.mutations.len(), 12);
        assert!(outcome
            .mutations
            .iter()
            .all(|m| m.mutation_type == MutationType::Legendary));
        assert_eq!(outcome.legendary_traits.len(), 12);
        assert!(outcome.legendary_traits.iter().all(|t| t.id == "swarm_mind"));
        assert_eq!(outcome.offspring.legendary_traits.len(), 12);
        assert!(outcome.offspring.traits.iter().all(|(_, v)| v == 75.0));
    }

    #[test]
    fn test_recessive_inheritance() {
        let engine = GeneticEngine::default();
        let mut p1 = parent("p1", 50.0, 1);
        let mut p2 = parent("p2", 50.0, 1);
        p1.recessive = TraitSubset::from([(Trait::Speed, 11.0), (Trait::Intuition, 12.0)]);
        p2.recessive = TraitSubset::from([(Trait::Speed, 21.0), (Trait::Endurance, 22.0)]);
        let mut rng = RngSource::seeded(77);
        for _ in 0..50 {
            let child = engine.breed(&p1, &p2, &mut rng).offspring;
            assert!((2..=3).contains(&child.recessive.len()));
            if let Some(v) = child.recessive.get(&Trait::Speed) {
                assert_eq!(*v, 21.0);
            }
            assert!(child
                .recessive
                .keys()
                .all(|t| matches!(t, Trait::Speed | Trait::Intuition | Trait::Endurance)));
        }
    }

    #[test]
    fn test_breed_invariants_random() {
        let engine = GeneticEngine::default();
        let mut rng = RngSource::seeded(2024);
        let mut a = engine.initialize_profile("a", "o", None, SwarmPerformance::default(), &mut rng);
        let b = engine.initialize_profile("b", "o", None, SwarmPerformance::default(), &mut rng);
        for _ in 0..200 {
            let outcome = engine.breed(&a, &b, &mut rng);
            let child = &outcome.offspring;
            assert!(child.traits.is_within_bounds());
            assert_eq!(child.generation, a.generation.max(b.generation) + 1);
            assert!(outcome.mutations.iter().all(|m| m.sign_is_consistent()));
            let legendary_count = outcome
                .mutations
                .iter()
                .filter(|m| m.mutation_type == MutationType::Legendary)
                .count();
            assert_eq!(legendary_count, outcome.legendary_traits.len());
            assert!((0.0..=100.0).contains(&child.genetic_fitness));
            a = child.clone();
            if a.generation > 30 {
                a.generation = 1;
            }
        }
    }

    #[test]
    fn test_parents_untouched() {
        let engine = GeneticEngine::default();
        let p1 = parent("p1", 70.0, 1);
        let p2 = parent("p2", 30.0, 1);
        let (c1, c2) = (p1.clone(), p2.clone());
        let _ = engine.breed(&p1, &p2, &mut RngSource::seeded(8));
        assert_eq!(p1, c1);
        assert_eq!(p2, c2);
    }
}
