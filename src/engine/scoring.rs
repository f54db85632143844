//! Derived scores: genetic fitness, pair compatibility, offspring prediction
//!
//! All results are clamped to [0, 100].

use super::RandomSource;
use crate::genome::{GeneticProfile, SwarmPerformance, TraitVector};

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Fitness of a trait vector given observed performance
pub fn genetic_fitness(traits: &TraitVector, performance: SwarmPerformance) -> f64 {
    let trait_avg = traits.mean();
    let diversity = traits.std_dev() / 30.0;
    let performance_score =
        (performance.win_rate / 100.0) * 40.0 + (performance.total_profit / 100.0).min(20.0);
    let trait_score = (trait_avg / 100.0) * 30.0;
    clamp_score(performance_score + trait_score + diversity)
}

/// How favourably two profiles combine
pub fn compatibility(parent1: &GeneticProfile, parent2: &GeneticProfile) -> f64 {
    let mut score = 50.0;

    let gap = parent1.generation.abs_diff(parent2.generation);
    if gap <= 1 {
        score += 20.0;
    } else if gap <= 3 {
        score += 10.0;
    } else if gap > 5 {
        score -= 10.0;
    }

    let diversity = parent1.traits.mean_abs_diff(&parent2.traits);
    if diversity > 15.0 && diversity < 40.0 {
        score += 15.0;
    } else if diversity >= 40.0 {
        score += 5.0;
    }

    // mean of all 24 trait values across the pair
    let pair_avg = (parent1.traits.mean() + parent2.traits.mean()) / 2.0;
    if pair_avg > 60.0 {
        score += 15.0;
    } else if pair_avg < 40.0 {
        score -= 10.0;
    }

    clamp_score(score)
}

/// Expected offspring fitness, with ±7.5 noise and a hybrid-vigour bonus above 75
pub fn predict_offspring_fitness<R: RandomSource + ?Sized>(
    parent1_fitness: f64,
    parent2_fitness: f64,
    compatibility: f64,
    rng: &mut R,
) -> f64 {
    let avg = (parent1_fitness + parent2_fitness) / 2.0;
    let compatibility_bonus = (compatibility / 100.0) * 10.0;
    let variance = rng.uniform(-7.5, 7.5);
    let hybrid_vigor = if compatibility > 75.0 { 5.0 } else { 0.0 };
    clamp_score(avg + compatibility_bonus + variance + hybrid_vigor)
}
