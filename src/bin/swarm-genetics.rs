//! Swarm Genetics CLI: genetic profiles and breeding contracts
//!
//! Commands:
//!   swarm-genetics init      - create a swarm's genetic profile
//!   swarm-genetics show      - print a profile's traits
//!   swarm-genetics propose   - propose a breeding contract
//!   swarm-genetics accept    - accept a proposed contract
//!   swarm-genetics incubate  - start incubation
//!   swarm-genetics complete  - breed the offspring
//!   swarm-genetics reject    - reject a proposal
//!   swarm-genetics cancel    - cancel an open contract
//!   swarm-genetics contracts - list an owner's contracts
//!   swarm-genetics lineage   - show a swarm's lineage
//!   swarm-genetics mutations - show a swarm's mutation history
//!   swarm-genetics catalog   - list legendary traits
//!   swarm-genetics stats     - store statistics
//!   swarm-genetics demo      - run a full breeding demo in memory

use chrono::Duration;
use std::env;
use std::sync::Arc;
use swarm_genetics::breeding::{BreedingContract, BreedingContractManager, BreedingReceipt, ProposalRequest};
use swarm_genetics::clock::{Clock, ManualClock};
use swarm_genetics::config::BreedingConfig;
use swarm_genetics::genome::{GeneticProfile, LegendaryTraitCatalog, SwarmPerformance, Trait, TraitSubset};
use swarm_genetics::storage::GeneticsStore;
use swarm_genetics::zk::DigestProofService;

const STORE_FILE: &str = "swarm-genetics-store.json";
const CONFIG_ENV: &str = "SWARM_GENETICS_CONFIG";

fn print_usage() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║        Swarm Genetics v0.1                                   ║
║        Heritable Traits + Breeding Contracts                 ║
╚══════════════════════════════════════════════════════════════╝

Usage: swarm-genetics <command> [options]

Commands:
  init       <swarm> <owner> [win_rate] [profit] [trait=value...]   Create a genetic profile
  show       <swarm>                                                Show a profile
  propose    <p1> <p2> <owner1> <owner2> <offspring_owner>
             [fee] [share%] [days]                                  Propose a breeding contract
  accept     <contract>                                             Accept a proposal
  incubate   <contract>                                             Start incubation
  complete   <contract>                                             Breed the offspring
  reject     <contract>                                             Reject a proposal
  cancel     <contract>                                             Cancel an open contract
  contracts  <owner>                                                List an owner's contracts
  lineage    <swarm>                                                Show lineage
  mutations  <swarm>                                                Show mutation history
  catalog                                                           List legendary traits
  stats                                                             Store statistics
  demo                                                              Run a full in-memory demo

Environment:
  SWARM_GENETICS_CONFIG   path to a JSON breeding config

Examples:
  swarm-genetics init alpha alice 62.5 1200 risk_tolerance=80 patience=70
  swarm-genetics propose alpha beta alice bob carol 50 10 30
  swarm-genetics complete <contract-id>
  swarm-genetics demo
"#
    );
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    match command {
        "catalog" => return cmd_catalog(),
        "demo" => return cmd_demo().await,
        "help" | "--help" | "-h" => return print_usage(),
        _ => {}
    }

    let Some((manager, store)) = load_manager() else {
        return;
    };
    let rest = &args[2..];

    match command {
        "init" => cmd_init(&manager, rest).await,
        "show" => cmd_show(&manager, rest).await,
        "propose" => cmd_propose(&manager, rest).await,
        "accept" | "incubate" | "complete" | "reject" | "cancel" => cmd_transition(&manager, command, rest).await,
        "contracts" => cmd_contracts(&manager, rest).await,
        "lineage" => cmd_lineage(&manager, rest).await,
        "mutations" => cmd_mutations(&manager, rest).await,
        "stats" => cmd_stats(&store).await,
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
        }
    }
}

fn load_config() -> Option<BreedingConfig> {
    match env::var(CONFIG_ENV) {
        Ok(path) => match BreedingConfig::load(&path) {
            Ok(config) => {
                println!("  Loaded config from {}", path);
                Some(config)
            }
            Err(e) => {
                eprintln!("  Bad config {}: {}", path, e);
                None
            }
        },
        Err(_) => Some(BreedingConfig::default()),
    }
}

/// Open the store file and wire up a manager over it
fn load_manager() -> Option<(BreedingContractManager, Arc<GeneticsStore>)> {
    let config = load_config()?;
    let store = match GeneticsStore::open(STORE_FILE) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("  Failed to open {}: {}", STORE_FILE, e);
            return None;
        }
    };
    match BreedingContractManager::new(store.clone(), Arc::new(DigestProofService::new()), config) {
        Ok(manager) => Some((manager, store)),
        Err(e) => {
            eprintln!("  Invalid config: {}", e);
            None
        }
    }
}

fn parse_baseline(pairs: &[String]) -> Result<TraitSubset, String> {
    let mut baseline = TraitSubset::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected trait=value, got '{}'", pair))?;
        let t = Trait::from_key(key).ok_or_else(|| format!("unknown trait '{}'", key))?;
        let value: f64 = value
            .parse()
            .map_err(|_| format!("trait value for '{}' must be a number", key))?;
        baseline.insert(t, value);
    }
    Ok(baseline)
}

fn print_profile(profile: &GeneticProfile) {
    println!("\n  {}", profile.summary());
    println!("  Owner: {}", profile.owner_id);
    if !profile.parent_ids.is_empty() {
        println!("  Parents: {}", profile.parent_ids.join(" × "));
    }
    println!("  {}", "-".repeat(50));
    for (t, value) in profile.traits.iter() {
        let marker = match (profile.is_dominant(t), profile.is_recessive(t)) {
            (true, true) => "D/R",
            (true, false) => "D",
            (false, true) => "R",
            (false, false) => "",
        };
        println!("  {:<22} {:>6.2}  {}", t.display_name(), value, marker);
    }
    for synergy in &profile.synergies {
        println!("  Synergy: {} (+{}) — {}", synergy.name, synergy.bonus, synergy.description);
    }
    for legendary in &profile.legendary_traits {
        println!("  Legendary: {} [{:?}] — {}", legendary.name, legendary.rarity, legendary.effect);
    }
}

fn print_contract(contract: &BreedingContract) {
    println!("  {}", contract.summary());
    println!(
        "    owners: {} × {} → {}",
        contract.parent1_owner, contract.parent2_owner, contract.offspring_owner
    );
    if let Some(offspring) = &contract.offspring_id {
        println!("    offspring: {}", offspring);
    }
}

fn print_receipt(receipt: &BreedingReceipt) {
    print_profile(&receipt.offspring);
    println!("  {}", "-".repeat(50));
    println!(
        "  Lineage: {:?} bloodline | inbreeding={:.3} | hash={}",
        receipt.lineage.bloodline_tier,
        receipt.lineage.inbreeding_coefficient,
        &receipt.lineage.lineage_hash[..16.min(receipt.lineage.lineage_hash.len())]
    );
    for m in &receipt.mutations {
        println!("  Mutation: {} ({:?}, {:+.2})", m.mutation_name, m.rarity_tier, m.effect_value);
    }
    if let Some(achievement) = &receipt.achievement {
        println!(
            "  Achievement: {} (+{} reputation) for {}",
            achievement.name, achievement.bonus_reputation, achievement.owner_id
        );
    }
}

async fn cmd_init(manager: &BreedingContractManager, args: &[String]) {
    if args.len() < 2 {
        eprintln!("Usage: swarm-genetics init <swarm> <owner> [win_rate] [profit] [trait=value...]");
        return;
    }
    let win_rate: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(50.0);
    let total_profit: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.0);
    let baseline = match parse_baseline(args.get(4..).unwrap_or(&[])) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("  {}", e);
            return;
        }
    };
    let baseline = (!baseline.is_empty()).then_some(&baseline);

    match manager
        .initialize_profile(&args[0], &args[1], baseline, SwarmPerformance { win_rate, total_profit })
        .await
    {
        Ok(profile) => print_profile(&profile),
        Err(e) => eprintln!("  Failed: {}", e),
    }
}

async fn cmd_show(manager: &BreedingContractManager, args: &[String]) {
    let Some(swarm_id) = args.first() else {
        eprintln!("Usage: swarm-genetics show <swarm>");
        return;
    };
    match manager.profile(swarm_id).await {
        Ok(profile) => print_profile(&profile),
        Err(e) => eprintln!("  {}", e),
    }
}

async fn cmd_propose(manager: &BreedingContractManager, args: &[String]) {
    if args.len() < 5 {
        eprintln!("Usage: swarm-genetics propose <p1> <p2> <owner1> <owner2> <offspring_owner> [fee] [share%] [days]");
        return;
    }
    let request = ProposalRequest {
        parent1_id: args[0].clone(),
        parent2_id: args[1].clone(),
        parent1_owner: args[2].clone(),
        parent2_owner: args[3].clone(),
        offspring_owner: args[4].clone(),
        breeding_fee: args.get(5).and_then(|s| s.parse().ok()).unwrap_or(0.0),
        profit_share_percent: args.get(6).and_then(|s| s.parse().ok()).unwrap_or(0.0),
        profit_share_duration_days: args.get(7).and_then(|s| s.parse().ok()).unwrap_or(0),
    };
    match manager.propose(request).await {
        Ok(contract) => {
            println!("\n  Proposed:");
            print_contract(&contract);
        }
        Err(e) => eprintln!("  Proposal failed: {}", e),
    }
}

async fn cmd_transition(manager: &BreedingContractManager, command: &str, args: &[String]) {
    let Some(id) = args.first() else {
        eprintln!("Usage: swarm-genetics {} <contract>", command);
        return;
    };
    let result = match command {
        "accept" => manager.accept(id).await,
        "reject" => manager.reject(id).await,
        "cancel" => manager.cancel(id).await,
        "incubate" => manager.start_incubation(id).await.map(|(contract, record)| {
            println!(
                "  Incubating for {}h, ready at {}",
                record.duration_hours, record.estimated_completion
            );
            contract
        }),
        _ => manager.complete(id).await.map(|receipt| {
            print_receipt(&receipt);
            receipt.contract
        }),
    };
    match result {
        Ok(contract) => print_contract(&contract),
        Err(e) => eprintln!("  {} failed: {}", command, e),
    }
}

async fn cmd_contracts(manager: &BreedingContractManager, args: &[String]) {
    let Some(owner) = args.first() else {
        eprintln!("Usage: swarm-genetics contracts <owner>");
        return;
    };
    match manager.contracts_for_owner(owner).await {
        Ok(contracts) if contracts.is_empty() => println!("  No contracts for {}", owner),
        Ok(contracts) => {
            println!("\n  {} contract(s) for {}:", contracts.len(), owner);
            for contract in &contracts {
                print_contract(contract);
            }
        }
        Err(e) => eprintln!("  {}", e),
    }
}

async fn cmd_lineage(manager: &BreedingContractManager, args: &[String]) {
    let Some(swarm_id) = args.first() else {
        eprintln!("Usage: swarm-genetics lineage <swarm>");
        return;
    };
    match manager.lineage(swarm_id).await {
        Ok(lineage) => {
            println!("\n  Lineage of {} (generation {})", lineage.swarm_id, lineage.generation);
            if lineage.is_genesis() {
                println!("  Genesis swarm");
            } else {
                println!(
                    "  Parents:   {} × {}",
                    lineage.parent1_id.as_deref().unwrap_or("?"),
                    lineage.parent2_id.as_deref().unwrap_or("?")
                );
                println!("  Ancestors: {}", lineage.ancestor_ids.join(", "));
                let mut parents = Vec::new();
                for id in [&lineage.parent1_id, &lineage.parent2_id].into_iter().flatten() {
                    parents.push(manager.lineage(id).await.ok());
                }
                let verified = match parents.as_slice() {
                    [p1, p2] => lineage.verify_chain(p1.as_ref(), p2.as_ref()),
                    _ => false,
                };
                println!("  Hash chain verified: {}", verified);
            }
            println!("  Bloodline: {:?}", lineage.bloodline_tier);
            println!("  Inbreeding coefficient: {:.3}", lineage.inbreeding_coefficient);
            println!("  Hash: {}", lineage.lineage_hash);
        }
        Err(e) => eprintln!("  {}", e),
    }
}

async fn cmd_mutations(manager: &BreedingContractManager, args: &[String]) {
    let Some(swarm_id) = args.first() else {
        eprintln!("Usage: swarm-genetics mutations <swarm>");
        return;
    };
    match manager.mutations(swarm_id).await {
        Ok(entries) if entries.is_empty() => println!("  No mutations recorded for {}", swarm_id),
        Ok(entries) => {
            for entry in entries {
                println!(
                    "  {} | {} | {:?} {:+.2} | {}",
                    entry.occurred_at.format("%Y-%m-%d %H:%M"),
                    entry.record.mutation_name,
                    entry.record.rarity_tier,
                    entry.record.effect_value,
                    entry.record.mutation_description
                );
            }
        }
        Err(e) => eprintln!("  {}", e),
    }
}

async fn cmd_stats(store: &GeneticsStore) {
    println!("\n  {}", store.summary().await);
    let metadata = store.metadata().await;
    println!(
        "  Lifetime: {} profiles, {} contracts, {} mutations since {}",
        metadata.total_profiles_ever,
        metadata.total_contracts_ever,
        metadata.total_mutations,
        metadata.created_at.format("%Y-%m-%d")
    );
    let ranked = store.profiles_by_fitness().await;
    if !ranked.is_empty() {
        println!("\n  Fittest swarms:");
        for (rank, profile) in ranked.iter().take(5).enumerate() {
            println!("  {}. {}", rank + 1, profile.summary());
        }
    }
}

fn cmd_catalog() {
    println!("\n  Legendary traits");
    println!("  {}", "=".repeat(50));
    for t in LegendaryTraitCatalog.all() {
        println!("  {:<18} {:<10} {}", t.name, format!("{:?}", t.rarity), t.effect);
    }
}

async fn cmd_demo() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║              Swarm Genetics — Full Demo                      ║
║       Profiles + Contract + Incubation + Offspring           ║
╚══════════════════════════════════════════════════════════════╝
"#
    );

    let store = Arc::new(GeneticsStore::in_memory());
    let clock = Arc::new(ManualClock::default());
    let manager = match BreedingContractManager::new(
        store.clone(),
        Arc::new(DigestProofService::new()),
        BreedingConfig::default(),
    ) {
        Ok(m) => m.with_clock(clock.clone()),
        Err(e) => {
            eprintln!("  {}", e);
            return;
        }
    };

    if let Err(e) = run_demo(&manager, &clock).await {
        eprintln!("\n  Demo failed: {}", e);
        return;
    }
    println!("\n  {}", store.summary().await);
}

async fn run_demo(
    manager: &BreedingContractManager,
    clock: &ManualClock,
) -> Result<(), Box<dyn std::error::Error>> {
    // Step 1: founders
    println!("Step 1: Initializing founder swarms...");
    println!("{}", "-".repeat(60));
    let aggressive = parse_baseline(&["risk_tolerance=85".into(), "aggression=80".into()])?;
    let patient = parse_baseline(&["patience=85".into(), "analytical_depth=80".into()])?;
    let alpha = manager
        .initialize_profile(
            "alpha",
            "alice",
            Some(&aggressive),
            SwarmPerformance { win_rate: 64.0, total_profit: 4200.0 },
        )
        .await?;
    let beta = manager
        .initialize_profile(
            "beta",
            "bob",
            Some(&patient),
            SwarmPerformance { win_rate: 58.0, total_profit: 2500.0 },
        )
        .await?;
    println!("  {}", alpha.summary());
    println!("  {}", beta.summary());

    // Step 2: contract
    println!("\nStep 2: Proposing and accepting a breeding contract...");
    println!("{}", "-".repeat(60));
    let contract = manager
        .propose(ProposalRequest {
            parent1_id: alpha.swarm_id.clone(),
            parent2_id: beta.swarm_id.clone(),
            parent1_owner: "alice".into(),
            parent2_owner: "bob".into(),
            offspring_owner: "alice".into(),
            breeding_fee: 150.0,
            profit_share_percent: 15.0,
            profit_share_duration_days: 90,
        })
        .await?;
    print_contract(&contract);
    println!("  Proofs verify: {}", manager.verify_contract_proofs(&contract.id).await?);
    manager.accept(&contract.id).await?;

    // Step 3: incubation
    println!("\nStep 3: Incubating...");
    println!("{}", "-".repeat(60));
    let (_, record) = manager.start_incubation(&contract.id).await?;
    println!(
        "  Ready in {}h at {}",
        record.remaining(clock.now()).num_hours(),
        record.estimated_completion
    );
    if let Err(e) = manager.complete(&contract.id).await {
        println!("  Early completion refused: {}", e);
    }
    clock.advance(Duration::hours(record.duration_hours as i64));
    println!("  Clock advanced to {}", clock.now());

    // Step 4: offspring
    println!("\nStep 4: Completing the breeding...");
    println!("{}", "-".repeat(60));
    let receipt = manager.complete(&contract.id).await?;
    print_receipt(&receipt);

    let parent = manager.profile(&alpha.swarm_id).await?;
    println!(
        "\n  {} has {} breeding(s) left, cooling down until {}",
        parent.swarm_id,
        parent.remaining_breedings(),
        parent
            .cooldown_until(manager.config().cooldown())
            .map(|t| t.to_string())
            .unwrap_or_default()
    );
    Ok(())
}
