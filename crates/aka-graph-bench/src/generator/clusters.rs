//! Entity-cluster topology: groups of noisy records that should merge into
//! one connected component, plus a controlled rate of weak cross-cluster
//! leaks for exercising soft-edge confidence scoring.
use aka_graph_core::Record;
use rand::Rng;
use rand::rngs::StdRng;

use super::GeneratorConfig;
use super::identifiers::{HARD_FIELDS, SOFT_FIELDS, ValueCounter, sample_from_pool};

/// Builds the full dataset for `config`: `config.num_clusters` entities,
/// each represented by `config.records_per_cluster` noisy sightings, plus a
/// trailing fraction of single-record noise entities with no relation to
/// anything else.
pub fn build_dataset(config: &GeneratorConfig, rng: &mut StdRng) -> Vec<Record> {
    let mut counter = ValueCounter::new();
    let mut out = Vec::new();

    for cluster_idx in 0..config.num_clusters {
        build_cluster(config, cluster_idx, &mut counter, rng, &mut out);
    }

    let noise_count =
        (config.num_clusters as f64 * config.noise_record_fraction).round() as usize;
    for i in 0..noise_count {
        let url = format!("noise-{i}");
        let mut record = Record::new(url);
        record.push_field("email", counter.next_value("email"));
        out.push(record);
    }

    out
}

/// Builds one entity's records.
///
/// Each entity owns a fixed set of `hard_selectors_per_record` hard values
/// and `soft_selectors_per_record` soft values. Every sighting record draws
/// a random non-empty subset of the entity's own hard values (so a hard
/// chain forms through the union of pairwise shared identifiers) and
/// carries all of the entity's soft values. With probability
/// `config.cross_cluster_leak_rate`, one of the entity's soft values is
/// instead drawn from a shared pool also used by the next cluster, to
/// produce a weak probabilistic link between otherwise-disjoint components.
fn build_cluster(
    config: &GeneratorConfig,
    cluster_idx: usize,
    counter: &mut ValueCounter,
    rng: &mut StdRng,
    out: &mut Vec<Record>,
) {
    let hard_fields: Vec<&str> = HARD_FIELDS
        .iter()
        .copied()
        .take(config.hard_selectors_per_record.max(1))
        .collect();
    let soft_fields: Vec<&str> = SOFT_FIELDS
        .iter()
        .copied()
        .take(config.soft_selectors_per_record)
        .collect();

    let entity_hard_values: Vec<(String, String)> = hard_fields
        .iter()
        .map(|f| ((*f).to_owned(), counter.next_value(f)))
        .collect();

    let leaks_this_cluster = rng.gen_bool(config.cross_cluster_leak_rate.clamp(0.0, 1.0));
    let leak_pool_field = soft_fields.first().copied();

    let entity_soft_values: Vec<(String, String)> = soft_fields
        .iter()
        .map(|f| {
            if leaks_this_cluster && Some(*f) == leak_pool_field {
                ((*f).to_owned(), sample_from_pool(rng, f, 3))
            } else {
                ((*f).to_owned(), counter.next_value(f))
            }
        })
        .collect();

    for record_idx in 0..config.records_per_cluster.max(1) {
        let url = format!("rec-{cluster_idx}-{record_idx}");
        let mut record = Record::new(url);

        for (field, value) in &entity_hard_values {
            // Every sighting carries at least one shared hard value so the
            // cluster forms a connected hard chain; additional ones are
            // included with decreasing probability to simulate incomplete
            // records.
            if entity_hard_values.iter().position(|(f, _)| f == field) == Some(0)
                || rng.gen_bool(0.6)
            {
                record.push_field(field.clone(), value.clone());
            }
        }
        for (field, value) in &entity_soft_values {
            record.push_field(field.clone(), value.clone());
        }

        out.push(record);
    }
}
