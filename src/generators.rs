//! Random contact graphs used as baselines against the observed ward network. Nodes are
//! labelled `"0"` to `"n-1"` and every node is present even when it has no contacts.

use crate::{PersonId, error::ContagionError, graph::ContactGraph};
use log::debug;
use rand::Rng;

fn empty_graph(nodes: usize) -> ContactGraph {
    let mut graph = ContactGraph::new();
    for idx in 0..nodes {
        graph.add_node(&idx.to_string());
    }
    graph
}

fn complete_graph(nodes: usize) -> ContactGraph {
    let mut graph = empty_graph(nodes);
    for a in 0..nodes {
        for b in a + 1..nodes {
            graph.connect(PersonId(a), PersonId(b));
        }
    }
    graph
}

/// G(n, m): `edges` distinct edges chosen uniformly at random among all node pairs. Asking for
/// at least n(n−1)/2 edges gives the complete graph.
pub fn erdos_renyi<R: Rng + ?Sized>(nodes: usize, edges: usize, rng: &mut R) -> ContactGraph {
    let max_edges = nodes * nodes.saturating_sub(1) / 2;
    if edges >= max_edges {
        return complete_graph(nodes);
    }

    let mut graph = empty_graph(nodes);
    while graph.edge_count() < edges {
        let a = PersonId(rng.random_range(0..nodes));
        let b = PersonId(rng.random_range(0..nodes));
        if a == b || graph.has_edge(a, b) {
            continue;
        }
        graph.connect(a, b);
    }
    debug!("generated Erdős–Rényi graph with {nodes} nodes and {edges} edges");
    graph
}

/// Small-world graph: a ring lattice where each node touches its `k / 2` nearest neighbours on
/// either side, after which every lattice edge `(u, v)` is replaced by `(u, w)` with
/// probability `rewire`, for a uniformly chosen `w` that is neither `u` nor already adjacent
/// to it.
pub fn watts_strogatz<R: Rng + ?Sized>(
    nodes: usize,
    k: usize,
    rewire: f64,
    rng: &mut R,
) -> Result<ContactGraph, ContagionError> {
    if k > nodes {
        return Err(ContagionError::Configuration(format!(
            "Watts-Strogatz needs k <= nodes, got k = {k} for {nodes} nodes"
        )));
    }
    if !(0.0..=1.0).contains(&rewire) {
        return Err(ContagionError::Configuration(format!(
            "rewiring probability must be in [0, 1], got {rewire}"
        )));
    }
    if k == nodes {
        return Ok(complete_graph(nodes));
    }

    let mut graph = empty_graph(nodes);
    for offset in 1..=k / 2 {
        for u in 0..nodes {
            graph.connect(PersonId(u), PersonId((u + offset) % nodes));
        }
    }

    for offset in 1..=k / 2 {
        for u in 0..nodes {
            if !rng.random_bool(rewire) {
                continue;
            }
            let source = PersonId(u);
            let mut target = PersonId(rng.random_range(0..nodes));
            let mut saturated = false;
            while target == source || graph.has_edge(source, target) {
                target = PersonId(rng.random_range(0..nodes));
                if graph.degree(source) >= nodes - 1 {
                    saturated = true;
                    break;
                }
            }
            if !saturated {
                graph.disconnect(source, PersonId((u + offset) % nodes));
                graph.connect(source, target);
            }
        }
    }
    debug!(
        "generated Watts-Strogatz graph with {nodes} nodes, k = {k}, {} edges",
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn erdos_renyi_has_exact_edge_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let graph = erdos_renyi(100, 250, &mut rng);
        assert_eq!(graph.len(), 100);
        assert_eq!(graph.edge_count(), 250);
        assert_eq!(graph.label(PersonId(37)), "37");
        assert!(graph.people().all(|p| !graph.has_edge(p, p)));
    }

    #[test]
    fn erdos_renyi_is_reproducible() {
        let a = erdos_renyi(30, 40, &mut StdRng::seed_from_u64(7));
        let b = erdos_renyi(30, 40, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn erdos_renyi_saturates_to_complete() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = erdos_renyi(5, 100, &mut rng);
        assert_eq!(graph.edge_count(), 10);
        assert!(graph.people().all(|p| graph.degree(p) == 4));

        assert_eq!(erdos_renyi(1, 3, &mut rng).edge_count(), 0);
        assert!(erdos_renyi(0, 0, &mut rng).is_empty());
    }

    #[test]
    fn lattice_without_rewiring() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = watts_strogatz(10, 4, 0.0, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 20);
        assert!(graph.people().all(|p| graph.degree(p) == 4));
        assert!(graph.has_edge(PersonId(0), PersonId(9)));
        assert!(graph.has_edge(PersonId(0), PersonId(8)));
        assert!(!graph.has_edge(PersonId(0), PersonId(5)));
    }

    #[test]
    fn rewiring_keeps_the_edge_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = watts_strogatz(50, 6, 1.0, &mut rng).unwrap();
        assert_eq!(graph.len(), 50);
        assert_eq!(graph.edge_count(), 150);
        assert!((graph.mean_degree() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn odd_k_rounds_down() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = watts_strogatz(8, 3, 0.0, &mut rng).unwrap();
        assert!(graph.people().all(|p| graph.degree(p) == 2));
    }

    #[test]
    fn invalid_watts_strogatz_arguments() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            watts_strogatz(5, 6, 0.1, &mut rng),
            Err(ContagionError::Configuration(_))
        ));
        assert!(watts_strogatz(5, 2, 1.5, &mut rng).is_err());

        let complete = watts_strogatz(5, 5, 0.3, &mut rng).unwrap();
        assert_eq!(complete.edge_count(), 10);
    }
}
