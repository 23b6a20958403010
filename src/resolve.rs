//! The resolution driver.
//!
//! One driver owns one graph for the duration of a run: each pass
//! reads the current graph, proposes links for every linkable inter,
//! applies them, sweeps stale links, then re-checks structural
//! validity. Passes repeat until a fixed point (no link applied, none
//! removed). Each disjoint sheet region owns an independent graph, so
//! regions can be resolved on independent workers with no shared
//! state; within a graph this loop is strictly single-writer.

use tracing::{debug, warn};

use crate::graph::SymbolGraph;
use crate::inter::{check_abnormal, InterId};
use crate::model::Scale;
use crate::relation::{Link, RelationConfig};
use crate::search::{search_links, search_stale_links, SearchContext};
use crate::system::System;

/// Outcome of one resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub passes: usize,
    pub links_applied: usize,
    pub links_removed: usize,
    /// Per-node search failures tolerated without aborting the batch.
    pub failures: usize,
}

/// Guard against a pathological propose/sweep oscillation.
const MAX_PASSES: usize = 10;

/// Resolve one region's graph to a fixed point.
pub fn resolve(
    graph: &mut SymbolGraph,
    system: &System,
    scale: Scale,
    config: &RelationConfig,
) -> ResolveStats {
    let mut stats = ResolveStats::default();

    while stats.passes < MAX_PASSES {
        stats.passes += 1;

        // Read phase: propose links for every live linkable inter.
        let mut proposals: Vec<(InterId, Link)> = Vec::new();
        {
            let ctx = SearchContext { graph: &*graph, system, scale, config };
            for id in graph.inter_ids() {
                let Some(inter) = graph.inter(id) else {
                    continue;
                };
                if !inter.shape().is_linkable() {
                    continue;
                }
                match search_links(&ctx, id) {
                    Ok(links) => proposals.extend(links.into_iter().map(|l| (id, l))),
                    Err(e) => {
                        // Per-node isolation: one bad inter must not
                        // abort the batch.
                        warn!(%id, error = %e, "link search failed");
                        stats.failures += 1;
                    }
                }
            }
        }

        // Apply phase.
        let mut applied = 0usize;
        let mut touched: Vec<InterId> = Vec::new();
        for (owner, link) in proposals {
            let partner = link.partner;
            match link.apply(graph, owner) {
                Ok(Some(_)) => {
                    applied += 1;
                    touched.push(owner);
                    touched.push(partner);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(%owner, error = %e, "link application failed");
                    stats.failures += 1;
                }
            }
        }

        // Stale sweep.
        let stale = {
            let ctx = SearchContext { graph: &*graph, system, scale, config };
            let all = graph.edge_ids();
            search_stale_links(&ctx, &all)
        };
        let mut removed = 0usize;
        for eid in stale {
            if let Some(edge) = graph.remove_relation(eid) {
                removed += 1;
                touched.push(edge.src);
                touched.push(edge.dst);
            }
        }

        // Structural re-validation for everything the pass touched.
        touched.sort();
        touched.dedup();
        for id in touched {
            check_abnormal(graph, id);
        }

        stats.links_applied += applied;
        stats.links_removed += removed;
        debug!(pass = stats.passes, applied, removed, "resolution pass done");

        if applied == 0 && removed == 0 {
            break;
        }
    }

    stats
}
