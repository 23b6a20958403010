//! A proposed, not-yet-committed edge.

use tracing::debug;

use crate::graph::{EdgeId, SymbolGraph};
use crate::inter::{ensemble, InterId};
use crate::{Error, Result};

use super::{Relation, RelationKind};

/// A candidate edge produced by a link search: partner, a relation with
/// gaps and grade already computed, and the orientation of the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub partner: InterId,
    pub relation: Relation,
    /// Whether the link's owner is the edge source.
    pub outgoing: bool,
}

impl Link {
    pub fn new(partner: InterId, relation: Relation, outgoing: bool) -> Self {
        Self { partner, relation, outgoing }
    }

    /// Commit this link into the graph on behalf of `owner`.
    ///
    /// The edge direction follows the orientation flag; containment
    /// links go through the ensemble bookkeeping (ordering, arity).
    /// An already-present edge of the same kind on the same pair is
    /// treated as "already linked" and reported as `Ok(None)`.
    pub fn apply(&self, graph: &mut SymbolGraph, owner: InterId) -> Result<Option<EdgeId>> {
        let (src, dst) = if self.outgoing {
            (owner, self.partner)
        } else {
            (self.partner, owner)
        };

        let applied = if self.relation.kind == RelationKind::Containment {
            ensemble::add_member(graph, src, dst)
        } else {
            graph.add_relation(src, dst, self.relation.clone())
        };

        match applied {
            Ok(edge) => Ok(Some(edge)),
            Err(Error::DuplicateRelation { .. }) => {
                debug!(%src, %dst, kind = ?self.relation.kind, "link already applied");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
