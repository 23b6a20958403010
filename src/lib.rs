//! # notegraph: Semantic Symbol Graph for Optical Music Recognition
//!
//! Converts geometric symbol detections on a scanned music sheet into a
//! structured, semantically linked graph: each classified glyph becomes
//! an interpretation node, and semantic relationships between symbols
//! (a fingering under a note, a fermata over a chord, a pause after a
//! chord, two digits forming a time signature) become typed, scored,
//! directed edges.
//!
//! ## Design Principles
//!
//! 1. **Arena graph**: nodes and edges are addressed by stable integer
//!    identities; cross-references never own each other
//! 2. **Closed shape set**: per-kind behavior is an exhaustive match,
//!    not virtual dispatch
//! 3. **Explicit tolerances**: gap tables travel in a `RelationConfig`
//!    value, never in ambient statics
//! 4. **Single-writer**: queries are `&self`, mutation is `&mut self`;
//!    one resolution pass at a time per graph
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notegraph::{
//!     resolve, Inter, Rect, RelationConfig, Scale, Shape, SymbolGraph,
//! };
//! # use notegraph::system::System;
//!
//! # fn example(system: System) {
//! let mut graph = SymbolGraph::new();
//! graph.add_inter(Inter::new(Shape::HeadChord, 0.9).with_bounds(Rect::new(100, 100, 20, 60)));
//! graph.add_inter(Inter::new(Shape::Staccato, 0.8).with_bounds(Rect::new(104, 170, 8, 8)));
//!
//! let stats = resolve(&mut graph, &system, Scale::new(20), &RelationConfig::default());
//! println!("{} links applied over {} passes", stats.links_applied, stats.passes);
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod graph;
pub mod inter;
pub mod model;
pub mod relation;
pub mod resolve;
pub mod search;
pub mod system;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Fraction, Glyph, Grade, GradeImpacts, Point, Profile, Rect, Scale, Shape};

// ============================================================================
// Re-exports: Graph
// ============================================================================

pub use graph::{Edge, EdgeId, SymbolGraph};
pub use inter::{check_abnormal, ensemble, Inter, InterId};

// ============================================================================
// Re-exports: Relations and search
// ============================================================================

pub use relation::{GapLimits, Link, Relation, RelationConfig, RelationKind};
pub use resolve::{resolve, ResolveStats};
pub use search::{search_links, search_stale_links, SearchContext};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("shape {shape:?} unsupported for {context}")]
    UnsupportedShape { shape: Shape, context: &'static str },

    #[error("ensemble {id} is full (capacity {capacity})")]
    ArityExceeded { id: InterId, capacity: usize },

    #[error("inter {0} is not an ensemble")]
    NotAnEnsemble(InterId),

    #[error("ensemble {ensemble} expects {expected:?} members, got {got:?}")]
    MemberShape { ensemble: InterId, expected: Shape, got: Shape },

    #[error("inter {0} not found")]
    NotFound(InterId),

    #[error("duplicate {kind:?} relation {src} -> {dst}")]
    DuplicateRelation { kind: RelationKind, src: InterId, dst: InterId },
}

pub type Result<T> = std::result::Result<T, Error>;
