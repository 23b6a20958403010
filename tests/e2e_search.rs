//! End-to-end tests for the per-kind link searches.
//!
//! Each test builds a small two-staff system, populates a graph with a
//! handful of interpretations, and checks which partner the search
//! proposes.

use pretty_assertions::assert_eq;

use notegraph::system::{LineSeg, MeasureSpan, Staff, StaffId, System};
use notegraph::{
    search_links, Inter, Point, Rect, RelationConfig, RelationKind, Scale, SearchContext, Shape,
    SymbolGraph,
};

/// Two 5-line staves, interline 20: staff 0 spans y 100..180, staff 1
/// spans y 300..380. Two measures split at x=400.
fn two_staff_system() -> System {
    let staff = |id: u16, top: f64| {
        Staff::new(
            StaffId(id),
            (0..5)
                .map(|i| LineSeg::level(0.0, 1000.0, top + 20.0 * f64::from(i)))
                .collect(),
            vec![
                MeasureSpan { start_x: 0, end_x: 400 },
                MeasureSpan { start_x: 400, end_x: 1000 },
            ],
        )
    };
    System::new(vec![staff(0, 100.0), staff(1, 300.0)])
}

fn scale() -> Scale {
    Scale::new(20)
}

fn chord(graph: &mut SymbolGraph, bounds: Rect, staff: u16) -> notegraph::InterId {
    let lead = Point::new(bounds.center().x, bounds.bottom() as f64 - 10.0);
    graph.add_inter(
        Inter::new(Shape::HeadChord, 0.9)
            .with_bounds(bounds)
            .with_staff(StaffId(staff))
            .with_leading_note(lead),
    )
}

// ============================================================================
// 1. Pause sign: right-most chord in the measure wins, not the nearest
// ============================================================================

#[test]
fn breath_mark_picks_rightmost_chord_in_measure() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // Right-most qualifying chord, center x = 40.
    let target = chord(&mut graph, Rect::new(30, 120, 20, 40), 0);
    // Closer in y, but further left (x = 10).
    let _closer = chord(&mut graph, Rect::new(0, 110, 20, 30), 0);
    let mark = graph.add_inter(
        Inter::new(Shape::BreathMark, 0.8).with_bounds(Rect::new(115, 90, 10, 10)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, mark).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, target);
    assert_eq!(links[0].relation.kind, RelationKind::ChordPause);
    assert!(!links[0].outgoing, "chord is the edge source");
}

#[test]
fn breath_mark_ignores_chords_in_next_measure() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // Sign lives in the second measure; this chord is in the first.
    let _previous = chord(&mut graph, Rect::new(380, 120, 15, 40), 0);
    let mark = graph.add_inter(
        Inter::new(Shape::BreathMark, 0.8).with_bounds(Rect::new(430, 90, 10, 10)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    assert!(search_links(&ctx, mark).unwrap().is_empty());
}

// ============================================================================
// 2. Articulation between two staves
// ============================================================================

#[test]
fn staccato_between_staves_accepts_chord_below() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // Exactly midway between staff 0 (bottom 180) and staff 1 (top 300).
    let sign = graph.add_inter(
        Inter::new(Shape::Staccato, 0.8).with_bounds(Rect::new(200, 236, 8, 8)),
    );
    // Immediately below, inside the inter-staff window.
    let below = chord(&mut graph, Rect::new(196, 250, 20, 40), 1);
    // Outside the window: entirely above the facing line of staff 0.
    let _outside = chord(&mut graph, Rect::new(196, 110, 20, 40), 0);

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, sign).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, below);
    assert_eq!(links[0].relation.kind, RelationKind::ChordArticulation);
}

#[test]
fn articulation_tie_break_is_minimal_vertical_gap() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let sign = graph.add_inter(
        Inter::new(Shape::Staccato, 0.8).with_bounds(Rect::new(200, 236, 8, 8)),
    );
    let near = chord(&mut graph, Rect::new(196, 250, 20, 40), 1);
    let _far = chord(&mut graph, Rect::new(205, 270, 14, 30), 1);

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, sign).unwrap();
    assert_eq!(links[0].partner, near);
}

#[test]
fn marcato_below_staff_contradicts_its_allowed_side() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // Marcato may only sit above its chord; placed below the bottom
    // staff the allowed side contradicts the position.
    let sign = graph.add_inter(
        Inter::new(Shape::Marcato, 0.8).with_bounds(Rect::new(200, 390, 8, 8)),
    );
    let _chord = chord(&mut graph, Rect::new(196, 320, 20, 40), 1);

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    assert!(search_links(&ctx, sign).unwrap().is_empty());
}

#[test]
fn wide_chord_is_not_masked_by_a_chord_outside_the_window() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let sign = graph.add_inter(
        Inter::new(Shape::Staccato, 0.8).with_bounds(Rect::new(200, 236, 8, 8)),
    );
    // Entirely right of the search window, earlier in center-x order.
    let _outside = chord(&mut graph, Rect::new(228, 250, 4, 40), 1);
    // Center further right still, but the wide box reaches back into
    // the window.
    let wide = chord(&mut graph, Rect::new(210, 250, 60, 40), 1);

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, sign).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, wide);
}

// ============================================================================
// 3. Playing technique: below candidates preferred
// ============================================================================

#[test]
fn playing_sign_prefers_chord_below_even_when_above_is_nearer() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let sign = graph.add_inter(
        Inter::new(Shape::PlayingOpen, 0.8).with_bounds(Rect::new(200, 200, 10, 10)),
    );
    let _above = chord(&mut graph, Rect::new(195, 150, 20, 40), 0);
    let below = chord(&mut graph, Rect::new(195, 240, 20, 40), 1);

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, sign).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, below);
    assert_eq!(links[0].relation.kind, RelationKind::ChordPlaying);
}

// ============================================================================
// 4. Grace chord: right side only, Euclidean-nearest leading note
// ============================================================================

#[test]
fn grace_chord_only_looks_right() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // dx = +30 from the grace head: eligible.
    let host = chord(&mut graph, Rect::new(120, 100, 20, 45), 0);
    // dx = -10: on the left, never eligible.
    let _left = chord(&mut graph, Rect::new(60, 100, 20, 45), 0);
    let grace = graph.add_inter(
        Inter::new(Shape::GraceChord, 0.7)
            .with_bounds(Rect::new(95, 130, 10, 10))
            .with_leading_note(Point::new(100.0, 135.0)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, grace).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, host);
    assert_eq!(links[0].relation.kind, RelationKind::ChordGrace);
    assert!(links[0].outgoing, "the grace chord is the edge source");
}

#[test]
fn grace_scan_survives_a_decoy_leading_note() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // Earlier in center-x order, but its leading note sits far beyond
    // the horizontal tolerance.
    let _decoy = graph.add_inter(
        Inter::new(Shape::HeadChord, 0.9)
            .with_bounds(Rect::new(106, 100, 20, 45))
            .with_staff(StaffId(0))
            .with_leading_note(Point::new(150.0, 135.0)),
    );
    let host = graph.add_inter(
        Inter::new(Shape::HeadChord, 0.9)
            .with_bounds(Rect::new(115, 100, 20, 45))
            .with_staff(StaffId(0))
            .with_leading_note(Point::new(120.0, 135.0)),
    );
    let grace = graph.add_inter(
        Inter::new(Shape::GraceChord, 0.7)
            .with_bounds(Rect::new(95, 130, 10, 10))
            .with_leading_note(Point::new(100.0, 135.0)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, grace).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, host);
}

// ============================================================================
// 5. Fermata: barline partner beats a slightly closer chord
// ============================================================================

#[test]
fn fermata_prefers_overlapping_barline_over_closer_chord() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let bar = graph.add_inter(
        Inter::new(Shape::Barline, 0.9)
            .with_bounds(Rect::new(396, 100, 4, 80))
            .with_staff(StaffId(0)),
    );
    // A chord slightly closer to the fermata center than the barline.
    let _chord = chord(&mut graph, Rect::new(380, 95, 14, 40), 0);
    // Centered 1.0 interline above the barline top, overlapping it.
    let fermata = graph.add_inter(
        Inter::new(Shape::FermataAbove, 0.8).with_bounds(Rect::new(388, 70, 20, 20)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, fermata).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, bar);
    assert_eq!(links[0].relation.kind, RelationKind::FermataBar);
}

#[test]
fn fermata_falls_back_to_chord_and_prefers_closer_mirror() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // No barline in reach. Mirror chord sits nearer to the fermata.
    let mirror = chord(&mut graph, Rect::new(200, 105, 20, 30), 0);
    let primary = graph.add_inter(
        Inter::new(Shape::HeadChord, 0.9)
            .with_bounds(Rect::new(200, 125, 20, 40))
            .with_staff(StaffId(0))
            .with_leading_note(Point::new(210.0, 155.0))
            .with_mirror(mirror),
    );
    let fermata = graph.add_inter(
        Inter::new(Shape::FermataAbove, 0.8).with_bounds(Rect::new(198, 70, 24, 16)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, fermata).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].relation.kind, RelationKind::FermataChord);
    let partner = links[0].partner;
    assert!(partner == mirror || partner == primary);
    assert_eq!(partner, mirror, "the strictly closer mirror wins");
}

#[test]
fn fermata_keeps_primary_when_mirror_fails_grading() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    // The mirror's center is nearer to the fermata, but its box sits
    // exactly one horizontal tolerance away, so its own grade is zero.
    let mirror = graph.add_inter(
        Inter::new(Shape::HeadChord, 0.9)
            .with_bounds(Rect::new(240, 80, 20, 30))
            .with_staff(StaffId(0)),
    );
    let primary = graph.add_inter(
        Inter::new(Shape::HeadChord, 0.9)
            .with_bounds(Rect::new(200, 125, 20, 40))
            .with_staff(StaffId(0))
            .with_leading_note(Point::new(210.0, 155.0))
            .with_mirror(mirror),
    );
    let fermata = graph.add_inter(
        Inter::new(Shape::FermataAbove, 0.8).with_bounds(Rect::new(198, 70, 24, 16)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, fermata).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, primary);
    assert_eq!(links[0].relation.kind, RelationKind::FermataChord);
}

// ============================================================================
// 6. Measure count: containment plus value consistency
// ============================================================================

#[test]
fn measure_number_links_to_multiple_rest_by_containment() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let rest = graph.add_inter(
        Inter::new(Shape::MultipleRest, 0.9)
            .with_bounds(Rect::new(100, 130, 200, 20))
            .with_staff(StaffId(0)),
    );
    let number = graph.add_inter(
        Inter::new(Shape::MeasureNumber, 0.8)
            .with_bounds(Rect::new(190, 60, 20, 20))
            .with_staff(StaffId(0))
            .with_value(12),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let links = search_links(&ctx, number).unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, rest);
    assert_eq!(links[0].relation.kind, RelationKind::MeasureCount);
}

#[test]
fn measure_number_skips_repeat_sign_with_mismatched_slash_count() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let repeat = graph.add_inter(
        Inter::new(Shape::MeasureRepeat2, 0.9)
            .with_bounds(Rect::new(100, 130, 200, 20))
            .with_staff(StaffId(0)),
    );

    let mismatched = graph.add_inter(
        Inter::new(Shape::MeasureNumber, 0.8)
            .with_bounds(Rect::new(190, 60, 20, 20))
            .with_staff(StaffId(0))
            .with_value(4),
    );
    let matching = graph.add_inter(
        Inter::new(Shape::MeasureNumber, 0.8)
            .with_bounds(Rect::new(120, 60, 20, 20))
            .with_staff(StaffId(0))
            .with_value(2),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    assert!(search_links(&ctx, mismatched).unwrap().is_empty());

    let links = search_links(&ctx, matching).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].partner, repeat);
}

// ============================================================================
// 7. Idempotence
// ============================================================================

#[test]
fn search_links_is_idempotent_on_an_unchanged_graph() {
    let system = two_staff_system();
    let mut graph = SymbolGraph::new();
    let config = RelationConfig::default();

    let _target = chord(&mut graph, Rect::new(30, 120, 20, 40), 0);
    let mark = graph.add_inter(
        Inter::new(Shape::BreathMark, 0.8).with_bounds(Rect::new(115, 90, 10, 10)),
    );

    let ctx = SearchContext { graph: &graph, system: &system, scale: scale(), config: &config };
    let first = search_links(&ctx, mark).unwrap();
    let second = search_links(&ctx, mark).unwrap();
    assert_eq!(first, second);
}
