//! Span merging
//!
//! Pools candidates from every recognizer into one ordered list with no two
//! spans overlapping. Ranking between overlapping spans is score first, then
//! length, then earliest start; registration order of the recognizers plays
//! no part.

use crate::anonymization::models::{EntityType, Span};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Merge candidate spans
///
/// Spans scoring below `threshold` or whose type is not in `requested`
/// (`None` accepts every type) are discarded first. The returned list is
/// sorted by start and strictly non-overlapping.
pub fn merge(
    spans: Vec<Span>,
    threshold: f32,
    requested: Option<&HashSet<EntityType>>,
) -> Vec<Span> {
    let mut candidates: Vec<Span> = spans
        .into_iter()
        .filter(|s| s.score() >= threshold)
        .filter(|s| requested.map_or(true, |r| r.contains(s.entity_type())))
        .collect();

    candidates.sort_by(|a, b| {
        a.start()
            .cmp(&b.start())
            .then_with(|| b.score().total_cmp(&a.score()))
            .then_with(|| b.len().cmp(&a.len()))
    });

    let mut kept: Vec<Span> = Vec::with_capacity(candidates.len());
    for span in candidates {
        match kept.last_mut() {
            Some(last) if span.start() < last.end() => {
                if outranks(&span, last) {
                    *last = span;
                }
            }
            _ => kept.push(span),
        }
    }

    // A replacement can extend the last kept span backwards over an earlier one
    // only if it started before it, which the start ordering rules out.
    debug_assert!(kept.windows(2).all(|w| w[0].end() <= w[1].start()));

    kept
}

/// Whether `challenger` beats `incumbent` on an overlap
fn outranks(challenger: &Span, incumbent: &Span) -> bool {
    rank(challenger, incumbent) == Ordering::Greater
}

fn rank(a: &Span, b: &Span) -> Ordering {
    a.score()
        .total_cmp(&b.score())
        .then_with(|| a.len().cmp(&b.len()))
        .then_with(|| b.start().cmp(&a.start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, entity_type: EntityType, score: f32) -> Span {
        Span::new(start, end, entity_type, score, "test").unwrap()
    }

    #[test]
    fn test_threshold_filter() {
        let merged = merge(
            vec![
                span(0, 4, EntityType::Person, 0.3),
                span(10, 14, EntityType::Person, 0.5),
            ],
            0.5,
            None,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start(), 10);
    }

    #[test]
    fn test_requested_types_filter() {
        let requested: HashSet<EntityType> = [EntityType::EmailAddress].into_iter().collect();
        let merged = merge(
            vec![
                span(0, 4, EntityType::Person, 0.9),
                span(10, 20, EntityType::EmailAddress, 0.9),
            ],
            0.0,
            Some(&requested),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].entity_type(), &EntityType::EmailAddress);
    }

    #[test]
    fn test_higher_score_wins_overlap() {
        let merged = merge(
            vec![
                span(0, 20, EntityType::StreetAddress, 0.6),
                span(5, 12, EntityType::Location, 0.85),
            ],
            0.0,
            None,
        );
        assert_eq!(merged, vec![span(5, 12, EntityType::Location, 0.85)]);
    }

    #[test]
    fn test_equal_score_longer_wins() {
        let merged = merge(
            vec![
                span(0, 5, EntityType::UsSsn, 0.8),
                span(2, 15, EntityType::UsBankNumber, 0.8),
            ],
            0.0,
            None,
        );
        assert_eq!(merged, vec![span(2, 15, EntityType::UsBankNumber, 0.8)]);
    }

    #[test]
    fn test_full_tie_earlier_start_wins() {
        let merged = merge(
            vec![
                span(3, 8, EntityType::Guid, 0.7),
                span(0, 5, EntityType::Guid, 0.7),
            ],
            0.0,
            None,
        );
        assert_eq!(merged, vec![span(0, 5, EntityType::Guid, 0.7)]);
    }

    #[test]
    fn test_adjacent_spans_do_not_overlap() {
        let merged = merge(
            vec![
                span(0, 5, EntityType::Person, 0.7),
                span(5, 9, EntityType::Person, 0.7),
            ],
            0.0,
            None,
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_sweep_continues_from_kept_span() {
        // The winner of the first overlap is compared against the next span
        let merged = merge(
            vec![
                span(0, 10, EntityType::Person, 0.5),
                span(8, 20, EntityType::Location, 0.9),
                span(18, 25, EntityType::Person, 0.6),
                span(30, 35, EntityType::Guid, 0.9),
            ],
            0.0,
            None,
        );
        assert_eq!(
            merged,
            vec![
                span(8, 20, EntityType::Location, 0.9),
                span(30, 35, EntityType::Guid, 0.9),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(merge(Vec::new(), 0.5, None).is_empty());
    }
}
