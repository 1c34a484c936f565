//! Rail piece placement along an edge
//!
//! Pieces are modelled facing +Z with their origin at the back end. Every
//! placement carries the full 3D rotation onto the edge direction, so rails
//! between islands at different altitudes follow the slope.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::rail::kit::{AlternatingRailKit, RailKit};

const EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RailPieceKind {
    Start,
    Main,
    End,
    Long,
    Short,
}

/// One rail piece instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailPiecePlacement {
    pub kind: RailPieceKind,
    /// Back end of the piece
    pub position: Vec3,
    pub center: Vec3,
    pub rotation: Quat,
    /// Length actually covered along the edge
    pub length: f32,
    /// Scale along the forward axis relative to the kit length
    pub stretch: f32,
    /// Distance from the edge start to `position`
    pub offset: f32,
}

struct Line {
    origin: Vec3,
    dir: Vec3,
    distance: f32,
    rotation: Quat,
}

impl Line {
    fn between(from: Vec3, to: Vec3) -> Option<Self> {
        let delta = to - from;
        let distance = delta.length();
        if !(distance > EPSILON) || !distance.is_finite() {
            return None;
        }
        let dir = delta / distance;
        Some(Self {
            origin: from,
            dir,
            distance,
            rotation: Quat::from_rotation_arc(Vec3::Z, dir),
        })
    }

    fn piece(&self, kind: RailPieceKind, offset: f32, length: f32, kit_length: f32) -> RailPiecePlacement {
        let position = self.origin + self.dir * offset;
        RailPiecePlacement {
            kind,
            position,
            center: position + self.dir * (length * 0.5),
            rotation: self.rotation,
            length,
            stretch: length / kit_length,
            offset,
        }
    }
}

fn sanitize_offset(offset: f32) -> f32 {
    if offset.is_finite() {
        offset.max(0.0)
    } else {
        0.0
    }
}

/// Lay a start piece, stretched main pieces and an end piece between two
/// anchors, keeping `min_offset` clear at both ends.
///
/// The interior between the caps is tiled by `max(1, round(interior /
/// main_length))` main pieces stretched to cover it exactly, so consecutive
/// pieces neither gap nor overlap. Returns nothing when the caps do not fit.
pub fn place_rail_segments(kit: &RailKit, from: Vec3, to: Vec3, min_offset: f32) -> Vec<RailPiecePlacement> {
    let Some(line) = Line::between(from, to) else {
        return Vec::new();
    };
    let min_offset = sanitize_offset(min_offset);
    let usable = line.distance - 2.0 * min_offset;
    if usable + EPSILON < kit.start_length + kit.end_length {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut cursor = min_offset;

    pieces.push(line.piece(RailPieceKind::Start, cursor, kit.start_length, kit.start_length));
    cursor += kit.start_length;

    let interior = usable - kit.start_length - kit.end_length;
    if interior > EPSILON {
        let count = ((interior / kit.main_length).round() as usize).max(1);
        let spacing = interior / count as f32;
        for _ in 0..count {
            pieces.push(line.piece(RailPieceKind::Main, cursor, spacing, kit.main_length));
            cursor += spacing;
        }
    }

    pieces.push(line.piece(RailPieceKind::End, cursor, kit.end_length, kit.end_length));
    pieces
}

/// Number of alternating long/short sections that fit in `distance` once
/// `end_offset` is reserved at both ends. Sections are never stretched, so
/// the pattern stops at the first one that would overrun.
pub fn count_alternating_sections(distance: f32, long_length: f32, short_length: f32, end_offset: f32) -> usize {
    if !(long_length > 0.0) || !(short_length > 0.0) {
        return 0;
    }
    let usable = (distance - sanitize_offset(end_offset) * 2.0).max(0.0);
    if !usable.is_finite() {
        return 0;
    }

    let mut cursor = 0.0;
    let mut count = 0;
    let mut use_long = true;
    loop {
        let len = if use_long { long_length } else { short_length };
        if cursor + len > usable + EPSILON {
            break;
        }
        cursor += len;
        count += 1;
        use_long = !use_long;
    }
    count
}

/// Lay alternating long and short sections from `end_offset` past `from`,
/// starting with a long one.
pub fn place_alternating_segments(
    kit: &AlternatingRailKit,
    from: Vec3,
    to: Vec3,
    end_offset: f32,
) -> Vec<RailPiecePlacement> {
    let Some(line) = Line::between(from, to) else {
        return Vec::new();
    };
    let end_offset = sanitize_offset(end_offset);
    let count = count_alternating_sections(line.distance, kit.long_length, kit.short_length, end_offset);

    let mut cursor = end_offset;
    (0..count)
        .map(|i| {
            let (kind, len) = if i % 2 == 0 {
                (RailPieceKind::Long, kit.long_length)
            } else {
                (RailPieceKind::Short, kit.short_length)
            };
            let piece = line.piece(kind, cursor, len, len);
            cursor += len;
            piece
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(pieces: &[RailPiecePlacement]) {
        for pair in pieces.windows(2) {
            let gap = pair[1].offset - (pair[0].offset + pair[0].length);
            assert!(gap.abs() < 1e-4, "gap {gap} between pieces");
        }
    }

    #[test]
    fn test_tiles_interior_exactly() {
        let kit = RailKit::new(2.0, 4.0, 2.0);
        let pieces = place_rail_segments(&kit, Vec3::ZERO, Vec3::new(0.0, 0.0, 20.0), 1.0);

        assert_eq!(pieces.first().unwrap().kind, RailPieceKind::Start);
        assert_eq!(pieces.last().unwrap().kind, RailPieceKind::End);
        let mains: Vec<_> = pieces.iter().filter(|p| p.kind == RailPieceKind::Main).collect();
        assert_eq!(mains.len(), 4);
        for m in mains {
            assert!((m.length - 3.5).abs() < 1e-4);
            assert!((m.stretch - 0.875).abs() < 1e-4);
        }

        assert_contiguous(&pieces);
        assert!((pieces[0].offset - 1.0).abs() < 1e-5);
        let last = pieces.last().unwrap();
        assert!((last.offset + last.length - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_short_gap() {
        let kit = RailKit::new(2.0, 4.0, 2.0);
        assert!(place_rail_segments(&kit, Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0).is_empty());
        assert!(place_rail_segments(&kit, Vec3::ZERO, Vec3::ZERO, 0.0).is_empty());
    }

    #[test]
    fn test_caps_only_when_no_interior() {
        let kit = RailKit::new(2.0, 4.0, 2.0);
        let pieces = place_rail_segments(&kit, Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0), 1.0);
        assert_eq!(pieces.len(), 2);
        assert_contiguous(&pieces);
    }

    #[test]
    fn test_rotation_follows_slope() {
        let kit = RailKit::default();
        let from = Vec3::new(0.0, 0.0, 0.0);
        let to = Vec3::new(30.0, 12.0, -5.0);
        let dir = (to - from).normalize();
        let pieces = place_rail_segments(&kit, from, to, 0.5);
        assert!(!pieces.is_empty());
        for p in &pieces {
            assert!((p.rotation * Vec3::Z).distance(dir) < 1e-4);
            assert!((p.center - (p.position + dir * p.length * 0.5)).length() < 1e-4);
        }
    }

    #[test]
    fn test_alternating_count() {
        assert_eq!(count_alternating_sections(100.0, 10.0, 6.0, 10.0), 10);
        assert_eq!(count_alternating_sections(19.0, 10.0, 6.0, 10.0), 0);
        assert_eq!(count_alternating_sections(100.0, 0.0, 6.0, 10.0), 0);
    }

    #[test]
    fn test_alternating_pattern() {
        let kit = AlternatingRailKit::new(10.0, 6.0);
        let pieces = place_alternating_segments(&kit, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), 10.0);
        assert_eq!(pieces.len(), 10);
        for (i, p) in pieces.iter().enumerate() {
            let expected = if i % 2 == 0 { RailPieceKind::Long } else { RailPieceKind::Short };
            assert_eq!(p.kind, expected);
            assert_eq!(p.stretch, 1.0);
        }
        assert!((pieces[0].position.x - 10.0).abs() < 1e-5);
        assert_contiguous(&pieces);
    }
}
