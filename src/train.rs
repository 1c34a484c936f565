//! Train motion along the closed traversal path

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::rail::path::{path_length, TrainPathSegment};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainMotionConfig {
    /// World units per second
    pub speed: f32,
    /// Height of the train origin above the rail line
    pub y_offset: f32,
}

impl Default for TrainMotionConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            y_offset: 0.6,
        }
    }
}

/// Snapshot of the train pose and progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainState {
    pub position: Vec3,
    /// Yaw around +Y, zero facing +Z
    pub heading: f32,
    /// Nose-down positive
    pub pitch: f32,
    pub orientation: Quat,
    pub segment_index: usize,
    pub distance_on_segment: f32,
    /// Total distance driven since creation
    pub travelled: f32,
    pub loop_count: u32,
    pub speed: f32,
}

impl Default for TrainState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
            pitch: 0.0,
            orientation: Quat::IDENTITY,
            segment_index: 0,
            distance_on_segment: 0.0,
            travelled: 0.0,
            loop_count: 0,
            speed: 0.0,
        }
    }
}

pub struct TrainMotion {
    segments: Vec<TrainPathSegment>,
    config: TrainMotionConfig,
    state: TrainState,
}

fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() {
        speed.max(0.0)
    } else {
        0.0
    }
}

fn usable_segments(segments: Vec<TrainPathSegment>) -> Vec<TrainPathSegment> {
    segments
        .into_iter()
        .filter(|s| s.length.is_finite() && s.length > 0.0)
        .collect()
}

/// Closest point parameter on each segment; returns `(index, distance)` of
/// the nearest one.
fn project_onto(segments: &[TrainPathSegment], point: Vec3) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32, f32)> = None;
    for (i, seg) in segments.iter().enumerate() {
        let t = (point - seg.start).dot(seg.direction()).clamp(0.0, seg.length);
        let d2 = seg.point_at(t).distance_squared(point);
        if best.map_or(true, |(_, _, best_d2)| d2 < best_d2) {
            best = Some((i, t, d2));
        }
    }
    best.map(|(i, t, _)| (i, t))
}

impl TrainMotion {
    /// A negative or non-finite speed is treated as stopped.
    pub fn new(segments: Vec<TrainPathSegment>, config: TrainMotionConfig) -> Self {
        let config = TrainMotionConfig {
            speed: sanitize_speed(config.speed),
            y_offset: if config.y_offset.is_finite() { config.y_offset } else { 0.0 },
        };
        let mut motion = Self {
            segments: usable_segments(segments),
            config,
            state: TrainState {
                speed: config.speed,
                ..TrainState::default()
            },
        };
        motion.refresh_pose();
        motion
    }

    pub fn state(&self) -> &TrainState {
        &self.state
    }

    pub fn segments(&self) -> &[TrainPathSegment] {
        &self.segments
    }

    pub fn set_speed(&mut self, speed: f32) {
        let speed = sanitize_speed(speed);
        self.config.speed = speed;
        self.state.speed = speed;
    }

    /// Advance by `dt` seconds, wrapping to the first segment at the end of
    /// the path. A non-positive `dt` or an empty path leaves the state as is.
    pub fn update(&mut self, dt: f32) -> TrainState {
        if !(dt > 0.0) || !dt.is_finite() || self.segments.is_empty() {
            return self.state.clone();
        }

        let total = path_length(&self.segments);
        let step = self.state.speed * dt;
        self.state.travelled += step;

        let mut remaining = step;
        if total > 0.0 && remaining >= total {
            let whole = (remaining / total).floor();
            self.state.loop_count += whole as u32;
            remaining -= whole * total;
        }

        self.state.distance_on_segment += remaining;
        while self.state.distance_on_segment >= self.segments[self.state.segment_index].length {
            self.state.distance_on_segment -= self.segments[self.state.segment_index].length;
            self.state.segment_index += 1;
            if self.state.segment_index == self.segments.len() {
                self.state.segment_index = 0;
                self.state.loop_count += 1;
            }
        }

        self.refresh_pose();
        self.state.clone()
    }

    /// Swap the path. With `preserve_progress` the train snaps to the closest
    /// point of the new path; otherwise it restarts at the first segment.
    /// Travel counters are kept either way.
    pub fn set_segments(&mut self, segments: Vec<TrainPathSegment>, preserve_progress: bool) {
        let on_rail = self.state.position - Vec3::Y * self.config.y_offset;
        let had_path = !self.segments.is_empty();
        self.segments = usable_segments(segments);

        let (index, distance) = if preserve_progress && had_path {
            project_onto(&self.segments, on_rail).unwrap_or((0, 0.0))
        } else {
            (0, 0.0)
        };
        self.state.segment_index = index;
        self.state.distance_on_segment = distance;
        self.refresh_pose();
    }

    fn refresh_pose(&mut self) {
        let Some(seg) = self.segments.get(self.state.segment_index) else {
            return;
        };
        let dir = seg.direction();
        self.state.position = seg.point_at(self.state.distance_on_segment) + Vec3::Y * self.config.y_offset;
        self.state.heading = dir.x.atan2(dir.z);
        self.state.pitch = -dir.y.clamp(-1.0, 1.0).asin();
        self.state.orientation = Quat::from_euler(EulerRot::YXZ, self.state.heading, self.state.pitch, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rail::path::SegmentKind;

    fn segment(start: [f32; 3], end: [f32; 3]) -> TrainPathSegment {
        let start = Vec3::from(start);
        let end = Vec3::from(end);
        TrainPathSegment {
            start,
            end,
            length: start.distance(end),
            kind: SegmentKind::Rail,
            edge_id: None,
        }
    }

    fn config(speed: f32) -> TrainMotionConfig {
        TrainMotionConfig { speed, y_offset: 0.0 }
    }

    #[test]
    fn test_moves_forward_on_update() {
        let mut motion = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0])], config(5.0));
        let state = motion.update(1.0);
        assert!(state.position.x > 1.0);
        assert!((state.travelled - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_transitions_to_next_segment() {
        let mut motion = TrainMotion::new(
            vec![segment([0.0, 0.0, 0.0], [2.0, 0.0, 0.0]), segment([2.0, 0.0, 0.0], [2.0, 0.0, 4.0])],
            config(10.0),
        );
        motion.update(0.4);
        assert_eq!(motion.state().segment_index, 1);
        assert!((motion.state().distance_on_segment - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_pitches_on_sloped_segment() {
        let mut motion = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [5.0, 3.0, 0.0])], config(0.0));
        let state = motion.update(0.1);
        assert!(state.pitch.abs() > 0.01);
        assert!(state.pitch < 0.0);
        let dir = Vec3::new(5.0, 3.0, 0.0).normalize();
        assert!((state.orientation * Vec3::Z).distance(dir) < 1e-4);
    }

    #[test]
    fn test_preserves_progress_when_segments_replaced() {
        let mut motion = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [20.0, 0.0, 0.0])], config(5.0));
        motion.update(1.2);
        let before = motion.state().position;

        motion.set_segments(
            vec![segment([0.0, 0.0, 0.0], [20.0, 0.0, 0.0]), segment([20.0, 0.0, 0.0], [20.0, 0.0, 10.0])],
            true,
        );
        assert!(motion.state().position.distance(before) < 0.5);
    }

    #[test]
    fn test_restart_without_preserve() {
        let mut motion = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [20.0, 0.0, 0.0])], config(5.0));
        motion.update(2.0);
        motion.set_segments(vec![segment([0.0, 0.0, 0.0], [20.0, 0.0, 0.0])], false);
        assert_eq!(motion.state().position, Vec3::ZERO);
        assert!((motion.state().travelled - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_wraps_and_counts_loops() {
        let mut motion = TrainMotion::new(
            vec![segment([0.0, 0.0, 0.0], [4.0, 0.0, 0.0]), segment([4.0, 0.0, 0.0], [0.0, 0.0, 0.0])],
            config(1.0),
        );
        motion.update(9.0);
        assert_eq!(motion.state().loop_count, 1);
        assert_eq!(motion.state().segment_index, 0);
        assert!((motion.state().position.x - 1.0).abs() < 1e-4);

        motion.update(80.0);
        assert_eq!(motion.state().loop_count, 11);
    }

    #[test]
    fn test_idle_cases_leave_state() {
        let mut motion = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [4.0, 0.0, 0.0])], config(1.0));
        let before = motion.state().clone();
        assert_eq!(motion.update(0.0), before);
        assert_eq!(motion.update(-1.0), before);

        let mut empty = TrainMotion::new(Vec::new(), config(1.0));
        let idle = empty.update(1.0);
        assert_eq!(idle.position, Vec3::ZERO);
        assert_eq!(idle.travelled, 0.0);
    }

    #[test]
    fn test_negative_speed_is_stopped() {
        let mut motion = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0])], config(-4.0));
        assert_eq!(motion.state().speed, 0.0);
        let state = motion.update(2.0);
        assert_eq!(state.travelled, 0.0);
        assert_eq!(state.position, Vec3::ZERO);

        let mut nan = TrainMotion::new(vec![segment([0.0, 0.0, 0.0], [10.0, 0.0, 0.0])], config(f32::NAN));
        assert_eq!(nan.update(1.0).travelled, 0.0);

        motion.set_speed(-1.0);
        assert_eq!(motion.state().speed, 0.0);
        motion.set_speed(3.0);
        assert!(motion.update(1.0).travelled > 2.9);
    }

    #[test]
    fn test_y_offset_lifts_train() {
        let motion = TrainMotion::new(
            vec![segment([0.0, 2.0, 0.0], [0.0, 2.0, 5.0])],
            TrainMotionConfig { speed: 1.0, y_offset: 0.5 },
        );
        assert!((motion.state().position.y - 2.5).abs() < 1e-6);
        assert!(motion.state().heading.abs() < 1e-6);
    }
}
