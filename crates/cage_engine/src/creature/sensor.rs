//! Directional proximity and color sensor
//!
//! Each tick a ray is cast from just outside the body (the dead zone) out to
//! the sensor range. The four output channels are smoothed over time:
//! colors move towards the color of whatever was hit by `fadeout` of the
//! remaining difference, and fade towards black when nothing is in range.

use crate::draw::DrawList;
use crate::entity::Surroundings;
use crate::error::{ensure_non_negative, ensure_positive, CageError, Result};
use crate::foundation::collections::EntityKey;
use crate::foundation::logging::warn;
use crate::foundation::math::{utils, Color, Point2, Vec2};
use crate::physics::{CollisionGroup, RaySegment};

/// Smoothing factor used unless configured otherwise
pub const DEFAULT_FADEOUT: f32 = 0.6;

/// A single ray sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRay {
    inner_radius: f32,
    radius: f32,
    angle: f32,
    fadeout: f32,
    start: Point2,
    end: Point2,
    owner_hit: Option<EntityKey>,
    normal_hit: Option<Vec2>,
    results: [f32; 4],
}

impl SensorRay {
    /// A sensor with the default fade-out
    pub fn new(inner_radius: f32, radius: f32, angle: f32) -> Result<Self> {
        Self::with_fadeout(inner_radius, radius, angle, DEFAULT_FADEOUT)
    }

    /// A sensor with an explicit fade-out in (0, 1]
    pub fn with_fadeout(inner_radius: f32, radius: f32, angle: f32, fadeout: f32) -> Result<Self> {
        let inner_radius = ensure_non_negative("inner radius", inner_radius)?;
        let radius = ensure_positive("sensor radius", radius)?;
        if radius <= inner_radius {
            return Err(CageError::EmptySensorRange { inner: inner_radius, outer: radius });
        }
        if !(fadeout > 0.0 && fadeout <= 1.0) {
            return Err(CageError::OutOfRange { what: "fadeout", range: "(0, 1]", value: fadeout });
        }
        if !angle.is_finite() {
            return Err(CageError::OutOfRange {
                what: "sensor angle",
                range: "finite",
                value: angle,
            });
        }

        let mut sensor = Self {
            inner_radius,
            radius,
            angle,
            fadeout,
            start: Point2::origin(),
            end: Point2::origin(),
            owner_hit: None,
            normal_hit: None,
            results: [0.0; 4],
        };
        sensor.zero();
        Ok(sensor)
    }

    /// Clear the hit and reset the signal (black, nothing in range)
    pub fn zero(&mut self) {
        self.owner_hit = None;
        self.normal_hit = None;
        self.results = [0.0, 0.0, 0.0, 1.0];
    }

    /// Recompute the ray endpoints
    ///
    /// `orientation` is the creature's forward direction; `mirrored` flips
    /// the ray about the forward axis. Returns `false` and keeps the old
    /// segment when the inputs are not finite.
    pub fn update_segment(&mut self, position: Vec2, orientation: Vec2, mirrored: bool) -> bool {
        if !utils::is_finite2(&position) || !utils::is_finite2(&orientation) {
            warn!("Sensor ignoring non-finite pose {:?} / {:?}", position, orientation);
            return false;
        }
        let mut direction = utils::rotate(orientation, self.angle);
        if mirrored {
            direction.y = -direction.y;
        }
        self.start = Point2::from(position + direction * self.inner_radius);
        self.end = Point2::from(position + direction * self.radius);
        true
    }

    /// Cast the current segment and fold the result into the signal
    pub fn process(&mut self, surroundings: &Surroundings<'_>, exclude: CollisionGroup) {
        let segment = RaySegment::new(self.start, self.end);
        if !segment.is_castable() {
            warn!("Sensor segment {:?} is not castable", segment);
            return;
        }

        let Some(hit) = surroundings.cast(&segment, exclude) else {
            self.owner_hit = None;
            self.normal_hit = None;
            self.results[3] = 1.0;
            for channel in &mut self.results[..3] {
                *channel *= self.fadeout;
            }
            return;
        };

        let Some((owner, color)) = surroundings.identify(hit.shape) else {
            return;
        };
        if !hit.fraction.is_finite()
            || !utils::is_finite2(&hit.normal)
            || !color.iter().all(|c| c.is_finite())
        {
            warn!("Sensor ignoring non-finite hit on {:?}", owner);
            return;
        }

        self.owner_hit = Some(owner);
        self.normal_hit = Some(hit.normal);
        for (channel, target) in self.results[..3].iter_mut().zip(color.iter()) {
            *channel += (target - *channel) * self.fadeout;
        }
        self.results[3] = utils::clamp(hit.fraction, 0.0, 1.0);
    }

    /// Update the segment and process it in one go
    pub fn sense(
        &mut self,
        position: Vec2,
        orientation: Vec2,
        mirrored: bool,
        surroundings: &Surroundings<'_>,
        exclude: CollisionGroup,
    ) {
        if self.update_segment(position, orientation, mirrored) {
            self.process(surroundings, exclude);
        }
    }

    /// Smoothed color of what the ray sees
    pub fn color(&self) -> Color {
        Color::new(self.results[0], self.results[1], self.results[2])
    }

    /// Hit fraction along the ray (1.0 when nothing is in range)
    pub fn distance(&self) -> f32 {
        self.results[3]
    }

    /// All four channels
    pub fn results(&self) -> [f32; 4] {
        self.results
    }

    /// Entity hit by the last cast
    pub fn owner_hit(&self) -> Option<EntityKey> {
        self.owner_hit
    }

    /// Surface normal at the last hit
    pub fn normal_hit(&self) -> Option<Vec2> {
        self.normal_hit
    }

    /// Current ray segment
    pub fn segment(&self) -> RaySegment {
        RaySegment::new(self.start, self.end)
    }

    /// Dead-zone radius
    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    /// Sensing range
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Angular offset from forward (radians)
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Smoothing factor
    pub fn fadeout(&self) -> f32 {
        self.fadeout
    }

    #[cfg(test)]
    pub(crate) fn set_results(&mut self, results: [f32; 4]) {
        self.results = results;
    }

    pub(crate) fn clear_color(&mut self) {
        self.results[..3].fill(0.0);
    }

    /// Dot at the ray end and, after a hit, a line up to the hit point
    pub fn draw(&self, list: &mut DrawList) {
        let color = self.color();
        list.dot(self.end, color);
        if self.owner_hit.is_some() {
            list.line(self.start, self.segment().point_at(self.distance()), 0.0, color);
        }
    }
}
