//! Body records and snapshots.
//!
//! A [`Snapshot`] is the full state of every body at one instant. Body order
//! is positional identity: index `i` denotes the same body in every snapshot
//! of a series, across both data sources.

use nalgebra::Vector3;
use serde::Serialize;
use thiserror::Error;

/// Field names of one fixed-layout record, in wire order.
pub const FIELD_NAMES: [&str; 8] = ["x", "y", "z", "vx", "vy", "vz", "mass", "radius"];

/// Reasons a set of values cannot form a [`Body`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BodyError {
    /// One of the eight fields is NaN or infinite
    #[error("Non-finite {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Mass below zero
    #[error("Negative mass: {0}")]
    NegativeMass(f64),
}

/// One point mass at one instant.
///
/// All eight fields are finite and `mass >= 0`; the constructors enforce
/// this, so a `Body` in hand is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Body {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    mass: f64,
    radius: f64,
}

impl Body {
    /// Creates a validated body.
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        mass: f64,
        radius: f64,
    ) -> Result<Self, BodyError> {
        Self::from_record([
            position.x, position.y, position.z,
            velocity.x, velocity.y, velocity.z,
            mass, radius,
        ])
    }

    /// Creates a body from the flat `[x, y, z, vx, vy, vz, mass, radius]` layout.
    pub fn from_record(record: [f64; 8]) -> Result<Self, BodyError> {
        for (field, value) in FIELD_NAMES.into_iter().zip(record) {
            if !value.is_finite() {
                return Err(BodyError::NonFinite { field, value });
            }
        }

        let [x, y, z, vx, vy, vz, mass, radius] = record;
        if mass < 0.0 {
            return Err(BodyError::NegativeMass(mass));
        }

        Ok(Self {
            position: Vector3::new(x, y, z),
            velocity: Vector3::new(vx, vy, vz),
            mass,
            radius,
        })
    }

    /// Returns the flat record in wire order.
    pub fn to_record(&self) -> [f64; 8] {
        [
            self.position.x, self.position.y, self.position.z,
            self.velocity.x, self.velocity.y, self.velocity.z,
            self.mass, self.radius,
        ]
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn velocity(&self) -> &Vector3<f64> {
        &self.velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Errors from assembling a [`Snapshot`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// The wire format stores the body count as a u32
    #[error("Too many bodies: {0} does not fit the u32 body count")]
    TooManyBodies(usize),
}

/// Ordered bodies sharing one instant in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    bodies: Vec<Body>,
}

impl Snapshot {
    /// Creates a snapshot from bodies in their positional order.
    pub fn new(bodies: Vec<Body>) -> Result<Self, SnapshotError> {
        if u32::try_from(bodies.len()).is_err() {
            return Err(SnapshotError::TooManyBodies(bodies.len()));
        }
        Ok(Self { bodies })
    }

    /// Creates a snapshot with no bodies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Used by the codec, which has already bounded the count by a u32.
    pub(crate) fn from_decoded(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Body count as written in the snapshot header.
    pub fn count(&self) -> u32 {
        // Bounded by the constructors.
        self.bodies.len() as u32
    }

    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Body;
    type IntoIter = std::slice::Iter<'a, Body>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}
