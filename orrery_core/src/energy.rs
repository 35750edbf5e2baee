//! Energy Model - kinetic, gravitational potential and total energy.
//!
//! # Unit systems
//!
//! The gravitational constant only has meaning together with the length, mass
//! and time units of the input. Snapshots from different producers have been
//! written in both astronomical and SI units, so the model never assumes one:
//! every [`EnergyModel`] carries an explicit [`UnitSystem`].
//!
//! | system         | length | mass | time | G                  |
//! |----------------|--------|------|------|--------------------|
//! | `Astronomical` | AU     | M☉   | yr   | 4π²                |
//! | `Si`           | m      | kg   | s    | 6.674 30 × 10⁻¹¹   |
//! | `Natural`      | -      | -    | -    | 1                  |
//! | `Custom`       | -      | -    | -    | caller supplied    |
//!
//! # Singular pairs
//!
//! A pair of bodies at exactly the same position contributes zero potential.
//! Coincident bodies are physically degenerate and are left out of the sum
//! rather than producing an infinite energy.

use crate::body::Snapshot;
use crate::divergence::distance;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, Div};

/// CODATA 2018 Newtonian constant of gravitation [m³ kg⁻¹ s⁻²].
pub const G_SI: f64 = 6.674_30e-11;

/// Gravitational constant in AU³ M☉⁻¹ yr⁻².
pub const G_ASTRONOMICAL: f64 = 4.0 * PI * PI;

/// Unit system of the snapshot data, which fixes the gravitational constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitSystem {
    /// AU / solar mass / year
    #[default]
    Astronomical,

    /// Metre / kilogram / second
    Si,

    /// N-body units with G = 1
    Natural,

    /// Any other system, with its G given explicitly
    Custom { g: f64 },
}

impl UnitSystem {
    /// Returns the gravitational constant in this unit system.
    pub fn gravitational_constant(&self) -> f64 {
        match self {
            UnitSystem::Astronomical => G_ASTRONOMICAL,
            UnitSystem::Si => G_SI,
            UnitSystem::Natural => 1.0,
            UnitSystem::Custom { g } => *g,
        }
    }

    /// Returns the unit system name.
    pub fn name(&self) -> &'static str {
        match self {
            UnitSystem::Astronomical => "astronomical",
            UnitSystem::Si => "si",
            UnitSystem::Natural => "natural",
            UnitSystem::Custom { .. } => "custom",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Custom { g } => write!(f, "custom(G={})", g),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "astronomical" | "au" | "solar" => Ok(UnitSystem::Astronomical),
            "si" | "mks" => Ok(UnitSystem::Si),
            "natural" | "nbody" => Ok(UnitSystem::Natural),
            "custom" => Err("Custom unit systems need an explicit G (use --gravity)".to_string()),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

/// Kinetic, potential and total energy of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Energies {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

impl Energies {
    /// Creates a triple; the total is always `kinetic + potential`.
    pub fn new(kinetic: f64, potential: f64) -> Self {
        Self {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }

    /// Relative change of total energy against an earlier state.
    ///
    /// Returns 0 when the initial total is exactly zero.
    pub fn relative_drift(&self, initial: &Energies) -> f64 {
        if initial.total == 0.0 {
            0.0
        } else {
            (self.total - initial.total) / initial.total.abs()
        }
    }
}

impl Add for Energies {
    type Output = Energies;

    fn add(self, rhs: Energies) -> Energies {
        Energies {
            kinetic: self.kinetic + rhs.kinetic,
            potential: self.potential + rhs.potential,
            total: self.total + rhs.total,
        }
    }
}

impl Div<f64> for Energies {
    type Output = Energies;

    fn div(self, rhs: f64) -> Energies {
        Energies {
            kinetic: self.kinetic / rhs,
            potential: self.potential / rhs,
            total: self.total / rhs,
        }
    }
}

impl Sum for Energies {
    fn sum<I: Iterator<Item = Energies>>(iter: I) -> Self {
        iter.fold(Energies::default(), Add::add)
    }
}

/// Computes energies of snapshots under a fixed unit system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyModel {
    units: UnitSystem,
    g: f64,
}

impl EnergyModel {
    /// Creates a model for the given unit system.
    pub fn new(units: UnitSystem) -> Self {
        Self {
            units,
            g: units.gravitational_constant(),
        }
    }

    /// Creates a model with an explicit gravitational constant.
    pub fn with_gravitational_constant(g: f64) -> Self {
        Self::new(UnitSystem::Custom { g })
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.g
    }

    /// Sum of `0.5 * m * |v|²` over all bodies.
    pub fn kinetic(&self, snapshot: &Snapshot) -> f64 {
        snapshot
            .iter()
            .map(|body| 0.5 * body.mass() * body.velocity().norm_squared())
            .sum()
    }

    /// Sum of `-G * m_i * m_j / r_ij` over unordered pairs.
    ///
    /// O(n²) in the body count. Pairs at identical positions contribute nothing;
    /// any other pair counts, however close.
    pub fn potential(&self, snapshot: &Snapshot) -> f64 {
        let bodies = snapshot.bodies();
        let mut potential = 0.0;

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if a.position() == b.position() {
                    continue;
                }
                let r = distance(a.position(), b.position());
                potential -= self.g * a.mass() * b.mass() / r;
            }
        }

        potential
    }

    /// Kinetic, potential and total energy of a snapshot.
    pub fn energies(&self, snapshot: &Snapshot) -> Energies {
        Energies::new(self.kinetic(snapshot), self.potential(snapshot))
    }
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self::new(UnitSystem::default())
    }
}
