//! Signed angles in radians.

use serde::{Deserialize, Serialize};
use std::f32::consts;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A signed angle. The value is stored in radians; degree helpers are pure
/// conversions. All rotation angles at the public API are `Angle`s.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle {
    radians: f32,
}

impl Angle {
    pub const ZERO: Angle = Angle { radians: 0.0 };
    pub const PI: Angle = Angle {
        radians: consts::PI,
    };
    pub const HALF_PI: Angle = Angle {
        radians: consts::FRAC_PI_2,
    };
    /// A quarter of a full revolution (π/2).
    pub const QUARTER_TURN: Angle = Angle {
        radians: consts::FRAC_PI_2,
    };
    /// Half of a full revolution (π).
    pub const HALF_TURN: Angle = Angle {
        radians: consts::PI,
    };
    /// One full revolution (2π).
    pub const FULL_TURN: Angle = Angle {
        radians: consts::TAU,
    };

    pub const fn radians(radians: f32) -> Self {
        Angle { radians }
    }

    pub fn degrees(degrees: f32) -> Self {
        Angle {
            radians: degrees.to_radians(),
        }
    }

    pub const fn to_radians(self) -> f32 {
        self.radians
    }

    pub fn to_degrees(self) -> f32 {
        self.radians.to_degrees()
    }

    /// Returns the equivalent angle in the interval `[0, 2π)`.
    pub fn normalized(self) -> Angle {
        let mut r = self.radians.rem_euclid(consts::TAU);
        if r >= consts::TAU {
            r = 0.0;
        }
        Angle { radians: r }
    }

    pub fn abs(self) -> Angle {
        Angle {
            radians: self.radians.abs(),
        }
    }

    /// Euclidean modulo; the result has the sign of `modulus`.
    pub fn modulo(self, modulus: Angle) -> Angle {
        Angle {
            radians: self.radians.rem_euclid(modulus.radians),
        }
    }

    pub fn sin(self) -> f32 {
        self.radians.sin()
    }

    pub fn cos(self) -> f32 {
        self.radians.cos()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}π", self.radians / consts::PI)
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle {
            radians: self.radians + rhs.radians,
        }
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        self.radians += rhs.radians;
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle {
            radians: self.radians - rhs.radians,
        }
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) {
        self.radians -= rhs.radians;
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle {
            radians: -self.radians,
        }
    }
}

impl Mul<f32> for Angle {
    type Output = Angle;
    fn mul(self, rhs: f32) -> Angle {
        Angle {
            radians: self.radians * rhs,
        }
    }
}

impl Mul<Angle> for f32 {
    type Output = Angle;
    fn mul(self, rhs: Angle) -> Angle {
        Angle {
            radians: self * rhs.radians,
        }
    }
}

impl Div<f32> for Angle {
    type Output = Angle;
    fn div(self, rhs: f32) -> Angle {
        Angle {
            radians: self.radians / rhs,
        }
    }
}

impl Div<Angle> for Angle {
    type Output = f32;
    fn div(self, rhs: Angle) -> f32 {
        self.radians / rhs.radians
    }
}
