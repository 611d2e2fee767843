//! Simple zero-overhead unit of measure types
//!
//! Keeps angular units correct by construction while leaving the storage type
//! visible. Coordinates are stored in [`Degrees`]; the transform's
//! trigonometry works in [`Radians`].

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq, relative_eq};
use num_traits::{Float, FloatConst, Num, NumCast};

macro_rules! unit_of_measure {
    ($u:ident, $suffix:literal) => {
        #[derive(Clone, Copy, Default, PartialEq, PartialOrd, Debug)]
        pub struct $u<N: Num>(pub N);

        impl<N> Add for $u<N>
        where
            N: Num + Add,
        {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl<N> AddAssign for $u<N>
        where
            N: Num + AddAssign,
        {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl<N> Sub for $u<N>
        where
            N: Num + Sub,
        {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl<N> SubAssign for $u<N>
        where
            N: Num + SubAssign,
        {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl<N> Neg for $u<N>
        where
            N: Num + Neg<Output = N>,
        {
            type Output = Self;

            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl<N> Mul<N> for $u<N>
        where
            N: Num + Mul,
        {
            type Output = Self;

            fn mul(self, rhs: N) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl<N> Div<N> for $u<N>
        where
            N: Num + Div,
        {
            type Output = Self;

            fn div(self, rhs: N) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl<N> Display for $u<N>
        where
            N: Num + Display,
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*}{}", p, self.0, $suffix),
                    None => write!(f, "{}{}", self.0, $suffix),
                }
            }
        }

        // Relative equality traits for appox support

        impl<N> AbsDiffEq for $u<N>
        where
            N: Num + Float + AbsDiffEq<N, Epsilon = N>,
        {
            type Epsilon = N;

            fn default_epsilon() -> Self::Epsilon {
                N::epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                self.0.abs_diff_eq(&other.0, epsilon)
            }
        }

        impl<N> RelativeEq for $u<N>
        where
            N: Num + Float + AbsDiffEq<N, Epsilon = N> + RelativeEq<N>,
        {
            fn default_max_relative() -> Self::Epsilon {
                N::epsilon()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                relative_eq!(
                    self.0,
                    other.0,
                    epsilon = epsilon,
                    max_relative = max_relative
                )
            }
        }
    };
}

// Angular units:
unit_of_measure![Degrees, "°"];
unit_of_measure![Radians, " rad"];

impl<N> From<Degrees<N>> for Radians<N>
where
    N: Float + FloatConst,
{
    /// Same operation order as `lat / 180.0 * PI`, which the GCJ-02 offset
    /// depends on for bit-compatible results.
    fn from(value: Degrees<N>) -> Self {
        Radians(value.0 / <N as NumCast>::from(180u8).unwrap_or_else(N::nan) * N::PI())
    }
}

impl<N> From<Radians<N>> for Degrees<N>
where
    N: Float + FloatConst,
{
    fn from(value: Radians<N>) -> Self {
        Degrees(value.0 * <N as NumCast>::from(180u8).unwrap_or_else(N::nan) / N::PI())
    }
}
