use std::ops::{Add, Mul, Sub};

use once_cell::sync::Lazy;

use crate::error::{Result, ShadowError};

/// The field modulus. 251 is the largest prime below 256, so byte values
/// mostly fit and every nonzero residue has a multiplicative inverse.
pub const PRIME: u16 = 251;

/// Precomputed multiplicative inverses for all nonzero residues.
///
/// Inversion sits on the innermost hot path of both interpolation and
/// evaluation, so it is computed once via Fermat (a^249 mod 251) and
/// shared by read-only reference afterwards. Index 0 is unused.
static INVERSES: Lazy<[u8; PRIME as usize]> = Lazy::new(|| {
    let mut table = [0u8; PRIME as usize];
    for a in 1..PRIME {
        table[a as usize] = pow_mod(a, PRIME as u32 - 2);
    }
    table
});

/// Square-and-multiply exponentiation modulo 251
fn pow_mod(base: u16, mut exp: u32) -> u8 {
    let mut result: u16 = 1;
    let mut base = base % PRIME;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result * base) % PRIME;
        }
        base = (base * base) % PRIME;
        exp >>= 1;
    }
    result as u8
}

/// An element of the prime field GF(251)
///
/// The wrapped value is always in `[0, 250]`; every arithmetic result is
/// reduced back into that range.
///
/// # Example
/// ```
/// use shadow_share::Gf251;
///
/// let a = Gf251::new(200);
/// let b = Gf251::new(100);
/// assert_eq!((a + b).value(), 49); // 300 mod 251
/// assert_eq!((a * b).value(), 171); // 20000 mod 251
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gf251(u8);

impl Gf251 {
    /// Creates a field element, reducing the input modulo 251
    #[inline]
    pub fn new(value: u8) -> Self {
        Self(value % PRIME as u8)
    }

    /// The canonical representative in `[0, 250]`
    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Additive inverse
    #[inline]
    pub fn negate(self) -> Self {
        Self(((PRIME - self.0 as u16) % PRIME) as u8)
    }

    /// Exponentiation using square-and-multiply
    #[inline]
    pub fn pow(self, exp: u32) -> Self {
        Self(pow_mod(self.0 as u16, exp))
    }

    /// Multiplicative inverse, looked up from the precomputed table
    ///
    /// Zero has no inverse and fails with [`ShadowError::DivisionByZero`].
    ///
    /// # Example
    /// ```
    /// use shadow_share::Gf251;
    ///
    /// let a = Gf251::new(17);
    /// assert_eq!(a * a.inverse().unwrap(), Gf251::new(1));
    /// assert!(Gf251::new(0).inverse().is_err());
    /// ```
    #[inline]
    pub fn inverse(self) -> Result<Self> {
        if self.0 == 0 {
            Err(ShadowError::DivisionByZero)
        } else {
            Ok(Self(INVERSES[self.0 as usize]))
        }
    }

    /// Division as multiplication by the inverse of `other`
    #[inline]
    pub fn divide(self, other: Self) -> Result<Self> {
        Ok(self * other.inverse()?)
    }
}

impl Add for Gf251 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self(((self.0 as u16 + other.0 as u16) % PRIME) as u8)
    }
}

impl Sub for Gf251 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self(((PRIME + self.0 as u16 - other.0 as u16) % PRIME) as u8)
    }
}

impl Mul for Gf251 {
    type Output = Self;
    #[inline]
    fn mul(self, other: Self) -> Self {
        Self(((self.0 as u16 * other.0 as u16) % PRIME) as u8)
    }
}
