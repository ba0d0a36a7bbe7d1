use crate::error::{Result, ShadowError};
use crate::gf251::Gf251;

/// A polynomial over GF(251), stored as a coefficient vector
///
/// Index 0 is the constant term and index `degree()` the highest term.
/// Values are immutable once constructed; the two construction paths are
/// a direct coefficient vector ([`Polynomial::new`] / [`Polynomial::from_bytes`])
/// and interpolation from sample points ([`Polynomial::interpolate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<Gf251>,
}

impl Polynomial {
    /// Creates a polynomial from its coefficient vector
    pub fn new(coefficients: Vec<Gf251>) -> Self {
        Self { coefficients }
    }

    /// Creates a polynomial from raw bytes, reducing each into the field
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            coefficients: bytes.iter().map(|&b| Gf251::new(b)).collect(),
        }
    }

    /// The polynomial degree (coefficient count minus one)
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// The coefficient of the `x^i` term
    ///
    /// # Panics
    /// Panics if `i` exceeds the degree.
    pub fn coefficient(&self, i: usize) -> Gf251 {
        self.coefficients[i]
    }

    /// All coefficients, constant term first
    pub fn coefficients(&self) -> &[Gf251] {
        &self.coefficients
    }

    /// Evaluates the polynomial at `x` using Horner's method
    pub fn evaluate(&self, x: Gf251) -> Gf251 {
        self.coefficients
            .iter()
            .rev()
            .fold(Gf251::new(0), |acc, &coeff| acc * x + coeff)
    }

    /// Recovers the unique degree-(n-1) polynomial through `n` sample points
    ///
    /// Builds the Vandermonde system `V * c = y` (row i = `[1, x_i, x_i^2, ...]`)
    /// and solves it by Gauss-Jordan elimination. The field has no ordering, so
    /// pivoting just searches the remaining rows for any nonzero entry in the
    /// current column.
    ///
    /// # Errors
    /// - [`ShadowError::DuplicateXValue`] if two points share an x-coordinate
    /// - [`ShadowError::SingularSystem`] if no nonzero pivot exists for a column
    pub fn interpolate(points: &[(Gf251, Gf251)]) -> Result<Self> {
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if points[i].0 == points[j].0 {
                    return Err(ShadowError::DuplicateXValue(points[i].0.value()));
                }
            }
        }

        let n = points.len();
        let mut rhs: Vec<Gf251> = points.iter().map(|&(_, y)| y).collect();

        // Vandermonde matrix, one row per sample point
        let mut matrix: Vec<Vec<Gf251>> = points
            .iter()
            .map(|&(x, _)| {
                let mut row = Vec::with_capacity(n);
                let mut power = Gf251::new(1);
                for _ in 0..n {
                    row.push(power);
                    power = power * x;
                }
                row
            })
            .collect();

        for i in 0..n {
            // Find a nonzero pivot in this column among the unprocessed rows
            if matrix[i][i] == Gf251::new(0) {
                let swap = (i + 1..n).find(|&j| matrix[j][i] != Gf251::new(0));
                match swap {
                    Some(j) => {
                        matrix.swap(i, j);
                        rhs.swap(i, j);
                    }
                    None => return Err(ShadowError::SingularSystem),
                }
            }

            // Normalize the pivot row
            let inv = matrix[i][i].inverse()?;
            for entry in matrix[i].iter_mut().skip(i) {
                *entry = *entry * inv;
            }
            rhs[i] = rhs[i] * inv;

            // Eliminate the column from every other row
            for j in 0..n {
                if j == i {
                    continue;
                }
                let factor = matrix[j][i];
                if factor == Gf251::new(0) {
                    continue;
                }
                for col in i..n {
                    let pivot_entry = matrix[i][col];
                    matrix[j][col] = matrix[j][col] - factor * pivot_entry;
                }
                rhs[j] = rhs[j] - factor * rhs[i];
            }
        }

        // After full elimination the RHS holds the coefficient vector
        Ok(Self { coefficients: rhs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gf(v: u8) -> Gf251 {
        Gf251::new(v)
    }

    #[test]
    fn test_evaluate_constant() {
        let p = Polynomial::new(vec![gf(42)]);
        for x in [0u8, 1, 100, 250] {
            assert_eq!(p.evaluate(gf(x)), gf(42));
        }
    }

    #[test]
    fn test_evaluate_known_values() {
        // p(x) = 3 + 2x + x^2
        let p = Polynomial::from_bytes(&[3, 2, 1]);
        assert_eq!(p.evaluate(gf(0)), gf(3));
        assert_eq!(p.evaluate(gf(1)), gf(6));
        assert_eq!(p.evaluate(gf(2)), gf(11));
        // 3 + 2*250 + 250^2 = 63003, 63003 mod 251 = 2
        assert_eq!(p.evaluate(gf(250)), gf(2));
    }

    #[test]
    fn test_evaluate_deterministic() {
        let p = Polynomial::from_bytes(&[7, 13, 101, 250]);
        let first = p.evaluate(gf(5));
        for _ in 0..10 {
            assert_eq!(p.evaluate(gf(5)), first);
        }
    }

    #[test]
    fn test_interpolate_roundtrip() {
        for coeffs in [
            vec![1u8],
            vec![10, 20],
            vec![5, 0, 250],
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        ] {
            let p = Polynomial::from_bytes(&coeffs);
            let points: Vec<(Gf251, Gf251)> = (1..=coeffs.len() as u8)
                .map(|x| (gf(x), p.evaluate(gf(x))))
                .collect();
            let q = Polynomial::interpolate(&points).unwrap();
            assert_eq!(q, p);
        }
    }

    #[test]
    fn test_interpolate_point_order_irrelevant() {
        let p = Polynomial::from_bytes(&[9, 8, 7]);
        let mut points: Vec<(Gf251, Gf251)> = [5u8, 1, 3]
            .iter()
            .map(|&x| (gf(x), p.evaluate(gf(x))))
            .collect();
        let q = Polynomial::interpolate(&points).unwrap();
        assert_eq!(q, p);

        points.reverse();
        assert_eq!(Polynomial::interpolate(&points).unwrap(), p);
    }

    #[test]
    fn test_interpolate_passes_through_points() {
        let points = vec![(gf(1), gf(100)), (gf(2), gf(17)), (gf(7), gf(250))];
        let p = Polynomial::interpolate(&points).unwrap();
        assert_eq!(p.degree(), 2);
        for (x, y) in points {
            assert_eq!(p.evaluate(x), y);
        }
    }

    #[test]
    fn test_interpolate_with_zero_x() {
        // x = 0 forces a pivot swap in the second column
        let p = Polynomial::from_bytes(&[11, 22, 33]);
        let points: Vec<(Gf251, Gf251)> = [0u8, 1, 2]
            .iter()
            .map(|&x| (gf(x), p.evaluate(gf(x))))
            .collect();
        assert_eq!(Polynomial::interpolate(&points).unwrap(), p);
    }

    #[test]
    fn test_interpolate_duplicate_x() {
        let points = vec![(gf(1), gf(2)), (gf(1), gf(3)), (gf(4), gf(5))];
        assert!(matches!(
            Polynomial::interpolate(&points),
            Err(ShadowError::DuplicateXValue(1))
        ));
    }
}
