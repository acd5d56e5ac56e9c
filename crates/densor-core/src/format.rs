//! Text rendering for tensors and views.
//!
//! `Display` prints nested brackets with each column right-aligned to its
//! widest entry. The formatter's precision applies to every element
//! (`{:.2}`), defaulting to four decimal places.
//!
//! ```text
//! [[ 1.0000, -2.5000],
//!  [10.0000,  0.0000]]
//! ```

use std::fmt;

use crate::element::Element;
use crate::matrix::Matrix;

const DEFAULT_PRECISION: usize = 4;

pub(crate) fn write_matrix<T: Element>(
    f: &mut fmt::Formatter<'_>,
    m: &(impl Matrix<T> + ?Sized),
) -> fmt::Result {
    let (rows, cols) = (m.rows(), m.cols());
    if rows == 0 || cols == 0 {
        return write!(f, "[]");
    }
    let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
    let cells: Vec<String> = m
        .data()
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect();

    let mut widths = vec![0usize; cols];
    for (i, cell) in cells.iter().enumerate() {
        let w = &mut widths[i % cols];
        *w = (*w).max(cell.len());
    }

    f.write_str("[")?;
    for r in 0..rows {
        if r > 0 {
            f.write_str(",\n ")?;
        }
        f.write_str("[")?;
        for c in 0..cols {
            if c > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:>width$}", cells[r * cols + c], width = widths[c])?;
        }
        f.write_str("]")?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use crate::Dense;

    #[test]
    fn test_display_alignment() {
        let t = Dense::new(2, 2, &[1.0f32, -2.5, 10.0, 0.0]);
        assert_eq!(
            format!("{}", t),
            "[[ 1.0000, -2.5000],\n [10.0000,  0.0000]]"
        );
    }

    #[test]
    fn test_display_precision() {
        let t = Dense::row_vector(&[1.0f64, 0.12]);
        assert_eq!(format!("{:.1}", t), "[[1.0, 0.1]]");
    }

    #[test]
    fn test_display_non_finite_and_empty() {
        let t = Dense::vector(&[f64::NAN, f64::NEG_INFINITY]);
        assert_eq!(format!("{:.0}", t), "[[ NaN],\n [-inf]]");
        assert_eq!(format!("{}", Dense::<f32>::zeros(0, 3)), "[]");
    }

    #[test]
    fn test_display_view() {
        let t = Dense::new(1, 4, &[1.0f32, 2.0, 3.0, 4.0]);
        assert_eq!(format!("{:.0}", t.view(2, 2)), "[[1, 2],\n [3, 4]]");
    }
}
