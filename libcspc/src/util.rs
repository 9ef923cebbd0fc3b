use std::{
    cmp::Ordering::{Equal, Greater, Less},
    ops::{AddAssign, Div, DivAssign, MulAssign},
};

#[cfg(test)]
#[ctor::ctor]
fn init_backtrace() {
    color_backtrace::install();
}

/// The smallest positive normal double. Probabilities are clamped
/// to this value before taking logarithms so that log weights stay finite.
pub const PROBABILITY_FLOOR: f64 = f64::MIN_POSITIVE;

/// ln(PROBABILITY_FLOOR), roughly -708.4
pub const LOG_FLOOR: f64 = -708.3964185322641;

pub trait LogAbuse {
    fn ln_or_floor(self) -> f64;
}

impl LogAbuse for f64 {
    fn ln_or_floor(self) -> f64 {
        self.max(PROBABILITY_FLOOR).ln()
    }
}

pub trait Float:
    PartialOrd + Copy + Div<Output = Self> + AddAssign + DivAssign + MulAssign
{
    fn from_usize(n: usize) -> Self;
    fn is_finite_value(self) -> bool;
}

impl Float for f64 {
    fn from_usize(n: usize) -> Self {
        n as f64
    }

    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

pub trait VecMath<T>
where
    T: Float,
{
    fn total(&self) -> T;
    fn argmax(&self) -> Option<usize>;
    fn normalize(&mut self) -> bool;
    fn fill_uniform(&mut self);
    fn scale(&mut self, factor: T);
}

impl<T> VecMath<T> for [T]
where
    T: Float,
{
    fn total(&self) -> T {
        let mut sum = T::from_usize(0);
        self.iter().for_each(|&item| sum += item);
        sum
    }

    fn argmax(&self) -> Option<usize> {
        let mut max = *self.first()?;
        let mut argmax: usize = 0;

        for (idx, &item) in self.iter().enumerate().skip(1) {
            if item > max {
                max = item;
                argmax = idx;
            }
        }

        Some(argmax)
    }

    /// Scale the values so that they sum to one.
    ///
    /// If the sum is zero or not finite, the values are replaced
    /// by the uniform distribution and false is returned.
    fn normalize(&mut self) -> bool {
        let sum = self.total();

        if sum > T::from_usize(0) && sum.is_finite_value() {
            self.iter_mut().for_each(|item| *item /= sum);
            true
        } else {
            self.fill_uniform();
            false
        }
    }

    fn fill_uniform(&mut self) {
        let mut value = T::from_usize(1);
        value /= T::from_usize(self.len());
        self.iter_mut().for_each(|item| *item = value);
    }

    fn scale(&mut self, factor: T) {
        self.iter_mut().for_each(|item| *item *= factor);
    }
}

pub trait VecUtils<T>
where
    T: Clone,
{
    fn resize_and_reset(&mut self, new_len: usize, value: T);
}

impl<T> VecUtils<T> for Vec<T>
where
    T: Clone,
{
    fn resize_and_reset(&mut self, new_len: usize, value: T) {
        match new_len.cmp(&self.len()) {
            Less => {
                self.truncate(new_len);
                self.iter_mut().for_each(|v| *v = value.clone());
            }
            Equal => self.iter_mut().for_each(|v| *v = value.clone()),
            Greater => {
                self.iter_mut().for_each(|v| *v = value.clone());
                self.resize(new_len, value);
            }
        }
    }
}

/// Shannon entropy (in nats) of a probability vector.
pub fn entropy(probabilities: &[f64]) -> f64 {
    -probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|p| p * p.ln())
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_floor() {
        assert!((PROBABILITY_FLOOR.ln() - LOG_FLOOR).abs() < 1e-12);
        assert_eq!(0.0f64.ln_or_floor(), PROBABILITY_FLOOR.ln());
        assert_eq!(1.0f64.ln_or_floor(), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![1.0f64, 3.0];
        assert!(v.normalize());
        assert_eq!(v, vec![0.25, 0.75]);

        let mut zeros = vec![0.0f64; 4];
        assert!(!zeros.normalize());
        assert_eq!(zeros, vec![0.25; 4]);

        let mut nan = vec![f64::NAN, 1.0];
        assert!(!nan.normalize());
        assert_eq!(nan, vec![0.5, 0.5]);
    }

    #[test]
    fn test_argmax() {
        let v = vec![0.1f64, 0.7, 0.2];
        assert_eq!(v.argmax(), Some(1));
        let empty: Vec<f64> = vec![];
        assert_eq!(empty.argmax(), None);
    }

    #[test]
    fn test_resize_and_reset() {
        let mut v = vec![1.0f64, 2.0, 3.0];
        v.resize_and_reset(5, 0.0);
        assert_eq!(v, vec![0.0; 5]);
        v.resize_and_reset(2, 1.0);
        assert_eq!(v, vec![1.0; 2]);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(&[1.0, 0.0]), 0.0);
        assert!((entropy(&[0.5, 0.5]) - 2.0f64.ln()).abs() < 1e-12);
    }
}
