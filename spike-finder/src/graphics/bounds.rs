#[derive(Default, Clone)]
pub(crate) struct Pair<D: Default> {
    pub(crate) time: D,
    pub(crate) voltage: D,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub(crate) struct Bound {
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl Bound {
    /// The smallest range containing every finite value of `data`, widened by `margin`
    /// times its width on each side. Empty or constant data gets a unit range.
    pub(crate) fn from<I: Iterator<Item = f64>>(margin: f64, data: I) -> Bound {
        let (min, max) = data
            .filter(|value| value.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });
        if min > max {
            return Bound {
                min: -1.0,
                max: 1.0,
            };
        }
        let padding = if max > min {
            (max - min) * margin
        } else {
            1.0
        };
        Bound {
            min: min - padding,
            max: max + padding,
        }
    }

    pub(crate) fn range(&self) -> f64 {
        self.max - self.min
    }
}

pub(crate) type Bounds = Pair<Bound>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data() {
        assert_eq!(
            Bound::from(0.1, std::iter::empty()),
            Bound {
                min: -1.0,
                max: 1.0
            }
        );
    }

    #[test]
    fn constant_data() {
        assert_eq!(
            Bound::from(0.1, [3.0, 3.0].into_iter()),
            Bound { min: 2.0, max: 4.0 }
        );
    }

    #[test]
    fn margin_is_proportional() {
        let bound = Bound::from(0.5, [-2.0, f64::NAN, 2.0].into_iter());
        assert_eq!(bound, Bound { min: -4.0, max: 4.0 });
        assert_eq!(bound.range(), 8.0);
    }
}
