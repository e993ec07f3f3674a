use crate::common::*;

/// Image or box size in height/width order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HW<T> {
    h: T,
    w: T,
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_hw(hw: [T; 2]) -> Result<Self> {
        let [h, w] = hw;
        let zero = T::zero();
        ensure!(
            h >= zero && w >= zero,
            "height and width parameters must be non-negative"
        );
        Ok(Self { h, w })
    }

    pub fn from_hw(hw: [T; 2]) -> Self {
        Self::try_from_hw(hw).unwrap()
    }

    pub fn hw(&self) -> [T; 2] {
        [self.h, self.w]
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn w(&self) -> T {
        self.w
    }

    /// The shorter side.
    pub fn min_side(&self) -> T {
        if self.h <= self.w {
            self.h
        } else {
            self.w
        }
    }

    /// The longer side.
    pub fn max_side(&self) -> T {
        if self.h >= self.w {
            self.h
        } else {
            self.w
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_sides() {
        let size = HW::from_hw([480usize, 640]);
        assert_eq!(size.min_side(), 480);
        assert_eq!(size.max_side(), 640);
        assert!(HW::try_from_hw([-1.0, 2.0]).is_err());
    }
}
