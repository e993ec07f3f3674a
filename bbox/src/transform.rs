use super::TLBR;
use crate::common::*;

/// Axis-aligned affine transform applied to box coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transform<T> {
    pub sy: T,
    pub sx: T,
    pub ty: T,
    pub tx: T,
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Uniform scaling about the origin, as used when projecting boxes into
    /// a resized image.
    pub fn from_scale(scale: T) -> Self {
        Self {
            sy: scale,
            sx: scale,
            ty: T::zero(),
            tx: T::zero(),
        }
    }
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd + Neg<Output = T>,
{
    /// Mirror along the vertical axis of an image `width` pixels wide.
    ///
    /// Box corners are treated as inclusive pixel indices, so `x` maps to
    /// `width - x - 1`.
    pub fn horizontal_flip(width: T) -> Self {
        Self {
            sy: T::one(),
            sx: -T::one(),
            ty: T::zero(),
            tx: width - T::one(),
        }
    }
}

impl<T> Mul<&TLBR<T>> for &Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    type Output = TLBR<T>;

    fn mul(self, rhs: &TLBR<T>) -> Self::Output {
        rhs.transform(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RectNum;

    #[test]
    fn rect_scale() {
        let bbox = TLBR::try_from_xyxy([10.0, 20.0, 30.0, 40.0]).unwrap();
        let scaled = &Transform::from_scale(1.5) * &bbox;
        assert_eq!(scaled.xyxy(), [15.0, 30.0, 45.0, 60.0]);
    }

    #[test]
    fn rect_horizontal_flip() {
        let bbox = TLBR::try_from_xyxy([10.0, 20.0, 30.0, 40.0]).unwrap();
        let flip = Transform::horizontal_flip(100.0);
        let flipped = &flip * &bbox;
        assert_eq!(flipped.xyxy(), [69.0, 20.0, 89.0, 40.0]);
        assert_eq!(&flip * &flipped, bbox);
    }
}
