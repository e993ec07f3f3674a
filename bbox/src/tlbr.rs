use super::Rect;
use crate::{common::*, Transform};

/// Bounding box in TLBR format.
///
/// Region proposals are usually stored as `[x1, y1, x2, y2]`. Use
/// [RectNum::try_from_xyxy](crate::RectNum::try_from_xyxy) and
/// [RectNum::xyxy](crate::RectNum::xyxy) to convert from and to that layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TLBR<T> {
    t: T,
    l: T,
    b: T,
    r: T,
}

impl<T> TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Apply the transform. Sides are swapped back in order when a negative
    /// factor mirrors the box.
    pub fn transform(&self, transform: &Transform<T>) -> Self {
        let t = self.t * transform.sy + transform.ty;
        let l = self.l * transform.sx + transform.tx;
        let b = self.b * transform.sy + transform.ty;
        let r = self.r * transform.sx + transform.tx;
        let (t, b) = if t <= b { (t, b) } else { (b, t) };
        let (l, r) = if l <= r { (l, r) } else { (r, l) };
        TLBR { t, l, b, r }
    }
}

impl<T> Rect for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn t(&self) -> Self::Type {
        self.t
    }

    fn l(&self) -> Self::Type {
        self.l
    }

    fn b(&self) -> Self::Type {
        self.b
    }

    fn r(&self) -> Self::Type {
        self.r
    }

    fn h(&self) -> Self::Type {
        self.b - self.t
    }

    fn w(&self) -> Self::Type {
        self.r - self.l
    }

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self> {
        let [t, l, b, r] = tlbr;
        ensure!(b >= t && r >= l, "b >= t and r >= l must hold");

        Ok(Self { t, l, b, r })
    }
}
