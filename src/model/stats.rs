use std::ops::AddAssign;

/// Fractional bits of the proportional-share accumulator.
pub const SHARE_FRACTION_BITS: u32 = 8;

/// Residency accumulator for one mapping section or one whole process.
///
/// All byte counts grow monotonically while a scan runs. The reporting side
/// consumes an accumulator with [`ResidencyStats::take`], which leaves a
/// zeroed one behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResidencyStats {
    pub size: u64,
    pub present: u64,
    /// Bytes in frames referenced by at most one mapping.
    pub private: u64,
    /// Sum of `page_size / ref_count`, fixed point with
    /// [`SHARE_FRACTION_BITS`] fractional bits.
    pub share_fixed: u64,
    pub anon: u64,
    pub referenced: u64,
    pub swapped: u64,
    pub huge: u64,
}

impl ResidencyStats {
    /// Account one present page against its reference count.
    pub fn add_ownership(&mut self, page_size: u64, ref_count: u64) {
        if ref_count <= 1 {
            self.private += page_size;
        }
        if ref_count >= 1 {
            self.share_fixed += (page_size << SHARE_FRACTION_BITS) / ref_count;
        }
    }

    /// Proportional share in whole bytes.
    pub fn proportional(&self) -> u64 {
        self.share_fixed >> SHARE_FRACTION_BITS
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for ResidencyStats {
    fn add_assign(&mut self, rhs: Self) {
        self.size += rhs.size;
        self.present += rhs.present;
        self.private += rhs.private;
        self.share_fixed += rhs.share_fixed;
        self.anon += rhs.anon;
        self.referenced += rhs.referenced;
        self.swapped += rhs.swapped;
        self.huge += rhs.huge;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: u64 = 4096;

    #[test]
    fn exclusive_page_is_private() {
        let mut s = ResidencyStats::default();
        s.add_ownership(PAGE, 1);
        assert_eq!(s.private, PAGE);
        assert_eq!(s.proportional(), PAGE);
    }

    #[test]
    fn shared_page_splits_exactly() {
        let mut s = ResidencyStats::default();
        s.add_ownership(PAGE, 2);
        assert_eq!(s.private, 0);
        assert_eq!(s.share_fixed, (PAGE << 8) / 2);
        assert_eq!(s.proportional(), PAGE / 2);
    }

    #[test]
    fn zero_refcount_is_private_without_share() {
        let mut s = ResidencyStats::default();
        s.add_ownership(PAGE, 0);
        assert_eq!(s.private, PAGE);
        assert_eq!(s.share_fixed, 0);
    }

    #[test]
    fn fixed_point_keeps_fractions_across_pages() {
        // 4096 / 3 = 1365.33 per page; exact total is 1_365_333.
        let mut s = ResidencyStats::default();
        for _ in 0..1000 {
            s.add_ownership(PAGE, 3);
        }
        assert_eq!(s.proportional(), 1_365_332);
        assert!(s.proportional() > 1000 * (PAGE / 3));
    }

    #[test]
    fn take_resets() {
        let mut s = ResidencyStats {
            size: 10,
            present: 5,
            ..Default::default()
        };
        let taken = s.take();
        assert_eq!(taken.size, 10);
        assert!(s.is_empty());
    }

    #[test]
    fn add_assign_sums_every_field() {
        let one = ResidencyStats {
            size: 1,
            present: 2,
            private: 3,
            share_fixed: 4,
            anon: 5,
            referenced: 6,
            swapped: 7,
            huge: 8,
        };
        let mut total = one;
        total += one;
        assert_eq!(total.size, 2);
        assert_eq!(total.share_fixed, 8);
        assert_eq!(total.huge, 16);
    }
}
