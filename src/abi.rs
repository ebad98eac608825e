// Kernel page-table export ABI.
//
// Layout references:
//   Documentation/admin-guide/mm/pagemap.rst
//   include/uapi/linux/kernel-page-flags.h
//   include/linux/kernel-page-flags.h (kernel-internal bits, may change)
//
// Every bit position used by the crate lives in this file. Everything else
// goes through `PageTableEntry::decode` and `KpageFlags`.

use bitflags::bitflags;

/// Size of one `/proc/<pid>/pagemap` entry in bytes.
pub const PAGEMAP_ENTRY_SIZE: u64 = 8;

/// Size of one `/proc/kpagecount` or `/proc/kpageflags` entry in bytes.
pub const KPAGE_ENTRY_SIZE: u64 = 8;

pub const KPAGECOUNT_PATH: &str = "/proc/kpagecount";
pub const KPAGEFLAGS_PATH: &str = "/proc/kpageflags";

const PM_PRESENT: u64 = 1 << 63;
const PM_SWAPPED: u64 = 1 << 62;
// Bits 0-54
const PM_PFN_MASK: u64 = (1 << 55) - 1;
// Bits 0-4
const PM_SWAP_TYPE_MASK: u64 = 0x1f;
// Bits 5-54
const PM_SWAP_OFFSET_MASK: u64 = PM_PFN_MASK & !PM_SWAP_TYPE_MASK;
const PM_SWAP_OFFSET_SHIFT: u32 = 5;

/// Location of a swapped-out page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapLocation {
    /// Swap area index.
    pub slot: u8,
    /// Page offset inside the swap area.
    pub offset: u64,
}

/// Decoded form of one raw pagemap word.
///
/// `present` and `swapped` are tested independently: some kernels report
/// both for a page that sits in the swap cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub present: bool,
    pub swapped: bool,
    /// Physical frame number, only when `present`.
    pub pfn: Option<u64>,
    /// Swap location, only when `swapped` and not `present`.
    pub swap: Option<SwapLocation>,
}

impl PageTableEntry {
    pub fn decode(raw: u64) -> Self {
        let present = raw & PM_PRESENT != 0;
        let swapped = raw & PM_SWAPPED != 0;

        let pfn = present.then_some(raw & PM_PFN_MASK);
        let swap = (swapped && !present).then(|| SwapLocation {
            slot: (raw & PM_SWAP_TYPE_MASK) as u8,
            offset: (raw & PM_SWAP_OFFSET_MASK) >> PM_SWAP_OFFSET_SHIFT,
        });

        Self {
            present,
            swapped,
            pfn,
            swap,
        }
    }

    /// Page was never faulted in, or its range is unmapped.
    pub fn is_absent(&self) -> bool {
        !self.present && !self.swapped
    }
}

bitflags! {
    /// Physical frame flags as exported through `/proc/kpageflags`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct KpageFlags: u64 {
        const LOCKED = 1 << 0;
        const ERROR = 1 << 1;
        const REFERENCED = 1 << 2;
        const UPTODATE = 1 << 3;
        const DIRTY = 1 << 4;
        const LRU = 1 << 5;
        const ACTIVE = 1 << 6;
        const SLAB = 1 << 7;
        const WRITEBACK = 1 << 8;
        const RECLAIM = 1 << 9;
        const BUDDY = 1 << 10;
        const MMAP = 1 << 11;
        const ANON = 1 << 12;
        const SWAPCACHE = 1 << 13;
        const SWAPBACKED = 1 << 14;
        const COMPOUND_HEAD = 1 << 15;
        const COMPOUND_TAIL = 1 << 16;
        const HUGE = 1 << 17;
        const UNEVICTABLE = 1 << 18;
        const HWPOISON = 1 << 19;
        const NOPAGE = 1 << 20;
        const KSM = 1 << 21;
        const THP = 1 << 22;
        const BALLOON = 1 << 23;
        const ZERO_PAGE = 1 << 24;
        const IDLE = 1 << 25;
        const PGTABLE = 1 << 26;

        // Kernel-internal, subject to change between releases.
        const RESERVED = 1 << 32;
        const MLOCKED = 1 << 33;
        const MAPPEDTODISK = 1 << 34;
        const PRIVATE = 1 << 35;
        const PRIVATE_2 = 1 << 36;
        const OWNER_PRIVATE = 1 << 37;
        const ARCH = 1 << 38;
        const UNCACHED = 1 << 39;
        const SOFTDIRTY = 1 << 40;
        const ARCH_2 = 1 << 41;
    }
}

/// First bit whose meaning is not part of the stable user ABI.
pub const KPF_UNSTABLE_FIRST_BIT: u32 = 32;

impl KpageFlags {
    /// Either flavour of huge page.
    pub const ANY_HUGE: Self = Self::HUGE.union(Self::THP);

    /// Name of a single flag bit, if the kernel headers define one.
    pub fn bit_name(bit: u32) -> Option<&'static str> {
        if bit >= u64::BITS {
            return None;
        }
        Self::from_bits_retain(1 << bit)
            .iter_names()
            .next()
            .map(|(name, _)| name)
    }
}
