use crate::abi::KpageFlags;
use crate::model::FrameStats;

/// Compound (huge) page attribution state.
///
/// Tail frames of a compound page do not carry their own meaningful flags
/// or reference count, so every tail is attributed with the values cached
/// from the head that opened the group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompoundState {
    #[default]
    Idle,
    InGroup { head: FrameStats },
}

impl CompoundState {
    /// Feed the next present frame and return the frame to attribute it as.
    pub fn advance(&mut self, frame: FrameStats) -> FrameStats {
        let Some(flags) = frame.flags else {
            *self = Self::Idle;
            return frame;
        };

        if flags.contains(KpageFlags::COMPOUND_HEAD) {
            *self = Self::InGroup { head: frame };
            return frame;
        }

        match *self {
            Self::InGroup { head } if flags.contains(KpageFlags::COMPOUND_TAIL) => head,
            _ => {
                *self = Self::Idle;
                frame
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
