//! View identity and layout policy types.
//!
//! Two independent preview pipelines exist at any time. The layout mode
//! decides which of them render each frame and whether their outputs are
//! merged by the compositing pass. All of these are closed enums matched
//! exhaustively, so an out-of-range value cannot reach the frame driver.

use std::fmt;

/// One of the two independent preview view pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewSlot {
    /// The first (left / top / outside-circle) view.
    First,
    /// The second (right / bottom / inside-circle) view.
    Second,
}

impl ViewSlot {
    /// Both slots, in render order.
    pub const ALL: [ViewSlot; 2] = [ViewSlot::First, ViewSlot::Second];

    /// Array index for per-slot storage.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl fmt::Display for ViewSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
        }
    }
}

/// Output routing index: one of the two views, or the merged composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewCompositionIndex {
    /// Output of the first view.
    First,
    /// Output of the second view.
    Second,
    /// The merged result of both views.
    Composite,
}

impl ViewCompositionIndex {
    /// Array index for per-output storage.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Composite => 2,
        }
    }
}

impl From<ViewSlot> for ViewCompositionIndex {
    fn from(slot: ViewSlot) -> Self {
        match slot {
            ViewSlot::First => Self::First,
            ViewSlot::Second => Self::Second,
        }
    }
}

/// Split geometry used by the compositing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    /// Straight split line, blended across a thin band.
    Plane,
    /// Circular zone showing the second view inside the circle.
    Circle,
}

/// Which views render each frame and how their outputs are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    /// Only the first view, filling the whole panel.
    #[default]
    FullFirst,
    /// Only the second view, filling the whole panel.
    FullSecond,
    /// Both views, stacked top/bottom, no compositing.
    HorizontalSplit,
    /// Both views, side by side, no compositing.
    VerticalSplit,
    /// Both views blended across a draggable split line.
    CustomSplit,
    /// Both views blended across a draggable circle.
    CustomCircular,
}

impl LayoutMode {
    /// The slots rendered under this layout, in render order.
    pub fn active_slots(self) -> &'static [ViewSlot] {
        match self {
            Self::FullFirst => &[ViewSlot::First],
            Self::FullSecond => &[ViewSlot::Second],
            Self::HorizontalSplit
            | Self::VerticalSplit
            | Self::CustomSplit
            | Self::CustomCircular => &ViewSlot::ALL,
        }
    }

    /// The split geometry if this layout routes through the compositing
    /// pass, `None` for layouts delivered without compositing.
    pub fn split_kind(self) -> Option<SplitKind> {
        match self {
            Self::CustomSplit => Some(SplitKind::Plane),
            Self::CustomCircular => Some(SplitKind::Circle),
            Self::FullFirst | Self::FullSecond | Self::HorizontalSplit | Self::VerticalSplit => {
                None
            }
        }
    }

    /// Whether the layout delivers a single output at the composite index.
    ///
    /// Full layouts and composited layouts produce one texture; the plain
    /// split layouts deliver one texture per view instead.
    pub fn single_output(self) -> bool {
        match self {
            Self::FullFirst | Self::FullSecond | Self::CustomSplit | Self::CustomCircular => true,
            Self::HorizontalSplit | Self::VerticalSplit => false,
        }
    }
}
