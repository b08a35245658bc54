/// A unit of vector-mode content, produced upstream in document order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    KeyValue { key: String, value: String },
    /// Vertical space in points.
    Spacer { height: f32 },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    pub fn key_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Block::KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn spacer(height: f32) -> Self {
        Block::Spacer { height }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }
}

/// Half-open interval `[start, end)` along the growth axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub start: f32,
    pub end: f32,
}

impl Extent {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.start && y < self.end
    }

    /// True when cutting at `y` would split this extent.
    pub fn strictly_inside(&self, y: f32) -> bool {
        y > self.start && y < self.end
    }

    pub fn contains_extent(&self, other: &Extent) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeOrigin {
    /// An explicit author keep-together marker.
    Marker,
    /// A heading paired with its first meaningful following block.
    HeadingWithNext,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeepTogetherRange {
    pub extent: Extent,
    pub origin: RangeOrigin,
}

impl KeepTogetherRange {
    pub fn new(start: f32, end: f32, origin: RangeOrigin) -> Self {
        Self {
            extent: Extent::new(start, end),
            origin,
        }
    }
}

pub type HeadingPosition = f32;

pub type BreakPoint = f32;

pub type PageSlice = Extent;
