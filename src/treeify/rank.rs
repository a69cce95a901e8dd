//! Heading-like elements and their ranks.

/// Elements that open a new section, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadKind {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Hr,
}

impl HeadKind {
    pub const ALL: [Self; 7] = [
        Self::H1,
        Self::H2,
        Self::H3,
        Self::H4,
        Self::H5,
        Self::H6,
        Self::Hr,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Hr => "hr",
        }
    }

    /// 1 for `h1` through 7 for `hr`. Lower rank wins.
    pub const fn rank(self) -> u8 {
        self as u8 + 1
    }
}
