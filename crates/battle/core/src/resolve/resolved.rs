use core::fmt;

use crate::data::SourceRef;

/// Which layer decided a resolved value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Provenance {
    /// No tag applied; the stock value stands.
    Default,
    /// The host's own rules (e.g. a seal trait or stock carry cap).
    Host,
    /// Set by a tag on this source.
    Source(SourceRef),
    /// Forced to neutral by a null tag on this source.
    Nulled(SourceRef),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Default => f.write_str("default"),
            Provenance::Host => f.write_str("host"),
            Provenance::Source(origin) => write!(f, "{origin}"),
            Provenance::Nulled(origin) => write!(f, "nulled by {origin}"),
        }
    }
}

/// A query result plus the layer that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedModifier<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> ResolvedModifier<T> {
    pub const fn new(value: T, provenance: Provenance) -> Self {
        Self { value, provenance }
    }

    pub const fn stock(value: T) -> Self {
        Self::new(value, Provenance::Default)
    }

    pub fn set_by(&mut self, value: T, origin: SourceRef) {
        self.value = value;
        self.provenance = Provenance::Source(origin);
    }

    pub fn is_default(&self) -> bool {
        self.provenance == Provenance::Default
    }
}

impl<T: fmt::Display> fmt::Display for ResolvedModifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.provenance)
    }
}
