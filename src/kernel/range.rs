use crate::error::{Error, Result};

/// A flat iteration space of one to three dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KernelRange {
    extents: [usize; 3],
    dimensions: usize,
}

impl KernelRange {
    pub fn new_1d(x: usize) -> Self {
        Self {
            extents: [x, 1, 1],
            dimensions: 1,
        }
    }

    pub fn new_2d(x: usize, y: usize) -> Self {
        Self {
            extents: [x, y, 1],
            dimensions: 2,
        }
    }

    pub fn new_3d(x: usize, y: usize, z: usize) -> Self {
        Self {
            extents: [x, y, z],
            dimensions: 3,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Extent along `axis`, 1 for axes beyond the dimensionality.
    pub fn extent(&self, axis: usize) -> usize {
        self.extents[axis]
    }

    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    /// Number of work items, saturating at `usize::MAX`.
    pub fn total(&self) -> usize {
        self.checked_total().unwrap_or(usize::MAX)
    }

    pub fn checked_total(&self) -> Option<usize> {
        self.extents
            .iter()
            .try_fold(1usize, |total, &extent| total.checked_mul(extent))
    }
}

impl From<usize> for KernelRange {
    fn from(x: usize) -> Self {
        Self::new_1d(x)
    }
}

impl From<[usize; 2]> for KernelRange {
    fn from([x, y]: [usize; 2]) -> Self {
        Self::new_2d(x, y)
    }
}

impl From<[usize; 3]> for KernelRange {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self::new_3d(x, y, z)
    }
}

/// An iteration space split into work-groups: a global range and a local
/// (work-group) range of the same dimensionality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelNDRange {
    dimensions: usize,
    global: Option<KernelRange>,
    local: Option<KernelRange>,
}

impl KernelNDRange {
    pub fn new(dimensions: usize) -> Self {
        assert!(
            (1..=3).contains(&dimensions),
            "nd-range must have 1, 2 or 3 dimensions, got {}",
            dimensions
        );
        Self {
            dimensions,
            global: None,
            local: None,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn set_global(&mut self, range: KernelRange) -> Result<()> {
        self.check("global", &range)?;
        self.global = Some(range);
        Ok(())
    }

    pub fn set_local(&mut self, range: KernelRange) -> Result<()> {
        self.check("local", &range)?;
        self.local = Some(range);
        Ok(())
    }

    pub fn global(&self) -> Option<&KernelRange> {
        self.global.as_ref()
    }

    pub fn local(&self) -> Option<&KernelRange> {
        self.local.as_ref()
    }

    fn check(&self, which: &str, range: &KernelRange) -> Result<()> {
        if range.dimensions() != self.dimensions {
            return Err(Error::IncorrectParameter(format!(
                "{} range has {} dimensions, nd-range expects {}",
                which,
                range.dimensions(),
                self.dimensions
            ))
            .into());
        }
        Ok(())
    }
}

/// Range in the shape the native submission call expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NativeRange {
    D1([usize; 1]),
    D2([usize; 2]),
    D3([usize; 3]),
}

impl NativeRange {
    /// Extents padded to three axes.
    pub(crate) fn padded(&self) -> [usize; 3] {
        match *self {
            NativeRange::D1([x]) => [x, 1, 1],
            NativeRange::D2([x, y]) => [x, y, 1],
            NativeRange::D3(extents) => extents,
        }
    }

    pub(crate) fn dimensions(&self) -> usize {
        match self {
            NativeRange::D1(_) => 1,
            NativeRange::D2(_) => 2,
            NativeRange::D3(_) => 3,
        }
    }
}

impl From<&KernelRange> for NativeRange {
    fn from(range: &KernelRange) -> Self {
        let [x, y, z] = range.extents();
        match range.dimensions() {
            1 => NativeRange::D1([x]),
            2 => NativeRange::D2([x, y]),
            3 => NativeRange::D3([x, y, z]),
            other => unreachable!("kernel range with {} dimensions", other),
        }
    }
}
