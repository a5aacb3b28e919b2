/// Invalidation state of a scene node.
///
/// `dirty` records that props changed in the last commit. `layout` and `paint` gate the
/// expensive rebuild steps: geometry, fonts, paths, paragraph layout, and paint resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Props changed since the last commit.
    pub dirty: bool,
    /// A layout-relevant field changed.
    pub layout: bool,
    /// A style-relevant field changed.
    pub paint: bool,
}

impl Default for DirtyFlags {
    /// Fresh nodes need both rebuild steps before their first draw.
    fn default() -> Self {
        Self {
            dirty: false,
            layout: true,
            paint: true,
        }
    }
}

impl DirtyFlags {
    /// Flags with nothing pending.
    pub const CLEAN: Self = Self {
        dirty: false,
        layout: false,
        paint: false,
    };

    /// Return `true` when any flag is set.
    pub fn any(&self) -> bool {
        self.dirty || self.layout || self.paint
    }
}
