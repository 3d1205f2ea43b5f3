use super::color::{ColorIndex, ColorTable};
use super::dyn_array::DynArray;
use std::fmt::Debug;

/// Collapses the color graph so that bridge colors point directly at the
/// bridge colors they reach, skipping pass-through colors.
pub struct XrefFlattener {
    xref_merge: DynArray<ColorIndex>,
    walk: DynArray<ColorIndex>,
}

impl XrefFlattener {
    pub fn new() -> Self {
        Self {
            xref_merge: DynArray::new(),
            walk: DynArray::new(),
        }
    }

    /// Rewrites `other_colors` of every bridge color with its flattened edge
    /// set and returns the total number of edges.
    pub fn flatten<O: Copy + Debug>(&mut self, colors: &mut ColorTable<O>) -> usize {
        let mut xref_count = 0;

        for color in colors.indices() {
            if !colors.get(color).has_bridges() {
                continue;
            }

            self.xref_merge.clear();
            self.gather_xrefs(colors, color);
            self.reset_xrefs(colors, color);

            colors
                .get_mut(color)
                .other_colors
                .set_all(self.xref_merge.as_slice());

            xref_count += self.xref_merge.size();
        }

        xref_count
    }

    fn gather_xrefs<O: Copy + Debug>(&mut self, colors: &mut ColorTable<O>, color: ColorIndex) {
        self.walk.clear();
        self.walk.push(color);

        while !self.walk.is_empty() {
            let current = self.walk.pop();

            for i in 0..colors.get(current).other_colors.size() {
                let index = colors.get(current).other_colors.get(i);
                let src = colors.get_mut(index);

                if src.visited {
                    continue;
                }

                src.visited = true;

                if src.has_bridges() {
                    self.xref_merge.push(index);
                } else {
                    self.walk.push(index);
                }
            }
        }
    }

    // visits exactly the colors gather_xrefs marked
    fn reset_xrefs<O: Copy + Debug>(&mut self, colors: &mut ColorTable<O>, color: ColorIndex) {
        self.walk.clear();
        self.walk.push(color);

        while !self.walk.is_empty() {
            let current = self.walk.pop();

            for i in 0..colors.get(current).other_colors.size() {
                let index = colors.get(current).other_colors.get(i);
                let src = colors.get_mut(index);

                if !src.visited {
                    continue;
                }

                src.visited = false;

                if !src.has_bridges() {
                    self.walk.push(index);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.xref_merge.clear();
        self.walk.clear();
    }
}

impl Default for XrefFlattener {
    fn default() -> Self {
        Self::new()
    }
}
