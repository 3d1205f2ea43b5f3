use super::debug::bridge_dump;
use super::dyn_array::DynArray;
use std::fmt::Debug;

/// Index of a color in the [`ColorTable`].
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Hash)]
pub struct ColorIndex(u32);

impl ColorIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A node of the condensation graph: either an SCC holding at least one
/// bridge, or a pass-through group of bridge free SCCs that reach more than
/// one color.
pub struct ColorData<O: Copy> {
    /// Colors directly reachable from this one. After flattening, only
    /// colors that own bridges.
    pub other_colors: DynArray<ColorIndex>,
    pub bridges: DynArray<O>,
    /// Slot in the callback SCC array, set once the color is known to own
    /// a bridge.
    pub api_index: Option<usize>,
    // scratch mark shared by every walk over the table, always false
    // between walks
    pub visited: bool,
}

impl<O: Copy> ColorData<O> {
    fn new(other_colors: &[ColorIndex]) -> Self {
        let mut colors = DynArray::new();
        colors.set_all(other_colors);

        Self {
            other_colors: colors,
            bridges: DynArray::new(),
            api_index: None,
            visited: false,
        }
    }

    pub fn has_bridges(&self) -> bool {
        !self.bridges.is_empty()
    }
}

pub struct ColorTable<O: Copy> {
    colors: Vec<ColorData<O>>,
    colors_with_bridges: usize,
    color_merge: DynArray<ColorIndex>,
}

impl<O: Copy + Debug> ColorTable<O> {
    pub fn new() -> Self {
        Self {
            colors: Vec::new(),
            colors_with_bridges: 0,
            color_merge: DynArray::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors_with_bridges(&self) -> usize {
        self.colors_with_bridges
    }

    pub fn get(&self, color: ColorIndex) -> &ColorData<O> {
        match self.colors.get(color.as_usize()) {
            Some(data) => data,
            None => panic!("bridge: color {} out of range {}", color.0, self.colors.len()),
        }
    }

    pub fn get_mut(&mut self, color: ColorIndex) -> &mut ColorData<O> {
        let len = self.colors.len();

        match self.colors.get_mut(color.as_usize()) {
            Some(data) => data,
            None => panic!("bridge: color {} out of range {}", color.0, len),
        }
    }

    pub fn indices(&self) -> impl Iterator<Item = ColorIndex> {
        (0..self.colors.len() as u32).map(ColorIndex)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorIndex, &ColorData<O>)> {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, data)| (ColorIndex(i as u32), data))
    }

    pub fn new_color(&mut self, other_colors: &[ColorIndex]) -> ColorIndex {
        self.colors.push(ColorData::new(other_colors));

        ColorIndex(self.colors.len() as u32 - 1)
    }

    /// Picks the color of a closing SCC from the colors its members reach.
    ///
    /// `low_colors` may repeat colors. A bridge SCC always gets a fresh
    /// color. Otherwise an SCC reaching no color gets none, one reaching a
    /// single color joins it, and one reaching several gets a fresh
    /// pass-through color pointing at all of them.
    pub fn color_scc(&mut self, found_bridge: bool, low_colors: &[ColorIndex]) -> Option<ColorIndex> {
        let mut merged = std::mem::take(&mut self.color_merge);

        merged.clear();

        for &color in low_colors {
            let data = self.get_mut(color);

            if !data.visited {
                data.visited = true;
                merged.push(color);
            }
        }

        for &color in merged.iter() {
            let data = self.get_mut(color);

            assert!(data.visited, "bridge: merged color {} lost its mark", color.0);
            data.visited = false;
        }

        let color = if found_bridge {
            self.colors_with_bridges += 1;
            Some(self.new_color(merged.as_slice()))
        } else {
            self.reduce_color(merged.as_slice())
        };

        self.color_merge = merged;
        color
    }

    fn reduce_color(&mut self, merged: &[ColorIndex]) -> Option<ColorIndex> {
        match merged {
            [] => None,
            [color] => Some(*color),
            _ => Some(self.new_color(merged)),
        }
    }

    pub fn add_bridge(&mut self, color: ColorIndex, object: O) {
        self.get_mut(color).bridges.push(object);
    }

    /// Discards every color, keeping the table's storage for the next cycle.
    pub fn clear(&mut self) {
        self.colors.clear();
        self.colors_with_bridges = 0;
        self.color_merge.clear();
    }

    pub fn dump(&self, enabled: bool, why: &str) {
        if !enabled {
            return;
        }

        bridge_dump!(enabled, "colors{}:", why);

        for (color, data) in self.iter() {
            let api = match data.api_index {
                Some(api) => format!("({})", api),
                None => String::new(),
            };

            bridge_dump!(
                enabled,
                "\t{}{}: {:?} bridges: {:?}",
                color.0,
                api,
                data.other_colors,
                data.bridges
            );
        }
    }
}

impl<O: Copy + Debug> Default for ColorTable<O> {
    fn default() -> Self {
        Self::new()
    }
}
