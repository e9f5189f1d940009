//! Named, typed uniform table over a std140 uniform block.
//!
//! The table is the CPU-side twin of the GLSL `GradientParams` block:
//! a flat byte mirror plus a map from semantic name to byte offset and
//! declared shape. Shapes are fixed when the table is built (tagged
//! descriptors, no runtime type inspection); writes type-check against
//! the descriptor and mark the mirror dirty so the program wrapper can
//! upload it with a single buffer write before the next draw. Nested
//! struct-array members are addressed by flattened key, e.g.
//! `waveLayers[2].noiseFreq`.

use std::collections::HashMap;

use crate::error::UniformError;
use crate::waves::MAX_WAVE_LAYERS;

/// Declared shape of a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformShape {
    Scalar,
    Vec2,
    Vec3,
    Int,
    Bool,
}

impl UniformShape {
    /// std140 base alignment in bytes.
    fn alignment(self) -> usize {
        match self {
            UniformShape::Scalar | UniformShape::Int | UniformShape::Bool => 4,
            UniformShape::Vec2 => 8,
            UniformShape::Vec3 => 16,
        }
    }

    fn size(self) -> usize {
        match self {
            UniformShape::Scalar | UniformShape::Int | UniformShape::Bool => 4,
            UniformShape::Vec2 => 8,
            UniformShape::Vec3 => 12,
        }
    }

    fn name(self) -> &'static str {
        match self {
            UniformShape::Scalar => "scalar",
            UniformShape::Vec2 => "vec2",
            UniformShape::Vec3 => "vec3",
            UniformShape::Int => "int",
            UniformShape::Bool => "bool",
        }
    }
}

/// A value written into (or read back from) the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Int(i32),
    Bool(bool),
}

impl UniformValue {
    fn shape(self) -> UniformShape {
        match self {
            UniformValue::Scalar(_) => UniformShape::Scalar,
            UniformValue::Vec2(_) => UniformShape::Vec2,
            UniformValue::Vec3(_) => UniformShape::Vec3,
            UniformValue::Int(_) => UniformShape::Int,
            UniformValue::Bool(_) => UniformShape::Bool,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    offset: usize,
    shape: UniformShape,
}

fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Accumulates fields into a std140 layout, assigning offsets.
#[derive(Debug, Default)]
pub struct UniformTableBuilder {
    cursor: usize,
    slots: HashMap<String, Slot>,
}

impl UniformTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one top-level field.
    pub fn field(mut self, name: &str, shape: UniformShape) -> Self {
        self.cursor = align_up(self.cursor, shape.alignment());
        self.slots.insert(
            name.to_string(),
            Slot {
                offset: self.cursor,
                shape,
            },
        );
        self.cursor += shape.size();
        self
    }

    /// Appends an array of structs, registering each member under its
    /// flattened key `name[i].member`. Struct alignment and stride
    /// follow std140: both round up to 16 bytes.
    pub fn struct_array(mut self, name: &str, count: usize, members: &[(&str, UniformShape)]) -> Self {
        let mut inner = 0usize;
        let mut member_offsets = Vec::with_capacity(members.len());
        for (member, shape) in members {
            inner = align_up(inner, shape.alignment());
            member_offsets.push((*member, *shape, inner));
            inner += shape.size();
        }
        let stride = align_up(inner, 16);

        self.cursor = align_up(self.cursor, 16);
        for index in 0..count {
            let base = self.cursor + index * stride;
            for (member, shape, offset) in &member_offsets {
                self.slots.insert(
                    format!("{name}[{index}].{member}"),
                    Slot {
                        offset: base + offset,
                        shape: *shape,
                    },
                );
            }
        }
        self.cursor += count * stride;
        self
    }

    pub fn build(self) -> UniformTable {
        let size = align_up(self.cursor, 16);
        UniformTable {
            slots: self.slots,
            bytes: vec![0; size],
            dirty: true,
        }
    }
}

/// The built table: descriptors plus the byte mirror of the block.
#[derive(Debug)]
pub struct UniformTable {
    slots: HashMap<String, Slot>,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformTable {
    /// Writes `value` at the slot registered under `name`.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| UniformError::UnknownName(name.to_string()))?;
        if slot.shape != value.shape() {
            return Err(UniformError::ShapeMismatch {
                name: name.to_string(),
                expected: slot.shape.name(),
                got: value.shape().name(),
            });
        }

        let dst = &mut self.bytes[slot.offset..slot.offset + slot.shape.size()];
        match value {
            UniformValue::Scalar(v) => dst.copy_from_slice(&v.to_le_bytes()),
            UniformValue::Int(v) => dst.copy_from_slice(&v.to_le_bytes()),
            UniformValue::Bool(v) => dst.copy_from_slice(&(v as u32).to_le_bytes()),
            UniformValue::Vec2(v) => dst.copy_from_slice(bytemuck::cast_slice(&v)),
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::cast_slice(&v)),
        }
        self.dirty = true;
        Ok(())
    }

    /// Reads the current value of the slot registered under `name`.
    pub fn get(&self, name: &str) -> Result<UniformValue, UniformError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| UniformError::UnknownName(name.to_string()))?;
        let src = &self.bytes[slot.offset..slot.offset + slot.shape.size()];
        let read_f32 = |at: usize| f32::from_le_bytes(src[at..at + 4].try_into().unwrap());
        Ok(match slot.shape {
            UniformShape::Scalar => UniformValue::Scalar(read_f32(0)),
            UniformShape::Vec2 => UniformValue::Vec2([read_f32(0), read_f32(4)]),
            UniformShape::Vec3 => UniformValue::Vec3([read_f32(0), read_f32(4), read_f32(8)]),
            UniformShape::Int => {
                UniformValue::Int(i32::from_le_bytes(src[0..4].try_into().unwrap()))
            }
            UniformShape::Bool => {
                UniformValue::Bool(u32::from_le_bytes(src[0..4].try_into().unwrap()) != 0)
            }
        })
    }

    /// Byte offset of a slot; exposed for layout verification.
    pub fn offset_of(&self, name: &str) -> Result<usize, UniformError> {
        self.slots
            .get(name)
            .map(|slot| slot.offset)
            .ok_or_else(|| UniformError::UnknownName(name.to_string()))
    }

    /// Full mirror contents, sized to the std140 block.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether an upload is pending and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

/// Members of one `WaveLayer` struct, in block declaration order.
pub const WAVE_LAYER_MEMBERS: [(&str, UniformShape); 8] = [
    ("color", UniformShape::Vec3),
    ("noiseFreq", UniformShape::Vec2),
    ("noiseSpeed", UniformShape::Scalar),
    ("noiseFlow", UniformShape::Scalar),
    ("noiseSeed", UniformShape::Scalar),
    ("noiseFloor", UniformShape::Scalar),
    ("noiseCeil", UniformShape::Scalar),
    ("active", UniformShape::Scalar),
];

/// Builds the table matching the `GradientParams` block declared by the
/// shader pair. Field order here must track the GLSL declaration.
pub fn gradient_params_table() -> UniformTable {
    UniformTableBuilder::new()
        .field("resolution", UniformShape::Vec2)
        .field("realtime", UniformShape::Scalar)
        .field("amplitude", UniformShape::Scalar)
        .field("baseColor", UniformShape::Vec3)
        .field("shadowPower", UniformShape::Scalar)
        .field("activeLayers", UniformShape::Int)
        .struct_array("waveLayers", MAX_WAVE_LAYERS, &WAVE_LAYER_MEMBERS)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_block_offsets_match_std140() {
        let table = gradient_params_table();
        assert_eq!(table.offset_of("resolution").unwrap(), 0);
        assert_eq!(table.offset_of("realtime").unwrap(), 8);
        assert_eq!(table.offset_of("amplitude").unwrap(), 12);
        // vec3 aligns to 16; the following scalar packs into its tail.
        assert_eq!(table.offset_of("baseColor").unwrap(), 16);
        assert_eq!(table.offset_of("shadowPower").unwrap(), 28);
        assert_eq!(table.offset_of("activeLayers").unwrap(), 32);
        // struct array re-aligns to 16 and strides by 48.
        assert_eq!(table.offset_of("waveLayers[0].color").unwrap(), 48);
        assert_eq!(table.offset_of("waveLayers[0].noiseFreq").unwrap(), 64);
        assert_eq!(table.offset_of("waveLayers[0].noiseSpeed").unwrap(), 72);
        assert_eq!(table.offset_of("waveLayers[0].active").unwrap(), 92);
        assert_eq!(table.offset_of("waveLayers[1].color").unwrap(), 96);
        assert_eq!(table.offset_of("waveLayers[1].noiseFreq").unwrap(), 112);
        assert_eq!(table.offset_of("waveLayers[8].active").unwrap(), 476);
        assert_eq!(table.size(), 480);
    }

    #[test]
    fn set_then_get_round_trips_each_shape() {
        let mut table = UniformTableBuilder::new()
            .field("f", UniformShape::Scalar)
            .field("v2", UniformShape::Vec2)
            .field("v3", UniformShape::Vec3)
            .field("i", UniformShape::Int)
            .field("b", UniformShape::Bool)
            .build();

        table.set("f", UniformValue::Scalar(1.5)).unwrap();
        table.set("v2", UniformValue::Vec2([2.0, 3.0])).unwrap();
        table.set("v3", UniformValue::Vec3([0.1, 0.2, 0.3])).unwrap();
        table.set("i", UniformValue::Int(-7)).unwrap();
        table.set("b", UniformValue::Bool(true)).unwrap();

        assert_eq!(table.get("f").unwrap(), UniformValue::Scalar(1.5));
        assert_eq!(table.get("v2").unwrap(), UniformValue::Vec2([2.0, 3.0]));
        assert_eq!(
            table.get("v3").unwrap(),
            UniformValue::Vec3([0.1, 0.2, 0.3])
        );
        assert_eq!(table.get("i").unwrap(), UniformValue::Int(-7));
        assert_eq!(table.get("b").unwrap(), UniformValue::Bool(true));
    }

    #[test]
    fn unknown_name_and_shape_mismatch_are_typed_errors() {
        let mut table = gradient_params_table();
        assert_eq!(
            table.set("nonsense", UniformValue::Scalar(1.0)),
            Err(UniformError::UnknownName("nonsense".into()))
        );
        assert!(matches!(
            table.set("resolution", UniformValue::Scalar(1.0)),
            Err(UniformError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            table.set("waveLayers[3].color", UniformValue::Int(3)),
            Err(UniformError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn writes_mark_the_mirror_dirty_exactly_once() {
        let mut table = gradient_params_table();
        assert!(table.take_dirty(), "fresh table needs an initial upload");
        assert!(!table.take_dirty());
        table
            .set("realtime", UniformValue::Scalar(16.0))
            .unwrap();
        assert!(table.take_dirty());
        assert!(!table.take_dirty());
    }

    #[test]
    fn flattened_keys_write_distinct_regions() {
        let mut table = gradient_params_table();
        table
            .set("waveLayers[2].noiseSeed", UniformValue::Scalar(30.0))
            .unwrap();
        table
            .set("waveLayers[3].noiseSeed", UniformValue::Scalar(40.0))
            .unwrap();
        assert_eq!(
            table.get("waveLayers[2].noiseSeed").unwrap(),
            UniformValue::Scalar(30.0)
        );
        assert_eq!(
            table.get("waveLayers[3].noiseSeed").unwrap(),
            UniformValue::Scalar(40.0)
        );
    }
}
