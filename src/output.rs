use std::collections::BTreeMap;

use image::{Rgba32FImage, RgbaImage};

/// One UV layer worth of packed data, one `[u, v]` entry per mesh loop.
///
/// `slot` is the layer's position in the mesh UV stack when the packing
/// scheme dictates one (the shape-key scheme does); side-channel layers are
/// addressed by name only.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UvLayer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u8>,
    pub data: Vec<[f32; 2]>,
}

/// A per-loop RGBA color attribute (used for the shape-key normal bake).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorAttribute {
    pub name: String,
    pub data: Vec<[f32; 4]>,
}

/// Offset texture name; the decoder parses the scale factor back out of it.
pub fn offset_texture_name(name: &str, scale: u32) -> String {
    format!("T_{name}_Scale{scale}_O")
}

pub fn normal_texture_name(name: &str) -> String {
    format!("T_{name}_N")
}

/// An emitted resource, keyed by name in a [`ResourceStore`].
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    /// 4-channel float grid, unrestricted range.
    OffsetTexture(Rgba32FImage),
    /// 4-channel normalized [0,1] grid.
    NormalTexture(RgbaImage),
    UvLayer(UvLayer),
    ColorAttribute(ColorAttribute),
}

/// In-memory stand-in for the host's named resource storage. Inserting
/// under an existing name overwrites in place, never duplicates, so a pass
/// repeated with identical inputs leaves the store byte-identical.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceStore {
    resources: BTreeMap<String, Resource>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, resource: Resource) {
        self.resources.insert(name.into(), resource);
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_names_follow_the_decoder_contract() {
        assert_eq!(offset_texture_name("Flag", 17), "T_Flag_Scale17_O");
        assert_eq!(normal_texture_name("Flag"), "T_Flag_N");
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut store = ResourceStore::new();
        let layer = |v: f32| {
            Resource::UvLayer(UvLayer {
                name: "vertex_anim".into(),
                slot: None,
                data: vec![[v, v]],
            })
        };
        store.insert("vertex_anim", layer(0.25));
        store.insert("vertex_anim", layer(0.75));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("vertex_anim"), Some(&layer(0.75)));
    }
}
