//! Serde-facing registry configuration, loaded from TOML.

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

/// One `[[blocks]]` table. Absent flags default to a plain opaque cube.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub id: Option<u16>,
    pub transparent: Option<bool>,
    pub solid: Option<bool>,
    pub renderable: Option<bool>,
    pub animated: Option<bool>,
    pub light_value: Option<u8>,
    pub random_ticked: Option<bool>,
    pub requires_update: Option<bool>,
}
