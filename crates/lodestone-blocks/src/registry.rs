use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::config::BlocksConfig;
use crate::multipart::MultiPartDef;
use crate::types::{Block, BlockId, BlockType};

/// Read-only block metadata table, injected wherever flags are consumed.
/// Id 0 is always air.
#[derive(Clone, Debug, Default)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockType>,
    pub by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            blocks: Vec::new(),
            by_name: HashMap::new(),
        };
        reg.push(BlockType {
            id: 0,
            name: "air".to_string(),
            transparent: true,
            solid: false,
            renderable: false,
            animated: false,
            light_value: 0,
            random_ticked: false,
            requires_update: false,
            multipart: None,
        });
        reg
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize)
    }

    /// Flags for a stored block value; `None` for ids never registered.
    #[inline]
    pub fn get_block(&self, b: Block) -> Option<&BlockType> {
        self.get(b.id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn push(&mut self, ty: BlockType) -> BlockId {
        let id = ty.id;
        let idx = id as usize;
        if idx >= self.blocks.len() {
            self.blocks.resize(idx + 1, air_type());
        }
        self.by_name.insert(ty.name.clone(), id);
        self.blocks[idx] = ty;
        id
    }

    /// Register a block under the next free id, returning it.
    pub fn register(&mut self, mut ty: BlockType) -> BlockId {
        ty.id = self.blocks.len() as BlockId;
        self.push(ty)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = fs::read_to_string(path)?;
        let cfg: BlocksConfig = toml::from_str(&raw)?;
        Ok(Self::from_config(cfg))
    }

    pub fn from_config(cfg: BlocksConfig) -> Self {
        let mut reg = Self::new();
        for def in cfg.blocks.into_iter() {
            let solid = def.solid.unwrap_or(true);
            let ty = BlockType {
                id: def.id.unwrap_or(reg.blocks.len() as BlockId),
                name: def.name,
                transparent: def.transparent.unwrap_or(!solid),
                solid,
                renderable: def.renderable.unwrap_or(true),
                animated: def.animated.unwrap_or(false),
                light_value: def.light_value.unwrap_or(0).min(15),
                random_ticked: def.random_ticked.unwrap_or(false),
                requires_update: def.requires_update.unwrap_or(false),
                multipart: None,
            };
            reg.push(ty);
        }
        reg
    }

    /// Attach a multi-part definition after registration (rule trees are
    /// built in code, not in the TOML surface).
    pub fn set_multipart(&mut self, id: BlockId, def: MultiPartDef) {
        if let Some(ty) = self.blocks.get_mut(id as usize) {
            ty.multipart = Some(def);
        }
    }
}

fn air_type() -> BlockType {
    BlockType {
        id: 0,
        name: "air".to_string(),
        transparent: true,
        solid: false,
        renderable: false,
        animated: false,
        light_value: 0,
        random_ticked: false,
        requires_update: false,
        multipart: None,
    }
}
