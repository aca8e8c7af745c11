//! Parameter holders: fixed fan-out trees carrying the captured values of a tree into its
//! compiled unit, so one compiled unit serves every tree of the same shape.

use crate::ast::{Handle, HandleRef, Value};
use crate::error::Error;
use crate::Result;
use std::sync::{Arc, OnceLock};

pub const HOLDER_FAN_OUT: usize = 8;
pub const MAX_HOLDER_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
pub struct ParameterHolder {
    slots: [Value; HOLDER_FAN_OUT],
}

impl ParameterHolder {
    fn from_chunk(chunk: &[Value]) -> Self {
        Self {
            slots: std::array::from_fn(|i| chunk.get(i).cloned().unwrap_or(Value::Null)),
        }
    }

    pub fn slot(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    /// Leaf value at `position` of a holder tree `depth` levels deep.
    pub fn get(&self, position: usize, depth: usize) -> Option<&Value> {
        let path = slot_path(position, depth);
        let (leaf, inner) = path.split_last()?;
        let mut node = self;
        for slot in inner {
            match node.slot(*slot)? {
                Value::Holder(child) => node = child,
                _ => return None,
            }
        }
        node.slot(*leaf)
    }
}

/// Number of holder levels needed for `count` values; at least one.
pub fn holder_depth(count: usize) -> usize {
    let mut depth = 1;
    let mut width = HOLDER_FAN_OUT;
    while width < count {
        width *= HOLDER_FAN_OUT;
        depth += 1;
    }
    depth
}

/// Slot indices from the root holder down to the leaf for a value position: the base-8 digits
/// of `position`, most significant first.
pub fn slot_path(position: usize, depth: usize) -> Vec<usize> {
    (0..depth)
        .rev()
        .map(|level| position / HOLDER_FAN_OUT.pow(level as u32) % HOLDER_FAN_OUT)
        .collect()
}

#[derive(Debug, Clone)]
pub struct ParameterHolderFactory {
    capacity: usize,
}

impl Default for ParameterHolderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterHolderFactory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HOLDER_CAPACITY)
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Packs `values` into a holder tree; `None` when there is nothing to carry.
    pub fn create(&self, values: Vec<Value>) -> Result<Option<Arc<ParameterHolder>>> {
        if values.len() > self.capacity {
            return Err(Error::Capacity {
                count: values.len(),
                limit: self.capacity,
            });
        }
        if values.is_empty() {
            return Ok(None);
        }
        trace!(count = values.len(), depth = holder_depth(values.len()), "packing holder");
        let mut level = values;
        loop {
            let holders: Vec<Arc<ParameterHolder>> = level
                .chunks(HOLDER_FAN_OUT)
                .map(|chunk| Arc::new(ParameterHolder::from_chunk(chunk)))
                .collect();
            if holders.len() == 1 {
                return Ok(holders.into_iter().next());
            }
            level = holders.into_iter().map(Value::Holder).collect();
        }
    }
}

/// Reads one slot of a holder value.
#[derive(Debug)]
pub struct HolderSlot {
    index: usize,
    name: String,
}

impl Handle for HolderSlot {
    fn name(&self) -> &str {
        &self.name
    }
    fn declaring_type(&self) -> &str {
        "ParameterHolder"
    }
    fn is_static(&self) -> bool {
        false
    }
    fn invoke(&self, target: Option<&Value>, _args: &[Value]) -> Result<Value> {
        match target {
            Some(Value::Holder(holder)) => Ok(holder.slot(self.index).cloned().unwrap_or(Value::Null)),
            Some(other) => Err(Error::target(format!(
                "slot {} read on {}",
                self.name,
                other.type_name()
            ))),
            None => Err(Error::target(format!("slot {} read without a holder", self.name))),
        }
    }
}

pub fn holder_slot(index: usize) -> HandleRef {
    static SLOTS: OnceLock<Vec<HandleRef>> = OnceLock::new();
    let slots = SLOTS.get_or_init(|| {
        (0..HOLDER_FAN_OUT)
            .map(|index| {
                HandleRef::new(HolderSlot {
                    index,
                    name: format!("P{}", index),
                })
            })
            .collect()
    });
    slots[index % HOLDER_FAN_OUT].clone()
}
