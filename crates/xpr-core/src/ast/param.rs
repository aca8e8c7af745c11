use crate::ast::Ty;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a parameter node. Two parameters are the same binding only when their ids match;
/// names are cosmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("#{_0}")]
pub struct ParamId(u64);

impl ParamId {
    pub fn fresh() -> Self {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    id: ParamId,
    name: Arc<str>,
    ty: Ty,
}

impl Param {
    pub fn new(name: impl Into<Arc<str>>, ty: Ty) -> Self {
        Self {
            id: ParamId::fresh(),
            name: name.into(),
            ty,
        }
    }
    pub fn id(&self) -> ParamId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn ty(&self) -> &Ty {
        &self.ty
    }
    /// Same name and type under a new identity.
    pub fn refresh(&self) -> Self {
        Self {
            id: ParamId::fresh(),
            name: self.name.clone(),
            ty: self.ty.clone(),
        }
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Param {}
impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
