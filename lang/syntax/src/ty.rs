use helix_utils::prelude::IdentifierPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Void,
    Word,
    Bool,
    Pointer(Box<Type>),
    Struct(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// Struct declarations by name, in declaration order.
pub type StructTable = IndexMap<String, StructDecl>;

impl Type {
    pub fn pointer(inner: Type) -> Self {
        Type::Pointer(Box::new(inner))
    }
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            | Type::Pointer(inner) => Some(inner),
            | _ => None,
        }
    }
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Whether values of this type refer to storage inside some region.
    pub fn carries_region(&self, structs: &StructTable) -> bool {
        !self.region_members(&IdentifierPath::root(), structs).is_empty()
    }

    /// The leaf members holding a pointer, relative to `base`.
    pub fn region_members(
        &self, base: &IdentifierPath, structs: &StructTable,
    ) -> Vec<IdentifierPath> {
        (self.members(base, structs).into_iter())
            .filter(|(_, ty)| matches!(ty, Type::Pointer(_)))
            .map(|(path, _)| path)
            .collect()
    }

    /// Recursive member decomposition relative to `base`.
    ///
    /// Structs expand into their fields, everything else (pointers included)
    /// is a leaf member at `base` itself.
    pub fn members(
        &self, base: &IdentifierPath, structs: &StructTable,
    ) -> Vec<(IdentifierPath, Type)> {
        let mut out = Vec::new();
        let mut stack = vec![(base.clone(), self.clone())];
        while let Some((path, ty)) = stack.pop() {
            match &ty {
                | Type::Struct(name) if structs.contains_key(name) => {
                    let decl = &structs[name];
                    for field in decl.fields.iter().rev() {
                        stack.push((path.append(&field.name), field.ty.clone()));
                    }
                }
                | _ => out.push((path, ty)),
            }
        }
        out
    }

    pub fn field(&self, name: &str, structs: &StructTable) -> Option<Type> {
        let Type::Struct(sname) = self else { return None };
        let decl = structs.get(sname)?;
        decl.fields.iter().find(|f| f.name == name).map(|f| f.ty.clone())
    }
}
