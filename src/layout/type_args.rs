//! # Type Arguments
//!
//! Generic scopes carry their element types as a [`TypeArgumentList`]: the
//! item of a typed array, key and value of a map, every slot of a tuple, the
//! tag and payload(s) of a tagged scope. A user-defined type instead carries
//! the id of the schema it refers to.
//!
//! Equality is structural all the way down, so two lists are equal exactly
//! when every nested code and argument matches.

use std::fmt;

use crate::layout::code::LayoutCode;
use crate::schema::SchemaId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeArgument {
    code: LayoutCode,
    args: TypeArgumentList,
}

impl TypeArgument {
    pub fn new(code: LayoutCode) -> Self {
        Self {
            code,
            args: TypeArgumentList::empty(),
        }
    }

    pub fn with_args(code: LayoutCode, args: TypeArgumentList) -> Self {
        Self { code, args }
    }

    pub fn code(&self) -> LayoutCode {
        self.code
    }

    pub fn args(&self) -> &TypeArgumentList {
        &self.args
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.code, self.args)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeArgumentList {
    args: Vec<TypeArgument>,
    schema_id: Option<SchemaId>,
}

impl TypeArgumentList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(args: Vec<TypeArgument>) -> Self {
        Self {
            args,
            schema_id: None,
        }
    }

    /// Arguments of a user-defined type reference.
    pub fn udt(schema_id: SchemaId) -> Self {
        Self {
            args: Vec::new(),
            schema_id: Some(schema_id),
        }
    }

    /// Number of positional arguments. A UDT reference has none, so its
    /// length is 0 even though [`is_empty`](Self::is_empty) is false.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// True when the list carries neither positional arguments nor a schema
    /// reference.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.schema_id.is_none()
    }

    pub fn get(&self, index: usize) -> Option<&TypeArgument> {
        self.args.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeArgument> {
        self.args.iter()
    }

    pub fn schema_id(&self) -> Option<SchemaId> {
        self.schema_id
    }
}

impl fmt::Display for TypeArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.schema_id {
            return write!(f, "<{id}>");
        }
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nullable(code: LayoutCode) -> TypeArgument {
        TypeArgument::with_args(
            LayoutCode::NullableScope,
            TypeArgumentList::new(vec![TypeArgument::new(code)]),
        )
    }

    #[test]
    fn equality_is_structural() {
        let a = TypeArgumentList::new(vec![
            nullable(LayoutCode::Int32),
            TypeArgument::new(LayoutCode::Utf8),
        ]);
        let b = TypeArgumentList::new(vec![
            nullable(LayoutCode::Int32),
            TypeArgument::new(LayoutCode::Utf8),
        ]);
        let c = TypeArgumentList::new(vec![
            nullable(LayoutCode::Int64),
            TypeArgument::new(LayoutCode::Utf8),
        ]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn udt_lists_compare_by_schema_id() {
        assert_eq!(TypeArgumentList::udt(7), TypeArgumentList::udt(7));
        assert_ne!(TypeArgumentList::udt(7), TypeArgumentList::udt(8));
        assert_ne!(TypeArgumentList::udt(7), TypeArgumentList::empty());
    }

    #[test]
    fn udt_list_has_no_positional_arguments() {
        let list = TypeArgumentList::udt(7);
        assert_eq!(list.len(), 0);
        assert!(list.get(0).is_none());
        assert!(!list.is_empty());
        assert_eq!(list.schema_id(), Some(7));
        assert!(!TypeArgumentList::udt(7).is_empty());
    }

    #[test]
    fn display_nests_arguments() {
        let list = TypeArgumentList::new(vec![
            TypeArgument::new(LayoutCode::Utf8),
            nullable(LayoutCode::Int32),
        ]);
        assert_eq!(list.to_string(), "<utf8, nullable<int32>>");
        assert_eq!(TypeArgumentList::udt(3).to_string(), "<3>");
    }
}
