//! # Layout Compiler
//!
//! Translates a logical [`Schema`] into a physical [`Layout`]. Compilation is
//! a pure function of `(namespace, schema)`: the same inputs always produce
//! the same column order, offsets and bitmask.
//!
//! ## Storage Rules
//!
//! | Declaration | Top level | Inside a scope | Nullability |
//! |-------------|-----------|----------------|-------------|
//! | fixed primitive | yes | no | non-nullable `null` rejected |
//! | variable primitive | yes | no | must be nullable |
//! | sparse primitive | yes | yes | must be nullable |
//! | object / array / set / map / tuple / tagged / udt | yes | yes | must be nullable |
//! | `nullable` | no | no | only produced for nested items |
//! | `any` | no | no | only as an array item |
//!
//! ## Type Arguments
//!
//! Typed scopes carry their item types as nested [`TypeArgument`]s. A nullable
//! item is wrapped in `nullable<..>` before nesting:
//!
//! ```text
//! array<utf8>            -> array_t<nullable<utf8>>
//! map<utf8!, int32!>     -> map_t<utf8, int32>
//! tagged<int32!>         -> tagged<uint8, int32>
//! udt "Address" (id 7)   -> udt<7>
//! ```
//!
//! Any violated rule fails the whole compilation; no partial layout escapes.

use tracing::debug;

use crate::config::{is_system_schema_id, TAGGED_MAX_ITEMS, TAGGED_MIN_ITEMS};
use crate::error::LayoutCompileError;
use crate::layout::builder::LayoutBuilder;
use crate::layout::code::LayoutCode;
use crate::layout::type_args::{TypeArgument, TypeArgumentList};
use crate::layout::Layout;
use crate::schema::{Namespace, Property, PropertyType, Schema, SchemaId, StorageKind};

pub struct LayoutCompiler;

impl LayoutCompiler {
    /// Compiles a user schema. Reserved system schema ids are rejected.
    pub fn compile(namespace: &Namespace, schema: &Schema) -> Result<Layout, LayoutCompileError> {
        if is_system_schema_id(schema.id()) {
            return Err(LayoutCompileError::new(
                schema.name(),
                format!("schema id {} is reserved for system schemas", schema.id()),
            ));
        }
        Self::compile_unchecked(namespace, schema)
    }

    pub(crate) fn compile_unchecked(
        namespace: &Namespace,
        schema: &Schema,
    ) -> Result<Layout, LayoutCompileError> {
        let mut compilation = Compilation {
            namespace,
            builder: LayoutBuilder::new(schema.name(), schema.id()),
        };
        compilation.add_properties(schema.properties(), LayoutCode::Schema)?;
        let layout = compilation.builder.build();

        debug!(
            schema = layout.name(),
            id = layout.schema_id(),
            columns = layout.columns().len(),
            fixed = layout.num_fixed(),
            variable = layout.num_variable(),
            size = layout.size(),
            "compiled layout"
        );
        Ok(layout)
    }
}

struct Compilation<'a> {
    namespace: &'a Namespace,
    builder: LayoutBuilder,
}

impl Compilation<'_> {
    fn fail(&self, path: &str, message: impl std::fmt::Display) -> LayoutCompileError {
        LayoutCompileError::new(
            self.builder.name(),
            format!("property '{}': {}", self.builder.full_path(path), message),
        )
    }

    fn add_properties(
        &mut self,
        properties: &[Property],
        scope: LayoutCode,
    ) -> Result<(), LayoutCompileError> {
        for property in properties {
            self.add_property(property, scope)?;
        }
        Ok(())
    }

    fn add_property(
        &mut self,
        property: &Property,
        scope: LayoutCode,
    ) -> Result<(), LayoutCompileError> {
        let path = property.path();
        if path.is_empty() {
            return Err(self.fail(path, "property path must not be empty"));
        }
        if path.contains('.') {
            return Err(self.fail(path, "property path must not contain '.'"));
        }

        match &property.property_type {
            PropertyType::Nullable { .. } => {
                Err(self.fail(path, "'nullable' cannot be declared as a column type"))
            }
            PropertyType::Any => {
                Err(self.fail(path, "'any' is only allowed as an array item type"))
            }
            PropertyType::Primitive {
                primitive,
                storage,
                length,
                nullable,
            } => {
                let code = LayoutCode::from_primitive(*primitive);
                self.add_primitive(path, code, *storage, *length, *nullable, scope)
            }
            PropertyType::Object {
                properties,
                immutable,
                nullable,
            } => {
                if !nullable {
                    return Err(self.fail(path, "non-nullable sparse columns are not supported"));
                }
                let code = LayoutCode::ObjectScope.scope(*immutable);
                let column = self
                    .builder
                    .add_sparse(path, code, TypeArgumentList::empty())?;
                self.builder.push_scope(column);
                let nested = self.add_properties(properties, code);
                self.builder.pop_scope();
                nested
            }
            other => {
                if !other.is_nullable() {
                    return Err(self.fail(path, "non-nullable sparse columns are not supported"));
                }
                let (code, args) = self.physical_type(path, other)?;
                self.builder.add_sparse(path, code, args)?;
                Ok(())
            }
        }
    }

    fn add_primitive(
        &mut self,
        path: &str,
        code: LayoutCode,
        storage: StorageKind,
        length: u32,
        nullable: bool,
        scope: LayoutCode,
    ) -> Result<(), LayoutCompileError> {
        match storage {
            StorageKind::Fixed => {
                if scope.clear_immutable_bit() != LayoutCode::Schema {
                    return Err(self.fail(path, "fixed storage is only allowed at the top level"));
                }
                if code.is_null() && !nullable {
                    return Err(self.fail(path, "non-nullable null columns are not supported"));
                }
                let size = if code.is_length_sized() {
                    if length == 0 {
                        return Err(self.fail(path, format!("fixed {} requires a length", code)));
                    }
                    length as usize
                } else {
                    code.fixed_size()
                        .ok_or_else(|| self.fail(path, format!("{} cannot be stored fixed", code)))?
                };
                self.builder.add_fixed(path, code, nullable, size)?;
            }
            StorageKind::Variable => {
                if scope.clear_immutable_bit() != LayoutCode::Schema {
                    return Err(
                        self.fail(path, "variable storage is only allowed at the top level")
                    );
                }
                if !nullable {
                    return Err(self.fail(path, "non-nullable variable columns are not supported"));
                }
                if !code.is_variable_capable() {
                    return Err(self.fail(path, format!("{} cannot be stored variable", code)));
                }
                self.builder.add_variable(path, code, length)?;
            }
            StorageKind::Sparse => {
                if !nullable {
                    return Err(self.fail(path, "non-nullable sparse columns are not supported"));
                }
                self.builder
                    .add_sparse(path, code, TypeArgumentList::empty())?;
            }
        }
        Ok(())
    }

    /// Maps a logical type to its physical code and type arguments.
    fn physical_type(
        &self,
        path: &str,
        ty: &PropertyType,
    ) -> Result<(LayoutCode, TypeArgumentList), LayoutCompileError> {
        match ty {
            PropertyType::Primitive { primitive, .. } => {
                Ok((LayoutCode::from_primitive(*primitive), TypeArgumentList::empty()))
            }
            PropertyType::Object { immutable, .. } => Ok((
                LayoutCode::ObjectScope.scope(*immutable),
                TypeArgumentList::empty(),
            )),
            PropertyType::Array { items, immutable, .. } => match items.as_deref() {
                Some(item) if !item.is_any() => Ok((
                    LayoutCode::TypedArrayScope.scope(*immutable),
                    TypeArgumentList::new(vec![self.item_argument(path, item)?]),
                )),
                _ => Ok((
                    LayoutCode::ArrayScope.scope(*immutable),
                    TypeArgumentList::empty(),
                )),
            },
            PropertyType::Set { items, immutable, .. } => match items.as_deref() {
                Some(item) if !item.is_any() => Ok((
                    LayoutCode::TypedSetScope.scope(*immutable),
                    TypeArgumentList::new(vec![self.item_argument(path, item)?]),
                )),
                _ => Err(self.fail(path, "untyped sets are not supported")),
            },
            PropertyType::Map {
                keys,
                values,
                immutable,
                ..
            } => match (keys.as_deref(), values.as_deref()) {
                (Some(key), Some(value)) if !key.is_any() && !value.is_any() => Ok((
                    LayoutCode::TypedMapScope.scope(*immutable),
                    TypeArgumentList::new(vec![
                        self.item_argument(path, key)?,
                        self.item_argument(path, value)?,
                    ]),
                )),
                _ => Err(self.fail(path, "untyped maps are not supported")),
            },
            PropertyType::Tuple { items, immutable, .. } => {
                if items.is_empty() {
                    return Err(self.fail(path, "tuples require at least one item"));
                }
                let args = items
                    .iter()
                    .map(|item| self.item_argument(path, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((
                    LayoutCode::TypedTupleScope.scope(*immutable),
                    TypeArgumentList::new(args),
                ))
            }
            PropertyType::Tagged { items, immutable, .. } => {
                if !(TAGGED_MIN_ITEMS..=TAGGED_MAX_ITEMS).contains(&items.len()) {
                    return Err(self.fail(
                        path,
                        format!(
                            "tagged types take {}..={} items, found {}",
                            TAGGED_MIN_ITEMS,
                            TAGGED_MAX_ITEMS,
                            items.len()
                        ),
                    ));
                }
                let mut args = Vec::with_capacity(items.len() + 1);
                args.push(TypeArgument::new(LayoutCode::UInt8));
                for item in items {
                    args.push(self.item_argument(path, item)?);
                }
                let code = if items.len() == 1 {
                    LayoutCode::TaggedScope
                } else {
                    LayoutCode::Tagged2Scope
                };
                Ok((code.scope(*immutable), TypeArgumentList::new(args)))
            }
            PropertyType::Udt {
                name,
                schema_id,
                immutable,
                ..
            } => {
                let id = self.resolve_udt(path, name, *schema_id)?;
                Ok((LayoutCode::Schema.scope(*immutable), TypeArgumentList::udt(id)))
            }
            PropertyType::Nullable { item } => Ok((
                LayoutCode::NullableScope,
                TypeArgumentList::new(vec![self.bare_argument(path, item)?]),
            )),
            PropertyType::Any => {
                Err(self.fail(path, "'any' is only allowed as an array item type"))
            }
        }
    }

    fn bare_argument(
        &self,
        path: &str,
        ty: &PropertyType,
    ) -> Result<TypeArgument, LayoutCompileError> {
        let (code, args) = self.physical_type(path, ty)?;
        Ok(TypeArgument::with_args(code, args))
    }

    /// Type argument for a nested item, wrapped in `nullable<..>` when the
    /// item itself is nullable.
    fn item_argument(
        &self,
        path: &str,
        ty: &PropertyType,
    ) -> Result<TypeArgument, LayoutCompileError> {
        let arg = self.bare_argument(path, ty)?;
        match ty {
            PropertyType::Nullable { .. } | PropertyType::Any => Ok(arg),
            _ if ty.is_nullable() => Ok(TypeArgument::with_args(
                LayoutCode::NullableScope,
                TypeArgumentList::new(vec![arg]),
            )),
            _ => Ok(arg),
        }
    }

    fn resolve_udt(
        &self,
        path: &str,
        name: &str,
        schema_id: Option<SchemaId>,
    ) -> Result<SchemaId, LayoutCompileError> {
        match schema_id {
            Some(id) => {
                if let Some(found) = self.namespace.find_by_name(name).find(|s| s.id() == id) {
                    return Ok(found.id());
                }
                match self.namespace.find_by_id(id) {
                    Some(other) => Err(self.fail(
                        path,
                        format!(
                            "udt '{}' does not match schema {} which is named '{}'",
                            name,
                            id,
                            other.name()
                        ),
                    )),
                    None => Err(self.fail(
                        path,
                        format!("udt '{}' with id {} not found in namespace", name, id),
                    )),
                }
            }
            None => {
                let mut matches = self.namespace.find_by_name(name);
                match (matches.next(), matches.next()) {
                    (Some(found), None) => Ok(found.id()),
                    (None, _) => Err(self.fail(
                        path,
                        format!("udt '{}' not found in namespace", name),
                    )),
                    (Some(_), Some(_)) => Err(self.fail(
                        path,
                        format!("udt '{}' is ambiguous; specify a schema id", name),
                    )),
                }
            }
        }
    }
}
