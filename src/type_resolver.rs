use crate::extractor::{annotations, is_cfg_test};
use crate::parser::ParsedFile;
use crate::reflect::{FieldShape, Shape};
use log::{debug, warn};
use std::collections::HashMap;
use std::rc::Rc;
use syn::meta::ParseNestedMeta;

/// Type resolver - turns `struct` definitions found in parsed sources into [`Shape`]s
///
/// Struct shapes are lazy: a field referring to another known struct resolves through the
/// shared definition table only when the field list is requested, so recursive types are
/// described without unbounded expansion.
pub struct TypeResolver {
    /// Struct definitions indexed by name
    definitions: Rc<HashMap<String, StructDef>>,
    /// Struct names in source order
    order: Vec<String>,
}

/// Struct definition with named fields
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    /// Container-level `#[serde(rename_all = "...")]`
    pub rename_all: Option<String>,
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name as written (raw identifiers unescaped)
    pub name: String,
    pub type_ref: TypeRef,
    pub serde_attrs: SerdeAttributes,
    /// From `#[openapi(desc = "...")]`, or else the field's doc comment
    pub description: Option<String>,
}

/// Owned description of a field's declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Last path segment plus its generic type arguments
    Path { name: String, args: Vec<TypeRef> },
    /// Slices and arrays
    Sequence(Box<TypeRef>),
    Reference(Box<TypeRef>),
    Unknown,
}

/// Serde attributes for a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeAttributes {
    /// Renamed field name
    pub rename: Option<String>,
    /// `skip` or `skip_serializing`
    pub skip: bool,
}

impl TypeResolver {
    /// Create a new TypeResolver from parsed files
    ///
    /// When two structs share a name the first one found wins.
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        let mut definitions = HashMap::new();
        let mut order = Vec::new();

        for parsed_file in parsed_files {
            let mut structs = Vec::new();
            Self::collect_structs(&parsed_file.syntax_tree.items, &mut structs);

            for item_struct in structs {
                let Some(def) = Self::parse_struct_definition(item_struct) else {
                    continue;
                };
                if definitions.contains_key(&def.name) {
                    warn!(
                        "Duplicate struct {} in {}, keeping the first definition",
                        def.name,
                        parsed_file.path.display()
                    );
                    continue;
                }
                order.push(def.name.clone());
                definitions.insert(def.name.clone(), def);
            }
        }

        debug!("TypeResolver found {} struct definitions", order.len());
        Self {
            definitions: Rc::new(definitions),
            order,
        }
    }

    /// Struct names in the order they were found
    pub fn struct_names(&self) -> &[String] {
        &self.order
    }

    /// Find a struct definition by name
    pub fn find_struct_definition(&self, name: &str) -> Option<&StructDef> {
        self.definitions.get(name)
    }

    /// Shape of the named struct, or `None` when no such struct was found
    pub fn resolve_shape(&self, name: &str) -> Option<Shape> {
        if !self.definitions.contains_key(name) {
            debug!("Struct {} not found", name);
            return None;
        }
        Some(struct_shape(&self.definitions, name))
    }

    fn collect_structs<'a>(items: &'a [syn::Item], out: &mut Vec<&'a syn::ItemStruct>) {
        for item in items {
            match item {
                syn::Item::Struct(item_struct) => out.push(item_struct),
                syn::Item::Mod(item_mod) if !is_cfg_test(&item_mod.attrs) => {
                    if let Some((_, nested)) = &item_mod.content {
                        Self::collect_structs(nested, out);
                    }
                }
                _ => {}
            }
        }
    }

    /// Parse a struct with named fields; tuple and unit structs are not models
    fn parse_struct_definition(item_struct: &syn::ItemStruct) -> Option<StructDef> {
        let syn::Fields::Named(named_fields) = &item_struct.fields else {
            return None;
        };

        let name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", name);

        let fields = named_fields
            .named
            .iter()
            .filter_map(Self::parse_field)
            .collect();
        let rename_all = Self::parse_serde_container(&item_struct.attrs);

        Some(StructDef {
            name,
            fields,
            rename_all,
        })
    }

    fn parse_field(field: &syn::Field) -> Option<FieldDef> {
        let ident = field.ident.as_ref()?.to_string();
        let name = ident.strip_prefix("r#").unwrap_or(&ident).to_string();

        Some(FieldDef {
            name,
            type_ref: Self::extract_type_ref(&field.ty),
            serde_attrs: Self::parse_serde_attributes(&field.attrs),
            description: Self::parse_description(&field.attrs),
        })
    }

    /// Parse Serde attributes from field attributes
    fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
        let mut serde_attrs = SerdeAttributes::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    serde_attrs.rename = Self::parse_rename_value(&meta)?;
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    serde_attrs.skip = true;
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            });

            if let Err(e) = result {
                debug!("Ignoring unparsable serde attribute: {}", e);
            }
        }

        serde_attrs
    }

    fn parse_serde_container(attrs: &[syn::Attribute]) -> Option<String> {
        let mut rename_all = None;

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    rename_all = Self::parse_rename_value(&meta)?;
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            });

            if let Err(e) = result {
                debug!("Ignoring unparsable serde attribute: {}", e);
            }
        }

        rename_all
    }

    /// `rename = "x"` or `rename(serialize = "x", ...)`
    fn parse_rename_value(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
        if meta.input.peek(syn::Token![=]) {
            let lit: syn::LitStr = meta.value()?.parse()?;
            return Ok(Some(lit.value()));
        }

        let mut serialize = None;
        meta.parse_nested_meta(|inner| {
            let lit: syn::LitStr = inner.value()?.parse()?;
            if inner.path.is_ident("serialize") {
                serialize = Some(lit.value());
            }
            Ok(())
        })?;
        Ok(serialize)
    }

    fn parse_description(attrs: &[syn::Attribute]) -> Option<String> {
        let mut description = None;

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("openapi")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("desc") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    description = Some(lit.value());
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            });

            if let Err(e) = result {
                debug!("Ignoring unparsable openapi attribute: {}", e);
            }
        }

        description.or_else(|| {
            let doc = annotations::doc_lines(attrs).join(" ");
            if doc.is_empty() {
                None
            } else {
                Some(doc)
            }
        })
    }

    /// Extract a TypeRef from a syn::Type
    fn extract_type_ref(ty: &syn::Type) -> TypeRef {
        match ty {
            syn::Type::Path(type_path) => match type_path.path.segments.last() {
                Some(segment) => {
                    let mut args = Vec::new();
                    if let syn::PathArguments::AngleBracketed(generics) = &segment.arguments {
                        for arg in &generics.args {
                            if let syn::GenericArgument::Type(inner_ty) = arg {
                                args.push(Self::extract_type_ref(inner_ty));
                            }
                        }
                    }
                    TypeRef::Path {
                        name: segment.ident.to_string(),
                        args,
                    }
                }
                None => TypeRef::Unknown,
            },
            syn::Type::Slice(slice) => TypeRef::Sequence(Box::new(Self::extract_type_ref(&slice.elem))),
            syn::Type::Array(array) => TypeRef::Sequence(Box::new(Self::extract_type_ref(&array.elem))),
            syn::Type::Reference(reference) => {
                TypeRef::Reference(Box::new(Self::extract_type_ref(&reference.elem)))
            }
            syn::Type::Paren(paren) => Self::extract_type_ref(&paren.elem),
            syn::Type::Group(group) => Self::extract_type_ref(&group.elem),
            _ => TypeRef::Unknown,
        }
    }
}

/// Consume the value of a nested meta item we have no use for
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta_value(&inner))?;
    }
    Ok(())
}

fn struct_shape(definitions: &Rc<HashMap<String, StructDef>>, name: &str) -> Shape {
    let definitions = Rc::clone(definitions);
    let owned_name = name.to_string();

    Shape::structure(name, move || match definitions.get(&owned_name) {
        Some(def) => def
            .fields
            .iter()
            .map(|field| field_shape(&definitions, def, field))
            .collect(),
        None => Vec::new(),
    })
}

fn field_shape(definitions: &Rc<HashMap<String, StructDef>>, def: &StructDef, field: &FieldDef) -> FieldShape {
    let tag = if field.serde_attrs.skip {
        "-".to_string()
    } else if let Some(rename) = &field.serde_attrs.rename {
        rename.clone()
    } else {
        apply_rename_rule(def.rename_all.as_deref(), &field.name)
    };

    let mut shape = FieldShape::new(&field.name, type_shape(definitions, &field.type_ref)).rename(tag);
    if let Some(description) = &field.description {
        shape = shape.describe(format!("desc={}", description));
    }
    shape
}

fn type_shape(definitions: &Rc<HashMap<String, StructDef>>, type_ref: &TypeRef) -> Shape {
    match type_ref {
        TypeRef::Sequence(inner) => Shape::Seq(Box::new(type_shape(definitions, inner))),
        TypeRef::Reference(inner) => Shape::Indirect(Box::new(type_shape(definitions, inner))),
        TypeRef::Unknown => Shape::Opaque("unknown".to_string()),
        TypeRef::Path { name, args } => {
            if let Some(primitive) = primitive_shape(name) {
                return primitive;
            }

            match (name.as_str(), args.as_slice()) {
                ("Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet", [item]) => {
                    Shape::Seq(Box::new(type_shape(definitions, item)))
                }
                ("HashMap" | "BTreeMap" | "IndexMap", [_, value]) => {
                    Shape::Map(Box::new(type_shape(definitions, value)))
                }
                ("Option" | "Box" | "Rc" | "Arc" | "Cow", [.., inner]) => {
                    Shape::Indirect(Box::new(type_shape(definitions, inner)))
                }
                _ if definitions.contains_key(name) => struct_shape(definitions, name),
                _ => Shape::Opaque(name.clone()),
            }
        }
    }
}

/// Shape of a primitive type name
fn primitive_shape(type_name: &str) -> Option<Shape> {
    match type_name {
        "String" | "str" => Some(Shape::String),
        "char" => Some(Shape::Char),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => Some(Shape::Int),
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => Some(Shape::Uint),
        "f32" | "f64" => Some(Shape::Float),
        "bool" => Some(Shape::Bool),
        _ => None,
    }
}

/// Serde's container-level case conversion, applied to a snake_case field name
fn apply_rename_rule(rule: Option<&str>, field: &str) -> String {
    let pascal = || -> String {
        field
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    };

    match rule {
        Some("lowercase") => field.to_lowercase(),
        Some("UPPERCASE") | Some("SCREAMING_SNAKE_CASE") => field.to_uppercase(),
        Some("PascalCase") => pascal(),
        Some("camelCase") => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        Some("kebab-case") => field.replace('_', "-"),
        Some("SCREAMING-KEBAB-CASE") => field.to_uppercase().replace('_', "-"),
        _ => field.to_string(),
    }
}
