//! Code-shape inference for handlers whose directives leave categories empty.
//!
//! Each detector is an independent [`Visit`] pass over the handler body looking for one
//! family of method calls (see [`Conventions`] for the names). A detector that finds
//! nothing returns `None`, which means "leave the field empty"; it is never an error.

use super::{Header, Parameter, ParameterLocation, RequestBody, ResponseDoc, RouteDoc};
use crate::conventions::Conventions;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashMap;
use syn::visit::{self, Visit};
use syn::{Expr, ExprMethodCall, Lit};

/// Runs the detectors against one handler.
pub struct CodeShapeInference<'a> {
    conventions: &'a Conventions,
}

impl<'a> CodeShapeInference<'a> {
    pub fn new(conventions: &'a Conventions) -> Self {
        Self { conventions }
    }

    /// Fills every empty category of `route` that the body gives evidence for.
    ///
    /// Categories populated by directives are never touched.
    pub fn apply(&self, route: &mut RouteDoc, sig: &syn::Signature, body: &syn::Block) {
        let locals = LocalTypes::collect(sig, body);

        if route.parameters.is_empty() {
            if let Some(parameters) = self.detect_parameters(body) {
                debug!("{}: inferred {} parameters", route.handler_name, parameters.len());
                route.parameters = parameters;
            }
        }

        if route.headers.is_empty() {
            if let Some(headers) = self.detect_response_headers(body) {
                debug!("{}: inferred {} response headers", route.handler_name, headers.len());
                route.headers = headers;
            }
        }

        if route.request_body.is_none() {
            if let Some(body) = self.detect_request_body(body, &locals) {
                debug!("{}: inferred request body {}", route.handler_name, body.model);
                route.request_body = Some(body);
            }
        }

        if route.responses.is_empty() {
            if let Some(responses) = self.detect_responses(body, &locals) {
                debug!("{}: inferred {} responses", route.handler_name, responses.len());
                route.responses = responses;
            }
        }
    }

    /// Path, query and request-header reads with a single string-literal argument.
    pub fn detect_parameters(&self, body: &syn::Block) -> Option<Vec<Parameter>> {
        let mut detector = ParameterDetector {
            conventions: self.conventions,
            found: Vec::new(),
        };
        detector.visit_block(body);
        non_empty(detector.found)
    }

    /// Response header writes: two arguments, the first a string literal.
    pub fn detect_response_headers(&self, body: &syn::Block) -> Option<Vec<Header>> {
        let mut detector = ResponseHeaderDetector {
            method: &self.conventions.response_header,
            found: Vec::new(),
        };
        detector.visit_block(body);
        non_empty(detector.found)
    }

    /// The first body-binding call whose `&var` argument has a known type.
    pub fn detect_request_body(&self, body: &syn::Block, locals: &LocalTypes) -> Option<RequestBody> {
        let mut detector = BodyBindingDetector {
            method: &self.conventions.bind_body,
            locals,
            found: None,
        };
        detector.visit_block(body);
        detector.found.map(|model| RequestBody::json(model, true))
    }

    /// JSON writes with a literal status code; the value's type becomes the model.
    pub fn detect_responses(
        &self,
        body: &syn::Block,
        locals: &LocalTypes,
    ) -> Option<IndexMap<String, ResponseDoc>> {
        let mut detector = ResponseModelDetector {
            method: &self.conventions.write_json,
            locals,
            found: IndexMap::new(),
        };
        detector.visit_block(body);
        if detector.found.is_empty() {
            None
        } else {
            Some(detector.found)
        }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

struct ParameterDetector<'c> {
    conventions: &'c Conventions,
    found: Vec<Parameter>,
}

impl<'ast> Visit<'ast> for ParameterDetector<'_> {
    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if call.args.len() == 1 {
            let method = call.method.to_string();
            let location = if method == self.conventions.path_param {
                Some(ParameterLocation::Path)
            } else if method == self.conventions.query_param {
                Some(ParameterLocation::Query)
            } else if method == self.conventions.request_header {
                Some(ParameterLocation::Header)
            } else {
                None
            };

            if let (Some(location), Some(name)) = (location, string_literal(&call.args[0])) {
                let (required, description) = match location {
                    ParameterLocation::Path => (true, format!("Path parameter '{}'", name)),
                    ParameterLocation::Query => (false, format!("Query parameter '{}'", name)),
                    _ => (false, format!("Header '{}'", name)),
                };
                self.found.push(
                    Parameter::new(name, location, "string", required).with_description(description),
                );
            }
        }

        visit::visit_expr_method_call(self, call);
    }

    fn visit_item(&mut self, _: &'ast syn::Item) {}
}

struct ResponseHeaderDetector<'c> {
    method: &'c str,
    found: Vec<Header>,
}

impl<'ast> Visit<'ast> for ResponseHeaderDetector<'_> {
    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if call.method == self.method && call.args.len() == 2 {
            if let Some(name) = string_literal(&call.args[0]) {
                self.found.push(Header {
                    status_code: "200".to_string(),
                    description: format!("Header '{}'", name),
                    name,
                    schema_type: "string".to_string(),
                    required: true,
                });
            }
        }

        visit::visit_expr_method_call(self, call);
    }

    fn visit_item(&mut self, _: &'ast syn::Item) {}
}

struct BodyBindingDetector<'c> {
    method: &'c str,
    locals: &'c LocalTypes,
    found: Option<String>,
}

impl<'ast> Visit<'ast> for BodyBindingDetector<'_> {
    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if self.found.is_none() && call.method == self.method && call.args.len() == 1 {
            if let Expr::Reference(reference) = &call.args[0] {
                self.found = local_name(&reference.expr).and_then(|name| self.locals.type_of(&name));
            }
        }

        visit::visit_expr_method_call(self, call);
    }

    fn visit_item(&mut self, _: &'ast syn::Item) {}
}

struct ResponseModelDetector<'c> {
    method: &'c str,
    locals: &'c LocalTypes,
    found: IndexMap<String, ResponseDoc>,
}

impl<'ast> Visit<'ast> for ResponseModelDetector<'_> {
    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if call.method == self.method && call.args.len() == 2 {
            let status = status_literal(&call.args[0]);
            let model = self.value_type(&call.args[1]);
            if let (Some(status), Some(model)) = (status, model) {
                self.found.insert(status, ResponseDoc::new(model, ""));
            }
        }

        visit::visit_expr_method_call(self, call);
    }

    fn visit_item(&mut self, _: &'ast syn::Item) {}
}

impl ResponseModelDetector<'_> {
    fn value_type(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Reference(reference) => self.value_type(&reference.expr),
            Expr::Paren(paren) => self.value_type(&paren.expr),
            _ => constructed_type(expr)
                .or_else(|| local_name(expr).and_then(|name| self.locals.type_of(&name))),
        }
    }
}

/// Static types of the locals and parameters visible in one handler.
///
/// The table is flow-insensitive: a shadowing `let` replaces the earlier entry.
#[derive(Debug, Default)]
pub struct LocalTypes {
    types: HashMap<String, String>,
}

impl LocalTypes {
    pub fn collect(sig: &syn::Signature, body: &syn::Block) -> Self {
        let mut locals = Self::default();

        for input in &sig.inputs {
            if let syn::FnArg::Typed(pat_type) = input {
                if let (syn::Pat::Ident(ident), Some(ty)) = (&*pat_type.pat, type_name(&pat_type.ty)) {
                    locals.types.insert(ident.ident.to_string(), ty);
                }
            }
        }

        locals.visit_block(body);
        locals
    }

    pub fn type_of(&self, name: &str) -> Option<String> {
        self.types.get(name).cloned()
    }
}

impl<'ast> Visit<'ast> for LocalTypes {
    fn visit_local(&mut self, local: &'ast syn::Local) {
        match &local.pat {
            syn::Pat::Type(pat_type) => {
                if let (syn::Pat::Ident(ident), Some(ty)) = (&*pat_type.pat, type_name(&pat_type.ty)) {
                    self.types.insert(ident.ident.to_string(), ty);
                }
            }
            syn::Pat::Ident(ident) => {
                if let Some(ty) = local.init.as_ref().and_then(|init| constructed_type(&init.expr)) {
                    self.types.insert(ident.ident.to_string(), ty);
                }
            }
            _ => {}
        }

        visit::visit_local(self, local);
    }

    fn visit_item(&mut self, _: &'ast syn::Item) {}
}

/// Generic wrappers whose single type argument is the model.
const INDIRECTIONS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow"];

/// Names that never denote a registered model.
const NON_MODELS: &[&str] = &[
    "Self", "Default", "Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet", "HashMap",
    "BTreeMap", "IndexMap", "Result", "String", "str", "bool", "char", "i8", "i16", "i32",
    "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32", "f64",
];

/// Model name of a declared type, looking through references and indirection wrappers.
///
/// Collections, primitives and `Self` yield `None`.
fn type_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            if INDIRECTIONS.contains(&segment.ident.to_string().as_str()) {
                first_type_argument(&segment.arguments).and_then(type_name)
            } else {
                model_name(&segment.ident)
            }
        }
        syn::Type::Reference(reference) => type_name(&reference.elem),
        syn::Type::Paren(paren) => type_name(&paren.elem),
        syn::Type::Group(group) => type_name(&group.elem),
        _ => None,
    }
}

fn first_type_argument(arguments: &syn::PathArguments) -> Option<&syn::Type> {
    let syn::PathArguments::AngleBracketed(generics) = arguments else {
        return None;
    };
    generics.args.iter().find_map(|arg| match arg {
        syn::GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn model_name(ident: &syn::Ident) -> Option<String> {
    let name = ident.to_string();
    if NON_MODELS.contains(&name.as_str()) || INDIRECTIONS.contains(&name.as_str()) {
        None
    } else {
        Some(name)
    }
}

/// Type of a freshly constructed value: `T { .. }` or `T::ctor(..)`.
fn constructed_type(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Struct(expr_struct) => expr_struct.path.segments.last().and_then(|s| model_name(&s.ident)),
        Expr::Call(call) => {
            let Expr::Path(func) = &*call.func else {
                return None;
            };
            let segments: Vec<_> = func.path.segments.iter().collect();
            let owner = &segments[segments.len().checked_sub(2)?].ident;
            if owner.to_string().starts_with(char::is_uppercase) {
                model_name(owner)
            } else {
                None
            }
        }
        Expr::Paren(paren) => constructed_type(&paren.expr),
        _ => None,
    }
}

/// Name of a bare single-segment variable reference.
fn local_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(path) if path.qself.is_none() => path.path.get_ident().map(|i| i.to_string()),
        Expr::Paren(paren) => local_name(&paren.expr),
        _ => None,
    }
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        _ => None,
    }
}

fn status_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Int(lit_int) => Some(lit_int.base10_digits().to_string()),
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        _ => None,
    }
}
