//! Directive grammar for handler doc comments.
//!
//! ```text
//! /// @Summary Get user by ID
//! /// @Description Returns user data based on ID
//! /// @Tags user,admin
//! /// @Param id path string true "User ID"
//! /// @RequestBody {object} UpdateUser true "Changes to apply"
//! /// @Success 200 {object} UserResponse "The user"
//! /// @Failure 404 "Not found"
//! /// @Header 200 X-RateLimit-Remaining integer true "Remaining quota"
//! /// @Security BearerAuth
//! /// @Deprecated
//! /// @Router /user/{id} [put]
//! ```
//!
//! Keywords are matched literally, including the space that follows them. Token-count
//! thresholds are part of the grammar: a line with too few tokens is ignored rather than
//! partially applied.

use super::{
    normalize_path, Header, Parameter, ParameterLocation, RequestBody, ResponseDoc, RouteDoc,
    SecurityRequirement,
};
use log::debug;

/// Collects the text of every `#[doc = "..."]` attribute, one trimmed entry per line.
///
/// Block doc comments are split into lines and their leading `*` gutters removed. Blank
/// lines are dropped.
pub fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut lines = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        let syn::Meta::NameValue(meta) = &attr.meta else {
            continue;
        };
        let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit_str),
            ..
        }) = &meta.value
        else {
            continue;
        };

        for line in lit_str.value().lines() {
            let line = line.trim();
            let line = line.strip_prefix('*').map(str::trim_start).unwrap_or(line);
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
    }

    lines
}

/// Builds a route record from the directive lines of one handler.
///
/// The result may be incomplete; callers check [`RouteDoc::is_routable`].
pub fn parse_directives(handler_name: &str, lines: &[String]) -> RouteDoc {
    let mut route = RouteDoc::new(handler_name);

    for line in lines {
        apply_directive(&mut route, line);
    }

    route
}

fn apply_directive(route: &mut RouteDoc, text: &str) {
    if let Some(rest) = text.strip_prefix("@Summary ") {
        route.summary = rest.to_string();
    } else if let Some(rest) = text.strip_prefix("@Description ") {
        route.description = rest.to_string();
    } else if let Some(rest) = text.strip_prefix("@Tags ") {
        route.tags = rest
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
    } else if let Some(rest) = text
        .strip_prefix("@Success ")
        .or_else(|| text.strip_prefix("@Failure "))
    {
        match parse_response(rest) {
            Some((status, response)) => {
                route.responses.insert(status, response);
            }
            None => debug!("{}: ignoring malformed response directive: {}", route.handler_name, text),
        }
    } else if let Some(rest) = text.strip_prefix("@Router ") {
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if let [path, method] = tokens.as_slice() {
            route.path = normalize_path(path);
            route.method = method.trim_matches(|c| c == '[' || c == ']').to_string();
        } else {
            debug!("{}: ignoring malformed @Router: {}", route.handler_name, text);
        }
    } else if let Some(rest) = text.strip_prefix("@Param ") {
        match parse_param(rest) {
            Some(param) => route.parameters.push(param),
            None => debug!("{}: ignoring malformed @Param: {}", route.handler_name, text),
        }
    } else if let Some(rest) = text.strip_prefix("@RequestBody ") {
        match parse_request_body(rest) {
            Some(body) => route.request_body = Some(body),
            None => debug!("{}: ignoring malformed @RequestBody: {}", route.handler_name, text),
        }
    } else if let Some(rest) = text.strip_prefix("@Header ") {
        match parse_header(rest) {
            Some(header) => route.headers.push(header),
            None => debug!("{}: ignoring malformed @Header: {}", route.handler_name, text),
        }
    } else if let Some(rest) = text.strip_prefix("@Security ") {
        if let Some(requirement) = SecurityRequirement::parse(rest) {
            route.security.push(requirement);
        }
    } else if text.trim().eq_ignore_ascii_case("@Deprecated") {
        route.deprecated = true;
    }
}

/// `@Success 200 {object} Model "description"` or `@Failure 401 "description"`
fn parse_response(rest: &str) -> Option<(String, ResponseDoc)> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let (status, tail) = tokens.split_first()?;

    let response = match tail {
        [marker, model, description @ ..] if marker.starts_with('{') => {
            ResponseDoc::new(*model, join_description(description))
        }
        [marker] if marker.starts_with('{') => return None,
        description => ResponseDoc::new("", join_description(description)),
    };

    Some((status.to_string(), response))
}

/// `@Param name location type required "description"`
fn parse_param(rest: &str) -> Option<Parameter> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [name, location, schema_type, required, description @ ..] = tokens.as_slice() else {
        return None;
    };
    let location = ParameterLocation::parse(location)?;

    Some(
        Parameter::new(*name, location, *schema_type, *required == "true")
            .with_description(join_description(description)),
    )
}

/// `@RequestBody {object} Model required "description"`
fn parse_request_body(rest: &str) -> Option<RequestBody> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [_, model, required, description @ ..] = tokens.as_slice() else {
        return None;
    };
    if description.is_empty() {
        return None;
    }

    let mut body = RequestBody::json(*model, *required == "true");
    body.description = join_description(description);
    Some(body)
}

/// `@Header status name type required "description"`
fn parse_header(rest: &str) -> Option<Header> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [status, name, schema_type, required, description @ ..] = tokens.as_slice() else {
        return None;
    };
    if description.is_empty() {
        return None;
    }

    Some(Header {
        status_code: status.to_string(),
        name: name.to_string(),
        schema_type: schema_type.to_string(),
        required: *required == "true",
        description: join_description(description),
    })
}

fn join_description(tokens: &[&str]) -> String {
    tokens.join(" ").trim_matches('"').to_string()
}
