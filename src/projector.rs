//! Match classification and projection
//!
//! Pure functions that turn the anonymous capture sets produced by a query
//! into typed records. The capture names are the only contract with the
//! query text:
//!
//! - symbols: one of `const`, `var`, `function`, `method`, `type` marks the
//!   declaration; `name` carries the identifier; `params`, `result`,
//!   `receiver`, `type_def` and `doc` are auxiliary
//! - outline: `package`, `path`/`alias`, and declaration captures paired with
//!   `func_name`, `method_name`, `type_name`, `const_name`, `var_name`
//! - refs: any capture whose text equals the search term; the capture name
//!   decides the [`ReferenceKind`]

use std::collections::HashMap;

use crate::models::{
    Capture, FileOutline, ImportInfo, Position, QueryMatch, Reference, ReferenceKind, Symbol,
    SymbolKind, Visibility, VisibilityFilter,
};

/// Captures of one match indexed by name; a repeated name keeps the last capture
pub type CaptureMap<'a> = HashMap<&'a str, &'a Capture>;

/// Index a match's captures by name
pub fn capture_map(m: &QueryMatch) -> CaptureMap<'_> {
    let mut map = HashMap::with_capacity(m.captures.len());
    for capture in &m.captures {
        map.insert(capture.name.as_str(), capture);
    }
    map
}

/// The declaration a symbol match describes, with its declaration capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'a> {
    Const(&'a Capture),
    Var(&'a Capture),
    Function(&'a Capture),
    Method(&'a Capture),
    /// Named type, refined to struct/interface from the `type_def` node kind
    Type(&'a Capture, SymbolKind),
}

impl<'a> Declaration<'a> {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Declaration::Const(_) => SymbolKind::Const,
            Declaration::Var(_) => SymbolKind::Var,
            Declaration::Function(_) => SymbolKind::Function,
            Declaration::Method(_) => SymbolKind::Method,
            Declaration::Type(_, kind) => *kind,
        }
    }

    /// The capture spanning the whole declaration
    pub fn capture(&self) -> &'a Capture {
        match *self {
            Declaration::Const(c)
            | Declaration::Var(c)
            | Declaration::Function(c)
            | Declaration::Method(c)
            | Declaration::Type(c, _) => c,
        }
    }
}

/// Decide what a capture set declares
///
/// `const` and `var` are checked first: their patterns may also carry a
/// `type` capture for the annotation.
pub fn classify<'a>(captures: &CaptureMap<'a>) -> Option<Declaration<'a>> {
    if let Some(&c) = captures.get("const") {
        return Some(Declaration::Const(c));
    }
    if let Some(&c) = captures.get("var") {
        return Some(Declaration::Var(c));
    }
    if let Some(&c) = captures.get("function") {
        return Some(Declaration::Function(c));
    }
    if let Some(&c) = captures.get("method") {
        return Some(Declaration::Method(c));
    }
    if let Some(&c) = captures.get("type") {
        let kind = match captures.get("type_def") {
            Some(def) if def.node_type.starts_with("struct") => SymbolKind::Struct,
            Some(def) if def.node_type.starts_with("interface") => SymbolKind::Interface,
            _ => SymbolKind::Type,
        };
        return Some(Declaration::Type(c, kind));
    }
    None
}

/// Exported when the first character is upper-case, in any script
pub fn visibility_of(name: &str) -> Visibility {
    if name.chars().next().is_some_and(char::is_uppercase) {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

/// Settings for symbol projection
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolOptions {
    pub visibility: VisibilityFilter,
    pub include_source: bool,
    /// 0 keeps the full source
    pub max_source_lines: usize,
}

/// Project one match into a symbol, ignoring the visibility filter
pub fn project_symbol(m: &QueryMatch, opts: &SymbolOptions) -> Option<Symbol> {
    let captures = capture_map(m);
    let decl = classify(&captures)?;

    let name = captures.get("name")?;
    if name.text.is_empty() {
        return None;
    }

    let mut range = match decl {
        Declaration::Type(c, _) => c.range,
        _ => name.range,
    };

    let mut source = None;
    if opts.include_source {
        let c = decl.capture();
        source = Some(truncate_source(&c.text, opts.max_source_lines));
        range = c.range;
    }

    let (signature, receiver) = match decl {
        Declaration::Function(_) => (Some(build_signature(&captures)), None),
        Declaration::Method(_) => (
            Some(build_signature(&captures)),
            captures.get("receiver").map(|r| receiver_type(&r.text)),
        ),
        _ => (None, None),
    };

    Some(Symbol {
        name: name.text.clone(),
        kind: decl.kind(),
        visibility: visibility_of(&name.text),
        file: m.file.clone(),
        range,
        signature,
        source,
        receiver,
        doc: doc_text(m),
    })
}

/// Project every match of a file, applying the visibility filter
pub fn extract_symbols(matches: &[QueryMatch], opts: &SymbolOptions) -> Vec<Symbol> {
    matches
        .iter()
        .filter_map(|m| project_symbol(m, opts))
        .filter(|s| opts.visibility.allows(s.visibility))
        .collect()
}

/// `func [receiver ]name(params)[ result]`
pub fn build_signature(captures: &CaptureMap) -> String {
    let mut sig = String::from("func");
    if let Some(recv) = captures.get("receiver") {
        sig.push(' ');
        sig.push_str(&recv.text);
    }
    if let Some(name) = captures.get("name") {
        sig.push(' ');
        sig.push_str(&name.text);
    }
    if let Some(params) = captures.get("params") {
        sig.push_str(&params.text);
    }
    if let Some(result) = captures.get("result") {
        sig.push(' ');
        sig.push_str(&result.text);
    }
    sig
}

/// Bare receiver type: `(r *Server)` becomes `Server`
pub fn receiver_type(receiver: &str) -> String {
    let inner = receiver.strip_prefix('(').unwrap_or(receiver);
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    match inner.split_whitespace().last() {
        Some(last) => last
            .strip_prefix('*')
            .or_else(|| last.strip_prefix('&'))
            .unwrap_or(last)
            .to_string(),
        None => inner.to_string(),
    }
}

/// Keep the first `max_lines` lines and mark the cut with a `...` line
pub fn truncate_source(source: &str, max_lines: usize) -> String {
    if max_lines == 0 {
        return source.to_string();
    }
    let lines: Vec<&str> = source.split('\n').collect();
    if lines.len() <= max_lines {
        return source.to_string();
    }
    format!("{}\n...", lines[..max_lines].join("\n"))
}

fn doc_text(m: &QueryMatch) -> Option<String> {
    let lines: Vec<String> = m
        .captures
        .iter()
        .filter(|c| c.name == "doc")
        .flat_map(|c| strip_comment_markers(&c.text))
        .collect();

    let doc = lines.join("\n").trim().to_string();
    (!doc.is_empty()).then_some(doc)
}

fn strip_comment_markers(comment: &str) -> Vec<String> {
    let body = comment.trim();
    if let Some(block) = body.strip_prefix("/*") {
        let block = block.strip_suffix("*/").unwrap_or(block);
        block
            .lines()
            .map(|l| {
                let l = l.trim();
                l.strip_prefix('*').map(str::trim_start).unwrap_or(l).to_string()
            })
            .collect()
    } else {
        body.lines()
            .map(|l| {
                let l = l.trim();
                let l = l.strip_prefix("//").unwrap_or(l);
                l.strip_prefix(' ').unwrap_or(l).to_string()
            })
            .collect()
    }
}

/// Outline declaration captures, their name capture and resulting kind
const OUTLINE_RULES: &[(&str, &str, SymbolKind)] = &[
    ("function", "func_name", SymbolKind::Function),
    ("method", "method_name", SymbolKind::Method),
    ("struct", "type_name", SymbolKind::Struct),
    ("interface", "type_name", SymbolKind::Interface),
    ("type_alias", "type_name", SymbolKind::Type),
    ("type_ptr", "type_name", SymbolKind::Type),
    ("type_slice", "type_name", SymbolKind::Type),
    ("type_map", "type_name", SymbolKind::Type),
    ("type_func", "type_name", SymbolKind::Type),
    ("const", "const_name", SymbolKind::Const),
    ("var", "var_name", SymbolKind::Var),
];

/// Fold one file's outline matches into a [`FileOutline`]
pub fn build_outline(
    file: &str,
    matches: &[QueryMatch],
    include_source: bool,
    max_source_lines: usize,
) -> FileOutline {
    let mut outline = FileOutline {
        file: file.to_string(),
        ..Default::default()
    };

    for m in matches {
        let captures = capture_map(m);

        if let Some(pkg) = captures.get("package") {
            outline.package = pkg.text.clone();
            continue;
        }

        if let Some(path) = captures.get("path") {
            outline.imports.push(ImportInfo {
                path: path.text.trim_matches(|c| c == '"' || c == '`').to_string(),
                alias: captures.get("alias").map(|a| a.text.clone()),
            });
            continue;
        }

        let Some((decl, name, kind)) = OUTLINE_RULES
            .iter()
            .find_map(|(decl, name, kind)| captures.get(decl).map(|d| (*d, captures.get(name), *kind)))
        else {
            log::trace!("{}: outline match without a known declaration capture", file);
            continue;
        };

        let Some(name) = name.filter(|n| !n.text.is_empty()) else {
            continue;
        };

        let receiver = match kind {
            SymbolKind::Method => captures
                .get("receiver_type")
                .map(|r| r.text.trim_start_matches('*').to_string()),
            _ => None,
        };

        outline.symbols.push(Symbol {
            name: name.text.clone(),
            kind,
            visibility: visibility_of(&name.text),
            file: file.to_string(),
            range: decl.range,
            signature: None,
            source: include_source.then(|| truncate_source(&decl.text, max_source_lines)),
            receiver,
            doc: doc_text(m),
        });
    }

    outline
}

/// Map a refs capture name to the kind of use it records
pub fn reference_kind(capture_name: &str) -> ReferenceKind {
    match capture_name {
        "call" => ReferenceKind::Call,
        "type_ref" | "composite_type" => ReferenceKind::TypeRef,
        "field" => ReferenceKind::FieldAccess,
        "ident" | "short_var" => ReferenceKind::Identifier,
        _ => ReferenceKind::Reference,
    }
}

fn specificity(kind: ReferenceKind) -> u8 {
    match kind {
        ReferenceKind::Call => 4,
        ReferenceKind::TypeRef => 3,
        ReferenceKind::FieldAccess => 2,
        ReferenceKind::Identifier => 1,
        ReferenceKind::Reference => 0,
    }
}

/// Collect references to `symbol` from one file's matches
///
/// Only captures whose text is exactly `symbol` count. Captures landing on
/// the same start position collapse into one reference of the most specific
/// kind, so a call site is not also reported as a bare identifier.
pub fn find_references(
    file: &str,
    matches: &[QueryMatch],
    source: &[u8],
    symbol: &str,
    include_context: bool,
) -> Vec<Reference> {
    let text = String::from_utf8_lossy(source);
    let lines: Vec<&str> = text.split('\n').collect();

    let mut refs: Vec<Reference> = Vec::new();
    let mut seen: HashMap<Position, usize> = HashMap::new();

    for capture in matches.iter().flat_map(|m| &m.captures) {
        if capture.text != symbol {
            continue;
        }

        let position = capture.range.start;
        let kind = reference_kind(&capture.name);

        if let Some(&idx) = seen.get(&position) {
            if specificity(kind) > specificity(refs[idx].kind) {
                refs[idx].kind = kind;
            }
            continue;
        }

        let context = if include_context {
            position
                .line
                .checked_sub(1)
                .and_then(|idx| lines.get(idx))
                .map(|line| line.trim().to_string())
        } else {
            None
        };

        seen.insert(position, refs.len());
        refs.push(Reference {
            symbol: symbol.to_string(),
            kind,
            file: file.to_string(),
            position,
            context,
        });
    }

    refs
}
