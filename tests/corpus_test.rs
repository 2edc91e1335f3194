//! Corpus-based tests
//!
//! Exercises every operation against the Go fixtures in tests/corpus/go:
//! - Symbol detection (all kinds, signatures, receivers, visibility)
//! - Outlines (package, imports, type categories)
//! - References (kind classification, context)
//! - Discovery (ignored directories, files without symbols)


use tsq::{
    OutlineOptions, QueryOptions, ReferenceKind, SymbolKind, SymbolsOptions, Visibility,
    VisibilityFilter,
};
use test_helpers::*;

// ==================== Symbol Detection Tests ====================

#[test]
fn test_corpus_symbol_files() {
    let results = symbols_for(dir_target(&corpus_path()));
    let files: Vec<&str> = results.iter().map(|r| r.file.as_str()).collect();

    // doc.go has no declarations and vendor/ is pruned
    assert_eq!(files, vec!["multi.go", "server.go", "types.go", "unicode.go"]);
}

#[test]
fn test_corpus_server_symbols() {
    let results = symbols_for(file_target(&corpus_path().join("server.go")));
    let symbols = flatten(&results);

    assert_eq!(symbols.len(), 12);
    assert_symbol_found(&symbols, "DefaultPort", SymbolKind::Const);
    assert_symbol_found(&symbols, "maxConns", SymbolKind::Const);
    assert_symbol_found(&symbols, "Version", SymbolKind::Const);
    assert_symbol_found(&symbols, "ErrClosed", SymbolKind::Var);
    assert_symbol_found(&symbols, "started", SymbolKind::Var);
    assert_symbol_found(&symbols, "Count", SymbolKind::Var);
    assert_symbol_found(&symbols, "Handler", SymbolKind::Interface);
    assert_symbol_found(&symbols, "Server", SymbolKind::Struct);
    assert_symbol_found(&symbols, "NewServer", SymbolKind::Function);
    assert_symbol_found(&symbols, "helper", SymbolKind::Function);
    assert_symbol_found(&symbols, "Start", SymbolKind::Method);
    assert_symbol_found(&symbols, "address", SymbolKind::Method);
}

#[test]
fn test_corpus_multi_name_declarations() {
    let results = symbols_for(file_target(&corpus_path().join("multi.go")));
    let symbols = flatten(&results);

    assert_eq!(symbols.len(), 8);
    for name in ["a", "B", "lo", "Hi", "x", "Y"] {
        assert_symbol_found(&symbols, name, SymbolKind::Const);
    }
    for name in ["m", "N"] {
        assert_symbol_found(&symbols, name, SymbolKind::Var);
    }
    assert_eq!(find_symbol(&symbols, "a").visibility, Visibility::Private);
    assert_eq!(find_symbol(&symbols, "B").visibility, Visibility::Public);
    assert_eq!(find_symbol(&symbols, "Hi").range.start.line, 6);
    assert_eq!(find_symbol(&symbols, "Y").range.start.line, 7);
}

#[test]
fn test_corpus_signatures() {
    let results = symbols_for(file_target(&corpus_path().join("server.go")));
    let symbols = flatten(&results);

    assert_eq!(
        find_symbol(&symbols, "NewServer").signature.as_deref(),
        Some("func NewServer(addr string, handler Handler) *Server")
    );
    assert_eq!(
        find_symbol(&symbols, "helper").signature.as_deref(),
        Some("func helper(a, b int) (int, error)")
    );
    assert_eq!(
        find_symbol(&symbols, "Start").signature.as_deref(),
        Some("func (s *Server) Start() error")
    );
    assert!(find_symbol(&symbols, "Server").signature.is_none());
}

#[test]
fn test_corpus_receivers() {
    let results = symbols_for(dir_target(&corpus_path()));
    let symbols = flatten(&results);

    assert_eq!(find_symbol(&symbols, "Start").receiver.as_deref(), Some("Server"));
    assert_eq!(find_symbol(&symbols, "address").receiver.as_deref(), Some("Server"));
    assert_eq!(find_symbol(&symbols, "Push").receiver.as_deref(), Some("Stack[T]"));
    assert!(find_symbol(&symbols, "NewServer").receiver.is_none());
}

#[test]
fn test_corpus_type_kinds() {
    let results = symbols_for(file_target(&corpus_path().join("types.go")));
    let symbols = flatten(&results);

    for name in ["ID", "Names", "Index", "Callback", "Ptr", "Wrapper"] {
        assert_symbol_found(&symbols, name, SymbolKind::Type);
    }
    assert_symbol_found(&symbols, "Stack", SymbolKind::Struct);
    assert_symbol_found(&symbols, "Push", SymbolKind::Method);
}

#[test]
fn test_corpus_unicode_visibility() {
    let results = symbols_for(file_target(&corpus_path().join("unicode.go")));
    let symbols = flatten(&results);

    assert_eq!(find_symbol(&symbols, "Ärger").visibility, Visibility::Public);
    assert_eq!(find_symbol(&symbols, "ärger").visibility, Visibility::Private);
    assert_eq!(find_symbol(&symbols, "Π").visibility, Visibility::Public);
}

#[test]
fn test_corpus_visibility_filter() {
    let mut results = engine()
        .symbols(&SymbolsOptions {
            target: dir_target(&corpus_path()),
            visibility: VisibilityFilter::Private,
            ..Default::default()
        })
        .unwrap();
    results.sort_by(|a, b| a.file.cmp(&b.file));
    let symbols = flatten(&results);

    assert!(symbols.iter().all(|s| s.visibility == Visibility::Private));
    assert_symbol_found(&symbols, "helper", SymbolKind::Function);
    assert_symbol_absent(&symbols, "NewServer");
}

#[test]
fn test_corpus_include_source_truncates() {
    let results = engine()
        .symbols(&SymbolsOptions {
            target: file_target(&corpus_path().join("server.go")),
            include_source: true,
            max_source_lines: Some(2),
            ..Default::default()
        })
        .unwrap();
    let symbols = flatten(&results);

    let start = find_symbol(&symbols, "Start");
    assert_eq!(
        start.source.as_deref(),
        Some("func (s *Server) Start() error {\n\tif s.handler == nil {\n...")
    );
    assert_eq!(start.range.start.column, 1);

    let port = find_symbol(&symbols, "DefaultPort");
    assert_eq!(port.source.as_deref(), Some("DefaultPort = 8080"));
}

// ==================== Outline Tests ====================

#[test]
fn test_corpus_outline() {
    let outline = engine()
        .outline(&OutlineOptions {
            file: Some(corpus_path().join("server.go")),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(outline.file, "server.go");
    assert_eq!(outline.package, "server");

    assert_eq!(outline.imports.len(), 2);
    assert_eq!(outline.imports[0].path, "fmt");
    assert_eq!(outline.imports[0].alias, None);
    assert_eq!(outline.imports[1].path, "net/http");
    assert_eq!(outline.imports[1].alias.as_deref(), Some("h"));

    let symbols: Vec<_> = outline.symbols.iter().collect();
    assert_eq!(symbols.len(), 12);
    assert_symbol_found(&symbols, "Server", SymbolKind::Struct);
    assert_symbol_found(&symbols, "Handler", SymbolKind::Interface);
    assert_symbol_found(&symbols, "Start", SymbolKind::Method);
    assert_eq!(find_symbol(&symbols, "Start").receiver.as_deref(), Some("Server"));
    assert!(symbols.iter().all(|s| s.source.is_none()));
}

#[test]
fn test_corpus_outline_type_categories() {
    let outline = engine()
        .outline(&OutlineOptions {
            file: Some(corpus_path().join("types.go")),
            include_source: true,
            max_source_lines: Some(1),
            ..Default::default()
        })
        .unwrap();

    assert!(outline.imports.is_empty());
    let symbols: Vec<_> = outline.symbols.iter().collect();

    for name in ["ID", "Names", "Index", "Callback", "Ptr", "Wrapper"] {
        assert_symbol_found(&symbols, name, SymbolKind::Type);
    }
    assert_symbol_found(&symbols, "Stack", SymbolKind::Struct);
    assert_eq!(find_symbol(&symbols, "Push").receiver.as_deref(), Some("Stack[T]"));
    assert_eq!(
        find_symbol(&symbols, "Stack").source.as_deref(),
        Some("Stack[T any] struct {\n...")
    );
}

#[test]
fn test_corpus_outline_multi_name_declarations() {
    let outline = engine()
        .outline(&OutlineOptions {
            file: Some(corpus_path().join("multi.go")),
            ..Default::default()
        })
        .unwrap();

    let symbols: Vec<_> = outline.symbols.iter().collect();
    assert_eq!(symbols.len(), 8);
    for name in ["a", "B", "lo", "Hi", "x", "Y"] {
        assert_symbol_found(&symbols, name, SymbolKind::Const);
    }
    assert_symbol_found(&symbols, "m", SymbolKind::Var);
    assert_symbol_found(&symbols, "N", SymbolKind::Var);
    assert_eq!(find_symbol(&symbols, "N").visibility, Visibility::Public);
    assert_eq!(find_symbol(&symbols, "lo").visibility, Visibility::Private);
}

#[test]
fn test_corpus_outline_without_declarations() {
    let outline = engine()
        .outline(&OutlineOptions {
            file: Some(corpus_path().join("doc.go")),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(outline.package, "server");
    assert!(outline.symbols.is_empty());
}

// ==================== Reference Tests ====================

#[test]
fn test_corpus_type_references() {
    let refs = refs_for("Server", dir_target(&corpus_path()));

    let server_go: Vec<_> = refs.iter().filter(|r| r.file == "server.go").collect();
    assert_eq!(server_go.len(), 5);
    assert!(server_go.iter().all(|r| r.kind == ReferenceKind::TypeRef));
    assert_eq!(server_go[0].context.as_deref(), Some("type Server struct {"));

    // `type Ptr *Server` and `type Wrapper Server`
    assert_eq!(refs.iter().filter(|r| r.file == "types.go").count(), 2);
}

#[test]
fn test_corpus_identifier_references() {
    let refs = refs_for("Count", dir_target(&corpus_path()));

    assert_eq!(refs.len(), 2);
    assert!(refs.iter().all(|r| r.kind == ReferenceKind::Identifier));
    assert_eq!(refs[1].context.as_deref(), Some("Count++"));
}

#[test]
fn test_corpus_call_and_field_references() {
    let sprintf = refs_for("Sprintf", dir_target(&corpus_path()));
    assert_eq!(sprintf.len(), 1);
    assert_eq!(sprintf[0].kind, ReferenceKind::Call);

    let handler = refs_for("handler", file_target(&corpus_path().join("server.go")));
    let kinds: Vec<_> = handler.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&ReferenceKind::FieldAccess));
    assert!(kinds.contains(&ReferenceKind::Identifier));
}

#[test]
fn test_corpus_vendor_is_ignored() {
    let refs = refs_for("Vendored", dir_target(&corpus_path()));
    assert!(refs.is_empty());
}

// ==================== Raw Query Tests ====================

#[test]
fn test_corpus_raw_query() {
    let mut matches = engine()
        .query(&QueryOptions {
            query: "(method_declaration name: (field_identifier) @method)".to_string(),
            target: dir_target(&corpus_path()),
        })
        .unwrap();
    matches.sort_by(|a, b| a.file.cmp(&b.file));

    let names: Vec<&str> = matches.iter().map(|m| m.captures[0].text.as_str()).collect();
    assert_eq!(names, vec!["Start", "address", "Push"]);
    assert!(matches.iter().all(|m| m.pattern == 0));
    assert_eq!(matches[2].file, "types.go");
}
