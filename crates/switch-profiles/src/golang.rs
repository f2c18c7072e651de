//! A parser for the constant-literal subset of Go used by switch profile
//! definitions.
//!
//! Only package-level `var` and `const` declarations are kept. Their values
//! may be literals, identifiers, qualified identifiers, composite literals,
//! `&`/`-`/`+` prefixes and single-argument calls. `func` and `type`
//! declarations are skipped. Everything else is a [`ParseError`].

pub mod lexer;
pub mod parser;

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Number, Value};

use crate::errors::{ParseError, Pos};
pub use parser::{parse_file, Decl, DeclKind, Element, Expr, ExprKind, SourceFile};

/// Evaluates expressions against the declarations of one file.
///
/// Identifiers naming a `var` or `const` in the same file are replaced by
/// that declaration's value, or by the zero value of its type when it has
/// none. `true`, `false` and `nil` are the Go builtins. Any other identifier,
/// including qualified ones from other packages, evaluates to its bare name
/// as a string.
///
/// Identifier keys are field names unless the literal's type is a map, in
/// which case they are resolved like any other identifier.
pub struct Evaluator<'a> {
    decls: HashMap<&'a str, &'a Decl>,
    resolving: HashSet<&'a str>,
}

impl<'a> Evaluator<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        let mut decls = HashMap::new();
        for decl in &file.decls {
            // first declaration wins, later ones would be a Go compile error
            decls.entry(decl.name.as_str()).or_insert(decl);
        }
        Self {
            decls,
            resolving: HashSet::new(),
        }
    }

    pub fn evaluate(&mut self, expr: &'a Expr) -> Result<Value, ParseError> {
        self.typed(expr, None)
    }

    /// `ty` is the type an elided composite literal takes from its context.
    fn typed(&mut self, expr: &'a Expr, ty: Option<&str>) -> Result<Value, ParseError> {
        match &expr.kind {
            ExprKind::Str(s) => Ok(Value::String(s.clone())),
            ExprKind::Int(n) => Ok(Value::from(*n)),
            ExprKind::Float(f) => float(*f, expr.pos),
            ExprKind::Char(c) => Ok(Value::from(*c as u32)),
            ExprKind::Ident(name) => self.identifier(name, expr.pos),
            ExprKind::Selector { name, .. } => Ok(Value::String(name.clone())),
            ExprKind::AddrOf(inner) => self.typed(inner, ty),
            ExprKind::Call { arg, .. } => self.evaluate(arg),
            ExprKind::Neg(inner) => match self.evaluate(inner)? {
                Value::Number(n) => negate(&n, expr.pos),
                _ => Err(ParseError::new(expr.pos, "cannot negate a non-numeric value")),
            },
            ExprKind::Composite { ty: own, elements } => {
                self.composite(own.as_deref().or(ty), elements, expr.pos)
            }
        }
    }

    fn identifier(&mut self, name: &'a str, pos: Pos) -> Result<Value, ParseError> {
        if let Some(&decl) = self.decls.get(name) {
            let Some(value) = &decl.value else {
                return Ok(zero_value(decl.ty.as_deref()));
            };
            if !self.resolving.insert(name) {
                return Err(ParseError::new(
                    pos,
                    format!("initialization cycle through `{}`", name),
                ));
            }
            let result = self.typed(value, decl.ty.as_deref());
            self.resolving.remove(name);
            return result;
        }

        match name {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "nil" => Ok(Value::Null),
            _ => Ok(Value::String(name.to_string())),
        }
    }

    fn composite(
        &mut self,
        ty: Option<&str>,
        elements: &'a [Element],
        pos: Pos,
    ) -> Result<Value, ParseError> {
        let ty = ty.map(|t| t.trim_start_matches('*'));
        let is_map = ty.is_some_and(|t| t.starts_with("map["));
        let element_ty = ty.and_then(element_type);

        let keyed = elements.iter().filter(|e| e.key.is_some()).count();
        if keyed == 0 {
            return elements
                .iter()
                .map(|e| self.typed(&e.value, element_ty))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array);
        }
        if keyed != elements.len() {
            return Err(ParseError::new(
                pos,
                "mixture of field:value and value elements in composite literal",
            ));
        }

        let mut object = Map::new();
        for element in elements {
            let Some(key_expr) = &element.key else {
                continue;
            };
            let key = self.key(key_expr, is_map)?;
            if object.contains_key(&key) {
                return Err(ParseError::new(
                    key_expr.pos,
                    format!("duplicate key `{}` in composite literal", key),
                ));
            }
            let value = self.typed(&element.value, element_ty)?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }

    fn key(&mut self, expr: &'a Expr, is_map: bool) -> Result<String, ParseError> {
        let value = match &expr.kind {
            ExprKind::Ident(name) if !is_map => return Ok(name.clone()),
            _ => self.evaluate(expr)?,
        };
        match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(ParseError::new(
                expr.pos,
                "composite literal keys must be names, strings or numbers",
            )),
        }
    }
}

/// Element type of a slice, array or map type spelling.
fn element_type(ty: &str) -> Option<&str> {
    let ty = ty.trim_start_matches('*');
    let open = if ty.starts_with("map[") {
        3
    } else if ty.starts_with('[') {
        0
    } else {
        return None;
    };
    let mut depth = 0usize;
    for (i, c) in ty.char_indices().skip(open) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&ty[i + 1..]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Go's zero value for a declared type, as the JSON encoder would write it.
fn zero_value(ty: Option<&str>) -> Value {
    let Some(ty) = ty else {
        return Value::Null;
    };
    match ty {
        "string" => Value::String(String::new()),
        "bool" => Value::Bool(false),
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" | "float32" | "float64" => Value::from(0),
        _ if ty.starts_with('*') || ty.starts_with("[]") || ty.starts_with("map[") => {
            Value::Null
        }
        _ if ty.starts_with('[') => {
            let len = ty[1..]
                .split(']')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0);
            let element = zero_value(element_type(ty));
            Value::Array(vec![element; len])
        }
        // named types are assumed to be structs
        _ => Value::Object(Map::new()),
    }
}

fn float(f: f64, pos: Pos) -> Result<Value, ParseError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| ParseError::new(pos, "floating point value is not finite"))
}

fn negate(n: &Number, pos: Pos) -> Result<Value, ParseError> {
    if let Some(i) = n.as_i64() {
        return i
            .checked_neg()
            .map(Value::from)
            .ok_or_else(|| ParseError::new(pos, "integer overflow"));
    }
    match n.as_f64() {
        Some(f) => float(-f, pos),
        None => Err(ParseError::new(pos, "integer overflow")),
    }
}

/// Evaluates the declaration named `name`, if it exists and has a value.
pub fn evaluate_decl(file: &SourceFile, name: &str) -> Result<Option<Value>, ParseError> {
    let Some(decl) = file.decls.iter().find(|d| d.name == name) else {
        return Ok(None);
    };
    match &decl.value {
        Some(value) => Evaluator::new(file).evaluate(value).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use serde_json::json;

    fn eval(source: &str, name: &str) -> Value {
        let file = parse_file(source).unwrap();
        evaluate_decl(&file, name).unwrap().unwrap()
    }

    #[test]
    fn test_struct_and_slice_literals() {
        let value = eval(
            indoc! {r#"
                package p

                var X = T{
                    Name:      "x",
                    Enabled:   true,
                    Count:     -3,
                    Ratio:     0.5,
                    Supported: []string{"10G", "25G"},
                    Missing:   nil,
                }
            "#},
            "X",
        );
        assert_eq!(
            value,
            json!({
                "Name": "x",
                "Enabled": true,
                "Count": -3,
                "Ratio": 0.5,
                "Supported": ["10G", "25G"],
                "Missing": null,
            })
        );
    }

    #[test]
    fn test_local_constants_and_vars_resolve() {
        let value = eval(
            indoc! {r#"
                package p

                const SiliconTD3 = "Broadcom TD3-X7 2.0T"

                var speeds = []string{"1G", "10G"}

                var X = T{
                    SwitchSilicon: SiliconTD3,
                    Supported:     speeds,
                    NOSType:       meta.NOSTypeSONiCBCMVS,
                }
            "#},
            "X",
        );
        assert_eq!(value["SwitchSilicon"], "Broadcom TD3-X7 2.0T");
        assert_eq!(value["Supported"], json!(["1G", "10G"]));
        assert_eq!(value["NOSType"], "NOSTypeSONiCBCMVS");
    }

    #[test]
    fn test_map_keys_and_transparent_wrappers() {
        let value = eval(
            indoc! {r#"
                package p

                const groupOne = "1"

                var X = map[string]*T{
                    groupOne: &T{Speed: uint32(25)},
                    "E1/2":   {Flag: pointer.To(true)},
                }
            "#},
            "X",
        );
        assert_eq!(
            value,
            json!({
                "1": {"Speed": 25},
                "E1/2": {"Flag": true},
            })
        );
    }

    #[test]
    fn test_field_names_are_not_resolved_as_constants() {
        let value = eval(
            indoc! {r#"
                package p

                const Name = "other"
                const Speed = "speed"

                var X = T{
                    ObjectMeta: M{Name: "leaf"},
                    Profiles: map[string]map[string]P{
                        "a": {Speed: {Name: "25G"}},
                    },
                    Groups: []G{{Name: "g1"}},
                }
            "#},
            "X",
        );
        assert_eq!(
            value,
            json!({
                "ObjectMeta": {"Name": "leaf"},
                "Profiles": {"a": {"speed": {"Name": "25G"}}},
                "Groups": [{"Name": "g1"}],
            })
        );
    }

    #[test]
    fn test_declarations_without_value_are_zero() {
        let value = eval(
            indoc! {r#"
                package p

                var (
                    label   string
                    enabled bool
                    paths   uint32
                    ports   map[string]Port
                    offsets [2]string
                    meta    M
                )

                var X = T{
                    Label: label, Enabled: enabled, Paths: paths,
                    Ports: ports, Offsets: offsets, Meta: meta,
                }
            "#},
            "X",
        );
        assert_eq!(
            value,
            json!({
                "Label": "",
                "Enabled": false,
                "Paths": 0,
                "Ports": null,
                "Offsets": ["", ""],
                "Meta": {},
            })
        );
    }

    #[test]
    fn test_element_type() {
        assert_eq!(element_type("map[string]*T"), Some("*T"));
        assert_eq!(element_type("map[string]map[string]T"), Some("map[string]T"));
        assert_eq!(element_type("[]string"), Some("string"));
        assert_eq!(element_type("[4]P"), Some("P"));
        assert_eq!(element_type("wiringapi.SwitchProfile"), None);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let file = parse_file("package p\nvar X = T{A: 1, A: 2}\n").unwrap();
        let err = evaluate_decl(&file, "X").unwrap_err();
        assert!(err.message.contains("duplicate key"), "{}", err.message);
    }

    #[test]
    fn test_mixed_elements_are_rejected() {
        let file = parse_file("package p\nvar X = T{A: 1, 2}\n").unwrap();
        let err = evaluate_decl(&file, "X").unwrap_err();
        assert!(err.message.contains("mixture"), "{}", err.message);
    }

    #[test]
    fn test_initialization_cycle() {
        let file = parse_file("package p\nvar A = B\nvar B = A\n").unwrap();
        let err = evaluate_decl(&file, "A").unwrap_err();
        assert!(err.message.contains("cycle"), "{}", err.message);
    }
}
