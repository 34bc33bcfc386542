//! Minimal Jinja-style templates.
//!
//! Three directives, no filters, no escaping:
//!
//! ```text
//! {{ post.title }}                                  variable
//! {% if post.featured_image %}…{% else %}…{% endif %}  conditional
//! {% for post in posts %}…{% endfor %}              iteration
//! ```
//!
//! A template is compiled once into a directive tree ([`Template::parse`])
//! and rendered against a `serde_json::Value` context as many times as
//! needed. Blocks nest to any depth. Loop bodies see the loop variable
//! layered over the enclosing context; substituted values are emitted as-is
//! and never scanned for further directives.
//!
//! Rendering never fails. Anything the parser cannot make sense of (a tag
//! without its closing `%}`, a `for` without `endfor`, a stray `endif`, an
//! unknown tag) is kept in the output as literal text, and a path that does
//! not resolve renders as the empty string.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^for\s+(\w+)\s+in\s+(\w+(?:\.\w+)*)$").unwrap());
static IF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^if\s+(.+)$").unwrap());

/// Render `template` against `context` in one go.
pub fn render(template: &str, context: &Value) -> String {
    Template::parse(template).render(context)
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    For {
        item: String,
        path: String,
        body: Vec<Node>,
    },
    If {
        condition: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let tokens = tokenize(source);
        let (nodes, _, _) = Parser { tokens: &tokens }.sequence(0, &[]);
        Self { nodes }
    }

    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        let scope = Scope {
            context,
            binding: None,
        };
        render_nodes(&self.nodes, &scope, &mut out);
        out
    }
}

// =========================================================================
// Tokenizer
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tag {
    For,
    If,
    Else,
    EndFor,
    EndIf,
}

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Var(&'a str),
    /// A `{% … %}` tag: its kind, trimmed inner text and raw source.
    Tag(Tag, &'a str, &'a str),
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(start) = next_opening(rest) {
        if start > 0 {
            tokens.push(Token::Text(&rest[..start]));
        }
        let tail = &rest[start..];
        let close = if tail.starts_with("{{") { "}}" } else { "%}" };

        let Some(end) = tail[2..].find(close).map(|i| i + 2 + close.len()) else {
            // Unterminated: the opener is text, keep scanning after it.
            tokens.push(Token::Text(&tail[..2]));
            rest = &tail[2..];
            continue;
        };
        let raw = &tail[..end];
        let inner = raw[2..raw.len() - 2].trim();

        tokens.push(if close == "}}" {
            Token::Var(inner)
        } else {
            classify_tag(inner, raw)
        });
        rest = &tail[end..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

fn next_opening(text: &str) -> Option<usize> {
    match (text.find("{{"), text.find("{%")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn classify_tag<'a>(inner: &'a str, raw: &'a str) -> Token<'a> {
    let tag = match inner {
        "else" => Tag::Else,
        "endfor" => Tag::EndFor,
        "endif" => Tag::EndIf,
        _ if FOR_RE.is_match(inner) => Tag::For,
        _ if IF_RE.is_match(inner) => Tag::If,
        _ => return Token::Text(raw),
    };
    Token::Tag(tag, inner, raw)
}

// =========================================================================
// Parser
// =========================================================================

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
}

impl Parser<'_, '_> {
    /// Parse from `pos` until one of `stops` or the end of input.
    ///
    /// Returns the nodes, the position after the stop tag, and which stop
    /// ended the run (`None` at end of input). Tags that are not in `stops`
    /// and cannot open a block are literal text.
    fn sequence(&self, mut pos: usize, stops: &[Tag]) -> (Vec<Node>, usize, Option<Tag>) {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.get(pos) {
            pos += 1;
            match *token {
                Token::Text(text) => push_text(&mut nodes, text),
                Token::Var(path) => nodes.push(Node::Var(path.to_string())),
                Token::Tag(tag, _, _) if stops.contains(&tag) => {
                    return (nodes, pos, Some(tag));
                }
                Token::Tag(Tag::For, inner, raw) => match self.for_block(pos, inner) {
                    Some((node, next)) => {
                        nodes.push(node);
                        pos = next;
                    }
                    None => push_text(&mut nodes, raw),
                },
                Token::Tag(Tag::If, inner, raw) => match self.if_block(pos, inner) {
                    Some((node, next)) => {
                        nodes.push(node);
                        pos = next;
                    }
                    None => push_text(&mut nodes, raw),
                },
                Token::Tag(_, _, raw) => push_text(&mut nodes, raw),
            }
        }

        (nodes, pos, None)
    }

    /// Body of a `for` whose tag ended just before `pos`. `None` when there
    /// is no matching `endfor`.
    fn for_block(&self, pos: usize, inner: &str) -> Option<(Node, usize)> {
        let caps = FOR_RE.captures(inner)?;
        let (body, next, stop) = self.sequence(pos, &[Tag::EndFor]);
        stop?;
        Some((
            Node::For {
                item: caps[1].to_string(),
                path: caps[2].to_string(),
                body,
            },
            next,
        ))
    }

    fn if_block(&self, pos: usize, inner: &str) -> Option<(Node, usize)> {
        let caps = IF_RE.captures(inner)?;
        let condition = caps[1].trim().to_string();

        let (then, next, stop) = self.sequence(pos, &[Tag::Else, Tag::EndIf]);
        let (otherwise, next) = match stop? {
            Tag::Else => {
                let (otherwise, next, stop) = self.sequence(next, &[Tag::EndIf]);
                stop?;
                (otherwise, next)
            }
            _ => (Vec::new(), next),
        };

        Some((
            Node::If {
                condition,
                then,
                otherwise,
            },
            next,
        ))
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

// =========================================================================
// Rendering
// =========================================================================

/// Loop bindings layered over the root context, innermost first.
struct Scope<'a> {
    context: &'a Value,
    binding: Option<(&'a str, &'a Value, &'a Scope<'a>)>,
}

impl<'a> Scope<'a> {
    fn root(&self, name: &str) -> Option<&'a Value> {
        match self.binding {
            Some((bound, value, _)) if bound == name => Some(value),
            Some((_, _, parent)) => parent.root(name),
            None => self.context.get(name),
        }
    }

    fn resolve(&self, path: &str) -> Option<&'a Value> {
        let mut parts = path.split('.');
        let first = self.root(parts.next()?)?;
        parts.try_fold(first, |value, key| value.get(key))
    }
}

fn render_nodes(nodes: &[Node], scope: &Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = scope.resolve(path) {
                    push_display(out, value);
                }
            }
            Node::If {
                condition,
                then,
                otherwise,
            } => {
                let branch = if scope.resolve(condition).is_some_and(is_truthy) {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, scope, out);
            }
            Node::For { item, path, body } => {
                let Some(Value::Array(items)) = scope.resolve(path) else {
                    continue;
                };
                for element in items {
                    let inner = Scope {
                        context: scope.context,
                        binding: Some((item.as_str(), element, scope)),
                    };
                    render_nodes(body, &inner, out);
                }
            }
        }
    }
}

/// Look up a dotted path in a context. Missing keys and non-mapping values
/// along the way both resolve to `None`.
pub fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    Scope {
        context,
        binding: None,
    }
    .resolve(path)
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn push_display(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}
