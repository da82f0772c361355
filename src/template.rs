//! Text templates in the `{{ .Field }}` dialect of Go's `text/template`.
//!
//! Only the subset README templates use is supported: field and map-key
//! chains, variables, string/number/bool literals, parenthesized pipelines,
//! `|` pipes, the `index len eq ne not and or` functions, `if`/`else if`/
//! `else`, `range` (with `$k, $v :=` declarations), comments and `{{-`/`-}}`
//! whitespace trimming. Data is anything `Serialize`; it is converted to a
//! JSON value tree before execution, so maps iterate in sorted key order.

use serde::Serialize;
use serde_json::{Number, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const NO_VALUE: &str = "<no value>";
const FUNCS: &[&str] = &["index", "len", "eq", "ne", "not", "and", "or"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template: {name}:{line}: {message}")]
    Parse {
        name: String,
        line: usize,
        message: String,
    },

    #[error("template: {name}:{line}: executing: {message}")]
    Exec {
        name: String,
        line: usize,
        message: String,
    },

    #[error("template data could not be serialized: {0}")]
    Data(#[from] serde_json::Error),

    #[error("failed to write template output: {0}")]
    Io(#[from] io::Error),
}

/// A parsed template, ready to execute any number of times
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Print {
        line: usize,
        pipe: Pipeline,
    },
    If {
        line: usize,
        cond: Pipeline,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Range {
        line: usize,
        key: Option<String>,
        value: Option<String>,
        pipe: Pipeline,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone)]
struct Pipeline {
    commands: Vec<Command>,
}

#[derive(Debug, Clone)]
struct Command {
    args: Vec<Arg>,
}

#[derive(Debug, Clone)]
enum Arg {
    Dot,
    Field(Vec<String>),
    Var(String, Vec<String>),
    Literal(Value),
    Func(String),
    Sub(Pipeline, Vec<String>),
}

impl Template {
    /// Parse `source`; `name` only appears in error messages
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let items = lex(name, source)?;
        let mut parser = Parser {
            name,
            items: items.into_iter(),
        };

        let nodes = match parser.parse_list()? {
            (nodes, Stop::Eof) => nodes,
            (_, Stop::End { line }) => return Err(parser.error(line, "unexpected {{end}}")),
            (_, Stop::Else { line, .. }) => return Err(parser.error(line, "unexpected {{else}}")),
        };

        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    /// Read and parse a template file, named after its file name
    pub fn parse_file(path: &Path) -> Result<Self, TemplateError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the template against `data`, writing into `out`
    pub fn execute<W, T>(&self, out: &mut W, data: &T) -> Result<(), TemplateError>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        let root = serde_json::to_value(data)?;
        let mut exec = Executor {
            name: &self.name,
            out,
            vars: vec![(String::new(), root.clone())],
        };
        exec.walk(&self.nodes, &root)
    }

    /// Execute the template into a string
    pub fn render<T>(&self, data: &T) -> Result<String, TemplateError>
    where
        T: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.execute(&mut buf, data)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

// ---------------------------------------------------------------------------
// Lexing: split the source into text and action bodies
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Item {
    Text(String),
    Action { line: usize, body: String },
}

fn lex(name: &str, source: &str) -> Result<Vec<Item>, TemplateError> {
    let parse_error = |line: usize, message: &str| TemplateError::Parse {
        name: name.to_string(),
        line,
        message: message.to_string(),
    };

    let mut items = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut trim_next = false;

    while let Some(start) = rest.find(LEFT_DELIM) {
        let after = &rest[start + LEFT_DELIM.len()..];
        let trim_left = after.starts_with('-') && after[1..].starts_with(is_space);

        push_text(&mut items, &rest[..start], trim_next, trim_left);
        line += rest[..start].matches('\n').count();

        let body = if trim_left { &after[1..] } else { after };
        let is_comment = body.trim_start_matches(is_space).starts_with("/*");
        let close = find_close(body).ok_or_else(|| {
            parse_error(line, if is_comment { "unclosed comment" } else { "unclosed action" })
        })?;

        let mut action = &body[..close];
        let trim_right = action.ends_with('-') && action[..action.len() - 1].ends_with(is_space);
        if trim_right {
            action = &action[..action.len() - 1];
        }

        let trimmed = action.trim_matches(is_space);
        if is_comment {
            if trimmed.len() < 4 || !trimmed.ends_with("*/") {
                return Err(parse_error(line, "comment ends before closing delimiter"));
            }
        } else {
            items.push(Item::Action {
                line,
                body: trimmed.to_string(),
            });
        }

        line += body[..close].matches('\n').count();
        rest = &body[close + RIGHT_DELIM.len()..];
        trim_next = trim_right;
    }

    push_text(&mut items, rest, trim_next, false);
    Ok(items)
}

fn push_text(items: &mut Vec<Item>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start_matches(is_space);
    }
    if trim_end {
        text = text.trim_end_matches(is_space);
    }
    if !text.is_empty() {
        items.push(Item::Text(text.to_string()));
    }
}

/// Byte offset of the `}}` closing the action, skipping quoted strings
fn find_close(body: &str) -> Option<usize> {
    let lead = body.len() - body.trim_start_matches(is_space).len();
    if body[lead..].starts_with("/*") {
        let end = body[lead..].find("*/")? + lead + 2;
        return body[end..].find(RIGHT_DELIM).map(|i| i + end);
    }

    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'`' => quote = Some(b),
            None if b == b'}' && bytes.get(i + 1) == Some(&b'}') => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

// ---------------------------------------------------------------------------
// Tokenizing action bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Dot,
    Field(Vec<String>),
    Var(String, Vec<String>),
    /// Field chain directly after a closing paren
    Chain(Vec<String>),
    Literal(Value),
    Ident(String),
    LParen,
    RParen,
    Pipe,
    Comma,
    Declare,
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if is_space(c) => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                let (chain, next) = lex_fields(&chars, i + 1);
                if !chain.is_empty() {
                    tokens.push(Token::Chain(chain));
                }
                i = next;
            }
            '|' => {
                tokens.push(Token::Pipe);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ':' => {
                if chars.get(i + 1) != Some(&'=') {
                    return Err("expected :=".to_string());
                }
                tokens.push(Token::Declare);
                i += 2;
            }
            '.' => {
                let (fields, next) = lex_fields(&chars, i);
                if fields.is_empty() {
                    tokens.push(Token::Dot);
                    i += 1;
                } else {
                    tokens.push(Token::Field(fields));
                    i = next;
                }
            }
            '$' => {
                let (name, next) = lex_ident(&chars, i + 1);
                let (fields, next) = lex_fields(&chars, next);
                tokens.push(Token::Var(name, fields));
                i = next;
            }
            '"' => {
                let (s, next) = lex_quoted(&chars, i + 1)?;
                tokens.push(Token::Literal(Value::String(s)));
                i = next;
            }
            '`' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == '`')
                    .ok_or("unterminated raw quoted string")?;
                let s: String = chars[i + 1..i + 1 + end].iter().collect();
                tokens.push(Token::Literal(Value::String(s)));
                i += end + 2;
            }
            c if c.is_ascii_digit()
                || ((c == '-' || c == '+') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                let (number, next) = lex_number(&chars, i)?;
                tokens.push(Token::Literal(Value::Number(number)));
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let (word, next) = lex_ident(&chars, i);
                tokens.push(match word.as_str() {
                    "true" => Token::Literal(Value::Bool(true)),
                    "false" => Token::Literal(Value::Bool(false)),
                    "nil" => Token::Literal(Value::Null),
                    _ => Token::Ident(word),
                });
                i = next;
            }
            other => return Err(format!("unexpected {:?} in command", other)),
        }
    }

    Ok(tokens)
}

fn lex_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}

fn lex_fields(chars: &[char], start: usize) -> (Vec<String>, usize) {
    let mut fields = Vec::new();
    let mut i = start;
    while chars.get(i) == Some(&'.') {
        let (name, next) = lex_ident(chars, i + 1);
        if name.is_empty() {
            break;
        }
        fields.push(name);
        i = next;
    }
    (fields, i)
}

fn lex_quoted(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let mut s = String::new();
    let mut i = start;
    loop {
        match chars.get(i) {
            None => return Err("unterminated quoted string".to_string()),
            Some('"') => return Ok((s, i + 1)),
            Some('\\') => {
                let escaped = match chars.get(i + 1) {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('\\') => '\\',
                    Some('"') => '"',
                    Some(other) => return Err(format!("unknown escape sequence \\{}", other)),
                    None => return Err("unterminated quoted string".to_string()),
                };
                s.push(escaped);
                i += 2;
            }
            Some(&c) => {
                s.push(c);
                i += 1;
            }
        }
    }
}

fn lex_number(chars: &[char], start: usize) -> Result<(Number, usize), String> {
    let mut i = start + 1;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    let text: String = chars[start..i].iter().collect();

    let number = if text.contains('.') {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        text.parse::<i64>().ok().map(Number::from)
    };
    number
        .map(|n| (n, i))
        .ok_or_else(|| format!("bad number syntax: {:?}", text))
}

// ---------------------------------------------------------------------------
// Parsing items into a node tree
// ---------------------------------------------------------------------------

enum Stop {
    Eof,
    End { line: usize },
    Else { line: usize, rest: Vec<Token> },
}

struct Parser<'a> {
    name: &'a str,
    items: std::vec::IntoIter<Item>,
}

impl Parser<'_> {
    fn error(&self, line: usize, message: impl Into<String>) -> TemplateError {
        TemplateError::Parse {
            name: self.name.to_string(),
            line,
            message: message.into(),
        }
    }

    fn parse_list(&mut self) -> Result<(Vec<Node>, Stop), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(item) = self.items.next() {
            let (line, body) = match item {
                Item::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Item::Action { line, body } => (line, body),
            };

            let tokens = tokenize(&body).map_err(|e| self.error(line, e))?;
            let keyword = match tokens.first() {
                Some(Token::Ident(word)) => word.as_str(),
                _ => "",
            };

            match keyword {
                "end" => {
                    if tokens.len() > 1 {
                        return Err(self.error(line, "unexpected tokens after end"));
                    }
                    return Ok((nodes, Stop::End { line }));
                }
                "else" => {
                    return Ok((
                        nodes,
                        Stop::Else {
                            line,
                            rest: tokens[1..].to_vec(),
                        },
                    ));
                }
                "if" => nodes.push(self.parse_if(line, &tokens[1..])?),
                "range" => nodes.push(self.parse_range(line, &tokens[1..])?),
                "with" | "define" | "template" | "block" | "break" | "continue" => {
                    return Err(self.error(line, format!("unsupported action {:?}", keyword)));
                }
                _ => {
                    let pipe = parse_pipeline(&tokens).map_err(|e| self.error(line, e))?;
                    nodes.push(Node::Print { line, pipe });
                }
            }
        }

        Ok((nodes, Stop::Eof))
    }

    fn parse_if(&mut self, line: usize, tokens: &[Token]) -> Result<Node, TemplateError> {
        let cond = parse_pipeline(tokens).map_err(|e| self.error(line, e))?;
        let (then, stop) = self.parse_list()?;

        let otherwise = match stop {
            Stop::End { .. } => Vec::new(),
            Stop::Else { line: else_line, rest } if rest.is_empty() => {
                let (otherwise, stop) = self.parse_list()?;
                self.expect_end(stop, else_line)?;
                otherwise
            }
            // `else if` shares the closing end with the outer if
            Stop::Else { line: else_line, rest } if rest[0] == Token::Ident("if".to_string()) => {
                vec![self.parse_if(else_line, &rest[1..])?]
            }
            Stop::Else { line: else_line, .. } => {
                return Err(self.error(else_line, "unexpected tokens after else"));
            }
            Stop::Eof => return Err(self.error(line, "unexpected EOF, missing {{end}} for if")),
        };

        Ok(Node::If {
            line,
            cond,
            then,
            otherwise,
        })
    }

    fn parse_range(&mut self, line: usize, tokens: &[Token]) -> Result<Node, TemplateError> {
        let (key, value, rest) = match tokens {
            [Token::Var(k, kf), Token::Comma, Token::Var(v, vf), Token::Declare, rest @ ..] => {
                if k.is_empty() || v.is_empty() || !kf.is_empty() || !vf.is_empty() {
                    return Err(self.error(line, "bad range variable declaration"));
                }
                (Some(k.clone()), Some(v.clone()), rest)
            }
            [Token::Var(v, vf), Token::Declare, rest @ ..] => {
                if v.is_empty() || !vf.is_empty() {
                    return Err(self.error(line, "bad range variable declaration"));
                }
                (None, Some(v.clone()), rest)
            }
            rest => (None, None, rest),
        };

        let pipe = parse_pipeline(rest).map_err(|e| self.error(line, e))?;
        let (body, stop) = self.parse_list()?;

        let otherwise = match stop {
            Stop::End { .. } => Vec::new(),
            Stop::Else { line: else_line, rest } if rest.is_empty() => {
                let (otherwise, stop) = self.parse_list()?;
                self.expect_end(stop, else_line)?;
                otherwise
            }
            Stop::Else { line: else_line, .. } => {
                return Err(self.error(else_line, "unexpected tokens after else"));
            }
            Stop::Eof => {
                return Err(self.error(line, "unexpected EOF, missing {{end}} for range"));
            }
        };

        Ok(Node::Range {
            line,
            key,
            value,
            pipe,
            body,
            otherwise,
        })
    }

    fn expect_end(&self, stop: Stop, line: usize) -> Result<(), TemplateError> {
        match stop {
            Stop::End { .. } => Ok(()),
            Stop::Else { line, .. } => Err(self.error(line, "unexpected {{else}}")),
            Stop::Eof => Err(self.error(line, "unexpected EOF, missing {{end}} for else")),
        }
    }
}

fn parse_pipeline(tokens: &[Token]) -> Result<Pipeline, String> {
    let mut cursor = Cursor { tokens, pos: 0 };
    cursor.pipeline(false)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn pipeline(&mut self, nested: bool) -> Result<Pipeline, String> {
        let mut commands = Vec::new();
        let mut args = Vec::new();

        loop {
            let arg = match self.next() {
                None if nested => return Err("unclosed left paren".to_string()),
                None => break,
                Some(Token::RParen) if nested => break,
                Some(Token::RParen) => return Err("unexpected right paren".to_string()),
                Some(Token::Pipe) => {
                    commands.push(finish_command(std::mem::take(&mut args))?);
                    continue;
                }
                Some(Token::LParen) => {
                    let inner = self.pipeline(true)?;
                    let chain = match self.tokens.get(self.pos) {
                        Some(Token::Chain(chain)) => {
                            self.pos += 1;
                            chain.clone()
                        }
                        _ => Vec::new(),
                    };
                    Arg::Sub(inner, chain)
                }
                Some(Token::Dot) => Arg::Dot,
                Some(Token::Field(fields)) => Arg::Field(fields.clone()),
                Some(Token::Var(name, fields)) => Arg::Var(name.clone(), fields.clone()),
                Some(Token::Literal(value)) => Arg::Literal(value.clone()),
                Some(Token::Ident(name)) => {
                    if !FUNCS.contains(&name.as_str()) {
                        return Err(format!("function {:?} not defined", name));
                    }
                    if !args.is_empty() {
                        return Err(format!("function {:?} must start a command", name));
                    }
                    Arg::Func(name.clone())
                }
                Some(token) => return Err(format!("unexpected {:?} in command", token)),
            };
            args.push(arg);
        }

        commands.push(finish_command(args)?);
        Ok(Pipeline { commands })
    }
}

fn finish_command(args: Vec<Arg>) -> Result<Command, String> {
    match args.first() {
        None => Err("missing value for command".to_string()),
        Some(Arg::Func(_)) => Ok(Command { args }),
        Some(_) if args.len() > 1 => Err("can't give argument to non-function".to_string()),
        Some(_) => Ok(Command { args }),
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

struct Executor<'a, W> {
    name: &'a str,
    out: &'a mut W,
    /// Variable stack; the root `$` sits at the bottom under an empty name
    vars: Vec<(String, Value)>,
}

impl<W: Write> Executor<'_, W> {
    fn error(&self, line: usize, message: String) -> TemplateError {
        TemplateError::Exec {
            name: self.name.to_string(),
            line,
            message,
        }
    }

    fn walk(&mut self, nodes: &[Node], dot: &Value) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.write_all(text.as_bytes())?,
                Node::Print { line, pipe } => {
                    let value = self.eval_pipeline(pipe, dot).map_err(|e| self.error(*line, e))?;
                    write_value(&mut *self.out, &value)?;
                }
                Node::If {
                    line,
                    cond,
                    then,
                    otherwise,
                } => {
                    let value = self.eval_pipeline(cond, dot).map_err(|e| self.error(*line, e))?;
                    if truthy(&value) {
                        self.walk(then, dot)?;
                    } else {
                        self.walk(otherwise, dot)?;
                    }
                }
                Node::Range {
                    line,
                    key,
                    value,
                    pipe,
                    body,
                    otherwise,
                } => {
                    let collection =
                        self.eval_pipeline(pipe, dot).map_err(|e| self.error(*line, e))?;
                    let entries: Vec<(Value, Value)> = match collection {
                        Value::Object(map) => map
                            .into_iter()
                            .map(|(k, v)| (Value::String(k), v))
                            .collect(),
                        Value::Array(values) => values
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (Value::from(i), v))
                            .collect(),
                        Value::Null => Vec::new(),
                        other => {
                            return Err(self.error(
                                *line,
                                format!("range can't iterate over {}", type_name(&other)),
                            ));
                        }
                    };

                    if entries.is_empty() {
                        self.walk(otherwise, dot)?;
                        continue;
                    }

                    for (k, v) in entries {
                        let mark = self.vars.len();
                        if let Some(name) = key {
                            self.vars.push((name.clone(), k));
                        }
                        if let Some(name) = value {
                            self.vars.push((name.clone(), v.clone()));
                        }
                        let result = self.walk(body, &v);
                        self.vars.truncate(mark);
                        result?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_pipeline(&self, pipe: &Pipeline, dot: &Value) -> Result<Value, String> {
        let mut piped = None;
        for command in &pipe.commands {
            piped = Some(self.eval_command(command, dot, piped.take())?);
        }
        Ok(piped.unwrap_or(Value::Null))
    }

    fn eval_command(
        &self,
        command: &Command,
        dot: &Value,
        piped: Option<Value>,
    ) -> Result<Value, String> {
        match &command.args[0] {
            Arg::Func(name) => {
                let mut args = command.args[1..]
                    .iter()
                    .map(|arg| self.eval_arg(arg, dot))
                    .collect::<Result<Vec<_>, _>>()?;
                args.extend(piped);
                call(name, args)
            }
            arg => {
                if piped.is_some() {
                    return Err("can't give argument to non-function".to_string());
                }
                self.eval_arg(arg, dot)
            }
        }
    }

    fn eval_arg(&self, arg: &Arg, dot: &Value) -> Result<Value, String> {
        match arg {
            Arg::Dot => Ok(dot.clone()),
            Arg::Field(fields) => lookup(dot, fields),
            Arg::Var(name, fields) => lookup(self.var(name)?, fields),
            Arg::Literal(value) => Ok(value.clone()),
            Arg::Sub(pipe, chain) => lookup(&self.eval_pipeline(pipe, dot)?, chain),
            Arg::Func(name) => Err(format!("function {:?} used as a value", name)),
        }
    }

    fn var(&self, name: &str) -> Result<&Value, String> {
        self.vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| format!("undefined variable \"${}\"", name))
    }
}

fn lookup(value: &Value, fields: &[String]) -> Result<Value, String> {
    let mut current = value;
    for field in fields {
        current = match current {
            Value::Object(map) => map
                .get(field)
                .ok_or_else(|| format!("can't evaluate field {}", field))?,
            Value::Null => return Err(format!("nil value evaluating .{}", field)),
            other => {
                return Err(format!(
                    "can't evaluate field {} in {}",
                    field,
                    type_name(other)
                ))
            }
        };
    }
    Ok(current.clone())
}

fn call(name: &str, args: Vec<Value>) -> Result<Value, String> {
    match name {
        "index" => {
            let mut args = args.into_iter();
            let mut item = args
                .next()
                .ok_or("wrong number of args for index: want at least 1 got 0")?;
            for key in args {
                item = index(&item, &key)?;
            }
            Ok(item)
        }
        "len" => {
            let [item] = take_args::<1>(name, args)?;
            let len = match &item {
                Value::String(s) => s.len(),
                Value::Array(a) => a.len(),
                Value::Object(m) => m.len(),
                other => return Err(format!("len of {}", type_name(other))),
            };
            Ok(Value::from(len))
        }
        "eq" => {
            if args.len() < 2 {
                return Err(format!(
                    "wrong number of args for eq: want at least 2 got {}",
                    args.len()
                ));
            }
            Ok(Value::Bool(args[1..].iter().any(|other| *other == args[0])))
        }
        "ne" => {
            let [a, b] = take_args::<2>(name, args)?;
            Ok(Value::Bool(a != b))
        }
        "not" => {
            let [item] = take_args::<1>(name, args)?;
            Ok(Value::Bool(!truthy(&item)))
        }
        "and" | "or" => {
            let want = name == "or";
            let mut last = Value::Null;
            for arg in args {
                if truthy(&arg) == want {
                    return Ok(arg);
                }
                last = arg;
            }
            Ok(last)
        }
        _ => Err(format!("function {:?} not defined", name)),
    }
}

fn take_args<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], String> {
    let got = args.len();
    args.try_into()
        .map_err(|_| format!("wrong number of args for {}: want {} got {}", name, N, got))
}

fn index(item: &Value, key: &Value) -> Result<Value, String> {
    match (item, key) {
        (Value::Object(map), Value::String(k)) => Ok(map.get(k).cloned().unwrap_or(Value::Null)),
        (Value::Array(values), Value::Number(n)) => {
            let i = n
                .as_u64()
                .ok_or_else(|| format!("cannot index slice with {}", n))?;
            values
                .get(i as usize)
                .cloned()
                .ok_or_else(|| format!("index out of range: {}", i))
        }
        (Value::Null, _) => Err("index of untyped nil".to_string()),
        (other, key) => Err(format!(
            "can't index item of type {} with {}",
            type_name(other),
            type_name(key)
        )),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

/// Short type name for error messages
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "slice",
        Value::Object(_) => "map",
    }
}

fn write_value<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::String(s) => out.write_all(s.as_bytes()),
        Value::Null => out.write_all(NO_VALUE.as_bytes()),
        other => write!(out, "{}", other),
    }
}
