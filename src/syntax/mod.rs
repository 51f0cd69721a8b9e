//! generic parsed-configuration tree
//!
//! this is the shape handed over by a configuration front-end: blocks holding
//! key/value items, sub-blocks, boolean expressions and fileclass set
//! expressions, each tagged with its source line. the compiler only reads it.

mod json;
mod parser;

pub use parser::{parse_bool_expr, parse_set_expr, ParseError};

use std::fmt;

/// comparison operator as written in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    Diff,
    Gt,
    GtEq,
    Lt,
    LtEq,
    /// external command operator, not valid in conditions
    Cmd,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Equal => write!(f, "=="),
            Operator::Diff => write!(f, "!="),
            Operator::Gt => write!(f, ">"),
            Operator::GtEq => write!(f, ">="),
            Operator::Lt => write!(f, "<"),
            Operator::LtEq => write!(f, "<="),
            Operator::Cmd => write!(f, "cmd"),
        }
    }
}

/// a `name <op> value [extra args...]` item
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub name: String,
    pub op: Operator,
    pub value: String,
    pub extra_args: Vec<String>,
    pub line: u32,
}

impl KeyValue {
    /// create a `name = value` parameter
    pub fn new(name: impl Into<String>, value: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            op: Operator::Equal,
            value: value.into(),
            extra_args: Vec::new(),
            line,
        }
    }

    /// create a `name <op> value` condition
    pub fn condition(
        name: impl Into<String>,
        op: Operator,
        value: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            op,
            ..Self::new(name, value, line)
        }
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// boolean operator code emitted by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxBoolOp {
    /// parenthesized sub-expression
    Identity,
    Not,
    And,
    Or,
}

/// boolean expression as parsed
#[derive(Debug, Clone, PartialEq)]
pub enum BoolSyntax {
    Condition(KeyValue),
    Unary {
        op: SyntaxBoolOp,
        expr: Box<BoolSyntax>,
    },
    Binary {
        op: SyntaxBoolOp,
        left: Box<BoolSyntax>,
        right: Box<BoolSyntax>,
    },
}

impl BoolSyntax {
    pub fn condition(kv: KeyValue) -> Self {
        BoolSyntax::Condition(kv)
    }

    pub fn unary(op: SyntaxBoolOp, expr: BoolSyntax) -> Self {
        BoolSyntax::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: SyntaxBoolOp, left: BoolSyntax, right: BoolSyntax) -> Self {
        BoolSyntax::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// set operator code emitted by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Not,
    Union,
    Inter,
}

/// union/intersection/negation of fileclass names, as parsed
#[derive(Debug, Clone, PartialEq)]
pub enum SetSyntax {
    Singleton(String),
    Unary {
        op: SetOp,
        set: Box<SetSyntax>,
    },
    Binary {
        op: SetOp,
        left: Box<SetSyntax>,
        right: Box<SetSyntax>,
    },
}

impl SetSyntax {
    pub fn singleton(name: impl Into<String>) -> Self {
        SetSyntax::Singleton(name.into())
    }

    pub fn negation(set: SetSyntax) -> Self {
        SetSyntax::Unary {
            op: SetOp::Not,
            set: Box::new(set),
        }
    }

    pub fn union(left: SetSyntax, right: SetSyntax) -> Self {
        Self::binary(SetOp::Union, left, right)
    }

    pub fn inter(left: SetSyntax, right: SetSyntax) -> Self {
        Self::binary(SetOp::Inter, left, right)
    }

    pub fn binary(op: SetOp, left: SetSyntax, right: SetSyntax) -> Self {
        SetSyntax::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// kind of a configuration item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Var,
    Block,
    BoolExpr,
    Set,
}

/// one entry of a block's content
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigItem {
    Var(KeyValue),
    Block(Block),
    BoolExpr { expr: BoolSyntax, line: u32 },
    Set { expr: SetSyntax, line: u32 },
}

impl ConfigItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            ConfigItem::Var(_) => ItemType::Var,
            ConfigItem::Block(_) => ItemType::Block,
            ConfigItem::BoolExpr { .. } => ItemType::BoolExpr,
            ConfigItem::Set { .. } => ItemType::Set,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            ConfigItem::Var(kv) => kv.line,
            ConfigItem::Block(b) => b.line,
            ConfigItem::BoolExpr { line, .. } | ConfigItem::Set { line, .. } => *line,
        }
    }

    /// name of a key/value or block item
    pub fn name(&self) -> Option<&str> {
        match self {
            ConfigItem::Var(kv) => Some(&kv.name),
            ConfigItem::Block(b) => Some(&b.name),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            ConfigItem::Block(b) => Some(b),
            _ => None,
        }
    }
}

/// a named block: `name [id] { items... }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub name: String,
    pub id: Option<String>,
    pub line: u32,
    pub items: Vec<ConfigItem>,
}

impl Block {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            id: None,
            line,
            items: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_item(mut self, item: ConfigItem) -> Self {
        self.items.push(item);
        self
    }

    /// add a `name = value` parameter on the given line
    pub fn with_var(self, name: &str, value: &str, line: u32) -> Self {
        self.with_item(ConfigItem::Var(KeyValue::new(name, value, line)))
    }

    pub fn with_bool_expr(self, expr: BoolSyntax, line: u32) -> Self {
        self.with_item(ConfigItem::BoolExpr { expr, line })
    }

    pub fn with_set_expr(self, expr: SetSyntax, line: u32) -> Self {
        self.with_item(ConfigItem::Set { expr, line })
    }

    pub fn with_block(self, block: Block) -> Self {
        self.with_item(ConfigItem::Block(block))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// first key/value item with the given name (case-insensitive)
    pub fn var(&self, name: &str) -> Option<&KeyValue> {
        self.items.iter().find_map(|item| match item {
            ConfigItem::Var(kv) if kv.name.eq_ignore_ascii_case(name) => Some(kv),
            _ => None,
        })
    }

    /// first named item (key/value or block) with the given name
    pub fn item(&self, name: &str) -> Option<&ConfigItem> {
        self.items
            .iter()
            .find(|item| item.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    /// first sub-block with the given name (case-insensitive)
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.items.iter().find_map(|item| match item {
            ConfigItem::Block(b) if b.name.eq_ignore_ascii_case(name) => Some(b),
            _ => None,
        })
    }

    /// all sub-blocks with the given name (case-insensitive)
    pub fn blocks<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.items.iter().filter_map(move |item| match item {
            ConfigItem::Block(b) if b.name.eq_ignore_ascii_case(name) => Some(b),
            _ => None,
        })
    }
}
