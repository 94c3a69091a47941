//! Tagged AST nodes
//!
//! `NodeKind` is a closed enumeration of every node kind the scanner knows
//! about. Anything else decodes to `NodeKind::Unknown` so the scanner is
//! forced to handle it explicitly instead of silently matching on strings.

use std::fmt;

/// Kind tag of an AST node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Whole file: `[:program, stmts]`
    Program,
    /// `[:class, name, superclass, bodystmt]`
    Class,
    /// `[:module, name, bodystmt]`
    Module,
    /// `[:sclass, target, bodystmt]` (`class << self`)
    SClass,
    /// `[:const_ref, [:@const, ..]]` - the name of a class or module
    ConstRef,
    /// `[:bodystmt, stmts, rescue, else, ensure]`
    BodyStmt,
    /// `[:def, name, params, bodystmt]`
    Def,
    /// `[:defs, receiver, period, name, params, bodystmt]`
    Defs,
    /// `[:assign, target, value]`
    Assign,
    /// `[:opassign, target, op, value]`
    OpAssign,
    /// Assignment target: `[:var_field, token]`
    VarField,
    /// `[:var_ref, token]`
    VarRef,
    /// `[:top_const_ref, [:@const, ..]]` (`::Foo`)
    TopConstRef,
    /// `[:const_path_ref, left, [:@const, ..]]` (`Foo::Bar`)
    ConstPathRef,
    /// Assignment target `Foo::Bar = ..`
    ConstPathField,
    /// Assignment target `::Foo = ..`
    TopConstField,
    /// `[:call, receiver, op, name]`
    Call,
    /// `[:method_add_arg, call, args]`
    MethodAddArg,
    /// `[:method_add_block, call, block]`
    MethodAddBlock,
    /// `[:arg_paren, args]`
    ArgParen,
    /// `[:args_add_block, args, block_arg]`
    ArgsAddBlock,
    /// `[:brace_block, block_var, stmts]`
    BraceBlock,
    /// `[:do_block, block_var, bodystmt]`
    DoBlock,
    BlockVar,
    Params,
    /// `[:paren, stmts]`
    Paren,
    /// `[:array, elements]`
    Array,
    /// `[:command, name, args]` (`include Foo`)
    Command,
    /// `[:command_call, receiver, op, name, args]`
    CommandCall,
    Fcall,
    Vcall,
    Field,
    Aref,
    Binary,
    Unary,
    If,
    IfMod,
    Unless,
    UnlessMod,
    While,
    Until,
    Case,
    Begin,
    Return,
    StringLiteral,
    SymbolLiteral,
    VoidStmt,
    /// `@const` scanner token
    Const,
    /// `@ident` scanner token
    Ident,
    /// `@kw` scanner token
    Kw,
    /// `@int` scanner token
    Int,
    /// Any other scanner token (`@op`, `@period`, `@tstring_content`, ..)
    Token(String),
    /// A tag the scanner does not know about
    Unknown(String),
}

impl NodeKind {
    /// Map a Ripper tag to a node kind
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "program" => NodeKind::Program,
            "class" => NodeKind::Class,
            "module" => NodeKind::Module,
            "sclass" => NodeKind::SClass,
            "const_ref" => NodeKind::ConstRef,
            "bodystmt" => NodeKind::BodyStmt,
            "def" => NodeKind::Def,
            "defs" => NodeKind::Defs,
            "assign" => NodeKind::Assign,
            "opassign" => NodeKind::OpAssign,
            "var_field" => NodeKind::VarField,
            "var_ref" => NodeKind::VarRef,
            "top_const_ref" => NodeKind::TopConstRef,
            "const_path_ref" => NodeKind::ConstPathRef,
            "const_path_field" => NodeKind::ConstPathField,
            "top_const_field" => NodeKind::TopConstField,
            "call" => NodeKind::Call,
            "method_add_arg" => NodeKind::MethodAddArg,
            "method_add_block" => NodeKind::MethodAddBlock,
            "arg_paren" => NodeKind::ArgParen,
            "args_add_block" => NodeKind::ArgsAddBlock,
            "brace_block" => NodeKind::BraceBlock,
            "do_block" => NodeKind::DoBlock,
            "block_var" => NodeKind::BlockVar,
            "params" => NodeKind::Params,
            "paren" => NodeKind::Paren,
            "array" => NodeKind::Array,
            "command" => NodeKind::Command,
            "command_call" => NodeKind::CommandCall,
            "fcall" => NodeKind::Fcall,
            "vcall" => NodeKind::Vcall,
            "field" => NodeKind::Field,
            "aref" => NodeKind::Aref,
            "binary" => NodeKind::Binary,
            "unary" => NodeKind::Unary,
            "if" => NodeKind::If,
            "if_mod" => NodeKind::IfMod,
            "unless" => NodeKind::Unless,
            "unless_mod" => NodeKind::UnlessMod,
            "while" => NodeKind::While,
            "until" => NodeKind::Until,
            "case" => NodeKind::Case,
            "begin" => NodeKind::Begin,
            "return" => NodeKind::Return,
            "string_literal" => NodeKind::StringLiteral,
            "symbol_literal" => NodeKind::SymbolLiteral,
            "void_stmt" => NodeKind::VoidStmt,
            "@const" => NodeKind::Const,
            "@ident" => NodeKind::Ident,
            "@kw" => NodeKind::Kw,
            "@int" => NodeKind::Int,
            other if other.starts_with('@') => NodeKind::Token(other.to_string()),
            other => NodeKind::Unknown(other.to_string()),
        }
    }

    /// Get the Ripper tag for this kind
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Class => "class",
            NodeKind::Module => "module",
            NodeKind::SClass => "sclass",
            NodeKind::ConstRef => "const_ref",
            NodeKind::BodyStmt => "bodystmt",
            NodeKind::Def => "def",
            NodeKind::Defs => "defs",
            NodeKind::Assign => "assign",
            NodeKind::OpAssign => "opassign",
            NodeKind::VarField => "var_field",
            NodeKind::VarRef => "var_ref",
            NodeKind::TopConstRef => "top_const_ref",
            NodeKind::ConstPathRef => "const_path_ref",
            NodeKind::ConstPathField => "const_path_field",
            NodeKind::TopConstField => "top_const_field",
            NodeKind::Call => "call",
            NodeKind::MethodAddArg => "method_add_arg",
            NodeKind::MethodAddBlock => "method_add_block",
            NodeKind::ArgParen => "arg_paren",
            NodeKind::ArgsAddBlock => "args_add_block",
            NodeKind::BraceBlock => "brace_block",
            NodeKind::DoBlock => "do_block",
            NodeKind::BlockVar => "block_var",
            NodeKind::Params => "params",
            NodeKind::Paren => "paren",
            NodeKind::Array => "array",
            NodeKind::Command => "command",
            NodeKind::CommandCall => "command_call",
            NodeKind::Fcall => "fcall",
            NodeKind::Vcall => "vcall",
            NodeKind::Field => "field",
            NodeKind::Aref => "aref",
            NodeKind::Binary => "binary",
            NodeKind::Unary => "unary",
            NodeKind::If => "if",
            NodeKind::IfMod => "if_mod",
            NodeKind::Unless => "unless",
            NodeKind::UnlessMod => "unless_mod",
            NodeKind::While => "while",
            NodeKind::Until => "until",
            NodeKind::Case => "case",
            NodeKind::Begin => "begin",
            NodeKind::Return => "return",
            NodeKind::StringLiteral => "string_literal",
            NodeKind::SymbolLiteral => "symbol_literal",
            NodeKind::VoidStmt => "void_stmt",
            NodeKind::Const => "@const",
            NodeKind::Ident => "@ident",
            NodeKind::Kw => "@kw",
            NodeKind::Int => "@int",
            NodeKind::Token(tag) | NodeKind::Unknown(tag) => tag,
        }
    }

    /// Check if this is a scanner token (`@const`, `@ident`, ..)
    pub fn is_token(&self) -> bool {
        matches!(
            self,
            NodeKind::Const | NodeKind::Ident | NodeKind::Kw | NodeKind::Int | NodeKind::Token(_)
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, NodeKind::Unknown(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source position of a token (1-indexed line, 0-indexed column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One child slot of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(AstNode),
    List(Vec<Child>),
    Literal(String),
    Position(Position),
    Flag(bool),
    Nil,
}

impl Child {
    pub fn as_node(&self) -> Option<&AstNode> {
        match self {
            Child::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Child]> {
        match self {
            Child::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Child::Literal(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Child::Nil)
    }
}

/// A tagged AST node with ordered children.
///
/// Child indices follow the Ripper layout with the tag stripped, so
/// `[:class, name, superclass, body]` has `name` at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub children: Vec<Child>,
}

impl AstNode {
    pub fn new(kind: NodeKind, children: Vec<Child>) -> Self {
        Self { kind, children }
    }

    /// Get the child at `index`
    pub fn child(&self, index: usize) -> Option<&Child> {
        self.children.get(index)
    }

    /// Get the child at `index` if it is a node
    pub fn node(&self, index: usize) -> Option<&AstNode> {
        self.child(index).and_then(Child::as_node)
    }

    /// Get the child at `index` if it is a list
    pub fn list(&self, index: usize) -> Option<&[Child]> {
        self.child(index).and_then(Child::as_list)
    }

    /// Get the child at `index` if it is a literal
    pub fn literal(&self, index: usize) -> Option<&str> {
        self.child(index).and_then(Child::as_literal)
    }

    /// Name carried by a `@const` token
    pub fn const_name(&self) -> Option<&str> {
        if self.kind == NodeKind::Const {
            self.literal(0)
        } else {
            None
        }
    }

    /// First source position found in this node or its descendants
    pub fn position(&self) -> Option<Position> {
        self.children.iter().find_map(Self::child_position)
    }

    fn child_position(child: &Child) -> Option<Position> {
        match child {
            Child::Position(pos) => Some(*pos),
            Child::Node(node) => node.position(),
            Child::List(items) => items.iter().find_map(Self::child_position),
            _ => None,
        }
    }
}
