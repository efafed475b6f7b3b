//! AST node model.
//!
//! Nodes live in an arena ([`crate::model::arena::Ast`]) and reference each other by
//! [`NodeId`]. The kind set is closed: every construction rule of the builder
//! produces one of the [`NodeKind`] variants below, and generator emission matches
//! on the same enum. Payloads only hold ids of nodes that are also reachable
//! through `children`, so the arena stays the single owner of every node.

use crate::model::span::Span;
use serde::{Deserialize, Serialize};

/// Stable index of a node inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declarations and references recorded on a scope-bearing node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Identifier nodes introduced in this scope, in registration order.
    pub declarations: Vec<NodeId>,
    /// Identifier nodes referenced here that need resolution.
    pub used_identifiers: Vec<NodeId>,
}

/// One of the three value forms of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "form", content = "node")]
pub enum PropertyValue {
    /// `BindableExpression` wrapper around an inline expression.
    Expression(NodeId),
    /// `StatementBlock` evaluated once (or per change when it has bindings).
    Block(NodeId),
    /// Nested `ComponentDeclaration` used as a class-typed value.
    Component(NodeId),
}

impl PropertyValue {
    pub fn node(self) -> NodeId {
        match self {
            PropertyValue::Expression(id) | PropertyValue::Block(id) | PropertyValue::Component(id) => id,
        }
    }
}

/// Member lists shared by component declarations and component instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMembers {
    pub properties: Vec<NodeId>,
    pub assignments: Vec<NodeId>,
    pub events: Vec<NodeId>,
    pub listeners: Vec<NodeId>,
    /// Method definitions and typed functions, in source order.
    pub functions: Vec<NodeId>,
    /// Nested instances carrying an explicit id, exposed by name on the owner.
    pub id_components: Vec<NodeId>,
    /// Unnamed nested instances forming the default content.
    pub default_slot: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDecl {
    pub name: Option<NodeId>,
    /// Dotted base type, e.g. `[ui, Rectangle]`.
    pub heritage: Vec<NodeId>,
    pub id: Option<NodeId>,
    pub body: Option<NodeId>,
    pub constructor: Option<NodeId>,
    pub members: ComponentMembers,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Dotted type name segments.
    pub name: Vec<NodeId>,
    pub id: Option<NodeId>,
    /// External name bound with the `instance` form.
    pub instance_name: Option<NodeId>,
    pub arguments: Option<NodeId>,
    pub body: Option<NodeId>,
    /// Bare statement under the unit or its script scope.
    pub is_root: bool,
    /// Declaration or root instance that instantiates this id component.
    pub owner: Option<NodeId>,
    pub members: ComponentMembers,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub type_name: Option<NodeId>,
    pub name: Option<NodeId>,
    pub value: Option<PropertyValue>,
    /// Member expressions detected as reactive sources, in visit order.
    pub bindings: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAssign {
    /// Dotted left-hand path.
    pub path: Vec<NodeId>,
    pub value: Option<PropertyValue>,
    pub bindings: Vec<NodeId>,
}

/// Function parameter. Events and typed functions carry a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub type_name: Option<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionData {
    pub name: Option<NodeId>,
    pub params: Vec<Parameter>,
    /// Source node of the parameter list (kept for verbatim re-emission).
    pub params_node: Option<NodeId>,
    pub body: Option<NodeId>,
    /// `super(...)` call found at statement level of a constructor body.
    pub super_call: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportData {
    pub path: Vec<NodeId>,
    pub alias: Option<NodeId>,
    pub is_relative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedData {
    pub tag: Option<NodeId>,
    pub string: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKeyword {
    Var,
    Let,
    Const,
}

impl DeclarationKeyword {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "var" => Some(Self::Var),
            "let" => Some(Self::Let),
            "const" => Some(Self::Const),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }
}

/// Closed set of node kinds with their payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum NodeKind {
    Program,
    /// Top-level script block; instances directly inside are roots.
    ScriptScope,
    Import(ImportData),
    ImportPath,
    Identifier,
    ComponentDeclaration(Box<ComponentDecl>),
    ComponentHeritage,
    ComponentBody,
    ComponentInstance(Box<InstanceData>),
    PropertyDeclaration(Box<PropertyDecl>),
    PropertyAssignment(Box<PropertyAssign>),
    /// Inline property value expression.
    BindableExpression,
    StatementBlock,
    ExpressionStatement,
    MemberExpression,
    SubscriptExpression,
    CallExpression { is_super: bool },
    Arguments,
    NewExpression,
    ReturnStatement,
    Object,
    Number,
    FormalParameters,
    EventDeclaration(FunctionData),
    ListenerDeclaration(FunctionData),
    MethodDefinition(FunctionData),
    TypedFunctionDeclaration(FunctionData),
    FunctionDeclaration(FunctionData),
    ArrowFunction(FunctionData),
    ConstructorDefinition(FunctionData),
    ClassDeclaration,
    TaggedComponent(TaggedData),
    TaggedString,
    VariableDeclaration(DeclarationKeyword),
    VariableDeclarator,
}

impl NodeKind {
    /// Name used in dumps and diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::ScriptScope => "ScriptScope",
            NodeKind::Import(_) => "Import",
            NodeKind::ImportPath => "ImportPath",
            NodeKind::Identifier => "Identifier",
            NodeKind::ComponentDeclaration(_) => "ComponentDeclaration",
            NodeKind::ComponentHeritage => "ComponentHeritage",
            NodeKind::ComponentBody => "ComponentBody",
            NodeKind::ComponentInstance(_) => "ComponentInstance",
            NodeKind::PropertyDeclaration(_) => "PropertyDeclaration",
            NodeKind::PropertyAssignment(_) => "PropertyAssignment",
            NodeKind::BindableExpression => "BindableExpression",
            NodeKind::StatementBlock => "StatementBlock",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::SubscriptExpression => "SubscriptExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::Arguments => "Arguments",
            NodeKind::NewExpression => "NewExpression",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::Object => "Object",
            NodeKind::Number => "Number",
            NodeKind::FormalParameters => "FormalParameters",
            NodeKind::EventDeclaration(_) => "EventDeclaration",
            NodeKind::ListenerDeclaration(_) => "ListenerDeclaration",
            NodeKind::MethodDefinition(_) => "MethodDefinition",
            NodeKind::TypedFunctionDeclaration(_) => "TypedFunctionDeclaration",
            NodeKind::FunctionDeclaration(_) => "FunctionDeclaration",
            NodeKind::ArrowFunction(_) => "ArrowFunction",
            NodeKind::ConstructorDefinition(_) => "ConstructorDefinition",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::TaggedComponent(_) => "TaggedComponent",
            NodeKind::TaggedString => "TaggedString",
            NodeKind::VariableDeclaration(_) => "VariableDeclaration",
            NodeKind::VariableDeclarator => "VariableDeclarator",
        }
    }

    /// Kinds that own a [`Scope`].
    pub fn is_scope_bearing(&self) -> bool {
        matches!(
            self,
            NodeKind::Program
                | NodeKind::ScriptScope
                | NodeKind::ComponentDeclaration(_)
                | NodeKind::ComponentInstance(_)
                | NodeKind::StatementBlock
                | NodeKind::ArrowFunction(_)
                | NodeKind::ClassDeclaration
        )
    }

    /// Boundaries a member expression does not look past when searching for
    /// the property it binds to.
    pub fn stops_binding_search(&self) -> bool {
        matches!(
            self,
            NodeKind::MemberExpression
                | NodeKind::CallExpression { .. }
                | NodeKind::FunctionDeclaration(_)
                | NodeKind::ArrowFunction(_)
                | NodeKind::ClassDeclaration
        )
    }

    pub fn members(&self) -> Option<&ComponentMembers> {
        match self {
            NodeKind::ComponentDeclaration(d) => Some(&d.members),
            NodeKind::ComponentInstance(i) => Some(&i.members),
            _ => None,
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut ComponentMembers> {
        match self {
            NodeKind::ComponentDeclaration(d) => Some(&mut d.members),
            NodeKind::ComponentInstance(i) => Some(&mut i.members),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<&FunctionData> {
        match self {
            NodeKind::EventDeclaration(f)
            | NodeKind::ListenerDeclaration(f)
            | NodeKind::MethodDefinition(f)
            | NodeKind::TypedFunctionDeclaration(f)
            | NodeKind::FunctionDeclaration(f)
            | NodeKind::ArrowFunction(f)
            | NodeKind::ConstructorDefinition(f) => Some(f),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionData> {
        match self {
            NodeKind::EventDeclaration(f)
            | NodeKind::ListenerDeclaration(f)
            | NodeKind::MethodDefinition(f)
            | NodeKind::TypedFunctionDeclaration(f)
            | NodeKind::FunctionDeclaration(f)
            | NodeKind::ArrowFunction(f)
            | NodeKind::ConstructorDefinition(f) => Some(f),
            _ => None,
        }
    }

    /// Component id, for declarations and instances.
    pub fn component_id(&self) -> Option<NodeId> {
        match self {
            NodeKind::ComponentDeclaration(d) => d.id,
            NodeKind::ComponentInstance(i) => i.id,
            _ => None,
        }
    }
}

/// Arena slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Present exactly when `kind.is_scope_bearing()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Box<Scope>>,
}

/// Non-fatal finding recorded while building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "diagnostic")]
pub enum Diagnostic {
    /// A component body declares more than one constructor; the last one is used.
    DuplicateConstructor { component: Span, ignored: Span },
}
