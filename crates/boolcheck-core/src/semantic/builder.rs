//! Single forward pass over the syntax tree that records scopes,
//! declarations and the expression roots the rules walk.
//!
//! Declarations are recorded as they are met but nothing is resolved here,
//! so a call may later resolve against a function declared further down.

use tree_sitter::{Node, Tree};

use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbols::{ReturnKind, SymbolTable, VariableType};
use super::{ExprRoot, RootContext, SemanticModel};
use crate::syntax::lower::{
    child_of_kind, is_bool_type_name, is_expression, lower_expression, named_children, node_text,
    position,
};
use crate::syntax::{Expr, ExprKind};

const ARITHMETIC_TYPES: &[&str] = &[
    "char",
    "char8_t",
    "char16_t",
    "char32_t",
    "wchar_t",
    "short",
    "int",
    "long",
    "signed",
    "unsigned",
    "float",
    "double",
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "intptr_t",
    "uintptr_t",
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
];

/// Node kinds that never contain declarations or expressions of interest.
const SKIPPED_KINDS: &[&str] = &[
    "ERROR",
    "comment",
    "access_specifier",
    "alias_declaration",
    "enum_specifier",
    "friend_declaration",
    "namespace_alias_definition",
    "parameter_list",
    "preproc_call",
    "preproc_def",
    "preproc_function_def",
    "preproc_include",
    "static_assert_declaration",
    "template_parameter_list",
    "type_definition",
    "using_declaration",
];

/// What a declarator introduces once pointer, reference and parenthesis
/// wrappers are peeled off.
enum Declared<'tree> {
    Variable {
        name: String,
        ty: VariableType,
        line: usize,
        column: usize,
    },
    Function {
        name: Node<'tree>,
        /// Returns through a pointer or reference.
        indirect: bool,
        line: usize,
    },
    Unnamed,
}

impl Declared<'_> {
    fn indirect(self) -> Self {
        match self {
            Declared::Function { name, line, .. } => Declared::Function {
                name,
                indirect: true,
                line,
            },
            other => other,
        }
    }
}

pub struct ScopeBuilder<'src> {
    source: &'src [u8],
    scope_tree: ScopeTree,
    symbol_table: SymbolTable,
    roots: Vec<ExprRoot>,
    current_scope: ScopeId,
}

impl<'src> ScopeBuilder<'src> {
    pub fn build(tree: &Tree, source: &'src str) -> SemanticModel {
        let mut scope_tree = ScopeTree::new();
        let global = scope_tree.create_scope(ScopeKind::Global, None, None, 1);

        let mut builder = Self {
            source: source.as_bytes(),
            scope_tree,
            symbol_table: SymbolTable::new(),
            roots: Vec::new(),
            current_scope: global,
        };
        builder.visit_children(tree.root_node());

        tracing::trace!(
            scopes = builder.scope_tree.len(),
            roots = builder.roots.len(),
            "semantic model built"
        );

        SemanticModel::new(
            builder.scope_tree,
            builder.symbol_table,
            builder.roots,
            global,
        )
    }

    fn text(&self, node: Node) -> &'src str {
        node_text(node, self.source)
    }

    fn visit_children(&mut self, node: Node) {
        for child in named_children(node) {
            self.visit_node(child);
        }
    }

    fn visit_node(&mut self, node: Node) {
        match node.kind() {
            kind if SKIPPED_KINDS.contains(&kind) => {}
            "function_definition" => self.visit_function_definition(node),
            "declaration" => self.visit_declaration(node, RootContext::Initializer),
            "field_declaration" => self.visit_field_declaration(node),
            "class_specifier" | "struct_specifier" | "union_specifier" => self.visit_class(node),
            "namespace_definition" => self.visit_namespace(node),
            "preproc_if" | "preproc_ifdef" | "preproc_elif" | "preproc_elifdef" | "preproc_else" => {
                self.visit_preprocessor_branch(node)
            }
            "compound_statement" => self.in_new_scope(ScopeKind::Block, None, node, |builder| {
                builder.visit_children(node)
            }),
            "if_statement" => self.visit_if(node),
            "while_statement" | "switch_statement" => self.visit_loop_like(node),
            "do_statement" => self.visit_do(node),
            "for_statement" => self.visit_for(node),
            "for_range_loop" => self.visit_for_range(node),
            "expression_statement" => self.visit_expression_statement(node),
            "return_statement" => self.visit_return(node),
            kind if is_expression(kind) => self.push_root(node, RootContext::Statement),
            _ => self.visit_children(node),
        }
    }

    fn in_new_scope(
        &mut self,
        kind: ScopeKind,
        name: Option<String>,
        node: Node,
        visit: impl FnOnce(&mut Self),
    ) {
        let scope = self.scope_tree.create_scope(
            kind,
            name,
            Some(self.current_scope),
            position(node).0,
        );
        self.with_scope(scope, visit);
    }

    fn with_scope(&mut self, scope: ScopeId, visit: impl FnOnce(&mut Self)) {
        let parent_scope = self.current_scope;
        self.current_scope = scope;
        visit(self);
        self.current_scope = parent_scope;
    }

    fn push_root(&mut self, node: Node, context: RootContext) {
        let expr = lower_expression(node, self.source);
        self.push_expr(expr, context);
        self.visit_lambdas(node);
    }

    fn push_expr(&mut self, expr: Expr, context: RootContext) {
        self.roots.push(ExprRoot {
            expr,
            scope: self.current_scope,
            context,
        });
    }

    /// Lambdas inside `expression`, outermost first. Nested lambdas are
    /// reached through the body of the enclosing one.
    fn visit_lambdas(&mut self, expression: Node) {
        let mut pending = vec![expression];
        while let Some(node) = pending.pop() {
            if node.kind() == "lambda_expression" {
                self.visit_lambda(node);
            } else {
                pending.extend(named_children(node).into_iter().rev());
            }
        }
    }

    /// A lambda body is a function scope nested where the lambda appears, so
    /// captured names resolve through the enclosing scopes.
    fn visit_lambda(&mut self, node: Node) {
        self.in_new_scope(ScopeKind::Function, None, node, |builder| {
            let parameters = node
                .child_by_field_name("declarator")
                .and_then(|declarator| declarator.child_by_field_name("parameters"));
            if let Some(parameters) = parameters {
                builder.declare_parameters(parameters);
            }
            if let Some(body) = node.child_by_field_name("body") {
                builder.visit_children(body);
            }
        });
    }

    fn visit_preprocessor_branch(&mut self, node: Node) {
        let condition = node
            .child_by_field_name("condition")
            .or_else(|| node.child_by_field_name("name"));
        for child in named_children(node) {
            if Some(child) != condition {
                self.visit_node(child);
            }
        }
    }

    fn visit_function_definition(&mut self, node: Node) {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some((function_declarator, indirect)) = find_function_declarator(declarator, false)
        else {
            return;
        };

        let line = position(node).0;
        let return_kind = self.return_kind(node.child_by_field_name("type"), indirect);

        let name_node = function_declarator.child_by_field_name("declarator");
        let owner = match name_node {
            Some(name_node) => self.declare_function(name_node, return_kind, line),
            None => self.current_scope,
        };
        let name = name_node.map(|n| unqualified_name(self.text(n)).to_string());

        let function_scope =
            self.scope_tree
                .create_scope(ScopeKind::Function, name, Some(owner), line);

        self.with_scope(function_scope, |builder| {
            if let Some(parameters) = function_declarator.child_by_field_name("parameters") {
                builder.declare_parameters(parameters);
            }
            if let Some(body) = node.child_by_field_name("body") {
                builder.visit_children(body);
            }
        });
    }

    fn return_kind(&self, type_node: Option<Node>, indirect: bool) -> ReturnKind {
        match type_node {
            Some(ty) if !indirect && is_bool_type_name(self.text(ty)) => ReturnKind::Boolean,
            _ => ReturnKind::Other,
        }
    }

    /// Records a function named by `name_node` and returns the scope it
    /// belongs to. `Ns::f` lands in the scope for `Ns`, created on demand.
    fn declare_function(&mut self, name_node: Node, return_kind: ReturnKind, line: usize) -> ScopeId {
        match name_node.kind() {
            "qualified_identifier" => {
                let text = self.text(name_node);
                let global = text.trim_start().starts_with("::");
                let mut segments: Vec<&str> = text
                    .split("::")
                    .map(|segment| strip_template_arguments(segment).trim())
                    .filter(|segment| !segment.is_empty())
                    .collect();
                let Some(name) = segments.pop() else {
                    return self.current_scope;
                };
                let owner = self.container_scope(&segments, global, line);
                self.symbol_table
                    .declare_function(name, return_kind, owner, line);
                owner
            }
            "identifier" | "field_identifier" | "destructor_name" | "operator_name" => {
                let name = self.text(name_node).to_string();
                self.symbol_table
                    .declare_function(&name, return_kind, self.current_scope, line);
                self.current_scope
            }
            _ => self.current_scope,
        }
    }

    /// Scope named by `path`. The first segment is looked up through the
    /// enclosing scopes; missing segments become namespaces.
    fn container_scope(&mut self, path: &[&str], global: bool, line: usize) -> ScopeId {
        let Some((first, rest)) = path.split_first() else {
            return match (global, self.scope_tree.root()) {
                (true, Some(root)) => root,
                _ => self.current_scope,
            };
        };

        let start = match (global, self.scope_tree.root()) {
            (true, Some(root)) => root,
            _ => self.current_scope,
        };
        let found = if global {
            self.scope_tree.find_child(start, first)
        } else {
            self.scope_tree
                .ancestors(start)
                .find_map(|scope| self.scope_tree.find_child(scope.id, first))
        };
        let mut scope = match found {
            Some(scope) => scope,
            None => self.namespace_child(start, first, line),
        };

        for segment in rest {
            scope = match self.scope_tree.find_child(scope, segment) {
                Some(child) => child,
                None => self.namespace_child(scope, segment, line),
            };
        }
        scope
    }

    fn namespace_child(&mut self, parent: ScopeId, name: &str, line: usize) -> ScopeId {
        match self.scope_tree.find_child(parent, name) {
            Some(existing) => existing,
            None => self.scope_tree.create_scope(
                ScopeKind::Namespace,
                Some(name.to_string()),
                Some(parent),
                line,
            ),
        }
    }

    fn declare_parameters(&mut self, parameters: Node) {
        for parameter in named_children(parameters) {
            if !matches!(
                parameter.kind(),
                "parameter_declaration" | "optional_parameter_declaration"
            ) {
                continue;
            }
            let base = self.base_type(parameter.child_by_field_name("type"));
            let Some(declarator) = parameter.child_by_field_name("declarator") else {
                continue;
            };
            match self.unwrap_declarator(declarator, base) {
                Declared::Variable { name, ty, line, .. } => {
                    self.symbol_table
                        .declare_variable(&name, ty, self.current_scope, line);
                }
                // `bool f(int)` as a parameter is a function pointer.
                Declared::Function { name, line, .. } => {
                    let name = self.text(name).to_string();
                    self.symbol_table.declare_variable(
                        &name,
                        VariableType::Other,
                        self.current_scope,
                        line,
                    );
                }
                Declared::Unnamed => {}
            }
        }
    }

    fn base_type(&self, type_node: Option<Node>) -> VariableType {
        let Some(type_node) = type_node else {
            return VariableType::Other;
        };
        let text = self.text(type_node).trim();
        if is_bool_type_name(text) {
            return VariableType::Boolean;
        }
        match type_node.kind() {
            "sized_type_specifier" => VariableType::Integer,
            "primitive_type" | "type_identifier" if ARITHMETIC_TYPES.contains(&text) => {
                VariableType::Integer
            }
            _ => VariableType::Other,
        }
    }

    fn unwrap_declarator<'tree>(&self, node: Node<'tree>, base: VariableType) -> Declared<'tree> {
        match node.kind() {
            "identifier" | "field_identifier" => {
                let (line, column) = position(node);
                Declared::Variable {
                    name: self.text(node).to_string(),
                    ty: base,
                    line,
                    column,
                }
            }
            "pointer_declarator" => match node.child_by_field_name("declarator") {
                Some(inner) => self.unwrap_declarator(inner, VariableType::Pointer).indirect(),
                None => Declared::Unnamed,
            },
            "reference_declarator" => match named_children(node).first() {
                Some(&inner) => self.unwrap_declarator(inner, base).indirect(),
                None => Declared::Unnamed,
            },
            "array_declarator" => match node.child_by_field_name("declarator") {
                Some(inner) => self.unwrap_declarator(inner, VariableType::Other),
                None => Declared::Unnamed,
            },
            "parenthesized_declarator" | "attributed_declarator" => {
                match named_children(node).first() {
                    Some(&inner) => self.unwrap_declarator(inner, base),
                    None => Declared::Unnamed,
                }
            }
            "function_declarator" => {
                let Some(inner) = node.child_by_field_name("declarator") else {
                    return Declared::Unnamed;
                };
                if inner.kind() == "parenthesized_declarator" {
                    // Function and member pointers: `bool (*fp)(int)`.
                    match self.unwrap_declarator(inner, VariableType::Other) {
                        Declared::Variable {
                            name, line, column, ..
                        } => Declared::Variable {
                            name,
                            ty: VariableType::Other,
                            line,
                            column,
                        },
                        _ => Declared::Unnamed,
                    }
                } else {
                    Declared::Function {
                        name: inner,
                        indirect: false,
                        line: position(node).0,
                    }
                }
            }
            _ => Declared::Unnamed,
        }
    }

    /// Records a declared name and returns the variable name, if any.
    fn register(&mut self, declared: Declared, type_node: Option<Node>) -> Option<(String, usize, usize)> {
        match declared {
            Declared::Variable {
                name,
                ty,
                line,
                column,
            } => {
                self.symbol_table
                    .declare_variable(&name, ty, self.current_scope, line);
                Some((name, line, column))
            }
            Declared::Function {
                name,
                indirect,
                line,
            } => {
                let return_kind = self.return_kind(type_node, indirect);
                self.declare_function(name, return_kind, line);
                None
            }
            Declared::Unnamed => None,
        }
    }

    fn visit_declaration(&mut self, node: Node, context: RootContext) {
        let type_node = node.child_by_field_name("type");
        if let Some(ty) = type_node {
            if matches!(
                ty.kind(),
                "class_specifier" | "struct_specifier" | "union_specifier"
            ) {
                self.visit_class(ty);
            }
        }
        let base = self.base_type(type_node);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        for declarator in declarators {
            if declarator.kind() == "init_declarator" {
                self.visit_init_declarator(declarator, base, type_node, context);
            } else {
                let declared = self.unwrap_declarator(declarator, base);
                self.register(declared, type_node);
            }
        }
    }

    fn visit_init_declarator(
        &mut self,
        node: Node,
        base: VariableType,
        type_node: Option<Node>,
        context: RootContext,
    ) {
        let declared = match node.child_by_field_name("declarator") {
            Some(inner) => self.unwrap_declarator(inner, base),
            None => Declared::Unnamed,
        };
        let variable = self.register(declared, type_node);

        let Some(value) = node.child_by_field_name("value") else {
            return;
        };
        let operator = child_of_kind(node, "=").unwrap_or(value);
        self.push_initializer(variable, value, operator, context);
    }

    /// `T x = v` becomes the root `x = v`; brace and paren initialisers
    /// contribute each element as its own root.
    fn push_initializer(
        &mut self,
        variable: Option<(String, usize, usize)>,
        value: Node,
        operator: Node,
        context: RootContext,
    ) {
        match variable {
            Some((name, line, column)) if is_expression(value.kind()) => {
                let (op_line, op_column) = position(operator);
                let assign = ExprKind::Assign {
                    compound: false,
                    target: Box::new(Expr::new(ExprKind::Variable(name), line, column)),
                    value: Box::new(lower_expression(value, self.source)),
                };
                self.push_expr(Expr::new(assign, op_line, op_column), context);
                self.visit_lambdas(value);
            }
            _ if is_expression(value.kind()) => self.push_root(value, context),
            _ => {
                for element in named_children(value) {
                    if is_expression(element.kind()) {
                        self.push_root(element, context);
                    }
                }
            }
        }
    }

    fn visit_field_declaration(&mut self, node: Node) {
        let type_node = node.child_by_field_name("type");
        if let Some(ty) = type_node {
            if matches!(
                ty.kind(),
                "class_specifier" | "struct_specifier" | "union_specifier"
            ) {
                self.visit_class(ty);
            }
        }
        let base = self.base_type(type_node);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        let mut last_variable = None;
        for declarator in declarators {
            let declared = self.unwrap_declarator(declarator, base);
            last_variable = self.register(declared, type_node);
        }

        if let Some(default_value) = node.child_by_field_name("default_value") {
            let operator = child_of_kind(node, "=").unwrap_or(default_value);
            self.push_initializer(
                last_variable,
                default_value,
                operator,
                RootContext::Initializer,
            );
        }
    }

    fn visit_class(&mut self, node: Node) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let name = node
            .child_by_field_name("name")
            .map(|n| strip_template_arguments(unqualified_name(self.text(n))).to_string());

        self.in_new_scope(ScopeKind::Class, name, node, |builder| {
            builder.visit_children(body)
        });
    }

    fn visit_namespace(&mut self, node: Node) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let line = position(node).0;

        // Members of an anonymous namespace are visible in the enclosing one.
        let Some(name) = node.child_by_field_name("name") else {
            self.visit_children(body);
            return;
        };

        let mut scope = self.current_scope;
        for segment in self.text(name).split("::").map(str::trim) {
            if segment.is_empty() || segment == "inline" {
                continue;
            }
            scope = self.namespace_child(scope, segment, line);
        }
        self.with_scope(scope, |builder| builder.visit_children(body));
    }

    fn visit_condition(&mut self, node: Node) {
        match node.kind() {
            "condition_clause" => {
                for child in named_children(node) {
                    match child.kind() {
                        "declaration" | "condition_declaration" => {
                            self.visit_declaration(child, RootContext::Condition)
                        }
                        kind if is_expression(kind) => {
                            self.push_root(child, RootContext::Condition)
                        }
                        _ => self.visit_node(child),
                    }
                }
            }
            "declaration" | "condition_declaration" => {
                self.visit_declaration(node, RootContext::Condition)
            }
            kind if is_expression(kind) => self.push_root(node, RootContext::Condition),
            _ => self.visit_node(node),
        }
    }

    fn visit_if(&mut self, node: Node) {
        self.in_new_scope(ScopeKind::Block, None, node, |builder| {
            if let Some(condition) = node.child_by_field_name("condition") {
                builder.visit_condition(condition);
            }
            if let Some(consequence) = node.child_by_field_name("consequence") {
                builder.visit_node(consequence);
            }
            if let Some(alternative) = node.child_by_field_name("alternative") {
                builder.visit_node(alternative);
            }
        });
    }

    fn visit_loop_like(&mut self, node: Node) {
        self.in_new_scope(ScopeKind::Block, None, node, |builder| {
            if let Some(condition) = node.child_by_field_name("condition") {
                builder.visit_condition(condition);
            }
            if let Some(body) = node.child_by_field_name("body") {
                builder.visit_node(body);
            }
        });
    }

    fn visit_do(&mut self, node: Node) {
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_node(body);
        }
        if let Some(condition) = node.child_by_field_name("condition") {
            self.visit_condition(condition);
        }
    }

    fn visit_for(&mut self, node: Node) {
        self.in_new_scope(ScopeKind::Block, None, node, |builder| {
            if let Some(initializer) = node.child_by_field_name("initializer") {
                match initializer.kind() {
                    "declaration" => builder.visit_declaration(initializer, RootContext::Initializer),
                    kind if is_expression(kind) => {
                        builder.push_root(initializer, RootContext::Statement)
                    }
                    _ => builder.visit_node(initializer),
                }
            }
            if let Some(condition) = node.child_by_field_name("condition") {
                builder.visit_condition(condition);
            }
            if let Some(update) = node.child_by_field_name("update") {
                builder.visit_node(update);
            }
            if let Some(body) = node.child_by_field_name("body") {
                builder.visit_node(body);
            }
        });
    }

    fn visit_for_range(&mut self, node: Node) {
        self.in_new_scope(ScopeKind::Block, None, node, |builder| {
            let type_node = node.child_by_field_name("type");
            let base = builder.base_type(type_node);
            if let Some(declarator) = node.child_by_field_name("declarator") {
                let declared = builder.unwrap_declarator(declarator, base);
                builder.register(declared, type_node);
            }
            if let Some(right) = node.child_by_field_name("right") {
                if is_expression(right.kind()) {
                    builder.push_root(right, RootContext::Statement);
                }
            }
            if let Some(body) = node.child_by_field_name("body") {
                builder.visit_node(body);
            }
        });
    }

    fn visit_expression_statement(&mut self, node: Node) {
        for child in named_children(node) {
            if is_expression(child.kind()) {
                self.push_root(child, RootContext::Statement);
            } else {
                self.visit_node(child);
            }
        }
    }

    fn visit_return(&mut self, node: Node) {
        for child in named_children(node) {
            if is_expression(child.kind()) {
                self.push_root(child, RootContext::Return);
            } else if child.kind() == "initializer_list" {
                for element in named_children(child) {
                    if is_expression(element.kind()) {
                        self.push_root(element, RootContext::Return);
                    }
                }
            }
        }
    }
}

/// Peels pointer, reference and parenthesis wrappers until the function
/// declarator; `indirect` is set when a pointer or reference was crossed.
fn find_function_declarator(node: Node, indirect: bool) -> Option<(Node, bool)> {
    match node.kind() {
        "function_declarator" => Some((node, indirect)),
        "pointer_declarator" => find_function_declarator(node.child_by_field_name("declarator")?, true),
        "reference_declarator" => {
            find_function_declarator(*named_children(node).first()?, true)
        }
        "parenthesized_declarator" | "attributed_declarator" => {
            find_function_declarator(*named_children(node).first()?, indirect)
        }
        _ => None,
    }
}

fn unqualified_name(text: &str) -> &str {
    text.rsplit("::").next().unwrap_or(text).trim()
}

fn strip_template_arguments(text: &str) -> &str {
    text.split('<').next().unwrap_or(text)
}
