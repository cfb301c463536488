//! Grouping of statements by the object they act on.

use alloc::string::String;
use alloc::vec::Vec;

use vc_codedom::{Expression, Statement, StatementKind, TypeRef};

use crate::hash::HashMap;

/// Statements grouped by target name, in first-seen order.
pub type StatementTable = Vec<(String, Vec<Statement>)>;

/// Groups `statements` by the name of the object each one targets.
///
/// Statements on `this` file under `class_name`. Statements whose target
/// cannot be named are dropped.
///
/// ```
/// use vc_codedom::{Expression, Statement};
/// use vc_design::statement_table::fill_statement_table;
///
/// let button = Expression::field(Expression::This, "button1");
/// let statements = [
///     Statement::assign(Expression::property(button.clone(), "Text"), Expression::string("OK")),
///     Statement::assign(Expression::property(Expression::This, "Text"), Expression::string("Form")),
///     Statement::assign(Expression::property(button, "TabIndex"), Expression::int(1)),
/// ];
/// let table = fill_statement_table(&statements, "Form1");
/// assert_eq!(table.len(), 2);
/// assert_eq!(table[0].0, "button1");
/// assert_eq!(table[0].1.len(), 2);
/// ```
pub fn fill_statement_table(statements: &[Statement], class_name: &str) -> StatementTable {
    let mut table: StatementTable = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::default();

    for statement in statements {
        let Some(name) = statement_target(statement, class_name) else {
            continue;
        };
        match index.get(name) {
            Some(&slot) => table[slot].1.push(statement.clone()),
            None => {
                index.insert(name.into(), table.len());
                table.push((name.into(), alloc::vec![statement.clone()]));
            }
        }
    }
    table
}

/// The name of the object `statement` acts on.
pub fn statement_target<'s>(statement: &'s Statement, class_name: &'s str) -> Option<&'s str> {
    match statement.kind() {
        StatementKind::VariableDeclaration { name, .. } => Some(name.as_str()),
        StatementKind::Assign { left, .. } => expression_target(left, class_name),
        StatementKind::Expression(expression) => expression_target(expression, class_name),
        StatementKind::AttachEvent { target, .. } | StatementKind::RemoveEvent { target, .. } => {
            expression_target(target, class_name)
        }
        StatementKind::Comment(_) => None,
    }
}

/// The type `name` is declared with by a local declaration among
/// `statements`.
pub fn local_type<'s>(statements: &'s [Statement], name: &str) -> Option<&'s TypeRef> {
    statements.iter().find_map(|statement| match statement.kind() {
        StatementKind::VariableDeclaration { ty, name: declared, .. } if declared == name => Some(ty),
        _ => None,
    })
}

fn expression_target<'s>(expression: &'s Expression, class_name: &'s str) -> Option<&'s str> {
    let mut current = expression;
    loop {
        current = match current {
            Expression::This => return Some(class_name),
            Expression::Variable(name) => return Some(name.as_str()),
            Expression::Field { target, name } if matches!(target.as_ref(), Expression::This) => {
                return Some(name.as_str());
            }
            Expression::Field { target, .. }
            | Expression::Property { target, .. }
            | Expression::MethodInvoke { target, .. }
            | Expression::DelegateCreate { target, .. } => target.as_ref(),
            Expression::Cast { expr, .. } => expr.as_ref(),
            _ => return None,
        };
    }
}
