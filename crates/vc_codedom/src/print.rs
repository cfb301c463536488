//! C#-like rendering of the statement tree.

use core::fmt;

use crate::{Expression, Literal, Statement, StatementKind, TypeDeclaration};

// -----------------------------------------------------------------------------
// Helpers

struct Separated<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Separated<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(item, f)?;
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, ch: char, quote: char) -> fmt::Result {
    match ch {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        '\0' => f.write_str("\\0"),
        c if c == quote => write!(f, "\\{c}"),
        c => fmt::Write::write_char(f, c),
    }
}

// -----------------------------------------------------------------------------
// Display

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(c) => {
                f.write_str("'")?;
                write_escaped(f, *c, '\'')?;
                f.write_str("'")
            }
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}F"),
            Self::Double(v) => write!(f, "{v}D"),
            Self::Str(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    write_escaped(f, ch, '"')?;
                }
                f.write_str("\"")
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::This => f.write_str("this"),
            Self::Variable(name) => f.write_str(name),
            Self::Field { target, name } | Self::Property { target, name } => {
                write!(f, "{target}.{name}")
            }
            Self::TypeReference(ty) => write!(f, "{ty}"),
            Self::ObjectCreate { ty, args } => write!(f, "new {ty}({})", Separated(args)),
            Self::ArrayCreate { ty, items } if items.is_empty() => write!(f, "new {ty}[0]"),
            Self::ArrayCreate { ty, items } => {
                write!(f, "new {ty}[] {{ {} }}", Separated(items))
            }
            Self::Cast { ty, expr } => write!(f, "(({ty})({expr}))"),
            Self::Primitive(literal) => fmt::Display::fmt(literal, f),
            Self::Binary { left, op, right } => write!(f, "({left} {} {right})", op.symbol()),
            Self::MethodInvoke {
                target,
                method,
                args,
            } => write!(f, "{target}.{method}({})", Separated(args)),
            Self::DelegateCreate { ty, target, method } => {
                write!(f, "new {ty}({target}.{method})")
            }
            Self::TypeOf(ty) => write!(f, "typeof({ty})"),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            StatementKind::VariableDeclaration {
                ty,
                name,
                init: Some(init),
            } => write!(f, "{ty} {name} = {init};"),
            StatementKind::VariableDeclaration { ty, name, init: None } => {
                write!(f, "{ty} {name};")
            }
            StatementKind::Assign { left, right } => write!(f, "{left} = {right};"),
            StatementKind::Expression(expr) => write!(f, "{expr};"),
            StatementKind::AttachEvent {
                target,
                event,
                listener,
            } => write!(f, "{target}.{event} += {listener};"),
            StatementKind::RemoveEvent {
                target,
                event,
                listener,
            } => write!(f, "{target}.{event} -= {listener};"),
            StatementKind::Comment(text) => write!(f, "// {text}"),
        }
    }
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "partial class {} : {}", self.name, self.base)?;
        writeln!(f, "{{")?;
        for field in &self.fields {
            writeln!(f, "    private {} {};", field.ty, field.name)?;
        }
        if !self.fields.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, "    private void InitializeComponent()")?;
        writeln!(f, "    {{")?;
        for statement in &self.initialize {
            writeln!(f, "        {statement}")?;
        }
        writeln!(f, "    }}")?;
        write!(f, "}}")
    }
}
