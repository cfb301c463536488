//! Deterministic ordering of generated statements.

use alloc::vec::Vec;

use vc_codedom::{Expression, OrderHint, Statement, StatementKind};

// -----------------------------------------------------------------------------
// Bucket

/// The ordering group of a statement. Buckets are emitted in declaration
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Container,
    LocalDeclaration,
    FieldAssignment,
    VariableAssignment,
    Begin,
    Default,
    End,
}

impl Bucket {
    const COUNT: usize = 7;

    /// Classifies `statement`. An explicit ordering hint wins over the
    /// shape of the statement.
    pub fn classify(statement: &Statement) -> Self {
        match statement.order() {
            OrderHint::Container => return Self::Container,
            OrderHint::Begin => return Self::Begin,
            OrderHint::End => return Self::End,
            OrderHint::Default => {}
        }
        match statement.kind() {
            StatementKind::VariableDeclaration { .. } => Self::LocalDeclaration,
            StatementKind::Assign {
                left: Expression::Field { target, .. },
                ..
            } if matches!(target.as_ref(), Expression::This) => Self::FieldAssignment,
            StatementKind::Assign {
                left: Expression::Variable(_),
                ..
            } => Self::VariableAssignment,
            _ => Self::Default,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

// -----------------------------------------------------------------------------
// StatementAssembler

/// Collects statements into [`Bucket`]s and concatenates them.
///
/// Insertion order is kept within a bucket.
///
/// ```
/// use vc_codedom::{Expression, OrderHint, Statement};
/// use vc_design::assembler::StatementAssembler;
///
/// let mut assembler = StatementAssembler::new();
/// assembler.push(Statement::expression(Expression::variable("late")).with_order(OrderHint::End));
/// assembler.push(Statement::declare("T".into(), "early", None));
///
/// let combined = assembler.combine();
/// assert_eq!(combined[0].to_string(), "T early;");
/// ```
#[derive(Clone, Debug, Default)]
pub struct StatementAssembler {
    buckets: [Vec<Statement>; Bucket::COUNT],
}

impl StatementAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        let bucket = Bucket::classify(&statement);
        self.buckets[bucket.index()].push(statement);
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Statement] {
        &self.buckets[bucket.index()]
    }

    pub fn combine(self) -> Vec<Statement> {
        let mut combined = Vec::with_capacity(self.len());
        for bucket in self.buckets {
            combined.extend(bucket);
        }
        combined
    }
}

impl Extend<Statement> for StatementAssembler {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        for statement in iter {
            self.push(statement);
        }
    }
}

impl FromIterator<Statement> for StatementAssembler {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        let mut assembler = Self::new();
        assembler.extend(iter);
        assembler
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_codedom::{Expression, OrderHint, Statement};

    use super::{Bucket, StatementAssembler};

    fn samples() -> Vec<Statement> {
        vec![
            Statement::expression(Expression::invoke(Expression::This, "ResumeLayout", vec![
                Expression::bool(false),
            ]))
            .with_order(OrderHint::End),
            Statement::assign(
                Expression::property(Expression::field(Expression::This, "button1"), "Text"),
                Expression::string("OK"),
            ),
            Statement::assign(Expression::variable("point"), Expression::null()),
            Statement::expression(Expression::invoke(Expression::This, "SuspendLayout", vec![]))
                .with_order(OrderHint::Begin),
            Statement::assign(
                Expression::field(Expression::This, "button1"),
                Expression::create("Demo.Button".into(), vec![]),
            ),
            Statement::declare("Demo.Point".into(), "point", None),
            Statement::assign(
                Expression::field(Expression::This, "components"),
                Expression::create("System.ComponentModel.Container".into(), vec![]),
            )
            .with_order(OrderHint::Container),
        ]
    }

    #[test]
    fn classification() {
        let buckets: Vec<Bucket> = samples().iter().map(Bucket::classify).collect();
        assert_eq!(buckets, vec![
            Bucket::End,
            Bucket::Default,
            Bucket::VariableAssignment,
            Bucket::Begin,
            Bucket::FieldAssignment,
            Bucket::LocalDeclaration,
            Bucket::Container,
        ]);
    }

    #[test]
    fn combine_orders_buckets() {
        let mut samples = samples();
        let mut expected: Option<Vec<String>> = None;

        // Every rotation of the input combines to the same order.
        for _ in 0..samples.len() {
            let combined: Vec<String> = samples
                .iter()
                .cloned()
                .collect::<StatementAssembler>()
                .combine()
                .iter()
                .map(ToString::to_string)
                .collect();
            match &expected {
                Some(expected) => assert_eq!(&combined, expected),
                None => expected = Some(combined),
            }
            samples.rotate_left(1);
        }

        assert_eq!(expected.unwrap(), vec![
            "this.components = new System.ComponentModel.Container();",
            "Demo.Point point;",
            "this.button1 = new Demo.Button();",
            "point = null;",
            "this.SuspendLayout();",
            "this.button1.Text = \"OK\";",
            "this.ResumeLayout(false);",
        ]);
    }

    #[test]
    fn insertion_order_within_a_bucket() {
        let mut assembler = StatementAssembler::new();
        assembler.push(Statement::expression(Expression::variable("a")));
        assembler.push(Statement::expression(Expression::variable("b")));
        assert_eq!(assembler.bucket(Bucket::Default).len(), 2);
        let combined = assembler.combine();
        assert_eq!(combined[0].to_string(), "a;");
        assert_eq!(combined[1].to_string(), "b;");
    }
}
