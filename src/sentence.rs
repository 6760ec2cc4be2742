/*!
Propositional sentences: the AST, its two printed forms, three-valued
evaluation, and the rewriting pipeline into conjunctive normal form.
*/

use std::{fmt, fmt::Display, str::FromStr};

use crate::parser;
use crate::prelude::*;
use crate::symbols::{LogicValue, Symbol, SymbolList};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to parse sentence"))]
    Parse { source: parser::Error },
    #[snafu(display("Expected a single sentence but the input holds {}", count))]
    NotSingleSentence { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
    Implies,
    Biconditional,
}

impl Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => write!(f, "AND"),
            Connective::Or => write!(f, "OR"),
            Connective::Implies => write!(f, "=>"),
            Connective::Biconditional => write!(f, "<=>"),
        }
    }
}

/// Shape of a sentence node.
///
/// `Group` wraps a single child and only arises from negating an already
/// negated sentence; it keeps the double negation representable until the
/// normalization passes unwrap it. There is no connective-less binary state.
#[derive(Debug, Clone)]
pub enum Body {
    Atom(Symbol),
    Group(Box<Sentence>),
    Binary {
        op: Connective,
        left: Box<Sentence>,
        right: Box<Sentence>,
    },
}

/// A propositional sentence: a negation flag over a [`Body`].
///
/// Sentences are immutable values. Every transformation below builds a new
/// tree; no node is ever shared between two live sentences.
#[derive(Debug, Clone)]
pub struct Sentence {
    negated: bool,
    body: Body,
}

impl Sentence {
    pub fn symbol(symbol: Symbol) -> Self {
        Sentence {
            negated: false,
            body: Body::Atom(symbol),
        }
    }

    pub fn negated_symbol(symbol: Symbol) -> Self {
        Sentence {
            negated: true,
            body: Body::Atom(symbol),
        }
    }

    pub fn binary(left: Sentence, op: Connective, right: Sentence) -> Self {
        Sentence {
            negated: false,
            body: Body::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// Parses text that must hold exactly one sentence.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut sentences = parser::parse_all(text).context(Parse)?;
        ensure!(
            sentences.len() == 1,
            NotSingleSentence {
                count: sentences.len(),
            }
        );
        Ok(sentences.remove(0))
    }

    pub fn negated(&self) -> bool {
        self.negated
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.body, Body::Atom(_))
    }

    /// Logical negation. Negating an already negated sentence wraps it in a
    /// group so the double negation survives printing and transformation.
    pub fn negate(&self) -> Sentence {
        if self.negated {
            Sentence {
                negated: true,
                body: Body::Group(Box::new(self.clone())),
            }
        } else {
            let mut negated = self.clone();
            negated.negated = true;
            negated
        }
    }

    /// All symbols of the sentence, deduplicated in first-seen order.
    pub fn symbols(&self) -> SymbolList {
        let mut list = SymbolList::new();
        self.collect_symbols(&mut list);
        list
    }

    fn collect_symbols(&self, list: &mut SymbolList) {
        match &self.body {
            Body::Atom(symbol) => list.add(symbol.clone()),
            Body::Group(inner) => inner.collect_symbols(list),
            Body::Binary { left, right, .. } => {
                left.collect_symbols(list);
                right.collect_symbols(list);
            }
        }
    }

    /// Evaluates the sentence under `model` with three-valued semantics.
    /// Symbols absent from the model read as `Undefined`; each node applies
    /// its own negation last.
    pub fn evaluate(&self, model: &SymbolList) -> LogicValue {
        let value = match &self.body {
            Body::Atom(symbol) => model.value(symbol),
            Body::Group(inner) => inner.evaluate(model),
            Body::Binary { op, left, right } => {
                let lhs = left.evaluate(model);
                let rhs = right.evaluate(model);
                match op {
                    Connective::And => lhs.and(rhs),
                    Connective::Or => lhs.or(rhs),
                    Connective::Implies => lhs.implies(rhs),
                    Connective::Biconditional => lhs.iff(rhs),
                }
            }
        };

        if self.negated {
            !value
        } else {
            value
        }
    }

    pub fn is_true(&self, model: &SymbolList) -> bool {
        self.evaluate(model).is_true()
    }

    pub fn is_false(&self, model: &SymbolList) -> bool {
        self.evaluate(model).is_false()
    }

    /// Truth-table equivalence. The sentences must range over the same
    /// symbol set and agree under every assignment of it. Exponential in the
    /// number of symbols.
    pub fn are_equivalent(&self, other: &Sentence) -> bool {
        let mut ours = self.symbols();
        let mut theirs = other.symbols();
        ours.sort();
        theirs.sort();

        if ours != theirs {
            return false;
        }

        let model = ours.clone();
        self.agree_on_assignments(other, ours, &model)
    }

    fn agree_on_assignments(
        &self,
        other: &Sentence,
        mut symbols: SymbolList,
        model: &SymbolList,
    ) -> bool {
        let next = match symbols.pop_front() {
            Some(entry) => entry.symbol().clone(),
            None => return self.evaluate(model) == other.evaluate(model),
        };

        self.agree_on_assignments(
            other,
            symbols.clone(),
            &model.with_value(&next, LogicValue::True),
        ) && self.agree_on_assignments(other, symbols, &model.with_value(&next, LogicValue::False))
    }

    /// Fully parenthesized rendering, the canonical form used for sentence
    /// comparison. Same as formatting with `{:#}`.
    pub fn full_parens(&self) -> String {
        format!("{:#}", self)
    }

    /// Rewrites the sentence into conjunctive normal form: conditional
    /// elimination, then negation pushing, then OR-over-AND distribution
    /// repeated until the printed tree stops changing. The result can grow
    /// exponentially over the input.
    pub fn to_cnf(&self) -> Sentence {
        if self.is_atomic() {
            return self.clone();
        }

        let mut cnf = self.clone().eliminate_conditionals().push_negations();
        loop {
            let before = cnf.full_parens();
            cnf = cnf.distribute_ors();
            if cnf.full_parens() == before {
                break;
            }
        }

        cnf
    }

    /// Replaces every `a => b` with `~a OR b` and every `a <=> b` with the
    /// conjunction of the two implications, keeping each node's negation.
    fn eliminate_conditionals(self) -> Sentence {
        let negated = self.negated;
        match self.body {
            Body::Atom(_) => self,
            Body::Group(inner) => Sentence {
                negated,
                body: Body::Group(Box::new(inner.eliminate_conditionals())),
            },
            Body::Binary {
                op: Connective::Biconditional,
                left,
                right,
            } => {
                let forward =
                    Sentence::binary((*left).clone(), Connective::Implies, (*right).clone());
                let backward = Sentence::binary(*right, Connective::Implies, *left);
                Sentence {
                    negated,
                    body: Body::Binary {
                        op: Connective::And,
                        left: Box::new(forward.eliminate_conditionals()),
                        right: Box::new(backward.eliminate_conditionals()),
                    },
                }
            }
            Body::Binary {
                op: Connective::Implies,
                left,
                right,
            } => Sentence {
                negated,
                body: Body::Binary {
                    op: Connective::Or,
                    left: Box::new(left.negate().eliminate_conditionals()),
                    right: Box::new(right.eliminate_conditionals()),
                },
            },
            Body::Binary { op, left, right } => Sentence {
                negated,
                body: Body::Binary {
                    op,
                    left: Box::new(left.eliminate_conditionals()),
                    right: Box::new(right.eliminate_conditionals()),
                },
            },
        }
    }

    /// Pushes every negation down to the atoms with De Morgan rewrites,
    /// unwrapping groups along the way. Expects conditionals to be gone.
    fn push_negations(self) -> Sentence {
        let negated = self.negated;
        match self.body {
            Body::Atom(_) => self,
            Body::Group(inner) => {
                if negated {
                    inner.move_not_inward().push_negations()
                } else {
                    inner.push_negations()
                }
            }
            Body::Binary { op, left, right } => {
                if negated {
                    let flipped = match op {
                        Connective::And => Connective::Or,
                        Connective::Or => Connective::And,
                        Connective::Implies | Connective::Biconditional => {
                            unreachable!("conditionals are eliminated before negations are pushed")
                        }
                    };
                    Sentence {
                        negated: false,
                        body: Body::Binary {
                            op: flipped,
                            left: Box::new(left.move_not_inward().push_negations()),
                            right: Box::new(right.move_not_inward().push_negations()),
                        },
                    }
                } else {
                    Sentence {
                        negated,
                        body: Body::Binary {
                            op,
                            left: Box::new(left.push_negations()),
                            right: Box::new(right.push_negations()),
                        },
                    }
                }
            }
        }
    }

    /// Toggles the negation flag; a group that loses its negation this way
    /// is unwrapped one level.
    fn move_not_inward(mut self) -> Sentence {
        self.negated = !self.negated;
        let negated = self.negated;
        match self.body {
            Body::Group(inner) if !negated => *inner,
            _ => self,
        }
    }

    /// One pass of OR-over-AND distribution. The left conjunction is
    /// rewritten first; `to_cnf` loops this until a fixpoint.
    fn distribute_ors(self) -> Sentence {
        let negated = self.negated;
        match self.body {
            Body::Atom(_) => self,
            Body::Group(_) => unreachable!("groups are unwrapped before distribution"),
            Body::Binary {
                op: Connective::Or,
                left,
                right,
            } => {
                if matches!(
                    left.body,
                    Body::Binary {
                        op: Connective::And,
                        ..
                    }
                ) {
                    Sentence {
                        negated,
                        body: Self::redistribute(*left, *right),
                    }
                } else if matches!(
                    right.body,
                    Body::Binary {
                        op: Connective::And,
                        ..
                    }
                ) {
                    Sentence {
                        negated,
                        body: Self::redistribute(*right, *left),
                    }
                } else {
                    Sentence {
                        negated,
                        body: Body::Binary {
                            op: Connective::Or,
                            left: Box::new(left.distribute_ors()),
                            right: Box::new(right.distribute_ors()),
                        },
                    }
                }
            }
            Body::Binary {
                op: Connective::And,
                left,
                right,
            } => Sentence {
                negated,
                body: Body::Binary {
                    op: Connective::And,
                    left: Box::new(left.distribute_ors()),
                    right: Box::new(right.distribute_ors()),
                },
            },
            Body::Binary { .. } => unreachable!("conditionals are eliminated before distribution"),
        }
    }

    /// `(p AND q) OR r` into `(p OR r) AND (q OR r)`, distributing the two
    /// fresh branches in turn.
    fn redistribute(conjunction: Sentence, other: Sentence) -> Body {
        match conjunction.body {
            Body::Binary {
                op: Connective::And,
                left,
                right,
            } => {
                let first = Sentence::binary(*left, Connective::Or, other.clone());
                let second = Sentence::binary(*right, Connective::Or, other);
                Body::Binary {
                    op: Connective::And,
                    left: Box::new(first.distribute_ors()),
                    right: Box::new(second.distribute_ors()),
                }
            }
            _ => unreachable!("redistribution needs a conjunction operand"),
        }
    }

    fn fmt_full(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        match &self.body {
            Body::Atom(symbol) => write!(f, "{}", symbol),
            Body::Group(inner) => inner.fmt_full(f),
            Body::Binary { op, left, right } => {
                write!(f, "(")?;
                left.fmt_full(f)?;
                write!(f, " {} ", op)?;
                right.fmt_full(f)?;
                write!(f, ")")
            }
        }
    }

    fn fmt_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Atom(_) => self.fmt_full(f),
            Body::Group(inner) => {
                if self.negated {
                    write!(f, "~(")?;
                    inner.fmt_compact(f)?;
                    write!(f, ")")
                } else {
                    inner.fmt_compact(f)
                }
            }
            Body::Binary { op, left, right } => {
                if self.negated {
                    write!(f, "~(")?;
                }
                left.fmt_operand(*op, f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(*op, f)?;
                if self.negated {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }

    /// Prints a child of a binary node, parenthesizing only under AND/OR
    /// parents and only when the child does not already print its own
    /// parentheses. Conditionals bind loosest and never parenthesize.
    fn fmt_operand(&self, parent: Connective, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let needs_parens = matches!(parent, Connective::And | Connective::Or)
            && !self.negated
            && match &self.body {
                Body::Atom(_) => false,
                Body::Group(_) => true,
                Body::Binary { op, .. } => *op != parent,
            };

        if needs_parens {
            write!(f, "(")?;
            self.fmt_compact(f)?;
            write!(f, ")")
        } else {
            self.fmt_compact(f)
        }
    }
}

impl Display for Sentence {
    /// Compact form by default; `{:#}` renders every binary node fully
    /// parenthesized.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.fmt_full(f)
        } else {
            self.fmt_compact(f)
        }
    }
}

impl FromStr for Sentence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentence::parse(s)
    }
}

/// Sentence equality is syntactic: two sentences are equal when their fully
/// parenthesized forms match character for character.
impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.full_parens() == other.full_parens()
    }
}

impl Eq for Sentence {}
