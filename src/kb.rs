/*!
The knowledge base: sentence storage, whole-base evaluation, and the two
entailment engines (truth-table enumeration and DPLL).
*/

use std::{fmt, fmt::Display};

use typed_index_collections::TiVec;

use crate::parser;
use crate::sentence::{Body, Connective, Sentence};
use crate::symbols::{LogicValue, Symbol, SymbolList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SentenceIdx(usize);

impl From<usize> for SentenceIdx {
    fn from(index: usize) -> Self {
        SentenceIdx(index)
    }
}

impl From<SentenceIdx> for usize {
    fn from(index: SentenceIdx) -> Self {
        index.0
    }
}

/// Running count of query outcomes across the truth-table walk.
#[derive(Default)]
struct Tally {
    query_true: usize,
    query_false: usize,
}

/// Per-clause state of the unit-clause scan.
#[derive(Default)]
struct UnitScan {
    candidate: Option<(Symbol, LogicValue)>,
    unassigned: usize,
    satisfied: bool,
}

/// A conjunction of sentences plus the inference operations over it.
///
/// `is_cnf` records whether every stored sentence is a flat clause; the DPLL
/// entry points consult it to decide whether to normalize first.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    sentences: TiVec<SentenceIdx, Sentence>,
    is_cnf: bool,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        KnowledgeBase {
            sentences: TiVec::new(),
            is_cnf: false,
        }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn is_cnf(&self) -> bool {
        self.is_cnf
    }

    /// Adds a sentence unless a syntactically identical one is stored
    /// already. Any call resets the CNF marker.
    pub fn add(&mut self, sentence: Sentence) {
        if !self.contains(&sentence) {
            self.sentences.push(sentence);
        }
        self.is_cnf = false;
    }

    /// Parses `text` and adds every sentence in it, one per line.
    pub fn add_text(&mut self, text: &str) -> Result<(), parser::Error> {
        for sentence in parser::parse_all(text)? {
            self.add(sentence);
        }
        Ok(())
    }

    pub fn contains(&self, sentence: &Sentence) -> bool {
        self.sentences.iter().any(|stored| stored == sentence)
    }

    pub fn get(&self, index: SentenceIdx) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sentence> + '_ {
        self.sentences.iter()
    }

    pub fn clear(&mut self) {
        self.sentences.clear();
        self.is_cnf = false;
    }

    /// Union of every sentence's symbols in first-seen order, all
    /// `Undefined`.
    pub fn symbols(&self) -> SymbolList {
        let mut list = SymbolList::new();
        for sentence in self.sentences.iter() {
            list.merge(&sentence.symbols());
        }
        list
    }

    /// Conjunction of all member evaluations. An empty base is vacuously
    /// true.
    pub fn evaluate(&self, model: &SymbolList) -> LogicValue {
        let mut result = LogicValue::True;
        for sentence in self.sentences.iter() {
            match sentence.evaluate(model) {
                LogicValue::False => return LogicValue::False,
                LogicValue::Undefined => result = LogicValue::Undefined,
                LogicValue::True => {}
            }
        }
        result
    }

    pub fn is_true(&self, model: &SymbolList) -> bool {
        self.evaluate(model).is_true()
    }

    pub fn is_false(&self, model: &SymbolList) -> bool {
        self.evaluate(model).is_false()
    }

    /// CNF form of the whole base as a new base of flat clauses.
    ///
    /// The members are conjoined through their fully parenthesized text,
    /// re-parsed, rewritten by [`Sentence::to_cnf`] and split at every AND
    /// boundary.
    pub fn to_cnf_clone(&self) -> KnowledgeBase {
        let mut clone = KnowledgeBase::new();

        if !self.sentences.is_empty() {
            let conjoined = self
                .sentences
                .iter()
                .map(Sentence::full_parens)
                .collect::<Vec<_>>()
                .join(" AND ");
            let cnf = Sentence::parse(&conjoined)
                .expect("printed sentences always re-parse")
                .to_cnf();
            clone.collect_clauses(&cnf);
            debug!(
                "normalized {} sentences into {} clauses",
                self.sentences.len(),
                clone.sentences.len()
            );
        }

        clone.is_cnf = true;
        clone
    }

    /// Rewrites this base in place into its CNF clause form.
    pub fn convert_to_cnf(&mut self) {
        *self = self.to_cnf_clone();
    }

    /// Splits a CNF sentence at every AND into stored clauses. A top-level
    /// OR or a bare literal is itself a one-clause base.
    fn collect_clauses(&mut self, cnf: &Sentence) {
        match cnf.body() {
            Body::Binary {
                op: Connective::And,
                left,
                right,
            } => {
                self.collect_clauses(left);
                self.collect_clauses(right);
            }
            Body::Binary {
                op: Connective::Or, ..
            }
            | Body::Atom(_) => self.add(cnf.clone()),
            _ => unreachable!("normalized sentences hold only AND, OR and literals"),
        }
    }

    /// Brute-force entailment: enumerates every assignment of the base's
    /// symbols and inspects the query wherever the base holds.
    ///
    /// `True` means the query holds in every model of the base, `False`
    /// that it holds in none, `Undefined` that the models disagree or never
    /// pin the query down. Exponential in the number of symbols.
    pub fn truth_table_entails(&self, query: &Sentence) -> LogicValue {
        let symbols = self.symbols();
        let model = symbols.clone();
        let mut tally = Tally::default();
        self.check_assignments(query, symbols, &model, &mut tally)
    }

    fn check_assignments(
        &self,
        query: &Sentence,
        mut symbols: SymbolList,
        model: &SymbolList,
        tally: &mut Tally,
    ) -> LogicValue {
        let next = match symbols.pop_front() {
            Some(entry) => entry.symbol().clone(),
            None => {
                return match self.evaluate(model) {
                    LogicValue::True => match query.evaluate(model) {
                        LogicValue::True => {
                            tally.query_true += 1;
                            LogicValue::True
                        }
                        LogicValue::False => {
                            tally.query_false += 1;
                            LogicValue::False
                        }
                        LogicValue::Undefined => LogicValue::Undefined,
                    },
                    // assignments rejected by the base say nothing
                    LogicValue::False => LogicValue::True,
                    LogicValue::Undefined => LogicValue::Undefined,
                };
            }
        };

        let on_true = self.check_assignments(
            query,
            symbols.clone(),
            &model.with_value(&next, LogicValue::True),
            tally,
        );
        let on_false = self.check_assignments(
            query,
            symbols,
            &model.with_value(&next, LogicValue::False),
            tally,
        );

        match (on_true, on_false) {
            (LogicValue::True, LogicValue::True) => LogicValue::True,
            (LogicValue::False, _) | (_, LogicValue::False) => {
                if tally.query_true > 0 && tally.query_false > 0 {
                    LogicValue::Undefined
                } else {
                    LogicValue::False
                }
            }
            _ => LogicValue::Undefined,
        }
    }

    /// DPLL satisfiability of the base. A base not yet in CNF is normalized
    /// on a clone first; the receiver is never modified.
    pub fn dpll_is_satisfiable(&self) -> bool {
        if self.is_cnf {
            let symbols = self.symbols();
            let model = symbols.clone();
            self.dpll(symbols, model)
        } else {
            let cnf = self.to_cnf_clone();
            let symbols = cnf.symbols();
            let model = symbols.clone();
            cnf.dpll(symbols, model)
        }
    }

    /// Entailment by refutation: the base entails `query` exactly when
    /// base AND ~query is unsatisfiable. The refutation set is built fresh
    /// on a clone whatever the CNF state of the receiver.
    pub fn dpll_entails(&self, query: &Sentence) -> bool {
        let mut refutation = self.clone();
        refutation.add(query.negate());
        let refutation = refutation.to_cnf_clone();

        let symbols = refutation.symbols();
        let model = symbols.clone();
        !refutation.dpll(symbols, model)
    }

    pub fn is_query_true(&self, query: &Sentence) -> bool {
        self.dpll_entails(query)
    }

    /// Whether the base entails the query's negation. This and
    /// `is_query_true` are both false when the base pins the query down
    /// neither way.
    pub fn is_query_false(&self, query: &Sentence) -> bool {
        self.dpll_entails(&query.negate())
    }

    fn dpll(&self, mut symbols: SymbolList, model: SymbolList) -> bool {
        match self.evaluate(&model) {
            LogicValue::True => return true,
            LogicValue::False => return false,
            LogicValue::Undefined => {}
        }

        if let Some((symbol, value)) = self.find_pure_symbol(&symbols, &model) {
            trace!("pure symbol {} = {}", symbol, value);
            symbols.remove(&symbol);
            return self.dpll(symbols, model.with_value(&symbol, value));
        }

        if let Some((symbol, value)) = self.find_unit_clause(&model) {
            trace!("unit clause forces {} = {}", symbol, value);
            symbols.remove(&symbol);
            return self.dpll(symbols, model.with_value(&symbol, value));
        }

        let next = symbols
            .pop_front()
            .expect("an undefined base keeps an unassigned symbol")
            .symbol()
            .clone();
        trace!("branching on {}", next);
        self.dpll(symbols.clone(), model.with_value(&next, LogicValue::True))
            || self.dpll(symbols, model.with_value(&next, LogicValue::False))
    }

    /// First remaining symbol appearing with a single polarity across every
    /// clause still undefined under `model`, with the value that polarity
    /// forces. A symbol those clauses never mention counts as pure.
    fn find_pure_symbol(
        &self,
        symbols: &SymbolList,
        model: &SymbolList,
    ) -> Option<(Symbol, LogicValue)> {
        for entry in symbols.iter() {
            let symbol = entry.symbol();
            if self.is_pure_symbol(model, symbol, false) {
                return Some((symbol.clone(), LogicValue::True));
            }
            if self.is_pure_symbol(model, symbol, true) {
                return Some((symbol.clone(), LogicValue::False));
            }
        }

        None
    }

    fn is_pure_symbol(&self, model: &SymbolList, symbol: &Symbol, negated: bool) -> bool {
        self.sentences
            .iter()
            .filter(|clause| clause.evaluate(model) == LogicValue::Undefined)
            .all(|clause| Self::polarity_matches(clause, symbol, negated))
    }

    /// Whether every occurrence of `symbol` in the clause carries the
    /// polarity `negated`. A clause without the symbol holds vacuously.
    fn polarity_matches(clause: &Sentence, symbol: &Symbol, negated: bool) -> bool {
        match clause.body() {
            Body::Atom(name) => name != symbol || clause.negated() == negated,
            Body::Binary {
                op: Connective::Or,
                left,
                right,
            } => {
                Self::polarity_matches(left, symbol, negated)
                    && Self::polarity_matches(right, symbol, negated)
            }
            _ => unreachable!("pure symbol scan requires clause form"),
        }
    }

    /// First clause where exactly one literal is unassigned and none is
    /// already true, with the value forced on that literal's symbol.
    fn find_unit_clause(&self, model: &SymbolList) -> Option<(Symbol, LogicValue)> {
        for clause in self.sentences.iter() {
            let mut scan = UnitScan::default();
            Self::scan_unit(clause, model, &mut scan);
            if scan.candidate.is_some() {
                return scan.candidate;
            }
        }

        None
    }

    fn scan_unit(clause: &Sentence, model: &SymbolList, scan: &mut UnitScan) {
        match clause.body() {
            Body::Atom(name) => match model.value(name) {
                LogicValue::Undefined => {
                    let forced = if clause.negated() {
                        LogicValue::False
                    } else {
                        LogicValue::True
                    };
                    scan.candidate = Some((name.clone(), forced));
                    scan.unassigned += 1;
                }
                value => {
                    // a literal already true rules the whole clause out
                    if clause.negated() != value.is_true() {
                        scan.satisfied = true;
                        scan.candidate = None;
                    }
                }
            },
            Body::Binary {
                op: Connective::Or,
                left,
                right,
            } => {
                Self::scan_unit(left, model, scan);
                if scan.satisfied {
                    return;
                }
                if scan.unassigned > 1 {
                    scan.candidate = None;
                    return;
                }
                Self::scan_unit(right, model, scan);
                if scan.satisfied {
                    return;
                }
                if scan.unassigned > 1 {
                    scan.candidate = None;
                }
            }
            _ => unreachable!("unit clause scan requires clause form"),
        }
    }
}

impl Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.sentences.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for sentence in iter {
            write!(f, "\n{}", sentence)?;
        }

        Ok(())
    }
}
