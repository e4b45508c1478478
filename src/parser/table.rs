//! LALR(1) action/goto tables built from [`PRODUCTIONS`].
//!
//! States are discovered by core (production + dot position). When a
//! transition reaches an existing core with new lookaheads, the lookaheads are
//! merged and the state is revisited, so propagation runs to a fixed point and
//! the result equals the merged canonical LR(1) automaton.

use super::grammar::{NonTerminal, Symbol, PRODUCTIONS, TERMINAL_COUNT};
use crate::tokens::TokenKind;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::OnceLock;
use tracing::debug;

/// Lookahead sets fit in one word.
type Lookahead = u64;

/// An item core: production index and dot position.
type Core = (usize, usize);

const EOF_BIT: Lookahead = 1 << 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
    Error,
}

#[derive(Debug)]
pub struct ParseTable {
    actions: Vec<[Action; TERMINAL_COUNT]>,
    gotos: Vec<[Option<usize>; NonTerminal::COUNT]>,
    pub shift_reduce_conflicts: usize,
    pub reduce_reduce_conflicts: usize,
}

/// Process-wide table, built on first use.
pub fn parse_table() -> &'static ParseTable {
    static TABLE: OnceLock<ParseTable> = OnceLock::new();
    TABLE.get_or_init(ParseTable::build)
}

impl ParseTable {
    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, state: usize, terminal: usize) -> Action {
        self.actions
            .get(state)
            .and_then(|row| row.get(terminal))
            .copied()
            .unwrap_or(Action::Error)
    }

    pub fn goto(&self, state: usize, lhs: NonTerminal) -> Option<usize> {
        self.gotos.get(state).and_then(|row| row[lhs.index()])
    }

    /// Tokens with a non-error action in `state`, in column order.
    pub fn expected(&self, state: usize) -> Vec<TokenKind> {
        TokenKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.action(state, kind.index()) != Action::Error)
            .collect()
    }

    fn build() -> ParseTable {
        let first = FirstSets::compute();
        let mut states: Vec<BTreeMap<Core, Lookahead>> = Vec::new();
        let mut by_core: HashMap<Vec<Core>, usize> = HashMap::new();
        let mut transitions: Vec<BTreeMap<Symbol, usize>> = Vec::new();

        let start: BTreeMap<Core, Lookahead> = [((0, 0), EOF_BIT)].into_iter().collect();
        by_core.insert(start.keys().copied().collect(), 0);
        states.push(start);
        transitions.push(BTreeMap::new());

        let mut worklist: VecDeque<usize> = VecDeque::from([0]);
        while let Some(index) = worklist.pop_front() {
            let items = closure(&states[index], &first);

            // Group advanced items by the symbol after the dot.
            let mut kernels: BTreeMap<Symbol, BTreeMap<Core, Lookahead>> = BTreeMap::new();
            for (&(prod, dot), &la) in &items {
                if let Some(&symbol) = PRODUCTIONS[prod].rhs.get(dot) {
                    *kernels
                        .entry(symbol)
                        .or_default()
                        .entry((prod, dot + 1))
                        .or_default() |= la;
                }
            }

            for (symbol, kernel) in kernels {
                let core: Vec<Core> = kernel.keys().copied().collect();
                let target = match by_core.get(&core) {
                    Some(&existing) => {
                        let mut changed = false;
                        for (item, la) in kernel {
                            let entry = states[existing].entry(item).or_default();
                            if *entry | la != *entry {
                                *entry |= la;
                                changed = true;
                            }
                        }
                        if changed && !worklist.contains(&existing) {
                            worklist.push_back(existing);
                        }
                        existing
                    }
                    None => {
                        let fresh = states.len();
                        states.push(kernel);
                        transitions.push(BTreeMap::new());
                        by_core.insert(core, fresh);
                        worklist.push_back(fresh);
                        fresh
                    }
                };
                transitions[index].insert(symbol, target);
            }
        }

        let mut table = ParseTable {
            actions: vec![[Action::Error; TERMINAL_COUNT]; states.len()],
            gotos: vec![[None; NonTerminal::COUNT]; states.len()],
            shift_reduce_conflicts: 0,
            reduce_reduce_conflicts: 0,
        };

        for (index, kernel) in states.iter().enumerate() {
            for (&symbol, &target) in &transitions[index] {
                match symbol {
                    Symbol::N(lhs) => table.gotos[index][lhs.index()] = Some(target),
                    _ => {
                        if let Some(column) = symbol.terminal() {
                            table.actions[index][column] = Action::Shift(target);
                        }
                    }
                }
            }
            for (&(prod, dot), &la) in &closure(kernel, &first) {
                if dot < PRODUCTIONS[prod].rhs.len() {
                    continue;
                }
                for column in (0..TERMINAL_COUNT).filter(|c| la & (1 << c) != 0) {
                    let proposed = if prod == 0 {
                        Action::Accept
                    } else {
                        Action::Reduce(prod)
                    };
                    table.resolve(index, column, proposed);
                }
            }
        }

        debug!(
            states = table.state_count(),
            shift_reduce = table.shift_reduce_conflicts,
            reduce_reduce = table.reduce_reduce_conflicts,
            "built parse table"
        );
        table
    }

    /// Shift wins over reduce (dangling `else`); the earlier production wins
    /// a reduce/reduce tie.
    fn resolve(&mut self, state: usize, column: usize, proposed: Action) {
        let slot = &mut self.actions[state][column];
        match (*slot, proposed) {
            (Action::Error, _) => *slot = proposed,
            (Action::Shift(_), _) => self.shift_reduce_conflicts += 1,
            (Action::Reduce(current), Action::Reduce(candidate)) => {
                self.reduce_reduce_conflicts += 1;
                if candidate < current {
                    *slot = proposed;
                }
            }
            _ => self.reduce_reduce_conflicts += 1,
        }
    }
}

fn terminal_bit(column: usize) -> Lookahead {
    1 << column
}

struct FirstSets {
    first: [Lookahead; NonTerminal::COUNT],
    nullable: [bool; NonTerminal::COUNT],
}

impl FirstSets {
    fn compute() -> FirstSets {
        let mut sets = FirstSets {
            first: [0; NonTerminal::COUNT],
            nullable: [false; NonTerminal::COUNT],
        };
        let mut changed = true;
        while changed {
            changed = false;
            for prod in PRODUCTIONS {
                let lhs = prod.lhs.index();
                let (first, nullable) = sets.of_sequence(prod.rhs);
                if sets.first[lhs] | first != sets.first[lhs] {
                    sets.first[lhs] |= first;
                    changed = true;
                }
                if nullable && !sets.nullable[lhs] {
                    sets.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
        sets
    }

    /// FIRST of a symbol string and whether the whole string can vanish.
    fn of_sequence(&self, symbols: &[Symbol]) -> (Lookahead, bool) {
        let mut first = 0;
        for symbol in symbols {
            match symbol {
                Symbol::N(nt) => {
                    first |= self.first[nt.index()];
                    if !self.nullable[nt.index()] {
                        return (first, false);
                    }
                }
                terminal => {
                    if let Some(column) = terminal.terminal() {
                        first |= terminal_bit(column);
                    }
                    return (first, false);
                }
            }
        }
        (first, true)
    }
}

fn closure(kernel: &BTreeMap<Core, Lookahead>, first: &FirstSets) -> BTreeMap<Core, Lookahead> {
    let mut items = kernel.clone();
    let mut pending: Vec<Core> = kernel.keys().copied().collect();
    while let Some((prod, dot)) = pending.pop() {
        let rhs = PRODUCTIONS[prod].rhs;
        let Some(Symbol::N(next)) = rhs.get(dot) else {
            continue;
        };
        let (mut la, nullable) = first.of_sequence(&rhs[dot + 1..]);
        if nullable {
            la |= items[&(prod, dot)];
        }
        for (candidate, production) in PRODUCTIONS.iter().enumerate() {
            if production.lhs != *next {
                continue;
            }
            let entry = items.entry((candidate, 0)).or_default();
            if *entry | la != *entry {
                *entry |= la;
                pending.push((candidate, 0));
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::ERROR_TERMINAL;

    #[test]
    fn test_lookaheads_fit_in_a_word() {
        assert!(TERMINAL_COUNT <= Lookahead::BITS as usize);
        assert_eq!(ERROR_TERMINAL, TERMINAL_COUNT - 1);
    }

    #[test]
    fn test_only_the_dangling_else_conflicts() {
        let table = parse_table();
        assert_eq!(table.reduce_reduce_conflicts, 0);
        assert_eq!(table.shift_reduce_conflicts, 1);
    }

    #[test]
    fn test_initial_state_expects_a_declaration() {
        let table = parse_table();
        assert_eq!(table.expected(0), vec![TokenKind::Int, TokenKind::Void]);
        assert!(matches!(
            table.action(0, ERROR_TERMINAL),
            Action::Shift(_)
        ));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let table = parse_table();
        assert_eq!(table.action(0, TokenKind::Eof.index()), Action::Error);
    }

    #[test]
    fn test_nullable_lists() {
        let first = FirstSets::compute();
        assert!(first.nullable[NonTerminal::LocalDecls.index()]);
        assert!(first.nullable[NonTerminal::StmtList.index()]);
        assert!(first.nullable[NonTerminal::Args.index()]);
        assert!(!first.nullable[NonTerminal::Expr.index()]);
        let expr_first = first.first[NonTerminal::Expr.index()];
        for kind in [TokenKind::Id, TokenKind::Num, TokenKind::LParen] {
            assert_ne!(expr_first & terminal_bit(kind.index()), 0);
        }
    }
}
