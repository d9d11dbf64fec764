// Parse Driver: runs the shift-reduce automaton on a token list. Maintains
// a stack of `{ state_id, tree_node }` frames (plus a parallel attribute per
// frame); between the pop and the push of a reduction it calls into the
// Semantic Translator, exactly where syntax-directed actions belong.

use crate::attributes::Attribute;
use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::lexer::Token;
use crate::state::START_STATE;
use crate::table::{Action, Tables};
use crate::translate::Translator;
use crate::tree::TreeNode;

#[derive(Debug, Clone)]
pub struct TraceStep {
    pub step: u32,
    pub state_stack: Vec<u32>,
    pub symbol_stack: Vec<String>,
    pub remaining_input: Vec<String>,
    pub description: String,
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub tree: TreeNode,
    pub trace: Vec<TraceStep>,
}

struct Frame {
    state: u32,
    node: TreeNode,
    attribute: Attribute,
}

/// Drives the automaton described by `tables` over `tokens`, invoking
/// `translator` on every reduction. `tokens` must end with an end-marker
/// token (the lexer always appends one).
pub fn parse(
    grammar: &Grammar,
    tables: &Tables,
    translator: &mut Translator,
    tokens: &[Token],
) -> Result<ParseOutcome, ParseError> {
    let mut stack: Vec<Frame> = vec![Frame {
        state: START_STATE,
        node: TreeNode::leaf("#"),
        attribute: Attribute::default(),
    }];
    let mut trace = vec![TraceStep {
        step: 0,
        state_stack: vec![START_STATE],
        symbol_stack: vec!["#".to_string()],
        remaining_input: tokens.iter().map(|t| t.terminal_name().to_string()).collect(),
        description: "初始状态".to_string(),
    }];
    let mut pos = 0usize;
    let mut step_no = 1u32;

    loop {
        let token = tokens.get(pos).unwrap_or_else(|| tokens.last().expect("empty token stream"));
        let terminal_id = grammar
            .registry
            .id_of(token.terminal_name())
            .unwrap_or_else(|| grammar.registry.end_marker_id());
        let top_state = stack.last().expect("parse stack never empties").state;

        match tables.action_for(top_state, terminal_id).cloned() {
            Some(Action::Shift(next_state)) => {
                let node = TreeNode::leaf(token.terminal_name());
                let attribute = Attribute::from_token(token);
                stack.push(Frame { state: next_state, node, attribute });
                pos += 1;
                let description = format!("移进 {}, 状态 {} 压栈", token.terminal_name(), next_state);
                record_step(&mut trace, &mut step_no, &stack, &tokens[pos..], description);
            }
            Some(Action::Reduce(production_id)) => {
                let production = &grammar.productions[production_id as usize];
                let arity = production.arity(&grammar.registry);
                let split_at = stack.len() - arity;
                let popped = stack.split_off(split_at);
                let (child_nodes, child_attrs): (Vec<TreeNode>, Vec<Attribute>) = if popped.is_empty() {
                    (vec![TreeNode::leaf("None")], vec![Attribute::epsilon()])
                } else {
                    popped.into_iter().map(|f| (f.node, f.attribute)).unzip()
                };
                let goto_state = stack.last().expect("parse stack never empties").state;
                let next_state = tables
                    .goto_for(goto_state, production.lhs)
                    .unwrap_or_else(|| panic!("missing GOTO({}, {})", goto_state, production.lhs));
                let lhs_name = grammar.registry.name_of(production.lhs).unwrap_or("?").to_string();
                let attribute = translator.execute(grammar, production, child_attrs, token.location);
                let node = TreeNode::new(lhs_name, child_nodes);
                stack.push(Frame { state: next_state, node, attribute });
                let description = format!(
                    "使用产生式({})进行规约",
                    production.to_string(&grammar.registry)
                );
                record_step(&mut trace, &mut step_no, &stack, &tokens[pos..], description);
            }
            Some(Action::Accept) => {
                // The augmenting production `S' -> Program .` is never
                // itself reduced (the Table Builder turns that completed
                // item straight into Accept); the stack still holds exactly
                // two frames — the initial sentinel and the one built for
                // the grammar's start symbol — and that top frame's tree is
                // the parse root.
                let root = stack.last().expect("accept implies a root frame").node.clone();
                return Ok(ParseOutcome { tree: root, trace });
            }
            None => {
                return Err(ParseError::SyntaxError {
                    token: token.terminal_name().to_string(),
                    location: token.location,
                });
            }
        }
    }
}

fn record_step(
    trace: &mut Vec<TraceStep>,
    step_no: &mut u32,
    stack: &[Frame],
    remaining: &[Token],
    description: String,
) {
    trace.push(TraceStep {
        step: *step_no,
        state_stack: stack.iter().map(|f| f.state).collect(),
        symbol_stack: stack.iter().map(|f| f.node.label.clone()).collect(),
        remaining_input: remaining.iter().map(|t| t.terminal_name().to_string()).collect(),
        description,
    });
    *step_no += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::GrammarTables;
    use crate::lexer::Lexer;

    fn build(text: &str) -> GrammarTables {
        GrammarTables::build(text, false).expect("grammar builds cleanly").0
    }

    #[test]
    fn accepts_minimal_program() {
        let gt = build("Program -> i32\n");
        let tokens = vec![
            Token { class: crate::lexer::TokenClass::Keyword, lexeme: "i32".into(), location: Default::default() },
            Token { class: crate::lexer::TokenClass::EndMarker, lexeme: "#".into(), location: Default::default() },
        ];
        let mut translator = Translator::new(100);
        let outcome = parse(&gt.grammar, &gt.tables, &mut translator, &tokens).unwrap();
        assert_eq!(outcome.tree.label, "Program");
    }

    #[test]
    fn parses_the_whole_mini_rust_grammar_over_an_empty_main() {
        let text = std::fs::read_to_string(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("grammars/mini_rust.cfg"),
        )
        .unwrap();
        let gt = build(&text);
        let tokens = Lexer::tokenize("fn main() { }").unwrap();
        let mut translator = Translator::new(100);
        let outcome = parse(&gt.grammar, &gt.tables, &mut translator, &tokens).unwrap();
        assert_eq!(outcome.tree.label, "Program");
        assert_eq!(translator.quads.quads.len(), 2);
        assert_eq!(translator.quads.quads[0].tar, "101");
        assert_eq!(translator.quads.quads[1].op, "ret");
    }
}
