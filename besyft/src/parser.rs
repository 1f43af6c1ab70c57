use chumsky::error::Simple;
use chumsky::primitive::{choice, end, just, none_of};
use chumsky::recursive::recursive;
use chumsky::text::{self, TextParser};
use chumsky::Parser;
use synthesis::dfa::Guard;
use synthesis::vars::InputOutputPartition;

/// The contents of a DFA file, before any semantic validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaSyntax {
    pub formula: String,
    pub vars: Vec<String>,
    pub states: usize,
    pub initial: usize,
    pub accepting: Vec<usize>,
    pub edges: Vec<(usize, usize, Guard)>,
}

fn number() -> impl Parser<char, usize, Error = Simple<char>> + Clone {
    text::int(10)
        .try_map(|n: String, span| n.parse::<usize>().map_err(|e| Simple::custom(span, e.to_string())))
        .padded()
}

fn section(name: &'static str) -> impl Parser<char, (), Error = Simple<char>> + Clone {
    text::keyword(name).padded()
}

// <Atom>        ::= `true' | `false' | <Id> | `(' <Guard> `)'
// <Negation>    ::= `!'* <Atom>
// <Conjunction> ::= <Negation> (`&' <Negation>)*
// <Guard>       ::= <Conjunction> (`|' <Conjunction>)*
fn guard() -> impl Parser<char, Guard, Error = Simple<char>> + Clone {
    recursive(|guard| {
        let tt = text::keyword("true").to(Guard::True);
        let ff = text::keyword("false").to(Guard::False);
        let var = text::ident().map(Guard::Var);
        let group = guard.delimited_by(just('('), just(')'));
        let atom = choice((tt, ff, group, var)).padded().boxed();

        let negation = just('!').padded().repeated().then(atom).foldr(|_, g| Guard::not(g)).boxed();
        let conjunction = negation.separated_by(just('&').padded()).at_least(1).map(Guard::and);
        conjunction.separated_by(just('|').padded()).at_least(1).map(Guard::or)
    })
}

// .inputs: <Id>*
// .outputs: <Id>*
pub fn parse_partition(source: &str) -> Result<InputOutputPartition, Vec<Simple<char>>> {
    let names = text::ident().padded().repeated();
    let inputs = just(".inputs:").padded().ignore_then(names.clone());
    let outputs = just(".outputs:").padded().ignore_then(names);

    let partition = inputs.then(outputs).map(|(inputs, outputs)| InputOutputPartition { inputs, outputs });
    partition.then_ignore(end()).parse(source)
}

// formula "<text>";
// vars <Id>, ...;
// states <n>;
// initial <n>;
// accepting <n>, ...;
// <n> -> <n> : <Guard>;
pub fn parse_dfa(source: &str) -> Result<DfaSyntax, Vec<Simple<char>>> {
    let semi = just(';').padded();
    let comma = just(',').padded();

    let quoted = none_of('"').repeated().collect::<String>().delimited_by(just('"'), just('"'));
    let formula = section("formula").ignore_then(quoted.padded()).then_ignore(semi.clone());
    let vars = section("vars").ignore_then(text::ident().padded().separated_by(comma.clone())).then_ignore(semi.clone());
    let states = section("states").ignore_then(number()).then_ignore(semi.clone());
    let initial = section("initial").ignore_then(number()).then_ignore(semi.clone());
    let accepting = section("accepting").ignore_then(number().separated_by(comma)).then_ignore(semi.clone());

    let edge = number()
        .then_ignore(just("->").padded())
        .then(number())
        .then_ignore(just(':').padded())
        .then(guard())
        .then_ignore(semi)
        .map(|((source, target), guard)| (source, target, guard));

    let header = formula.then(vars).then(states).then(initial).then(accepting);
    let dfa = header.then(edge.repeated()).map(|(((((formula, vars), states), initial), accepting), edges)| {
        DfaSyntax { formula, vars, states, initial, accepting, edges }
    });

    dfa.then_ignore(end()).parse(source)
}
