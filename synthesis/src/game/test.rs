use biodivine_lib_bdd::Bdd;

use crate::dfa::{ExplicitDfa, Guard, SymbolicDfa};
use crate::game::{Player, Quantification, ReachabilitySynthesizer, Regime, SynthesisResult};
use crate::test_util::{and, assignments, dfa, encode, not, or, partition, reachable, state, var};
use crate::vars::{equivalent, VarGroup};

// One step with `y` reaches the goal, whatever `x` is.
fn single_bit() -> ExplicitDfa {
    dfa(&["x", "y"], 2, &[1], vec![(0, var("y"), 1), (0, not("y"), 0), (1, Guard::True, 1)])
}

// The agent must answer `x` with the same value of `y`.
fn copy_input() -> ExplicitDfa {
    let same = or([and([var("x"), var("y")]), and([not("x"), not("y")])]);
    let different = or([and([var("x"), not("y")]), and([not("x"), var("y")])]);
    dfa(&["x", "y"], 2, &[1], vec![(0, same, 1), (0, different, 0), (1, Guard::True, 1)])
}

// Eight states counting up on `inc`; when `blocking`, the environment can veto with `x`.
fn counter(blocking: bool) -> ExplicitDfa {
    let step = match blocking {
        true => and([var("inc"), not("x")]),
        false => var("inc"),
    };
    let mut edges = Vec::new();
    for s in 0..7 {
        edges.push((s, step.clone(), s + 1));
        edges.push((s, Guard::not(step.clone()), s));
    }
    edges.push((7, Guard::True, 7));
    dfa(&["x", "inc"], 8, &[7], edges)
}

// `y0` has to copy `x` while `y1` negates it.
fn copy_and_negate() -> ExplicitDfa {
    let answer = or([and([var("x"), var("y0"), not("y1")]), and([not("x"), not("y0"), var("y1")])]);
    dfa(&["x", "y0", "y1"], 2, &[1], vec![(0, answer.clone(), 1), (0, Guard::not(answer), 0), (1, Guard::True, 1)])
}

// Exactly one of `y0` and `y1`, whatever `x` is.
fn exactly_one() -> ExplicitDfa {
    let answer = or([and([var("y0"), not("y1")]), and([not("y0"), var("y1")])]);
    dfa(&["x", "y0", "y1"], 2, &[1], vec![(0, answer.clone(), 1), (0, Guard::not(answer), 0), (1, Guard::True, 1)])
}

fn solve(arena: &SymbolicDfa, regime: Regime, starting: Player) -> SynthesisResult {
    let game = ReachabilitySynthesizer::new(
        arena.clone(),
        regime,
        starting,
        Player::Agent,
        arena.final_states().clone(),
        arena.state_space().clone(),
    );
    game.run()
}

/// From every winning non-goal state the strategy keeps the play inside the winning region,
/// whatever the inputs.
fn assert_strategy_valid(arena: &SymbolicDfa, result: &SynthesisResult) {
    let transducer = result.transducer.as_ref().unwrap();
    let inputs = assignments(arena.var_mgr().input_variables().len());

    for state in reachable(arena) {
        if !arena.contains(&result.winning_states, &state) || arena.contains(arena.final_states(), &state) {
            continue;
        }
        for input in &inputs {
            let (_, next) = transducer.step(&state, input);
            assert!(arena.contains(&result.winning_states, &next), "{state} leaves the winning region on {input:?}");
        }
    }
}

#[test]
fn single_bit_game_is_won_on_the_first_turn() {
    let arena = encode(&single_bit(), &partition(&["x"], &["y"]));

    for starting in [Player::Agent, Player::Environment] {
        let result = solve(&arena, Regime::Adversarial, starting);
        assert!(result.realizability);

        let transducer = result.transducer.as_ref().unwrap();
        for input in [[false], [true]] {
            let (outputs, next) = transducer.step(arena.initial_state(), &input);
            assert_eq!(outputs, vec![true]);
            assert_eq!(next, state(1, 1));
        }
    }
}

#[test]
fn copying_needs_to_see_the_input() {
    let arena = encode(&copy_input(), &partition(&["x"], &["y"]));

    let result = solve(&arena, Regime::Adversarial, Player::Environment);
    assert!(result.realizability);
    assert_strategy_valid(&arena, &result);
    let transducer = result.transducer.as_ref().unwrap();
    assert_eq!(transducer.replay([&[true][..], &[false][..]]), vec![vec![true], vec![true]]);
    assert_eq!(transducer.outputs(arena.initial_state(), &[false]), vec![false]);

    let result = solve(&arena, Regime::Adversarial, Player::Agent);
    assert!(!result.realizability);
    assert!(!arena.contains(&result.winning_states, arena.initial_state()));

    let result = solve(&arena, Regime::Cooperative, Player::Agent);
    assert!(result.realizability);
}

#[test]
fn winning_region_grows_monotonically() {
    for (blocking, regime) in [(false, Regime::Adversarial), (true, Regime::Cooperative), (true, Regime::Adversarial)] {
        let arena = encode(&counter(blocking), &partition(&["x"], &["inc"]));
        let states = reachable(&arena).len();

        for starting in [Player::Agent, Player::Environment] {
            let game = ReachabilitySynthesizer::new(
                arena.clone(),
                regime,
                starting,
                Player::Agent,
                arena.final_states().clone(),
                arena.state_space().clone(),
            );

            let mut history = Vec::<Bdd>::new();
            let fixpoint = game.fixpoint_with(|winning| history.push(winning.clone()));
            history.push(fixpoint.winning_states.clone());

            for pair in history.windows(2) {
                assert!(pair[0].and_not(&pair[1]).is_false());
            }
            assert!(fixpoint.iterations <= states);
            assert_eq!(fixpoint.realizable, !(blocking && regime == Regime::Adversarial));
        }
    }
}

#[test]
fn blocked_counter_only_wins_at_the_goal() {
    let arena = encode(&counter(true), &partition(&["x"], &["inc"]));

    for starting in [Player::Agent, Player::Environment] {
        let result = solve(&arena, Regime::Adversarial, starting);
        assert!(!result.realizability);
        assert!(equivalent(&result.winning_states, arena.final_states()));

        let result = solve(&arena, Regime::Cooperative, starting);
        assert!(result.realizability);
        for code in 0..8 {
            assert!(arena.contains(&result.winning_states, &state(code, 3)));
        }
    }
}

#[test]
fn extracted_strategies_stay_winning() {
    let io = partition(&["x"], &["inc"]);
    let arena = encode(&counter(false), &io);
    for starting in [Player::Agent, Player::Environment] {
        let result = solve(&arena, Regime::Adversarial, starting);
        assert_strategy_valid(&arena, &result);
    }

    let arena = encode(&copy_input(), &partition(&["x"], &["y"]));
    assert_strategy_valid(&arena, &solve(&arena, Regime::Adversarial, Player::Environment));
}

#[test]
fn unreachable_cooperative_goal() {
    // The goal can only be entered from a state that is never reached.
    let explicit = dfa(
        &["x", "y"],
        3,
        &[2],
        vec![(0, Guard::True, 0), (1, var("y"), 2), (1, not("y"), 1), (2, Guard::True, 2)],
    );
    let arena = encode(&explicit, &partition(&["x"], &["y"]));

    for starting in [Player::Agent, Player::Environment] {
        let result = solve(&arena, Regime::Cooperative, starting);
        assert!(!result.realizability);
        assert!(!arena.contains(&result.winning_states, arena.initial_state()));
        assert!(arena.contains(&result.winning_states, &state(1, 2)));
    }
}

#[test]
fn strategy_functions_only_read_states_and_inputs() {
    let arena = encode(&copy_input(), &partition(&["x"], &["y"]));
    let var_mgr = arena.var_mgr();
    let vars = var_mgr.variables();
    let x = vars.mk_var(var_mgr.name_to_variable("x").unwrap());
    let y = vars.mk_var(var_mgr.name_to_variable("y").unwrap());

    let game = ReachabilitySynthesizer::adversarial(
        arena.clone(),
        Player::Environment,
        Player::Agent,
        arena.final_states().clone(),
        arena.state_space().clone(),
    );
    let moves = x.iff(&y).or(arena.final_states());
    let strategy = game.game().synthesize_strategy(&moves);

    let function = strategy.get(var_mgr.output_variables()[0]).unwrap();
    assert!(!function.support_set().contains(&var_mgr.output_variables()[0]));
    assert!(equivalent(&function.and(&arena.final_states().not()), &x.and(&arena.final_states().not())));
}

fn quantification_fixture() -> (SymbolicDfa, VarGroup, VarGroup, Bdd) {
    let explicit = dfa(&["x0", "x1", "y0", "y1"], 1, &[0], vec![(0, Guard::True, 0)]);
    let arena = encode(&explicit, &partition(&["x0", "x1"], &["y0", "y1"]));
    let var_mgr = arena.var_mgr().clone();
    let vars = var_mgr.variables();
    let v = |name| vars.mk_var(var_mgr.name_to_variable(name).unwrap());

    let f = v("x0").iff(&v("y0")).and(&v("x1").or(&v("y1")));
    let (inputs, outputs) = (var_mgr.input_variables().clone(), var_mgr.output_variables().clone());
    (arena, inputs, outputs, f)
}

#[test]
fn quantification_is_idempotent() {
    let (_arena, inputs, outputs, f) = quantification_fixture();

    let variants = [
        Quantification::Identity,
        Quantification::Exists(inputs.clone()),
        Quantification::Forall(outputs.clone()),
        Quantification::ExistsExists(inputs.clone(), outputs.clone()),
        Quantification::ForallExists(inputs.clone(), outputs.clone()),
        Quantification::ExistsForall(outputs.clone(), inputs.clone()),
    ];
    for variant in &variants {
        let once = variant.apply(&f);
        assert!(equivalent(&variant.apply(&once), &once), "{variant:?}");
    }
}

#[test]
fn quantifier_order_matters() {
    let (_arena, inputs, outputs, f) = quantification_fixture();

    // Seeing the inputs first, the outputs can always copy them.
    assert!(Quantification::ForallExists(inputs.clone(), outputs.clone()).apply(&f).is_true());
    // Committing to the outputs first, no choice survives every input.
    assert!(Quantification::ExistsForall(outputs.clone(), inputs.clone()).apply(&f).is_false());
    assert!(Quantification::ExistsExists(inputs, outputs).apply(&f).is_true());
}

#[test]
fn quantifiers_follow_the_turn_order() {
    let (_arena, inputs, outputs, _) = quantification_fixture();
    let pick = |regime, starting| Quantification::for_game(regime, starting, Player::Agent, &inputs, &outputs);

    assert!(matches!(pick(Regime::Adversarial, Player::Agent), (Quantification::Forall(_), Quantification::Exists(_))));
    assert!(matches!(
        pick(Regime::Adversarial, Player::Environment),
        (Quantification::Identity, Quantification::ForallExists(_, _))
    ));
    assert!(matches!(pick(Regime::Cooperative, Player::Agent), (Quantification::Exists(_), Quantification::Exists(_))));
    assert!(matches!(
        pick(Regime::Cooperative, Player::Environment),
        (Quantification::Identity, Quantification::ExistsExists(_, _))
    ));

    let (independent, _) = Quantification::for_game(Regime::Adversarial, Player::Environment, Player::Environment, &inputs, &outputs);
    match independent {
        Quantification::Forall(vars) => assert_eq!(&vars[..], &outputs[..]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn later_outputs_see_earlier_choices() {
    let io = partition(&["x"], &["y0", "y1"]);

    let arena = encode(&copy_and_negate(), &io);
    let result = solve(&arena, Regime::Adversarial, Player::Environment);
    assert!(result.realizability);
    assert_strategy_valid(&arena, &result);
    let transducer = result.transducer.as_ref().unwrap();
    assert_eq!(transducer.outputs(arena.initial_state(), &[true]), vec![true, false]);
    assert_eq!(transducer.outputs(arena.initial_state(), &[false]), vec![false, true]);
    assert!(!solve(&arena, Regime::Adversarial, Player::Agent).realizability);

    let arena = encode(&exactly_one(), &io);
    for starting in [Player::Agent, Player::Environment] {
        let result = solve(&arena, Regime::Adversarial, starting);
        assert!(result.realizability);
        assert_strategy_valid(&arena, &result);

        let transducer = result.transducer.as_ref().unwrap();
        for input in [[false], [true]] {
            let (outputs, next) = transducer.step(arena.initial_state(), &input);
            assert_ne!(outputs[0], outputs[1], "{starting:?} on {input:?}");
            assert_eq!(next, state(1, 1));
        }
    }
}
