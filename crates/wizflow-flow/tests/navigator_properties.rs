use proptest::prelude::*;
use serde_json::json;
use wizflow_context::{ContextStore, WorkspaceId};
use wizflow_flow::{IgnoreReason, Navigator, Node, Scenario, Transition};

#[derive(Debug, Clone)]
enum Op {
    Submit,
    Back,
    GoTo(usize),
    Reset,
    StaleSubmit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Submit),
        3 => Just(Op::Back),
        1 => (0..12usize).prop_map(Op::GoTo),
        1 => Just(Op::Reset),
        1 => Just(Op::StaleSubmit),
    ]
}

fn scenario(n: usize) -> Scenario {
    (0..n).fold(Scenario::new("s"), |s, i| {
        s.with_node(
            Node::new(format!("n{i}"), "form-step")
                .with_context_path(format!("answers.n{i}").parse().unwrap())
                .with_order(i64::try_from(i).unwrap()),
        )
    })
}

proptest! {
    #[test]
    fn prop_index_stays_in_bounds(n in 0..8usize, ops in proptest::collection::vec(op(), 0..40)) {
        let store = ContextStore::new();
        let ws = WorkspaceId::new("ws");
        let _ = store.insert_workspace(&ws, json!({}));
        let mut nav = Navigator::new(store, ws, &scenario(n));

        for op in ops {
            let before = nav.current_index();
            let epoch = nav.epoch();
            let t = match op {
                Op::Submit => nav.submit(Some(json!(1).into())),
                Op::Back => nav.back(),
                Op::GoTo(i) => nav.go_to(i),
                Op::Reset => nav.reset(),
                Op::StaleSubmit => nav.submit_for("not-a-node", None),
            };

            if n == 0 {
                prop_assert!(nav.current_node().is_none());
                prop_assert!(!t.is_applied());
                continue;
            }

            prop_assert!(nav.current_index() < n);
            prop_assert_eq!(nav.is_first_node(), nav.current_index() == 0);
            prop_assert_eq!(nav.is_last_node(), nav.current_index() == n - 1);

            match t {
                Transition::Advanced { from, to } => {
                    prop_assert_eq!(from, before);
                    prop_assert_eq!(to, before + 1);
                }
                Transition::Retreated { from, to } => {
                    prop_assert_eq!(from, before);
                    prop_assert_eq!(to + 1, before);
                }
                Transition::Completed { .. } => prop_assert_eq!(before, n - 1),
                Transition::Exited => prop_assert_eq!(before, 0),
                Transition::Jumped { from, .. } => prop_assert_eq!(from, before),
                Transition::Ignored(_) => {
                    prop_assert_eq!(nav.current_index(), before);
                    prop_assert_eq!(nav.epoch(), epoch);
                }
            }
        }
    }

    #[test]
    fn prop_submits_from_start_visit_every_node(n in 1..8usize) {
        let store = ContextStore::new();
        let ws = WorkspaceId::new("ws");
        let _ = store.insert_workspace(&ws, json!({}));
        let mut nav = Navigator::new(store.clone(), ws.clone(), &scenario(n));

        for i in 0..n {
            let t = nav.submit(Some(json!(i).into()));
            if i + 1 == n {
                prop_assert!(matches!(t, Transition::Completed { .. }), "expected completion");
            } else {
                prop_assert_eq!(t, Transition::Advanced { from: i, to: i + 1 });
            }
        }

        for i in 0..n {
            let path = format!("answers.n{i}");
            let stored = store.get_context(&ws, Some(&path)).map(|v| v.to_json());
            prop_assert_eq!(stored, Some(json!(i)));
        }
    }
}

#[test]
fn stale_submit_names_current_node() {
    let mut nav = Navigator::new(ContextStore::new(), WorkspaceId::new("ws"), &scenario(2));
    assert_eq!(
        nav.submit_for("n1", None),
        Transition::Ignored(IgnoreReason::StaleNode {
            expected: "n1".to_string(),
            current: Some("n0".to_string()),
        })
    );
}
