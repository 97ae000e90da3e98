//! End-to-end walks through the sample workspace

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wizflow_context::{ChangeTracker, ContextStore, TrackerConfig};
use wizflow_flow::{
    Node, Scenario, StepAction, StepInput, StepResolver, Transition, WizardSession, Workspace,
};
use wizflow_resolver::TemplatePack;
use wizflow_test_utils::{builtin_resolver, open_session, sample_workspace, workspace_id, TWO_STEP};

#[test]
fn two_answers_land_under_form() {
    let mut session = open_session(TWO_STEP);

    let first = session.handle_input(StepInput::Values(json!({"answer": "A"}).into()));
    assert_eq!(first.transition, Some(Transition::Advanced { from: 0, to: 1 }));

    let step = session.current_step().unwrap();
    assert_eq!(step.props.node.id, "q2");
    assert!(step.props.is_last_node);
    assert!(!step.props.is_first_node);

    let second = session.handle_input(StepInput::Values(json!({"answer": "B"}).into()));
    assert_eq!(
        second.transition,
        Some(Transition::Completed {
            node_id: "q2".to_string()
        })
    );
    assert!(session.navigator().is_last_node());

    let context = session.store().export_context(&workspace_id()).unwrap();
    assert_eq!(
        context["form"],
        json!({"q1": {"answer": "A"}, "q2": {"answer": "B"}})
    );
    assert_eq!(context["brand"], json!({"name": "Acme"}));
}

#[test]
fn invalid_form_input_keeps_node() {
    let mut session = open_session(TWO_STEP);
    let outcome = session.handle_input(StepInput::Values(json!({"answer": ""}).into()));

    assert!(matches!(outcome.action, StepAction::Stay(Some(_))));
    assert_eq!(outcome.transition, None);
    assert_eq!(session.navigator().current_index(), 0);
}

#[test]
fn back_then_resubmit_overwrites() {
    let mut session = open_session(TWO_STEP);
    let _ = session.handle_input(StepInput::Values(json!({"answer": "A"}).into()));
    let back = session.handle_input(StepInput::Back);
    assert_eq!(back.transition, Some(Transition::Retreated { from: 1, to: 0 }));

    let _ = session.handle_input(StepInput::Values(json!({"answer": "A2"}).into()));
    assert_eq!(
        session.store().get_context(&workspace_id(), Some("form.q1.answer")),
        Some("A2".into())
    );
    assert_eq!(
        session.handle_input(StepInput::Back).transition,
        Some(Transition::Retreated { from: 1, to: 0 })
    );
    assert_eq!(session.handle_input(StepInput::Back).transition, Some(Transition::Exited));
}

#[test]
fn identical_resubmission_does_not_bump_version() {
    let mut session = open_session(TWO_STEP);
    let _ = session.handle_input(StepInput::Values(json!({"answer": "A"}).into()));
    let version = session.store().version();

    let _ = session.handle_input(StepInput::Back);
    let _ = session.handle_input(StepInput::Values(json!({"answer": "A"}).into()));

    assert_eq!(session.store().version(), version);
}

#[test]
fn tracker_sees_each_bound_result() {
    let store = ContextStore::new();
    let tracker = ChangeTracker::attach(&store, &TrackerConfig::default());
    let mut session =
        WizardSession::open(&sample_workspace(), TWO_STEP, store, builtin_resolver()).unwrap();

    let _ = session.handle_input(StepInput::Values(json!({"answer": "A"}).into()));
    let _ = session.handle_input(StepInput::Values(json!({"answer": "B"}).into()));

    let paths: Vec<String> = tracker
        .records_for(&workspace_id())
        .iter()
        .flat_map(|r| r.diffs.iter().map(|d| d.path.to_string()))
        .collect();
    // namespace creation, then one diff per answer
    assert_eq!(paths, vec!["", "form", "form.q2"]);
}

#[test]
fn missing_template_yields_placeholder() {
    let workspace = Workspace::new("w").with_scenario(
        Scenario::new("s")
            .with_node(Node::new("chart", "chart-step").with_context_path("c".parse().unwrap()))
            .with_node(Node::new("end", "info-step")),
    );
    let mut session =
        WizardSession::open(&workspace, "s", ContextStore::new(), builtin_resolver()).unwrap();

    let step = session.current_step().unwrap();
    assert!(step.is_placeholder());
    let missing = step.missing.clone().unwrap();
    assert_eq!(missing.requested, "chart-step");
    assert_eq!(missing.attempted_fallback.as_deref(), Some("chart"));
    assert!(step.view().body.contains("chart-step"));

    let refused = session.handle_input(StepInput::Values("x".into()));
    assert_eq!(refused.transition, None);

    let moved = session.handle_input(StepInput::Continue);
    assert_eq!(moved.transition, Some(Transition::Advanced { from: 0, to: 1 }));
    assert!(session.store().get_context(&"w".into(), Some("c")).is_none());
}

#[test]
fn custom_pack_overrides_builtin() {
    let resolver = builtin_resolver();
    resolver
        .register(
            TemplatePack::new("brand")
                .with_priority(10)
                .with_flow_step(
                    "form-step",
                    Arc::new(wizflow_flow::InfoStep) as wizflow_flow::SharedRenderer,
                ),
        )
        .unwrap();

    let session =
        WizardSession::open(&sample_workspace(), TWO_STEP, ContextStore::new(), resolver).unwrap();
    let step = session.current_step().unwrap();
    assert_eq!(step.view().renderer, "info-step");
}

#[test]
fn node_type_default_used_when_tpl_file_unknown() {
    let workspace = Workspace::new("w").with_scenario(
        Scenario::new("s").with_node(
            Node::new("q", "my-form")
                .with_attrs(wizflow_test_utils::answer_form()),
        ),
    );
    let resolver: Arc<StepResolver> = builtin_resolver();
    let session = WizardSession::open(&workspace, "s", ContextStore::new(), resolver).unwrap();

    let step = session.current_step().unwrap();
    assert!(!step.is_placeholder());
    assert_eq!(step.resolved_id.as_deref(), Some("form-step"));
}
