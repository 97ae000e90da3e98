//! Subcommand handlers

use anyhow::{bail, Context as _};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use wizflow_context::{ChangeTracker, ContextStore, WriteOutcome};
use wizflow_flow::{
    resolve_step, EchoClient, EngineConfig, NodeAttrs, StepAction, StepInput, StepOutcome,
    Transition, WizardSession, Workspace,
};

/// Options of the `run` subcommand
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Scenario to walk
    pub scenario: String,
    /// Inline JSON object or path to a JSON file, keyed by node id
    pub answers: Option<String>,
    /// Prefix used by the echo client for unanswered llmQuery nodes
    pub llm_prefix: String,
}

fn load_workspace(path: &Path) -> anyhow::Result<Workspace> {
    Workspace::load(path).with_context(|| format!("loading workspace {}", path.display()))
}

/// Describe scenarios, nodes and how each node's `tplFile` resolves
///
/// # Errors
/// Returns error if the workspace or resolver cannot be loaded.
pub fn inspect(path: &Path, config: &EngineConfig, json: bool) -> anyhow::Result<String> {
    let workspace = load_workspace(path)?;
    if json {
        return Ok(serde_json::to_string_pretty(&workspace)?);
    }

    let resolver = config.build_resolver()?;
    let mut out = String::new();
    writeln!(out, "workspace {} ({} scenarios)", workspace.id, workspace.scenarios.len())?;
    for scenario in &workspace.scenarios {
        writeln!(out, "scenario {} ({} nodes)", scenario.id, scenario.nodes.len())?;
        for (i, node) in scenario.nodes.iter().enumerate() {
            let resolution = resolve_step(&resolver, node);
            let status = match (&resolution.resolved_id, &resolution.pack) {
                (Some(id), Some(pack)) if resolution.requested != node.tpl_file => {
                    format!("{id} via node type ({pack})")
                }
                (Some(id), Some(pack)) if resolution.used_fallback() => {
                    format!("{id} via fallback ({pack})")
                }
                (Some(id), Some(pack)) => format!("{id} ({pack})"),
                _ => "missing".to_string(),
            };
            let path = node
                .context_path
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            writeln!(
                out,
                "  {}. {} [{}] {} -> {} @ {}",
                i + 1,
                node.id,
                node.attrs.kind(),
                node.tpl_file,
                status,
                path
            )?;
        }
    }
    Ok(out.trim_end().to_string())
}

fn parse_answers(raw: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw).with_context(|| format!("reading answers {raw}"))?
    };
    match serde_json::from_str::<Value>(&text).context("parsing answers")? {
        Value::Object(map) => Ok(map),
        other => bail!("answers must be a JSON object keyed by node id, got {other}"),
    }
}

/// Walk a scenario with scripted answers
///
/// Nodes with an answer receive it as form values. Unanswered llmQuery
/// nodes run through an [`EchoClient`]; every other node gets `Continue`.
/// Output is a transcript followed by the final context.
///
/// # Errors
/// Returns error if the workspace cannot be loaded, a node refuses its
/// input, or an LLM step fails.
pub async fn run(
    path: &Path,
    config: &EngineConfig,
    options: &RunOptions,
) -> anyhow::Result<String> {
    let workspace = load_workspace(path)?;
    let answers = parse_answers(options.answers.as_deref())?;
    let resolver = Arc::new(config.build_resolver()?);

    let store = ContextStore::new();
    let tracker = ChangeTracker::attach(&store, &config.tracker);
    let mut session = WizardSession::open(&workspace, &options.scenario, store, resolver)?;
    let client = EchoClient::new(options.llm_prefix.clone());

    let total = session.navigator().len();
    tracing::info!(
        scenario = %options.scenario,
        nodes = total,
        answers = answers.len(),
        "running scenario"
    );
    let mut out = String::new();
    // Back transitions are never issued, so each node is visited once.
    for _ in 0..total {
        let Some(step) = session.current_step() else {
            break;
        };
        let node_id = step.props.node.id.clone();
        let view = step.view();
        writeln!(
            out,
            "[{}/{}] {} ({})",
            session.navigator().current_index() + 1,
            total,
            view.title,
            view.renderer
        )?;
        for line in view.body.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(out, "    {line}")?;
        }

        let is_llm = matches!(step.props.node.attrs, NodeAttrs::LlmQuery(_));
        let transition = match answers.get(&node_id) {
            Some(answer) => expect_transition(
                &node_id,
                session.handle_input(StepInput::Values(answer.into())),
            )?,
            None if is_llm && !step.is_placeholder() => session
                .run_llm_step(&client)
                .await
                .with_context(|| format!("llm step '{node_id}'"))?,
            None => expect_transition(&node_id, session.handle_input(StepInput::Continue))?,
        };

        match transition {
            Transition::Advanced { .. } => {}
            Transition::Completed { .. } => {
                writeln!(out, "completed")?;
                break;
            }
            other => bail!("unexpected transition at '{node_id}': {other:?}"),
        }
    }

    let context = session
        .store()
        .export_context(session.workspace_id())
        .unwrap_or(Value::Null);
    writeln!(out, "changes: {}", tracker.records_for(session.workspace_id()).len())?;
    writeln!(out, "context:")?;
    out.push_str(&serde_json::to_string_pretty(&context)?);
    Ok(out)
}

fn expect_transition(node_id: &str, outcome: StepOutcome) -> anyhow::Result<Transition> {
    match outcome.transition {
        Some(transition) => Ok(transition),
        None => {
            let reason = match outcome.action {
                StepAction::Stay(Some(message)) => message,
                _ => "input was not accepted".to_string(),
            };
            bail!("node '{node_id}' stayed: {reason}")
        }
    }
}

/// Render `template` against the workspace's initial context
///
/// Each override is `path=value`; the value is parsed as JSON when it can
/// be, otherwise taken as a string.
///
/// # Errors
/// Returns error if the workspace cannot be loaded or an override is
/// malformed.
pub fn interpolate(path: &Path, template: &str, overrides: &[String]) -> anyhow::Result<String> {
    let workspace = load_workspace(path)?;
    let store = ContextStore::new();
    let _ = store.ensure_workspace(&workspace.id, workspace.initial_context.clone());

    for entry in overrides {
        let (target, raw) = entry
            .split_once('=')
            .with_context(|| format!("override '{entry}' is not path=value"))?;
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        let outcome = store.update_by_context_path(&workspace.id, target, value);
        if let WriteOutcome::Dropped(reason) = outcome {
            bail!("override '{entry}' rejected: {reason}");
        }
    }

    Ok(store.interpolate(template, &workspace.id))
}
