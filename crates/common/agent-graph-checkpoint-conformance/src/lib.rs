//! Conformance checks for [`BaseCheckpointSaver`] implementations.
//!
//! Each check runs against a saver with no prior state for the thread ids it
//! uses and reports the first violated expectation. Backends call
//! [`run_all`] from their own test suites.
//!
//! ```ignore
//! #[tokio::test]
//! async fn in_memory_saver_conforms() {
//!     let saver = InMemorySaver::new();
//!     agent_graph_checkpoint_conformance::run_all(&saver).await.unwrap();
//! }
//! ```

use agent_graph_checkpoint::{BaseCheckpointSaver, Checkpoint, CheckpointMetadata};
use serde_json::json;
use thiserror::Error;

/// A violated saver expectation.
#[derive(Debug, Error)]
pub enum ConformanceError {
    #[error("{check}: {message}")]
    Violation {
        check: &'static str,
        message: String,
    },

    #[error("{check}: saver returned an error: {source}")]
    Saver {
        check: &'static str,
        #[source]
        source: agent_graph_checkpoint::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConformanceError>;

fn ensure(check: &'static str, condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ConformanceError::Violation {
            check,
            message: message(),
        })
    }
}

fn saver_err(check: &'static str) -> impl FnOnce(agent_graph_checkpoint::Error) -> ConformanceError {
    move |source| ConformanceError::Saver { check, source }
}

async fn write(
    saver: &dyn BaseCheckpointSaver,
    check: &'static str,
    thread_id: &str,
    parent_id: Option<&str>,
    step: i64,
) -> Result<String> {
    let checkpoint = Checkpoint::new(json!({ "step": step }), vec!["next".to_string()]);
    let metadata = if step == 0 {
        CheckpointMetadata::input(step)
    } else {
        CheckpointMetadata::from_node(step, "node")
    };
    saver
        .put(thread_id, parent_id, checkpoint, metadata)
        .await
        .map_err(saver_err(check))
}

/// Unknown threads read as empty, unknown checkpoint ids as not found.
pub async fn check_missing_reads(saver: &dyn BaseCheckpointSaver) -> Result<()> {
    const CHECK: &str = "missing_reads";
    let thread = "conformance-missing";

    let latest = saver.get_tuple(thread, None).await.map_err(saver_err(CHECK))?;
    ensure(CHECK, latest.is_none(), || "expected no head".into())?;

    let history = saver.list(thread).await.map_err(saver_err(CHECK))?;
    ensure(CHECK, history.is_empty(), || "expected empty history".into())?;

    match saver.get_tuple(thread, Some("does-not-exist")).await {
        Err(err) if err.is_not_found() => Ok(()),
        Err(err) => Err(ConformanceError::Saver {
            check: CHECK,
            source: err,
        }),
        Ok(_) => Err(ConformanceError::Violation {
            check: CHECK,
            message: "expected NotFound for an unknown checkpoint id".into(),
        }),
    }
}

/// Default writes form a chain listed newest first.
pub async fn check_linear_history(saver: &dyn BaseCheckpointSaver) -> Result<()> {
    const CHECK: &str = "linear_history";
    let thread = "conformance-linear";

    let mut ids = Vec::new();
    for step in 0..4 {
        ids.push(write(saver, CHECK, thread, None, step).await?);
        let history = saver.list(thread).await.map_err(saver_err(CHECK))?;
        ensure(CHECK, history.len() == ids.len(), || {
            format!("expected {} checkpoints, found {}", ids.len(), history.len())
        })?;
    }

    let history = saver.list(thread).await.map_err(saver_err(CHECK))?;
    let listed: Vec<String> = history.iter().map(|t| t.checkpoint.id.clone()).collect();
    let expected: Vec<String> = ids.iter().rev().cloned().collect();
    ensure(CHECK, listed == expected, || {
        format!("expected {expected:?}, listed {listed:?}")
    })?;

    for pair in history.windows(2) {
        ensure(
            CHECK,
            pair[0].parent_id.as_deref() == Some(pair[1].checkpoint.id.as_str()),
            || "parent ids do not link the chain".into(),
        )?;
    }

    let latest = saver
        .get_tuple(thread, None)
        .await
        .map_err(saver_err(CHECK))?;
    ensure(
        CHECK,
        latest.is_some_and(|t| Some(&t.checkpoint.id) == ids.last()),
        || "head is not the last written checkpoint".into(),
    )
}

/// Branch writes leave earlier history and the head untouched.
pub async fn check_branches_preserve_history(saver: &dyn BaseCheckpointSaver) -> Result<()> {
    const CHECK: &str = "branches_preserve_history";
    let thread = "conformance-branch";

    let root = write(saver, CHECK, thread, None, 0).await?;
    let middle = write(saver, CHECK, thread, None, 1).await?;
    let head = write(saver, CHECK, thread, None, 2).await?;
    let before = saver.list(thread).await.map_err(saver_err(CHECK))?;

    let branch = write(saver, CHECK, thread, Some(root.as_str()), 1).await?;

    let after = saver.list(thread).await.map_err(saver_err(CHECK))?;
    ensure(CHECK, before == after, || {
        "history changed after branching".into()
    })?;

    let latest = saver
        .get_tuple(thread, None)
        .await
        .map_err(saver_err(CHECK))?;
    ensure(
        CHECK,
        latest.is_some_and(|t| t.checkpoint.id == head),
        || "head moved after branching".into(),
    )?;

    for id in [&root, &middle, &head, &branch] {
        let found = saver
            .get_tuple(thread, Some(id.as_str()))
            .await
            .map_err(saver_err(CHECK))?;
        ensure(CHECK, found.is_some(), || format!("checkpoint {id} lost"))?;
    }

    let forked = saver
        .get_tuple(thread, Some(branch.as_str()))
        .await
        .map_err(saver_err(CHECK))?;
    ensure(
        CHECK,
        forked.is_some_and(|t| t.parent_id.as_deref() == Some(root.as_str())),
        || "branch is not a child of its parent".into(),
    )
}

/// Unknown explicit parents are rejected.
pub async fn check_unknown_parent(saver: &dyn BaseCheckpointSaver) -> Result<()> {
    const CHECK: &str = "unknown_parent";
    let thread = "conformance-parent";

    match write(saver, CHECK, thread, Some("does-not-exist"), 1).await {
        Err(ConformanceError::Saver { source, .. }) if source.is_not_found() => Ok(()),
        Err(err) => Err(err),
        Ok(_) => Err(ConformanceError::Violation {
            check: CHECK,
            message: "expected NotFound for an unknown parent".into(),
        }),
    }
}

/// Stored state comes back exactly as written.
pub async fn check_state_round_trip(saver: &dyn BaseCheckpointSaver) -> Result<()> {
    const CHECK: &str = "state_round_trip";
    let thread = "conformance-state";

    let values = json!({
        "user_message": "my name is Jon",
        "memory_hits": ["likes: pizza"],
        "timeline": ["loaded_memories:1"],
        "stored_fact": null,
    });
    let checkpoint = Checkpoint::new(values.clone(), vec![]);
    let id = saver
        .put(thread, None, checkpoint, CheckpointMetadata::update(0, "node"))
        .await
        .map_err(saver_err(CHECK))?;

    let stored = saver
        .get_tuple(thread, Some(id.as_str()))
        .await
        .map_err(saver_err(CHECK))?;
    ensure(
        CHECK,
        stored.as_ref().is_some_and(|t| t.checkpoint.values == values),
        || format!("state changed on the way through: {stored:?}"),
    )?;
    ensure(
        CHECK,
        stored.is_some_and(|t| t.metadata == CheckpointMetadata::update(0, "node")),
        || "metadata changed on the way through".into(),
    )
}

/// Run every check in sequence.
pub async fn run_all(saver: &dyn BaseCheckpointSaver) -> Result<()> {
    check_missing_reads(saver).await?;
    check_linear_history(saver).await?;
    check_branches_preserve_history(saver).await?;
    check_unknown_parent(saver).await?;
    check_state_round_trip(saver).await?;
    Ok(())
}
