use agent_graph_checkpoint::InMemorySaver;
use agent_graph_checkpoint_conformance as conformance;

#[tokio::test]
async fn test_in_memory_saver_conforms() {
    let saver = InMemorySaver::new();
    conformance::run_all(&saver).await.unwrap();
}

#[tokio::test]
async fn test_checks_are_independent() {
    let saver = InMemorySaver::new();
    conformance::check_branches_preserve_history(&saver)
        .await
        .unwrap();
    conformance::check_missing_reads(&saver).await.unwrap();
}
