use clustersh::executor::CommandExecutor;

#[tokio::test]
async fn test_execute_multiline_output_is_exact() {
    let executor = CommandExecutor::new();

    let output = executor
        .execute("", "printf 'line1\\nline2\\n'")
        .await
        .unwrap();

    assert_eq!(output, "line1\nline2\n");
}

#[tokio::test]
async fn test_execute_empty_output() {
    let executor = CommandExecutor::new();

    let output = executor.execute("", "true").await.unwrap();

    assert_eq!(output, "");
}

#[tokio::test]
async fn test_execute_feeds_input_as_stdin() {
    let executor = CommandExecutor::new();

    let output = executor.execute("hello", "cat").await.unwrap();

    assert!(output.contains("hello"));
}

#[tokio::test]
async fn test_execute_closes_stdin_for_eof_readers() {
    let executor = CommandExecutor::new();

    // wc blocks until stdin reaches end-of-file; this hangs if the
    // executor leaves the write end open.
    let output = executor.execute("one two three", "wc -w").await.unwrap();

    assert_eq!(output.trim(), "3");
}

#[tokio::test]
async fn test_execute_large_output() {
    let executor = CommandExecutor::new();

    let output = executor.execute("", "seq 1 1000").await.unwrap();

    assert_eq!(output.lines().count(), 1000);
}

#[tokio::test]
async fn test_execute_piped_commands() {
    let executor = CommandExecutor::new();

    let output = executor
        .execute("", "echo 'hello world' | wc -w")
        .await
        .unwrap();

    assert_eq!(output.trim(), "2");
}

#[tokio::test]
async fn test_cd_changes_working_directory() {
    let executor = CommandExecutor::new();

    // cd spawns nothing and always reports empty output.
    let output = executor.execute("", "cd /tmp").await.unwrap();
    assert_eq!(output, "");

    // Later commands resolve relative to the new directory.
    let pwd = executor.execute("", "pwd").await.unwrap();
    assert_eq!(pwd.trim_end(), "/tmp");
}

#[tokio::test]
async fn test_cd_failure_is_not_fatal() {
    let executor = CommandExecutor::new();

    let output = executor
        .execute("", "cd /nonexistent_dir_for_cd_test")
        .await
        .unwrap();

    assert_eq!(output, "");
}

#[tokio::test]
async fn test_execute_ignores_failing_exit_status() {
    let executor = CommandExecutor::new();

    // Captured stdout is the result even when the command fails.
    let output = executor.execute("", "echo partial && false").await.unwrap();

    assert_eq!(output, "partial\n");
}
