//! Command-line behaviour and exit statuses.

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use filedate_app::{AppError, Cli, execute, run_from};
use filedate_config::{ConfigOverrides, DispatcherConfig, parse_config};
use filedate_telemetry::Metrics;
use filedate_test_support::{ScriptedMetadata, write_files};
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "loggingLevel": "debug",
    "batchSize": 2,
    "outputDateFormat": "%Y_%m",
    "dateFields": [
        { "field": "MediaCreateDate", "pattern": "%Y:%m:%d %H:%M:%S" },
        { "field": "CreateDate", "pattern": "%Y:%m:%d %H:%M:%S" }
    ]
}"#;

fn config() -> anyhow::Result<DispatcherConfig> {
    Ok(parse_config(CONFIG, &ConfigOverrides::default())?)
}

fn cli(temp: &TempDir) -> anyhow::Result<Cli> {
    let args: Vec<OsString> = vec![
        "filedate".into(),
        "-s".into(),
        temp.path().join("in").into_os_string(),
        "-d".into(),
        temp.path().join("out").into_os_string(),
        "-c".into(),
        temp.path().join("conf.json").into_os_string(),
    ];
    Ok(Cli::try_parse_from(args)?)
}

#[tokio::test]
async fn missing_arguments_exit_with_configuration_status() {
    assert_eq!(run_from(["filedate"]).await, 1);
    assert_eq!(run_from(["filedate", "-s", "in", "-d", "out"]).await, 1);
}

#[tokio::test]
async fn unreadable_or_invalid_config_exits_with_configuration_status() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let source = temp.path().join("in");
    std::fs::create_dir_all(&source)?;
    let missing = temp.path().join("missing.json");
    let source_arg = source.to_string_lossy().into_owned();
    let missing_arg = missing.to_string_lossy().into_owned();

    assert_eq!(
        run_from(["filedate", "-s", source_arg.as_str(), "-d", "out", "-c", missing_arg.as_str()]).await,
        1
    );

    let broken = temp.path().join("broken.json");
    std::fs::write(&broken, "{ not json")?;
    let broken_arg = broken.to_string_lossy().into_owned();
    assert_eq!(
        run_from(["filedate", "-s", source_arg.as_str(), "-d", "out", "-c", broken_arg.as_str()]).await,
        1
    );

    let zero_batch = temp.path().join("zero.json");
    std::fs::write(&zero_batch, CONFIG)?;
    let zero_arg = zero_batch.to_string_lossy().into_owned();
    assert_eq!(
        run_from([
            "filedate", "-s", source_arg.as_str(), "-d", "out", "-c", zero_arg.as_str(), "-b", "0"
        ])
        .await,
        1
    );
    Ok(())
}

#[tokio::test]
async fn execute_sorts_tree_with_injected_service() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let cli = cli(&temp)?;
    let files = write_files(&cli.source, &["a.jpg", "b.mov", "c.txt"])?;
    let service = Arc::new(
        ScriptedMetadata::new()
            .with_date(&files[0], "CreateDate", "2019:04:04 13:18:04")
            .with_date(&files[1], "MediaCreateDate", "2021:02:03 04:05:06"),
    );

    let summary = execute(&cli, &config()?, service.clone(), Metrics::new()?).await?;

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.moved, 2);
    assert_eq!(service.call_count(), 2);
    assert!(cli.destination.join("2019_04/a.jpg").is_file());
    assert!(cli.destination.join("2021_02/b.mov").is_file());
    assert!(files[2].is_file());
    Ok(())
}

#[tokio::test]
async fn missing_source_is_a_configuration_failure() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let cli = cli(&temp)?;

    let result = execute(
        &cli,
        &config()?,
        Arc::new(ScriptedMetadata::new()),
        Metrics::new()?,
    )
    .await;

    let Err(err) = result else {
        anyhow::bail!("expected missing source to fail");
    };
    assert!(matches!(err, AppError::Pipeline { .. }));
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn service_failure_is_an_execution_failure() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let cli = cli(&temp)?;
    write_files(&cli.source, &["a.jpg"])?;

    let result = execute(
        &cli,
        &config()?,
        Arc::new(ScriptedMetadata::new().fail_on_call(1)),
        Metrics::new()?,
    )
    .await;

    let Err(err) = result else {
        anyhow::bail!("expected metadata failure to abort the run");
    };
    assert_eq!(err.exit_code(), 2);
    assert!(cli.source.join("a.jpg").is_file());
    Ok(())
}
