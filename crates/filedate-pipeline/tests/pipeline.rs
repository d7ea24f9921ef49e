//! End-to-end runs over a real source tree with a scripted metadata service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use filedate_config::{DateFieldRule, DateFieldRules};
use filedate_pipeline::{DispatchOptions, Dispatcher, PipelineError, RunSummary};
use filedate_telemetry::Metrics;
use filedate_test_support::{ScriptedMetadata, write_files};
use tempfile::TempDir;

const EXIF_PATTERN: &str = "%Y:%m:%d %H:%M:%S";

fn options(batch_size: usize, fields: &[&str]) -> anyhow::Result<DispatchOptions> {
    Ok(DispatchOptions {
        batch_size,
        date_fields: DateFieldRules::new(
            fields
                .iter()
                .map(|field| DateFieldRule {
                    field: (*field).to_string(),
                    pattern: EXIF_PATTERN.to_string(),
                })
                .collect(),
        )?,
        output_date_format: "%Y_%m".to_string(),
    })
}

struct Tree {
    _temp: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

fn tree(files: &[&str]) -> anyhow::Result<Tree> {
    let temp = TempDir::new()?;
    let source = temp.path().join("in");
    let destination = temp.path().join("out");
    std::fs::create_dir_all(&source)?;
    write_files(&source, files)?;
    Ok(Tree {
        _temp: temp,
        source,
        destination,
    })
}

fn remaining(root: &Path) -> anyhow::Result<usize> {
    let mut stack = vec![root.to_path_buf()];
    let mut count = 0;
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                count += 1;
            }
        }
    }
    Ok(count)
}

#[tokio::test]
async fn dated_files_move_and_undated_files_stay() -> anyhow::Result<()> {
    let tree = tree(&["IMG_0001.jpg", "nested/IMG_0002.jpg", "notes.txt"])?;
    let service = Arc::new(
        ScriptedMetadata::new()
            .with_date(tree.source.join("IMG_0001.jpg"), "CreateDate", "2019:04:04 13:18:04")
            .with_date(
                tree.source.join("nested/IMG_0002.jpg"),
                "CreateDate",
                "2020:12:25 08:30:00",
            ),
    );
    let metrics = Metrics::new()?;
    let dispatcher = Dispatcher::new(options(10, &["CreateDate"])?, service, metrics.clone())?;

    let summary = dispatcher.run(&tree.source, &tree.destination).await?;

    assert_eq!(
        summary,
        RunSummary {
            discovered: 3,
            classified: 2,
            moved: 2,
        }
    );
    assert!(tree.destination.join("2019_04/IMG_0001.jpg").is_file());
    assert!(tree.destination.join("2020_12/IMG_0002.jpg").is_file());
    assert!(tree.source.join("notes.txt").is_file());
    assert_eq!(remaining(&tree.source)?, 1);
    assert_eq!(metrics.snapshot().files_moved, 2);
    Ok(())
}

#[tokio::test]
async fn batches_follow_configured_size() -> anyhow::Result<()> {
    let tree = tree(&["a.jpg", "b.jpg", "c.jpg"])?;
    let service = Arc::new(ScriptedMetadata::new());
    let dispatcher = Dispatcher::new(
        options(2, &["CreateDate"])?,
        service.clone(),
        Metrics::new()?,
    )?;

    let summary = dispatcher.run(&tree.source, &tree.destination).await?;

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.classified, 0);
    let sizes: Vec<usize> = service.calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, [2, 1]);
    Ok(())
}

#[tokio::test]
async fn service_failure_aborts_the_run() -> anyhow::Result<()> {
    let tree = tree(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"])?;
    let service = Arc::new(ScriptedMetadata::new().fail_on_call(1));
    let dispatcher = Dispatcher::new(
        options(1, &["CreateDate"])?,
        service.clone(),
        Metrics::new()?,
    )?;

    let result = dispatcher.run(&tree.source, &tree.destination).await;

    assert!(matches!(result, Err(PipelineError::Metadata { files: 1, .. })));
    assert_eq!(service.call_count(), 1);
    assert_eq!(remaining(&tree.source)?, 4);
    assert!(!tree.destination.exists());
    Ok(())
}

#[tokio::test]
async fn later_batch_failure_keeps_earlier_work_and_stops_extraction() -> anyhow::Result<()> {
    let names = ["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"];
    let tree = tree(&names)?;
    let mut script = ScriptedMetadata::new().fail_on_call(2);
    for name in names {
        script = script.with_date(tree.source.join(name), "CreateDate", "2019:04:04 13:18:04");
    }
    let service = Arc::new(script);
    let metrics = Metrics::new()?;
    let dispatcher = Dispatcher::new(options(2, &["CreateDate"])?, service.clone(), metrics.clone())?;

    let result = dispatcher.run(&tree.source, &tree.destination).await;

    assert!(matches!(result, Err(PipelineError::Metadata { files: 2, .. })));
    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.metadata_batches_ok, 1);
    assert_eq!(snapshot.metadata_batches_failed, 1);
    assert_eq!(snapshot.move_instructions, 2);

    // First-batch files were handed to the relocator; each is in exactly one place.
    for path in &calls[0] {
        let filed = tree.destination.join("2019_04").join(path.file_name().unwrap_or_default());
        assert_ne!(path.exists(), filed.is_file(), "{} lost or duplicated", path.display());
    }
    for path in &calls[1] {
        assert!(path.is_file(), "{} left the source tree", path.display());
    }
    assert_eq!(
        remaining(&tree.source)? + snapshot.files_moved as usize,
        names.len()
    );
    Ok(())
}

#[tokio::test]
async fn field_precedence_and_reordered_results() -> anyhow::Result<()> {
    let tree = tree(&["clip.mov", "photo.jpg"])?;
    let service = Arc::new(
        ScriptedMetadata::new()
            .reversed()
            .with_date(tree.source.join("clip.mov"), "CreateDate", "2018:01:01 00:00:00")
            .with_date(
                tree.source.join("clip.mov"),
                "MediaCreateDate",
                "2017:06:15 12:00:00",
            )
            .with_date(tree.source.join("photo.jpg"), "CreateDate", "2019:04:04 13:18:04"),
    );
    let dispatcher = Dispatcher::new(
        options(5, &["MediaCreateDate", "CreateDate"])?,
        service,
        Metrics::new()?,
    )?;

    let summary = dispatcher.run(&tree.source, &tree.destination).await?;

    assert_eq!(summary.moved, 2);
    assert!(tree.destination.join("2017_06/clip.mov").is_file());
    assert!(tree.destination.join("2019_04/photo.jpg").is_file());
    Ok(())
}

#[tokio::test]
async fn destination_inside_source_is_rejected_before_running() -> anyhow::Result<()> {
    let tree = tree(&["a.jpg"])?;
    let service = Arc::new(ScriptedMetadata::new());
    let dispatcher = Dispatcher::new(
        options(10, &["CreateDate"])?,
        service.clone(),
        Metrics::new()?,
    )?;

    let result = dispatcher
        .run(&tree.source, &tree.source.join("sorted"))
        .await;

    assert!(matches!(result, Err(ref err) if err.is_configuration()));
    assert_eq!(service.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn existing_destination_file_is_not_overwritten() -> anyhow::Result<()> {
    let tree = tree(&["a.jpg"])?;
    write_files(&tree.destination, &["2019_04/a.jpg"])?;
    std::fs::write(tree.destination.join("2019_04/a.jpg"), b"keep me")?;
    let service = Arc::new(ScriptedMetadata::new().with_date(
        tree.source.join("a.jpg"),
        "CreateDate",
        "2019:04:04 13:18:04",
    ));
    let dispatcher = Dispatcher::new(options(10, &["CreateDate"])?, service, Metrics::new()?)?;

    let summary = dispatcher.run(&tree.source, &tree.destination).await?;

    assert_eq!(summary.classified, 1);
    assert_eq!(summary.moved, 0);
    assert_eq!(
        std::fs::read(tree.destination.join("2019_04/a.jpg"))?,
        b"keep me"
    );
    assert!(tree.source.join("a.jpg").is_file());
    Ok(())
}
