use crate::fake_provider::{FakeProvider, Harness, code, result_with_files, text};
use math_solver::error::FetchError;
use math_solver::providers::NullStreamSink;
use math_solver::solver::{FileReference, NullProgress, Question};

#[tokio::test]
async fn second_of_three_failing_downloads_is_skipped() {
    let harness = Harness::new(
        FakeProvider::new()
            .responding(vec![
                text("Plotting the three cases."),
                code("srvtoolu_1", "plt.savefig('a.png')"),
                result_with_files("srvtoolu_1", &["file_a", "file_b", "file_c"]),
            ])
            .file("file_a", "first_plot.png", b"AAA")
            .broken_file("file_b", "second_plot.png")
            .file("file_c", "third_plot.png", b"CCC"),
    );

    let solved = harness
        .solver
        .process(
            Question::new("Graph three parabolas", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap();

    let names: Vec<&str> = solved
        .fetch
        .saved
        .iter()
        .map(|f| f.filename.as_str())
        .collect();
    assert_eq!(names, vec!["first_plot.png", "third_plot.png"]);
    assert_eq!(solved.fetch.failures.len(), 1);
    assert!(matches!(
        &solved.fetch.failures[0],
        FetchError::Download { file_id, .. } if file_id == "file_b"
    ));
    assert_eq!(
        harness.provider.downloads(),
        vec!["file_a", "file_b", "file_c"]
    );

    let images = harness.layout().images_dir();
    assert_eq!(std::fs::read(images.join("first_plot.png")).unwrap(), b"AAA");
    assert_eq!(std::fs::read(images.join("third_plot.png")).unwrap(), b"CCC");
    assert!(!images.join("second_plot.png").exists());

    let report = std::fs::read_to_string(&solved.report_path).unwrap();
    let section = report
        .split("## Generated Visualizations\n\n")
        .nth(1)
        .and_then(|rest| rest.split("---").next())
        .unwrap();
    assert_eq!(
        section,
        "![first_plot.png](../images/first_plot.png)\n\n![third_plot.png](../images/third_plot.png)\n\n"
    );
    assert!(report.contains("- **Files created:** 2 visualization(s)"));
}

#[tokio::test]
async fn metadata_failure_skips_only_that_file() {
    let harness = Harness::new(
        FakeProvider::new()
            .responding(vec![result_with_files("srvtoolu_1", &["missing", "file_ok"])])
            .file("file_ok", "ok.png", b"PNG"),
    );

    let solved = harness
        .solver
        .process(
            Question::new("Plot something", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap();

    assert_eq!(solved.fetch.saved.len(), 1);
    assert!(matches!(
        &solved.fetch.failures[..],
        [FetchError::Metadata { file_id, .. }] if file_id == "missing"
    ));
    assert_eq!(harness.provider.downloads(), vec!["file_ok"]);
}

#[tokio::test]
async fn remote_filenames_stay_inside_images_directory() {
    let harness = Harness::new(
        FakeProvider::new()
            .file("file_x", "../../escape.png", b"X")
            .file("file_y", "", b"Y"),
    );

    let outcome = harness
        .solver
        .fetch_files(&[FileReference::new("file_x"), FileReference::new("file_y")])
        .await;

    let images = harness.layout().images_dir();
    assert!(!outcome.is_partial());
    assert_eq!(outcome.saved[0].path, images.join("escape.png"));
    assert_eq!(outcome.saved[1].path, images.join("file_y"));
    assert!(!harness.dir.path().join("escape.png").exists());
}

#[tokio::test]
async fn no_file_references_means_no_downloads() {
    let harness = Harness::new(FakeProvider::new().responding(vec![text("x = 5")]));

    let solved = harness
        .solver
        .process(
            Question::new("Solve for x: 3x + 7 = 22", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap();

    assert!(solved.fetch.saved.is_empty());
    assert!(harness.provider.downloads().is_empty());
}
