use crate::fake_provider::{
    Exchange, FakeProvider, Harness, MODEL, code, message_start, result_with_files, text,
};
use math_solver::SolverError;
use math_solver::error::DispatchError;
use math_solver::providers::{ContentBlock, NullStreamSink, StreamEvent};
use math_solver::solver::{NullProgress, Question};

#[tokio::test]
async fn report_linearizes_response_in_order() {
    let harness = Harness::new(
        FakeProvider::new()
            .responding(vec![
                text("I'll isolate x."),
                code("srvtoolu_1", "x = (22 - 7) / 3\nprint(x)"),
                result_with_files("srvtoolu_1", &[]),
                text("Now let me plot the line."),
                ContentBlock::Unsupported,
                code("srvtoolu_2", "plt.savefig('linear_equation.png')"),
                result_with_files("srvtoolu_2", &["file_plot"]),
                text("So x = 5."),
            ])
            .file("file_plot", "linear_equation.png", b"\x89PNG"),
    );

    let solved = harness
        .solver
        .process(
            Question::new("Solve for x: 3x + 7 = 22", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap();

    assert_eq!(harness.reports(), vec![solved.report_path.clone()]);
    let file_name = solved
        .report_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap();
    assert!(file_name.ends_with("_Solve_for_x_3x__7__22.md"));

    let report = std::fs::read_to_string(&solved.report_path).unwrap();
    assert!(report.contains(
        "## Solution\n\nI'll isolate x.\n\nNow let me plot the line.\n\nSo x = 5.\n\n---\n\n## Code Used"
    ));
    assert!(report.contains(
        "### Code Block 1\n\n```python\nx = (22 - 7) / 3\nprint(x)\n```\n\n\
         ### Code Block 2\n\n```python\nplt.savefig('linear_equation.png')\n```\n\n"
    ));
    assert!(report.contains("![linear_equation.png](../images/linear_equation.png)"));
    assert!(report.contains(&format!("- **Model:** {MODEL}\n")));
}

#[tokio::test]
async fn request_wraps_question_and_declares_code_execution() {
    let harness = Harness::new(FakeProvider::new().responding(vec![text("15% of 240 is 36.")]));

    harness
        .solver
        .process(
            Question::new("What is 15% of 240?", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap();

    let requests = harness.provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, MODEL);
    assert!(requests[0].prompt.contains("Problem: What is 15% of 240?"));
    assert_eq!(requests[0].tools.len(), 1);
    assert_eq!(requests[0].tools[0].name, "code_execution");
    assert_eq!(requests[0].tools[0].kind, "code_execution_20250522");
}

#[tokio::test]
async fn empty_response_renders_without_optional_sections() {
    let harness = Harness::new(FakeProvider::new().responding(Vec::new()));

    let solved = harness
        .solver
        .process(
            Question::new("Convert 45 degrees to radians", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap();

    assert!(solved.extraction.code_blocks.is_empty());
    assert!(solved.extraction.file_references.is_empty());
    let report = std::fs::read_to_string(&solved.report_path).unwrap();
    assert!(report.contains("## Problem Statement\n\nConvert 45 degrees to radians\n\n"));
    assert!(!report.contains("## Code Used"));
    assert!(!report.contains("## Generated Visualizations"));
}

#[tokio::test]
async fn refused_exchange_fails_without_report() {
    let harness = Harness::new(
        FakeProvider::new().exchange(Exchange::RefuseToOpen(
            "Anthropic API request failed (401 Unauthorized): invalid x-api-key".into(),
        )),
    );

    let err = harness
        .solver
        .process(
            Question::new("What is 15% of 240?", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SolverError::Dispatch(DispatchError::Open(_))));
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("401"));
    assert!(harness.reports().is_empty());
}

#[tokio::test]
async fn interrupted_stream_fails_without_report() {
    let harness = Harness::new(FakeProvider::new().exchange(Exchange::BreakAfter(
        vec![
            message_start(),
            StreamEvent::ContentBlockStart {
                index: 0,
                content_block: ContentBlock::text("Partial"),
            },
        ],
        "connection reset by peer".into(),
    )));

    let err = harness
        .solver
        .process(
            Question::new("Find the area of a circle with radius 5", 1).unwrap(),
            &NullStreamSink,
            &NullProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SolverError::Dispatch(DispatchError::Stream(_))));
    assert!(harness.reports().is_empty());
}
