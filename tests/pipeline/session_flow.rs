use crate::fake_provider::{
    Exchange, FakeProvider, Harness, capture, captured, code, message_start, result_with_files,
    text,
};
use math_solver::providers::{ContentBlock, StreamEvent};
use math_solver::session::{Session, SessionSummary, spawn_line_reader};
use math_solver::solver::{MathSolver, OutputLayout};
use std::io::BufReader;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Notify, mpsc};

fn session_for(harness: &Harness) -> (Session, Arc<std::sync::Mutex<String>>) {
    let (writer, buffer) = capture();
    let solver = MathSolver::new(
        Arc::clone(&harness.provider) as Arc<dyn math_solver::providers::Provider>,
        OutputLayout::new(harness.layout().root()),
        "claude-test",
        4096,
    );
    (Session::with_output(solver, writer), buffer)
}

#[tokio::test]
async fn quit_keywords_end_the_session_without_being_asked() {
    for keyword in ["quit", "EXIT", "Q", "  Quit  "] {
        let harness = Harness::new(FakeProvider::new().responding(vec![text("36")]));
        let (session, buffer) = session_for(&harness);
        let input = format!("What is 15% of 240?\n{keyword}\nnever asked\n");

        let summary = session.run(input.as_bytes()).await;

        assert_eq!(summary.answered, 1, "keyword {keyword:?}");
        assert_eq!(summary.failed, 0);
        assert_eq!(harness.provider.requests().len(), 1);
        let output = captured(&buffer);
        assert!(output.contains("Thanks for using the Math Solver! Goodbye!"));
        assert!(!output.contains("never asked"));
    }
}

#[tokio::test]
async fn blank_lines_reprompt_without_consuming_an_ordinal() {
    let harness = Harness::new(FakeProvider::new().responding(vec![text("36")]));
    let (session, buffer) = session_for(&harness);

    let summary = session.run("\n   \nWhat is 15% of 240?\nq\n".as_bytes()).await;

    assert_eq!(summary.answered, 1);
    let output = captured(&buffer);
    assert_eq!(output.matches("Please enter a question.").count(), 2);
    assert_eq!(output.matches("Question #1:").count(), 3);
    assert!(output.contains("Question #2:"));
    assert!(!output.contains("Question #3:"));
}

#[tokio::test]
async fn failed_question_does_not_end_the_session() {
    let harness = Harness::new(
        FakeProvider::new()
            .exchange(Exchange::RefuseToOpen("overloaded".into()))
            .responding(vec![
                text("Plotting."),
                code("srvtoolu_1", "plt.savefig('p.png')"),
                result_with_files("srvtoolu_1", &["file_p"]),
            ])
            .file("file_p", "p.png", b"PNG"),
    );
    let (session, buffer) = session_for(&harness);

    let summary = session
        .run("Find the Fourier series of a square wave\nGraph y = x^2\n".as_bytes())
        .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.answered, 1);
    assert_eq!(summary.reports.len(), 1);
    assert!(summary.reports[0].exists());

    let output = captured(&buffer);
    assert!(output.contains("❌ Error solving problem:"));
    assert!(output.contains("Please try again with a different question."));
    assert!(output.contains("📥 Downloading 1 file(s)..."));
    assert!(output.contains("✅ Downloaded: p.png"));
    assert!(output.contains("📝 Generating report..."));
    assert!(output.contains("✅ Solution complete!"));
    assert!(output.contains("🖼️  Visualizations: 1 file(s) saved"));
    assert!(output.contains("Question #3:"));
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let harness = Harness::new(FakeProvider::new());
    let (session, buffer) = session_for(&harness);

    let summary = session.run("".as_bytes()).await;

    assert_eq!(summary, SessionSummary::default());
    assert!(harness.provider.requests().is_empty());
    assert!(captured(&buffer).contains("Goodbye!"));
}

#[tokio::test]
async fn live_trace_is_written_through_the_session_output() {
    let harness = Harness::new(FakeProvider::new().responding(vec![
        text("x = 5"),
        code("srvtoolu_1", "print(5)"),
    ]));
    let (session, buffer) = session_for(&harness);

    session.run("Solve for x: 3x + 7 = 22\n".as_bytes()).await;

    let output = captured(&buffer);
    let thinking = output.find("🤔 Thinking about: Solve for x: 3x + 7 = 22").unwrap();
    let response = output.find("📝 Response: ").unwrap();
    let tool = output.find("🔧 Using tool: code_execution").unwrap();
    let completed = output.find("✅ Completed: end_turn").unwrap();
    assert!(thinking < response && response < tool && tool < completed);
}

#[tokio::test]
async fn out_of_range_block_index_fails_only_that_question() {
    let harness = Harness::new(
        FakeProvider::new()
            .exchange(Exchange::Respond(vec![
                message_start(),
                StreamEvent::ContentBlockStart {
                    index: 1 << 36,
                    content_block: ContentBlock::text(""),
                },
                StreamEvent::MessageStop,
            ]))
            .responding(vec![text("36")]),
    );
    let (session, buffer) = session_for(&harness);

    let summary = session
        .run("What is 2 + 2?\nWhat is 15% of 240?\n".as_bytes())
        .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.answered, 1);
    assert_eq!(harness.reports().len(), 1);
    assert!(captured(&buffer).contains("skips ahead"));
}

#[tokio::test]
async fn interrupt_at_the_prompt_ends_the_session_while_input_stays_open() {
    let harness = Harness::new(FakeProvider::new());
    let (session, buffer) = session_for(&harness);
    let notify = Arc::new(Notify::new());
    notify.notify_one();
    let (_keep_open, lines) = mpsc::channel::<std::io::Result<String>>(1);

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        session.interrupted_by(notify).run_lines(lines),
    )
    .await
    .unwrap();

    assert_eq!(summary, SessionSummary::default());
    assert!(harness.provider.requests().is_empty());
    assert!(captured(&buffer).contains("Session interrupted. Goodbye!"));
}

/// Input that never arrives until `release` is dropped.
struct StalledInput(std::sync::mpsc::Receiver<()>);

impl std::io::Read for StalledInput {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        let _ = self.0.recv();
        Ok(0)
    }
}

#[test]
fn runtime_shuts_down_while_the_input_reader_is_still_blocked() {
    let (release, stalled) = std::sync::mpsc::channel::<()>();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(20));
        drop(release);
    });

    let harness = Harness::new(FakeProvider::new());
    let (session, buffer) = session_for(&harness);
    let notify = Arc::new(Notify::new());
    notify.notify_one();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    let started = Instant::now();
    let summary = runtime.block_on(
        session
            .interrupted_by(notify)
            .run_lines(spawn_line_reader(BufReader::new(StalledInput(stalled)))),
    );
    drop(runtime);

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(summary, SessionSummary::default());
    assert!(captured(&buffer).contains("Session interrupted. Goodbye!"));
}
