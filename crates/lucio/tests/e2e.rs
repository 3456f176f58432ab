//! End-to-end runs through all four stages with scripted model answers,
//! fixture pages and the real PDF renderer.
//!
//! Adding a case means adding an entry to `TEST_CASES`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FixtureWeb, ScriptedModel, TestHarness};
use lucio::pipeline::{NoopProgress, PipelineStatus, RunRequest};
use lucio::worker::{PipelineJob, WorkerPool};

const ARTICLE_URL: &str = "https://news.example.org/story";
const ARTICLE_TEXT: &str = "Rust adoption keeps growing. Teams cite memory safety. \
     Tooling has matured a lot. Compile times are still a complaint.";

struct TestCase {
    name: &'static str,
    prompt: &'static str,
    supplied_url: Option<&'static str>,
    has_frame: bool,
    screen_analysis: &'static str,
    directive_answer: &'static str,
    expected_status: PipelineStatus,
    /// URL that reached the fetcher, if any.
    expected_fetch: Option<&'static str>,
    /// Each entry must appear in the error trail, in order.
    expected_errors: &'static [&'static str],
}

const TEST_CASES: &[TestCase] = &[
    TestCase {
        name: "url_labelled_on_screen",
        prompt: "summarize this article about rust",
        supplied_url: None,
        has_frame: true,
        screen_analysis: "A browser with a news story.\nURL: https://news.example.org/story",
        directive_answer: "URL: N/A",
        expected_status: PipelineStatus::Completed,
        expected_fetch: Some(ARTICLE_URL),
        expected_errors: &[],
    },
    TestCase {
        name: "domain_in_address_bar",
        prompt: "write up what I am reading",
        supplied_url: None,
        has_frame: true,
        screen_analysis: "The address bar shows news.example.org/story above an article",
        directive_answer: "URL: N/A",
        expected_status: PipelineStatus::Completed,
        expected_fetch: Some(ARTICLE_URL),
        expected_errors: &[],
    },
    TestCase {
        name: "supplied_url_skips_screen",
        prompt: "make notes",
        supplied_url: Some(ARTICLE_URL),
        has_frame: false,
        screen_analysis: "unused",
        directive_answer: "unused",
        expected_status: PipelineStatus::Completed,
        expected_fetch: Some(ARTICLE_URL),
        expected_errors: &[],
    },
    TestCase {
        name: "url_in_prompt_counts_as_supplied",
        prompt: "make notes on https://news.example.org/story please",
        supplied_url: None,
        has_frame: false,
        screen_analysis: "unused",
        directive_answer: "unused",
        expected_status: PipelineStatus::Completed,
        expected_fetch: Some(ARTICLE_URL),
        expected_errors: &[],
    },
    TestCase {
        name: "directive_retry_recovers",
        prompt: "summarize the page",
        supplied_url: None,
        has_frame: true,
        screen_analysis: "A page with a picture of a cat.",
        directive_answer: "URL: https://news.example.org/story",
        expected_status: PipelineStatus::Completed,
        expected_fetch: Some(ARTICLE_URL),
        expected_errors: &["Perceive: No URL found in screen analysis"],
    },
    TestCase {
        name: "no_url_after_retry_fails_in_fetch",
        prompt: "summarize the page",
        supplied_url: None,
        has_frame: true,
        screen_analysis: "A desktop with no browser open.",
        directive_answer: "URL: N/A",
        expected_status: PipelineStatus::Failed,
        expected_fetch: None,
        expected_errors: &[
            "Perceive: No URL found in screen analysis",
            "Perceive: No URL could be inferred from the screen after retry",
            "Fetch: No URL detected for web scraping",
        ],
    },
    TestCase {
        name: "no_frame_fails_in_perceive",
        prompt: "summarize the page",
        supplied_url: None,
        has_frame: false,
        screen_analysis: "unused",
        directive_answer: "unused",
        expected_status: PipelineStatus::Failed,
        expected_fetch: None,
        expected_errors: &["Perceive: Failed to capture screen"],
    },
    TestCase {
        name: "unreachable_page_fails_in_fetch",
        prompt: "summarize",
        supplied_url: Some("https://down.example.net/"),
        has_frame: false,
        screen_analysis: "unused",
        directive_answer: "unused",
        expected_status: PipelineStatus::Failed,
        expected_fetch: Some("https://down.example.net/"),
        expected_errors: &["Fetch: Failed to scrape content from https://down.example.net/"],
    },
];

fn harness_for(case: &TestCase) -> TestHarness {
    let model = ScriptedModel {
        screen_analysis: case.screen_analysis.to_string(),
        directive_answer: case.directive_answer.to_string(),
        ..ScriptedModel::default()
    };
    let web = FixtureWeb::default().with_page(ARTICLE_URL, "Rust in 2026", ARTICLE_TEXT);
    let harness = TestHarness::new(model, web);
    if case.has_frame {
        harness.with_frame()
    } else {
        harness
    }
}

fn run_case(case: &TestCase) {
    let harness = harness_for(case);
    let pipeline = harness.pipeline();

    let mut request = RunRequest::new(case.prompt);
    request.url = case.supplied_url.map(str::to_string);

    let response = pipeline.run_request(&request, &NoopProgress);

    assert_eq!(
        response.status, case.expected_status,
        "[{}] unexpected status, errors: {:?}",
        case.name, response.errors
    );

    assert_eq!(
        response.errors.len(),
        case.expected_errors.len(),
        "[{}] error trail: {:?}",
        case.name,
        response.errors
    );
    for (actual, expected) in response.errors.iter().zip(case.expected_errors) {
        assert!(
            actual.starts_with(expected),
            "[{}] expected error starting with '{}', got '{}'",
            case.name,
            expected,
            actual
        );
    }

    let fetched = harness.web.fetched();
    match case.expected_fetch {
        Some(url) => assert_eq!(fetched, vec![url.to_string()], "[{}]", case.name),
        None => assert!(fetched.is_empty(), "[{}] fetched {:?}", case.name, fetched),
    }

    let files = harness.output_files();
    if case.expected_status == PipelineStatus::Completed {
        assert!(response.pdf_generated, "[{}]", case.name);
        assert_eq!(files.len(), 1, "[{}] outputs: {:?}", case.name, files);

        let path = response.pdf_file_path.as_deref().unwrap();
        assert_eq!(std::path::Path::new(path), files[0].as_path());

        let bytes = std::fs::read(&files[0]).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "[{}] not a PDF", case.name);

        let name = files[0].file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".pdf"));
        assert!(name.contains("rustin2026"), "[{}] filename {}", case.name, name);
    } else {
        assert!(!response.pdf_generated, "[{}]", case.name);
        assert!(response.pdf_file_path.is_none(), "[{}]", case.name);
        assert!(files.is_empty(), "[{}] outputs: {:?}", case.name, files);
    }
}

#[test]
fn test_all_cases() {
    for case in TEST_CASES {
        run_case(case);
    }
}

#[test]
fn test_screen_models_see_the_frame() {
    let case = &TEST_CASES[4];
    let harness = harness_for(case);
    harness
        .pipeline()
        .run_request(&RunRequest::new(case.prompt), &NoopProgress);

    assert_eq!(
        harness.model.calls(),
        vec!["plan", "perception", "directive", "web", "content"]
    );
}

#[test]
fn test_repeated_runs_never_overwrite() {
    let harness = harness_for(&TEST_CASES[2]);
    let pipeline = harness.pipeline();
    let request = RunRequest::new("make notes").with_url(ARTICLE_URL);

    let first = pipeline.run_request(&request, &NoopProgress);
    let second = pipeline.run_request(&request, &NoopProgress);

    assert_eq!(first.status, PipelineStatus::Completed);
    assert_eq!(second.status, PipelineStatus::Completed);
    assert_ne!(first.pdf_file_path, second.pdf_file_path);
    assert_eq!(harness.output_files().len(), 2);
}

#[test]
fn test_worker_pool_runs_cases_concurrently() {
    let harness = harness_for(&TEST_CASES[2]);
    let pool = WorkerPool::new(Arc::new(harness.pipeline()), 4);

    for i in 0..8 {
        let mut request = RunRequest::new(format!("notes {}", i));
        if i % 2 == 0 {
            request.url = Some(ARTICLE_URL.to_string());
        } else {
            request.url = Some(format!("https://missing{}.example.org/", i));
        }
        pool.submit(PipelineJob::new(request)).unwrap();
    }

    let mut completed = 0;
    let mut failed = 0;
    for _ in 0..8 {
        let outcome = pool
            .recv_result_timeout(Duration::from_secs(30))
            .expect("worker result");
        match outcome.record.status() {
            PipelineStatus::Completed => completed += 1,
            PipelineStatus::Failed => {
                let url = outcome.record.known_url().unwrap().to_string();
                assert!(outcome.record.errors()[0].contains(&url));
                failed += 1;
            }
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!((completed, failed), (4, 4));
    assert_eq!(harness.output_files().len(), 4);

    pool.shutdown();
    pool.wait();
}
